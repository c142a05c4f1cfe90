use env_logger::{Builder, Env};
use log::LevelFilter;

/// Sets up the global logger
///
/// The given level is the default filter, `RUST_LOG` overrides it when set.
///
/// # Arguments
///
/// * 'level' - default level filter
pub fn setup_logger(level: LevelFilter) {
    Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp_millis()
        .format_target(false)
        .init();
}
