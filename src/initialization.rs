use std::env;
use std::fmt;
use std::fmt::Formatter;
use std::time::Duration;
use log::LevelFilter;
use reqwest::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_LIMIT: usize = 168;
const DEFAULT_INTERVAL_SECS: u64 = 60;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_BIND_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "./static";

#[derive(Clone, Debug)]
pub struct WeatherSource {
    pub base_url: String,
    pub limit: usize,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Refresh {
    pub interval: Duration,
}

#[derive(Clone, Debug)]
pub struct WebServer {
    pub bind_address: String,
    pub bind_port: u16,
    pub static_dir: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub weather: WeatherSource,
    pub refresh: Refresh,
    pub web_server: WebServer,
    pub log_level: LevelFilter,
}

#[derive(Debug, PartialEq)]
pub struct ConfigError {
    pub variable: String,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}: {}", self.variable, self.reason)
    }
}

/// Returns the dashboard configuration read from the process environment
///
pub fn config() -> Result<Config, ConfigError> {
    config_from(|key| env::var(key).ok())
}

/// Builds the configuration from the given variable lookup, falling back to
/// defaults for anything not set
///
/// # Arguments
///
/// * 'lookup' - returns the value of a named variable, if set
pub fn config_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let base_url = base_url(var("ETL_API_URL"))?;
    let limit = positive::<usize>("WEATHER_LIMIT", var("WEATHER_LIMIT"), DEFAULT_LIMIT)?;
    let interval = positive::<u64>(
        "REFRESH_INTERVAL_SECS",
        var("REFRESH_INTERVAL_SECS"),
        DEFAULT_INTERVAL_SECS,
    )?;
    let timeout = positive::<u64>(
        "HTTP_TIMEOUT_SECS",
        var("HTTP_TIMEOUT_SECS"),
        DEFAULT_TIMEOUT_SECS,
    )?;

    let bind_port = match var("BIND_PORT") {
        Some(v) => v.parse::<u16>().map_err(|e| invalid("BIND_PORT", e))?,
        None => DEFAULT_BIND_PORT,
    };

    let log_level = match var("LOG_LEVEL") {
        Some(v) => v.parse::<LevelFilter>().map_err(|e| invalid("LOG_LEVEL", e))?,
        None => LevelFilter::Info,
    };

    Ok(Config {
        weather: WeatherSource { base_url, limit, timeout: Duration::from_secs(timeout) },
        refresh: Refresh { interval: Duration::from_secs(interval) },
        web_server: WebServer {
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            bind_port,
            static_dir: var("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        },
        log_level,
    })
}

/// Validates the weather endpoint base url, returned without trailing slash
///
/// # Arguments
///
/// * 'value' - configured value, if any
fn base_url(value: Option<String>) -> Result<String, ConfigError> {
    let raw = value.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let url = Url::parse(&raw).map_err(|e| invalid("ETL_API_URL", e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("ETL_API_URL", format!("unsupported scheme '{}'", url.scheme())));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

fn positive<T>(name: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: fmt::Display,
{
    let Some(value) = value else {
        return Ok(default);
    };
    let parsed = value.parse::<T>().map_err(|e| invalid(name, e))?;
    if parsed <= T::default() {
        return Err(invalid(name, "must be greater than zero"));
    }

    Ok(parsed)
}

fn invalid(variable: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError { variable: variable.to_string(), reason: reason.to_string() }
}
