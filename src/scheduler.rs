use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use crate::manager_weather::errors::WeatherError;
use crate::manager_weather::RecordSource;
use crate::models::FailureKind;
use crate::reducer::{reduce, ReduceError};
use crate::store::ProjectionStore;

#[derive(Clone, Debug)]
pub struct RefreshSettings {
    pub limit: usize,
    pub interval: Duration,
}

#[derive(Debug)]
pub enum CycleError {
    Weather(WeatherError),
    Reduce(ReduceError),
}

impl CycleError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CycleError::Weather(e) => e.kind(),
            CycleError::Reduce(_)  => FailureKind::InvalidTimestamp,
        }
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::Weather(e) => write!(f, "{}", e),
            CycleError::Reduce(e)  => write!(f, "{}", e),
        }
    }
}
impl From<WeatherError> for CycleError {
    fn from(e: WeatherError) -> Self { CycleError::Weather(e) }
}
impl From<ReduceError> for CycleError {
    fn from(e: ReduceError) -> Self { CycleError::Reduce(e) }
}

/// Runs one fetch, reduce and commit pass
///
/// Returns the committed cycle number, or None when the store was closed while the cycle ran
///
/// # Arguments
///
/// * 'source' - where to fetch records from
/// * 'store' - store to publish the reduced table to
/// * 'limit' - maximum number of records to fetch
pub async fn refresh_once(
    source: &dyn RecordSource,
    store: &ProjectionStore,
    limit: usize,
) -> Result<Option<u64>, CycleError> {
    if store.is_closed() {
        return Ok(None);
    }

    let records = source.fetch(limit).await?;
    let fetched = records.len();
    let table = reduce(records)?;

    debug!("reduced {} records to {} cities", fetched, table.len());

    Ok(store.commit(table))
}

/// Handle for asking the scheduler to refresh right away
#[derive(Clone)]
pub struct RefreshTrigger {
    notify: Arc<Notify>,
}

impl RefreshTrigger {
    pub fn request(&self) {
        self.notify.notify_one();
    }
}

/// Periodic refresh of the projection store
///
/// The first cycle runs as soon as the scheduler starts. Stopping (or dropping) the scheduler
/// closes the store and cancels the task, a cycle in flight is dropped with it.
pub struct RefreshScheduler {
    store: Arc<ProjectionStore>,
    trigger: RefreshTrigger,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {

    /// Spawns the refresh task on the current runtime
    ///
    /// # Arguments
    ///
    /// * 'source' - where to fetch records from
    /// * 'store' - store to publish snapshots to
    /// * 'settings' - fetch limit and refresh interval
    pub fn start(
        source: Arc<dyn RecordSource>,
        store: Arc<ProjectionStore>,
        settings: RefreshSettings,
    ) -> Self {
        let notify = Arc::new(Notify::new());

        info!(
            "starting refresh scheduler, limit {}, every {:?}",
            settings.limit, settings.interval
        );
        let handle = tokio::spawn(run(source, store.clone(), settings, notify.clone()));

        Self { store, trigger: RefreshTrigger { notify }, handle: Some(handle) }
    }

    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    /// Cancels the refresh task and waits for it to wind down
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            self.store.close();
            handle.abort();
            let _ = handle.await;
            info!("refresh scheduler stopped");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.store.close();
            handle.abort();
        }
    }
}

async fn run(
    source: Arc<dyn RecordSource>,
    store: Arc<ProjectionStore>,
    settings: RefreshSettings,
    notify: Arc<Notify>,
) {
    let mut ticker = time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = notify.notified() => {
                info!("refresh requested");
                ticker.reset();
            }
        }

        match refresh_once(source.as_ref(), &store, settings.limit).await {
            Ok(Some(cycle)) => {
                info!("refresh cycle {} committed, {} cities", cycle, store.snapshot().table.len());
            }
            Ok(None) => {
                debug!("store closed, leaving refresh loop");
                break;
            }
            Err(e) => {
                error!("refresh failed: {}", e);
                store.record_failure(e.kind(), e.to_string());
            }
        }
    }
}
