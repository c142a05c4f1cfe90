use std::sync::Arc;
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;
use crate::models::{FailureKind, FailureRecord, RefreshHealth, Snapshot, WeatherRecord};

struct State {
    snapshot: Arc<Snapshot>,
    health: RefreshHealth,
    closed: bool,
}

/// Holds the latest published snapshot together with the refresh health
///
/// Snapshots are immutable and swapped as a whole under one lock, readers hold on to the `Arc`
/// they got and never see a table from one cycle next to a chart from another.
pub struct ProjectionStore {
    state: RwLock<State>,
}

impl ProjectionStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                snapshot: Arc::new(Snapshot::default()),
                health: RefreshHealth::default(),
                closed: false,
            }),
        }
    }

    /// Returns the current snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.state.read().snapshot.clone()
    }

    /// Returns a copy of the refresh health
    pub fn health(&self) -> RefreshHealth {
        self.state.read().health.clone()
    }

    /// Replaces the published snapshot with one built from the given reduced table
    ///
    /// Returns the cycle number of the new snapshot, or None if the store is closed and the
    /// table was discarded
    ///
    /// # Arguments
    ///
    /// * 'table' - reduced table, one row per city
    pub fn commit(&self, table: Vec<WeatherRecord>) -> Option<u64> {
        let mut state = self.state.write();
        if state.closed {
            debug!("store closed, discarding {} rows", table.len());
            return None;
        }

        let now = Utc::now();
        let cycle = state.snapshot.cycle + 1;
        state.snapshot = Arc::new(Snapshot::new(cycle, now, table));
        state.health.successes += 1;
        state.health.consecutive_failures = 0;
        state.health.last_success = Some(now);

        Some(cycle)
    }

    /// Records a failed cycle, the published snapshot is left as is
    ///
    /// # Arguments
    ///
    /// * 'kind' - failure category
    /// * 'message' - description of the failure
    pub fn record_failure(&self, kind: FailureKind, message: String) {
        let mut state = self.state.write();
        if state.closed {
            return;
        }

        state.health.failures += 1;
        state.health.consecutive_failures += 1;
        state.health.last_failure = Some(FailureRecord { kind, message, at: Some(Utc::now()) });
    }

    /// Stops accepting commits and failures
    pub fn close(&self) {
        self.state.write().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }
}

impl Default for ProjectionStore {
    fn default() -> Self {
        Self::new()
    }
}
