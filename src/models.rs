use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::serialize_timestamp;

/// One reading as delivered by the weather endpoint
///
/// The timestamp is kept as sent, it is parsed only when ordering a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub timestamp: String,
    pub city: String,
    pub temp_c: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

/// Chart-ready projection of a reduced record
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub entity: String,
    pub value: f64,
}

impl From<&WeatherRecord> for ChartPoint {
    fn from(record: &WeatherRecord) -> Self {
        ChartPoint { entity: record.city.clone(), value: record.temp_c }
    }
}

/// The pair of views published after a successful refresh cycle
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub cycle: u64,
    #[serde(with = "serialize_timestamp")]
    pub refreshed_at: Option<DateTime<Utc>>,
    pub table: Vec<WeatherRecord>,
    pub chart: Vec<ChartPoint>,
}

impl Snapshot {
    /// Builds a snapshot from a reduced table, deriving the chart points from it
    ///
    /// # Arguments
    ///
    /// * 'cycle' - sequence number of the committing cycle
    /// * 'refreshed_at' - commit time
    /// * 'table' - reduced table, one row per city
    pub fn new(cycle: u64, refreshed_at: DateTime<Utc>, table: Vec<WeatherRecord>) -> Self {
        let chart = table.iter().map(ChartPoint::from).collect();
        Snapshot { cycle, refreshed_at: Some(refreshed_at), table, chart }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Decode,
    InvalidTimestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FailureRecord {
    pub kind: FailureKind,
    pub message: String,
    #[serde(with = "serialize_timestamp")]
    pub at: Option<DateTime<Utc>>,
}

/// Outcome counters of the refresh cycles
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RefreshHealth {
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u64,
    #[serde(with = "serialize_timestamp")]
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<FailureRecord>,
}
