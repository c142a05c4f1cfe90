use chrono::{DateTime, Utc};
use serde::{self, Serialize, Serializer};

/// Serializer for serde with to serialize an optional chrono `DateTime<Utc>` into a millisecond
/// timestamp, or null when absent.
/// This function is not used directly but rather from struct fields with a serde with attribute
/// pointing to this module
///
/// # Arguments
///
/// * 'date_time' - the date time object
/// * 'serializer' - serializer given from serde
pub fn serialize<S>(
    date_time: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    date_time.map(|d| d.timestamp_millis()).serialize(serializer)
}
