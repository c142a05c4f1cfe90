use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::fmt::Formatter;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use crate::models::WeatherRecord;

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, PartialEq)]
pub struct ReduceError {
    pub city: String,
    pub timestamp: String,
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ReduceError::InvalidTimestamp: '{}' for city {}", self.timestamp, self.city)
    }
}

/// Reduces a batch of records to the latest record per city
///
/// The batch is stably sorted by timestamp and scanned from the latest record backwards, the
/// first record met for a city is kept and put in front of what was kept so far. Cities hence
/// come out ordered by where their latest record sits in the sorted batch.
///
/// # Arguments
///
/// * 'records' - the batch to reduce, in any order
pub fn reduce(records: Vec<WeatherRecord>) -> Result<Vec<WeatherRecord>, ReduceError> {
    let mut timed = records
        .into_iter()
        .map(|r| match parse_timestamp(&r.timestamp) {
            Some(at) => Ok((at, r)),
            None => Err(ReduceError { city: r.city, timestamp: r.timestamp }),
        })
        .collect::<Result<Vec<(DateTime<Utc>, WeatherRecord)>, ReduceError>>()?;

    // sort_by_key is stable, ties keep their input order
    timed.sort_by_key(|(at, _)| *at);

    let mut seen: HashSet<String> = HashSet::new();
    let mut latest: VecDeque<WeatherRecord> = VecDeque::new();
    for (_, record) in timed.into_iter().rev() {
        if seen.insert(record.city.clone()) {
            latest.push_front(record);
        }
    }

    Ok(latest.into())
}

/// Parses a record timestamp into an instant
///
/// Accepts RFC 3339, RFC 2822, ISO date times with or without seconds and offset, and plain
/// dates. A trailing `Z` means UTC, anything without an offset is taken as UTC as well.
///
/// # Arguments
///
/// * 'value' - timestamp as sent by the weather endpoint
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive_value = value.strip_suffix(['Z', 'z']).unwrap_or(value);
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use super::*;

    fn record(hour: u32, city: &str, temp_c: f64) -> WeatherRecord {
        WeatherRecord {
            timestamp: format!("2024-05-01T{:02}:00:00Z", hour),
            city: city.to_string(),
            temp_c,
            humidity: 50.0,
            weather: None,
            wind_speed: None,
        }
    }

    fn cities(records: &[WeatherRecord]) -> Vec<&str> {
        records.iter().map(|r| r.city.as_str()).collect()
    }

    #[test]
    fn empty_batch_reduces_to_empty() {
        assert!(reduce(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn latest_record_wins_and_order_follows_last_occurrence() {
        let input = vec![record(1, "X", 10.0), record(2, "X", 12.0), record(1, "Y", 5.0)];

        let reduced = reduce(input).unwrap();

        assert_eq!(reduced, vec![record(1, "Y", 5.0), record(2, "X", 12.0)]);
    }

    #[test]
    fn single_city_collapses_to_its_latest_sample() {
        let input = vec![
            record(3, "Seoul", 20.0),
            record(9, "Seoul", 24.0),
            record(5, "Seoul", 22.0),
        ];

        assert_eq!(reduce(input).unwrap(), vec![record(9, "Seoul", 24.0)]);
    }

    #[test]
    fn unsorted_input_is_ordered_by_time() {
        let input = vec![
            record(7, "Toronto", 9.0),
            record(2, "Vancouver", 11.0),
            record(4, "New York", 18.0),
            record(1, "Toronto", 7.0),
        ];

        let reduced = reduce(input).unwrap();

        assert_eq!(cities(&reduced), ["Vancouver", "New York", "Toronto"]);
        assert_eq!(reduced[2].temp_c, 9.0);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let reduced = reduce(vec![record(1, "A", 1.0), record(1, "B", 2.0)]).unwrap();
        assert_eq!(cities(&reduced), ["A", "B"]);

        let reduced = reduce(vec![record(1, "B", 2.0), record(1, "A", 1.0)]).unwrap();
        assert_eq!(cities(&reduced), ["B", "A"]);
    }

    #[test]
    fn duplicate_latest_timestamp_keeps_the_later_input() {
        let reduced = reduce(vec![record(4, "Oslo", 1.0), record(4, "Oslo", 2.0)]).unwrap();

        assert_eq!(reduced, vec![record(4, "Oslo", 2.0)]);
    }

    #[test]
    fn unparseable_timestamp_is_rejected() {
        let mut bad = record(1, "Lima", 15.0);
        bad.timestamp = "yesterday-ish".to_string();

        let err = reduce(vec![record(2, "Quito", 12.0), bad]).unwrap_err();

        assert_eq!(err, ReduceError {
            city: "Lima".to_string(),
            timestamp: "yesterday-ish".to_string(),
        });
    }

    #[test]
    fn timestamp_formats_are_understood() {
        let noon = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single();

        assert_eq!(parse_timestamp("2024-05-01T12:00:00Z"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T14:00:00+02:00"), Some(noon));
        assert_eq!(parse_timestamp("Wed, 01 May 2024 12:00:00 +0000"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01 12:00:00.000"), Some(noon));
        assert_eq!(
            parse_timestamp(" 2024-05-01T12:00:00.250 "),
            Some(noon + chrono::TimeDelta::milliseconds(250)),
        );
        assert_eq!(parse_timestamp("2024-05-01"), midnight);
        assert_eq!(parse_timestamp("not a time"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn minute_precision_and_compact_offsets_are_understood() {
        let noon = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-05-01T12:00Z"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T12:00"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01 12:00"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T14:00+02:00"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01 14:00+0200"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00+0000"), Some(noon));
        assert_eq!(
            parse_timestamp("2024-05-01T07:00:00.5-0500"),
            Some(noon + chrono::TimeDelta::milliseconds(500)),
        );
        assert_eq!(parse_timestamp("2024-05-01T12"), None);
    }

    #[test]
    fn minute_precision_batch_reduces() {
        let mut early = record(0, "X", 10.0);
        early.timestamp = "2024-05-01T10:00".to_string();
        let mut late = record(0, "X", 12.0);
        late.timestamp = "2024-05-01T11:30Z".to_string();
        let mut other = record(0, "Y", 5.0);
        other.timestamp = "2024-05-01 10:00+0000".to_string();

        let reduced = reduce(vec![early, late.clone(), other.clone()]).unwrap();

        assert_eq!(reduced, vec![other, late]);
    }

    fn batch() -> impl Strategy<Value = Vec<WeatherRecord>> {
        prop::collection::vec(
            (
                0u32..24,
                prop::sample::select(vec!["Vancouver", "Toronto", "New York", "Seoul"]),
                -30i32..45,
            ),
            0..40,
        ).prop_map(|rows| {
            rows.into_iter()
                .map(|(hour, city, temp)| record(hour, city, temp as f64))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn at_most_one_record_per_city(input in batch()) {
            let reduced = reduce(input.clone()).unwrap();

            let distinct: HashSet<&str> = input.iter().map(|r| r.city.as_str()).collect();
            let kept: HashSet<&str> = reduced.iter().map(|r| r.city.as_str()).collect();
            prop_assert_eq!(reduced.len(), kept.len());
            prop_assert_eq!(kept, distinct);
        }

        #[test]
        fn kept_record_is_the_latest_for_its_city(input in batch()) {
            let reduced = reduce(input.clone()).unwrap();

            // latest per city, later input wins a tie as the stable sort puts it last
            let mut expected: HashMap<&str, &WeatherRecord> = HashMap::new();
            for r in &input {
                let at = parse_timestamp(&r.timestamp).unwrap();
                match expected.get(r.city.as_str()) {
                    Some(prev) if parse_timestamp(&prev.timestamp).unwrap() > at => {}
                    _ => { expected.insert(r.city.as_str(), r); }
                }
            }

            for r in &reduced {
                prop_assert_eq!(Some(&r), expected.get(r.city.as_str()));
            }
        }

        #[test]
        fn reduction_is_idempotent(input in batch()) {
            let once = reduce(input).unwrap();
            let twice = reduce(once.clone()).unwrap();

            prop_assert_eq!(twice, once);
        }

        #[test]
        fn output_is_ordered_by_time(input in batch()) {
            let reduced = reduce(input).unwrap();

            let times: Vec<DateTime<Utc>> = reduced
                .iter()
                .map(|r| parse_timestamp(&r.timestamp).unwrap())
                .collect();
            prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn swapping_tied_records_keeps_survivors(
            input in batch(),
            hour in 0u32..24,
            pos in 0usize..41
        ) {
            let pos = pos % (input.len() + 1);
            let mut tied = input;
            tied.insert(pos, record(hour, "Lima", 15.0));
            tied.insert(pos + 1, record(hour, "Quito", 12.0));

            let mut swapped = tied.clone();
            swapped.swap(pos, pos + 1);

            let mut a = reduce(tied).unwrap();
            let mut b = reduce(swapped).unwrap();
            a.sort_by(|x, y| x.city.cmp(&y.city));
            b.sort_by(|x, y| x.city.cmp(&y.city));
            prop_assert_eq!(a, b);
        }
    }
}
