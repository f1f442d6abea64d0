//! Timestamp utilities

use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const NAIVE_LOG_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Convert a filesystem time (e.g. an mtime) to UTC
pub fn from_system_time(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Parse a log timestamp.
///
/// RFC 3339 with any offset is accepted; a timestamp without offset is read as UTC.
pub fn parse_log_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, NAIVE_LOG_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Signed drift in whole seconds (`observed - nominal`, truncated toward zero)
pub fn drift_seconds(observed: DateTime<Utc>, nominal: DateTime<Utc>) -> i64 {
    (observed - nominal).num_seconds()
}
