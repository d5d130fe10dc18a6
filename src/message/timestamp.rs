use crate::error::SyncError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Naive ISO-8601 form the vendor uses in platform contexts
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Convert a vendor timestamp to the canonical comparable form.
///
/// Accepts:
/// - RFC 3339 strings (`2018-06-16T05:03:49.230Z`)
/// - naive ISO-8601 strings (`2018-06-16T05:03:49.230000`), read as UTC
/// - epoch milliseconds, as a JSON integer or a numeric string
pub fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, SyncError> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| SyncError::InvalidTimestamp(n.to_string())),
        other => Err(SyncError::InvalidTimestamp(other.to_string())),
    }
}

pub fn parse_timestamp_str(s: &str) -> Result<DateTime<Utc>, SyncError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, NAIVE_FORMAT) {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    s.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| SyncError::InvalidTimestamp(s.to_string()))
}
