//! Lenient accessors over raw framework JSON.
//!
//! Framework exports vary between versions; absent optional fields read as
//! empty or zero rather than failing the conversion.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Array under `key`, or an empty slice when absent or not an array.
pub(crate) fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Non-negative millisecond value; fractional values are rounded.
pub(crate) fn millis_field(value: &Value, key: &str) -> Option<u64> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|ms| ms.max(0.0).round() as u64)
}

pub(crate) fn count_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn is_non_empty_object(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_object)
        .is_some_and(|o| !o.is_empty())
}

/// Parse a timestamp given either as RFC 3339 text or as epoch milliseconds.
pub(crate) fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_f64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single()),
        _ => None,
    }
}

/// Explicit duration when the payload carries one, otherwise wall-clock
/// time elapsed since the run started (0 when the start is unknown).
pub(crate) fn resolve_duration(
    explicit: Option<u64>,
    started: Option<&Value>,
    now: DateTime<Utc>,
) -> u64 {
    if let Some(ms) = explicit {
        return ms;
    }
    parse_timestamp(started)
        .map(|start| (now - start).num_milliseconds().max(0) as u64)
        .unwrap_or(0)
}
