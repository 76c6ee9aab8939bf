//! Wall-clock helpers

use chrono::{DateTime, Local, Utc};

const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Get current timestamp in milliseconds since Unix epoch
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

fn to_utc(timestamp_ms: u64) -> DateTime<Utc> {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// Format a Unix millisecond timestamp as `HH:MM:SS` in the local time
/// zone, the way the operator log renders it.
pub fn format_clock(timestamp_ms: u64) -> String {
    to_utc(timestamp_ms)
        .with_timezone(&Local)
        .format(CLOCK_FORMAT)
        .to_string()
}
