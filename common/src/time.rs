use chrono::{TimeZone, Utc};

/// Wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Human-readable UTC rendering of a millisecond timestamp.
pub fn format_ms(ts_ms: u64) -> String {
    match Utc.timestamp_millis_opt(ts_ms as i64).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{ts_ms} ms"),
    }
}
