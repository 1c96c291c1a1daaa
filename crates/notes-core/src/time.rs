//! Wall-clock helpers. All persisted timestamps are epoch milliseconds.

use chrono::Utc;

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
