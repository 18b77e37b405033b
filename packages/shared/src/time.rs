//! Time helpers.
//!
//! Timestamps are carried around as Unix milliseconds and only turned into
//! strings at the edges (HTTP responses, logs).

use chrono::{DateTime, FixedOffset, Offset, Utc};

const JST_OFFSET_SECONDS: i32 = 9 * 3600;

fn jst() -> FixedOffset {
    // JST is UTC+9, always within the valid offset range
    FixedOffset::east_opt(JST_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Get current Unix timestamp (milliseconds)
///
/// A Unix timestamp does not depend on the time zone; the JST name is kept
/// because every timestamp this project renders is rendered in JST.
pub fn get_jst_timestamp() -> i64 {
    Utc::now().with_timezone(&jst()).timestamp_millis()
}

/// Convert a Unix timestamp (milliseconds) to an RFC 3339 string in JST.
///
/// Out-of-range values fall back to the Unix epoch.
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_millis).unwrap_or_default();
    utc.with_timezone(&jst()).to_rfc3339()
}
