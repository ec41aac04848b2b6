use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Earliest calendar year a reading timestamp may carry.
///
/// Anything earlier is corrupt or placeholder data from a device whose clock
/// never synced, not merely an old reading, and is dropped outright.
pub const MIN_VALID_YEAR: i32 = 2025;

/// Timestamp value as it appears in a raw store document.
///
/// The collection accumulated three shapes over time: the document store's
/// native epoch wrapper, plain epoch milliseconds, and free-form date
/// strings. Untagged deserialization tries them in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Document-store timestamp wrapper: `{"seconds": ..., "nanoseconds": ...}`.
    Epoch {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
    /// Plain epoch milliseconds.
    Millis(i64),
    /// RFC3339 or a common `YYYY-MM-DD [HH:MM:SS]` string.
    Text(String),
}

/// Resolve a raw timestamp to a point in time.
///
/// Epoch wrappers resolve as seconds × 1000 → from-milliseconds; numbers are
/// taken as epoch milliseconds; strings go through RFC3339 first and then the
/// common date formats. Returns `None` when the value is absent, unparseable,
/// or resolves to a calendar year before `MIN_VALID_YEAR`. Pure; nothing
/// panics on malformed input.
pub fn resolve_timestamp(raw: Option<&RawTimestamp>) -> Option<DateTime<Utc>> {
    let resolved = match raw? {
        RawTimestamp::Epoch { seconds, .. } => {
            DateTime::from_timestamp_millis(seconds.checked_mul(1000)?)?
        }
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(*millis)?,
        RawTimestamp::Text(text) => parse_text_timestamp(text)?,
    };

    if resolved.year() >= MIN_VALID_YEAR {
        Some(resolved)
    } else {
        None
    }
}

fn parse_text_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }

    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}
