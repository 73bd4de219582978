//! Data model for the mood journal.
//!
//! Everything here is a plain serde type mirroring the JSON shapes kept in the
//! store. Entries and goals carry an `extra` map so fields written by other
//! versions of the widget survive a read/modify/write cycle.

pub mod entry;
pub mod goal;
pub mod mood;
pub mod snapshot;

pub use entry::{Draft, Entry};
pub use goal::Goal;
pub use mood::Mood;
pub use snapshot::{PomodoroStats, Snapshot};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parses an ISO-8601 timestamp leniently.
///
/// Accepts full RFC 3339 timestamps, naive date-times (read as UTC) and bare
/// dates (midnight UTC). Returns `None` for anything else.
///
/// # Examples
///
/// ```
/// use codemood::model::parse_timestamp;
///
/// assert!(parse_timestamp("2024-01-02T10:00:00Z").is_some());
/// assert!(parse_timestamp("2024-01-02").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserializes an id that may be either a JSON string or a JSON integer.
///
/// Integer ids (millisecond timestamps in older exports) are normalised to
/// their decimal string form.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Signed(value) => value.to_string(),
        RawId::Unsigned(value) => value.to_string(),
    })
}

/// Reads a field that should be a string, treating any other JSON value as absent.
pub(crate) fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Some(text),
        _ => None,
    })
}

/// Reads a tag list, keeping its string members. A lone string is one tag.
pub(crate) fn deserialize_loose_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        serde_json::Value::String(tag) => vec![tag],
        _ => Vec::new(),
    })
}

/// Extracts an id from a raw JSON record, accepting strings and integers.
pub(crate) fn value_id(value: &serde_json::Value) -> Option<String> {
    match value.get("id")? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) if number.is_i64() || number.is_u64() => {
            Some(number.to_string())
        }
        _ => None,
    }
}
