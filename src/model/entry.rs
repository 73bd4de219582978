//! Journal entries and drafts.

use super::{deserialize_id, deserialize_loose_string, deserialize_loose_tags, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single journal entry.
///
/// `timestamp` is the creation time and never changes; edits set `updatedAt`.
/// Decoding is lenient about the optional fields: a `mood` or `updatedAt` that
/// is not a string reads as absent and non-string tags are skipped. Code that
/// writes entries back works on the raw records, so nothing is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique id within the entry collection
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Freeform text
    pub content: String,
    /// Mood emoji chosen when the entry was written
    #[serde(
        default,
        deserialize_with = "deserialize_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mood: Option<String>,
    /// Tags attached to the entry, without duplicates
    #[serde(default, deserialize_with = "deserialize_loose_tags")]
    pub tags: Vec<String>,
    /// ISO-8601 creation time
    pub timestamp: String,
    /// ISO-8601 time of the last edit
    #[serde(
        default,
        deserialize_with = "deserialize_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    /// Fields this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Creates an entry with a fresh id and the given creation time.
    pub fn new(content: &str, mood: Option<&str>, tags: &[String], timestamp: String) -> Self {
        let mut unique_tags: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim();
            if !tag.is_empty() && !unique_tags.iter().any(|t| t == tag) {
                unique_tags.push(tag.to_string());
            }
        }

        Entry {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            mood: mood.map(str::to_string),
            tags: unique_tags,
            timestamp,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Reads an entry out of a raw JSON record.
    ///
    /// Returns `None` exactly when [`is_entry_record`] rejects the record.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !is_entry_record(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Whether a raw record is structurally a journal entry.
///
/// Only `id` (string or integer), `content` (string) and `timestamp` (string)
/// are checked. Every other field may hold anything.
pub fn is_entry_record(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let id_ok = match object.get("id") {
        Some(Value::String(_)) => true,
        Some(Value::Number(n)) => n.is_i64() || n.is_u64(),
        _ => false,
    };
    id_ok
        && matches!(object.get("content"), Some(Value::String(_)))
        && matches!(object.get("timestamp"), Some(Value::String(_)))
}

/// Creation time of a raw record, if its `timestamp` parses.
pub fn record_created_at(record: &Value) -> Option<DateTime<Utc>> {
    record
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

/// The later of a raw record's `timestamp` and `updatedAt`.
pub fn record_revision_time(record: &Value) -> Option<DateTime<Utc>> {
    let updated = record
        .get("updatedAt")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);
    record_created_at(record).max(updated)
}

/// Sorts raw entry records newest first by creation time.
///
/// The sort is stable; records whose timestamp does not parse sink to the end.
pub fn sort_newest_first(records: &mut [Value]) {
    records.sort_by(|a, b| record_created_at(b).cmp(&record_created_at(a)));
}

/// An unsaved piece of writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Unique id
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Draft text
    pub content: String,
    /// ISO-8601 time the draft was saved
    pub timestamp: String,
}

impl Draft {
    /// Creates a draft with a fresh id.
    pub fn new(content: &str, timestamp: String) -> Self {
        Draft {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            timestamp,
        }
    }
}
