//! Export/import snapshots and Pomodoro counters.

use crate::constants::SNAPSHOT_VERSION;
use crate::errors::ImportError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The unit of export and import.
///
/// Entries and goals stay raw JSON so records written by older versions, or
/// edited by hand, travel through a backup unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version, `"1.0"` for everything this crate writes
    pub version: String,
    /// ISO-8601 time the snapshot was taken
    pub timestamp: String,
    /// Journal entry records, newest first
    pub entries: Vec<Value>,
    /// Goal list
    #[serde(default)]
    pub goals: Vec<Value>,
    /// Option → value mapping
    #[serde(default)]
    pub settings: Map<String, Value>,
    /// Usage statistics, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
}

impl Snapshot {
    /// Builds a snapshot stamped with the current format version.
    pub fn new(
        timestamp: String,
        entries: Vec<Value>,
        goals: Vec<Value>,
        settings: Map<String, Value>,
        stats: Option<Value>,
    ) -> Self {
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp,
            entries,
            goals,
            settings,
            stats,
        }
    }

    /// Parses and validates the text of an export file.
    ///
    /// `version` and `timestamp` must be non-empty strings or numbers,
    /// `entries` must be an array and every entry must carry `id` (string or
    /// integer), `content` and `timestamp` (strings) and some `tags` value.
    /// `goals` and `settings` may be absent but must have the right type when
    /// present.
    pub fn parse(raw: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(raw).map_err(ImportError::Parse)?;
        Self::from_value(value)
    }

    /// Validates an already parsed export document.
    pub fn from_value(value: Value) -> Result<Self, ImportError> {
        let Value::Object(mut root) = value else {
            return Err(ImportError::WrongType {
                field: "document",
                expected: "an object",
            });
        };

        let version = take_string(&mut root, "version")?;
        let timestamp = take_string(&mut root, "timestamp")?;

        let raw_entries = match root.remove("entries") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ImportError::WrongType {
                    field: "entries",
                    expected: "an array",
                })
            }
            None => return Err(ImportError::MissingField("entries")),
        };

        let mut entries = Vec::with_capacity(raw_entries.len());
        for (index, raw) in raw_entries.into_iter().enumerate() {
            entries.push(validate_entry(index, raw)?);
        }

        let goals = match root.remove("goals") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ImportError::WrongType {
                    field: "goals",
                    expected: "an array",
                })
            }
        };

        let settings = match root.remove("settings") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ImportError::WrongType {
                    field: "settings",
                    expected: "an object",
                })
            }
        };

        let stats = root.remove("stats").filter(|value| !value.is_null());

        Ok(Snapshot {
            version,
            timestamp,
            entries,
            goals,
            settings,
            stats,
        })
    }
}

fn take_string(root: &mut Map<String, Value>, field: &'static str) -> Result<String, ImportError> {
    match root.remove(field) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
        Some(Value::Number(number)) => Ok(number.to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(ImportError::MissingField(field)),
        Some(_) => Err(ImportError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

fn validate_entry(index: usize, raw: Value) -> Result<Value, ImportError> {
    let invalid = |field| ImportError::InvalidEntry { index, field };

    let Some(object) = raw.as_object() else {
        return Err(invalid("id"));
    };
    match object.get("id") {
        Some(Value::String(_)) => {}
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {}
        _ => return Err(invalid("id")),
    }
    if !matches!(object.get("content"), Some(Value::String(_))) {
        return Err(invalid("content"));
    }
    if !matches!(object.get("timestamp"), Some(Value::String(_))) {
        return Err(invalid("timestamp"));
    }
    if matches!(object.get("tags"), None | Some(Value::Null)) {
        return Err(invalid("tags"));
    }

    Ok(raw)
}

/// Counters for completed Pomodoro sessions, stored under `pomodoroStats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroStats {
    /// Number of sessions run to completion
    #[serde(default)]
    pub completed_sessions: u64,
    /// Sum of focus minutes across completed sessions
    #[serde(default)]
    pub total_focus_minutes: u64,
    /// ISO-8601 time the last session finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "version": "1.0",
            "timestamp": "2024-01-05T00:00:00Z",
            "entries": [
                {"id": "1", "content": "a", "tags": ["bug"], "timestamp": "2024-01-02"}
            ],
            "goals": [{"id": "g1", "text": "learn rust", "completed": false}],
            "settings": {"theme": "dark"}
        })
    }

    #[test]
    fn test_parse_valid_document() {
        let snapshot = Snapshot::from_value(valid_document()).unwrap();
        assert_eq!(snapshot.version, "1.0");
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.goals.len(), 1);
        assert_eq!(snapshot.settings["theme"], json!("dark"));
        assert!(snapshot.stats.is_none());
    }

    #[test]
    fn test_optional_collections_default_to_empty() {
        let snapshot = Snapshot::parse(
            r#"{"version":"1.0","timestamp":"2024-01-05","entries":[]}"#,
        )
        .unwrap();
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.goals.is_empty());
        assert!(snapshot.settings.is_empty());
    }

    #[test]
    fn test_rejects_missing_header_fields() {
        for field in ["version", "timestamp"] {
            let mut document = valid_document();
            document.as_object_mut().unwrap().remove(field);
            match Snapshot::from_value(document) {
                Err(ImportError::MissingField(missing)) => assert_eq!(missing, field),
                other => panic!("Expected MissingField({}), got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_numeric_version_is_accepted() {
        let mut document = valid_document();
        document["version"] = json!(1.0);
        let snapshot = Snapshot::from_value(document).unwrap();
        assert_eq!(snapshot.version, "1.0");

        let mut document = valid_document();
        document["version"] = json!(["1.0"]);
        assert!(matches!(
            Snapshot::from_value(document),
            Err(ImportError::WrongType { field: "version", .. })
        ));
    }

    #[test]
    fn test_entries_keep_loosely_typed_fields() {
        let mut document = valid_document();
        document["entries"][0]["mood"] = json!(3);
        document["entries"][0]["tags"] = json!("work");
        let snapshot = Snapshot::from_value(document.clone()).unwrap();
        assert_eq!(snapshot.entries[0], document["entries"][0]);
    }

    #[test]
    fn test_rejects_non_array_entries() {
        let mut document = valid_document();
        document["entries"] = json!({"id": "1"});
        assert!(matches!(
            Snapshot::from_value(document),
            Err(ImportError::WrongType { field: "entries", .. })
        ));
    }

    #[test]
    fn test_rejects_entry_missing_any_required_field() {
        for field in ["id", "content", "timestamp", "tags"] {
            let mut document = valid_document();
            document["entries"][0].as_object_mut().unwrap().remove(field);
            match Snapshot::from_value(document) {
                Err(ImportError::InvalidEntry { index, field: bad }) => {
                    assert_eq!(index, 0);
                    assert_eq!(bad, field);
                }
                other => panic!("Expected InvalidEntry for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Snapshot::parse("not json"),
            Err(ImportError::Parse(_))
        ));
        assert!(matches!(
            Snapshot::parse("[1, 2, 3]"),
            Err(ImportError::WrongType { .. })
        ));
    }

    #[test]
    fn test_pomodoro_stats_defaults() {
        let stats: PomodoroStats = serde_json::from_value(json!({})).unwrap();
        assert_eq!(stats, PomodoroStats::default());
    }
}
