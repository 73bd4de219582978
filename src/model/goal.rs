//! Goals on the tag-based goal list.

use super::{deserialize_id, parse_timestamp};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A goal the user can tick off.
///
/// `completed_at` is only ever set while `completed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique id within the goal list
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// What the goal is
    pub text: String,
    /// Whether the goal is done
    #[serde(default)]
    pub completed: bool,
    /// ISO-8601 time the goal was completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Fields this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Goal {
    /// Creates an open goal with a fresh id.
    pub fn new(text: &str) -> Self {
        Goal {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
            completed_at: None,
            extra: Map::new(),
        }
    }

    /// Reads a goal out of a raw JSON record.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Flips the completion state, stamping or clearing `completed_at`.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed {
            Some(now.to_rfc3339())
        } else {
            None
        };
    }

    /// Whether capacity reclamation may drop this goal.
    ///
    /// Only completed goals with a parseable `completed_at` older than
    /// `retention` qualify. A completed goal with no completion time is kept.
    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        if !self.completed {
            return false;
        }
        match self.completed_at.as_deref().and_then(parse_timestamp) {
            Some(completed_at) => now - completed_at > retention,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_toggle_sets_and_clears_completed_at() {
        let mut goal = Goal::new("ship it");
        goal.toggle(at(1));
        assert!(goal.completed);
        assert!(goal.completed_at.is_some());

        goal.toggle(at(2));
        assert!(!goal.completed);
        assert!(goal.completed_at.is_none());
    }

    #[test]
    fn test_expiry_requires_completion_time() {
        let retention = Duration::days(30);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let mut old = Goal::new("old");
        old.toggle(at(1));
        assert!(old.is_expired(now, retention));

        let mut recent = Goal::new("recent");
        recent.toggle(Utc.with_ymd_and_hms(2024, 5, 25, 0, 0, 0).unwrap());
        assert!(!recent.is_expired(now, retention));

        let mut undated = Goal::new("undated");
        undated.completed = true;
        assert!(!undated.is_expired(now, retention));

        let open = Goal::new("open");
        assert!(!open.is_expired(now, retention));
    }
}
