//! Capacity reclamation policy.
//!
//! These functions work on raw JSON collections so records the model types do
//! not understand are kept rather than silently dropped.

use crate::constants::{
    DEFAULT_GOAL_RETENTION_DAYS, DEFAULT_MAX_DRAFTS, DEFAULT_MAX_ENTRIES,
    DEFAULT_STORAGE_LIMIT_BYTES,
};
use crate::model::entry::record_created_at;
use crate::model::Goal;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Limits the store enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Journal entries kept; the newest win
    pub max_entries: usize,
    /// Drafts kept; the newest win
    pub max_drafts: usize,
    /// How long a completed goal survives reclamation
    pub goal_retention: Duration,
    /// Total bytes of keys plus encoded records
    pub storage_limit: u64,
}

impl Default for StoreLimits {
    fn default() -> Self {
        StoreLimits {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_drafts: DEFAULT_MAX_DRAFTS,
            goal_retention: Duration::days(DEFAULT_GOAL_RETENTION_DAYS),
            storage_limit: DEFAULT_STORAGE_LIMIT_BYTES,
        }
    }
}

/// What a reclamation pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Journal entries dropped
    pub entries_removed: usize,
    /// Drafts dropped
    pub drafts_removed: usize,
    /// Completed goals dropped
    pub goals_removed: usize,
}

impl ReclaimReport {
    /// Total number of records dropped.
    pub fn total(&self) -> usize {
        self.entries_removed + self.drafts_removed + self.goals_removed
    }
}

/// Sorts records newest first by their `timestamp` field and keeps `max`.
///
/// The sort is stable and records without a parseable timestamp sort last.
/// Returns how many records were dropped.
pub fn keep_newest(records: &mut Vec<Value>, max: usize) -> usize {
    records.sort_by(|a, b| record_created_at(b).cmp(&record_created_at(a)));
    let removed = records.len().saturating_sub(max);
    records.truncate(max);
    removed
}

/// Drops completed goals whose `completedAt` is older than `retention`.
///
/// Completed goals without a completion time, and records that do not parse
/// as goals, are kept. Returns how many goals were dropped.
pub fn prune_goals(goals: &mut Vec<Value>, now: DateTime<Utc>, retention: Duration) -> usize {
    let before = goals.len();
    goals.retain(|raw| match Goal::from_value(raw) {
        Some(goal) => !goal.is_expired(now, retention),
        None => true,
    });
    before - goals.len()
}
