//! The persistent store.
//!
//! `Store` is a synchronous request/response façade over a [`Medium`]. Every
//! value goes through the [`encoding`] step on its way in and out, the total
//! size of the medium is kept under a budget by the [`capacity`] policy, and
//! construction validates the medium, falling back to salvage-and-rebuild when
//! validation fails.
//!
//! # Module Structure
//!
//! - `medium`: the `Medium` trait, `FileMedium` and `MemoryMedium`
//! - `encoding`: the reversible, non-cryptographic record encoding
//! - `capacity`: limits and the reclamation policy
//!
//! # Example
//!
//! ```
//! use codemood::store::{MemoryMedium, Store, StoreLimits};
//! use serde_json::json;
//!
//! let mut store = Store::open(MemoryMedium::new(), StoreLimits::default())?;
//! assert!(store.set("darkMode", &json!(true)));
//! assert_eq!(store.get("darkMode"), Some(json!(true)));
//! assert_eq!(store.get("neverWritten"), None);
//! # Ok::<(), codemood::AppError>(())
//! ```

pub mod capacity;
pub mod encoding;
pub mod medium;

pub use capacity::{ReclaimReport, StoreLimits};
pub use medium::{FileMedium, Medium, MemoryMedium};

use crate::constants::{KEY_DRAFTS, KEY_GOALS, KEY_JOURNAL_ENTRIES, KEY_SETTINGS};
use crate::errors::{AppError, AppResult, StorageError};
use crate::model::entry::is_entry_record;
use crate::model::Entry;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A store shared between commands and the backup worker.
///
/// Each logical operation holds the lock for its whole duration, so no two
/// operations interleave mid-write.
pub type SharedStore = Arc<tokio::sync::Mutex<Store>>;

#[derive(Debug, Clone, Copy)]
enum Shape {
    Array,
    Object,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object(),
        }
    }

    fn empty(self) -> Value {
        match self {
            Shape::Array => Value::Array(Vec::new()),
            Shape::Object => Value::Object(Map::new()),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Array => "an array",
            Shape::Object => "an object",
        }
    }
}

/// Keys that must exist after construction, with the shape they must hold.
const REQUIRED_KEYS: &[(&str, Shape)] = &[
    (KEY_JOURNAL_ENTRIES, Shape::Array),
    (KEY_GOALS, Shape::Array),
    (KEY_SETTINGS, Shape::Object),
    (KEY_DRAFTS, Shape::Array),
];

fn required_shape(key: &str) -> Option<Shape> {
    REQUIRED_KEYS
        .iter()
        .find(|(required, _)| *required == key)
        .map(|(_, shape)| *shape)
}

/// Durable, size-bounded key-value storage for all application state.
pub struct Store {
    medium: Box<dyn Medium>,
    limits: StoreLimits,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Builds a store over `medium` and validates it.
    ///
    /// Missing required keys are initialised, structurally invalid journal
    /// entries are dropped, and if validation fails outright the medium is
    /// salvaged: every record that still decodes is kept, the rest is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unrecoverable` if both validation and salvage
    /// fail. This is the only storage failure that reaches the caller.
    pub fn open<M: Medium + 'static>(medium: M, limits: StoreLimits) -> AppResult<Self> {
        let mut store = Store {
            medium: Box::new(medium),
            limits,
        };

        if let Err(validation_error) = store.validate() {
            warn!(
                "Storage validation failed, attempting recovery: {}",
                validation_error
            );
            store.recover().map_err(|recovery_error| {
                StorageError::Unrecoverable(format!(
                    "{}; recovery failed: {}",
                    validation_error, recovery_error
                ))
            })?;
            info!("Storage recovered");
        }

        Ok(store)
    }

    /// Wraps the store for sharing with async operations and the backup worker.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// The limits this store enforces.
    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }

    /// Direct access to the underlying medium, bypassing encoding and limits.
    pub fn medium_mut(&mut self) -> &mut dyn Medium {
        self.medium.as_mut()
    }

    /// Reads and decodes the value under `key`.
    ///
    /// Returns `None` when the key was never written or its record is
    /// corrupted; corruption is logged, never propagated.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable record '{}': {}", key, e);
                None
            }
        }
    }

    /// Reads the value under `key` and deserializes it into `T`.
    ///
    /// Returns `None` when the record is absent, corrupted or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!("Record '{}' has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Fallible read: distinguishes a missing key from a broken record.
    pub fn try_get(&self, key: &str) -> AppResult<Option<Value>> {
        match self.medium.read(key)? {
            Some(text) => Ok(Some(encoding::decode(key, &text)?)),
            None => Ok(None),
        }
    }

    /// Encodes and writes `value` under `key`.
    ///
    /// If the write would push the medium over its budget, capacity
    /// reclamation runs first. Returns `false` (after logging) on any failure.
    pub fn set(&mut self, key: &str, value: &Value) -> bool {
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to store '{}': {}", key, e);
                false
            }
        }
    }

    /// Fallible write using the current time for goal expiry.
    pub fn try_set(&mut self, key: &str, value: &Value) -> AppResult<()> {
        self.try_set_at(key, value, Utc::now())
    }

    /// Fallible write; `now` decides which completed goals have expired if
    /// reclamation is needed.
    ///
    /// Journal entries beyond `max_entries` and drafts beyond `max_drafts` are
    /// trimmed (newest kept) before the size check.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Shape` if a required key is given a value of the
    /// wrong JSON shape, and `StorageError::QuotaExceeded` if the value does
    /// not fit even after reclamation. Nothing is written in either case.
    pub fn try_set_at(&mut self, key: &str, value: &Value, now: DateTime<Utc>) -> AppResult<()> {
        medium::validate_key(key)?;
        if let Some(shape) = required_shape(key) {
            if !shape.matches(value) {
                return Err(StorageError::Shape {
                    key: key.to_string(),
                    expected: shape.describe(),
                }
                .into());
            }
        }

        let mut value = value.clone();
        if let Some(limit) = self.collection_limit(key) {
            if let Value::Array(records) = &mut value {
                let removed = capacity::keep_newest(records, limit);
                if removed > 0 {
                    info!("Trimmed {} oldest records from '{}'", removed, key);
                }
            }
        }

        let mut text = encoding::encode(key, &value)?;
        let mut needed = self.projected_usage(key, &text)?;

        if needed > self.limits.storage_limit {
            debug!(
                "Write of '{}' needs {} bytes, limit {}; reclaiming",
                key, needed, self.limits.storage_limit
            );
            self.reclaim_except(Some(key), now)?;

            if key == KEY_GOALS {
                if let Value::Array(goals) = &mut value {
                    if capacity::prune_goals(goals, now, self.limits.goal_retention) > 0 {
                        text = encoding::encode(key, &value)?;
                    }
                }
            }

            needed = self.projected_usage(key, &text)?;
            if needed > self.limits.storage_limit {
                return Err(StorageError::QuotaExceeded {
                    needed,
                    limit: self.limits.storage_limit,
                }
                .into());
            }
        }

        self.medium.write(key, &text)
    }

    /// Writes several records as one unit.
    ///
    /// If any write fails, every key already written is restored to its
    /// previous record and the error is returned.
    pub fn set_many(&mut self, writes: &[(&str, Value)], now: DateTime<Utc>) -> AppResult<()> {
        let mut previous: Vec<(&str, Option<String>)> = Vec::with_capacity(writes.len());

        for (key, value) in writes {
            let before = self.medium.read(key)?;
            if let Err(e) = self.try_set_at(key, value, now) {
                warn!("Write of '{}' failed, rolling back {} records", key, previous.len());
                for (written_key, old_text) in previous.iter().rev() {
                    let restored = match old_text {
                        Some(text) => self.medium.write(written_key, text),
                        None => self.medium.remove(written_key),
                    };
                    if let Err(rollback_error) = restored {
                        warn!("Failed to roll back '{}': {}", written_key, rollback_error);
                    }
                }
                return Err(e);
            }
            previous.push((*key, before));
        }
        Ok(())
    }

    /// Deletes the record under `key`. Returns `false` (after logging) on failure.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.medium.remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to remove '{}': {}", key, e);
                false
            }
        }
    }

    /// Every key currently stored, or an empty list if the medium is unreadable.
    pub fn keys(&self) -> Vec<String> {
        self.medium.keys().unwrap_or_else(|e| {
            warn!("Failed to list storage keys: {}", e);
            Vec::new()
        })
    }

    /// Bytes used by keys and encoded records.
    pub fn usage(&self) -> AppResult<u64> {
        self.medium.used_bytes()
    }

    /// Journal entries decoded for display, in stored order (newest first).
    ///
    /// Use [`Store::entry_records`] for anything that writes entries back.
    pub fn entries(&self) -> Vec<Entry> {
        self.entry_records()
            .iter()
            .filter_map(Entry::from_value)
            .collect()
    }

    /// Journal entry records exactly as stored, in stored order.
    pub fn entry_records(&self) -> Vec<Value> {
        match self.get(KEY_JOURNAL_ENTRIES) {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        }
    }

    /// The raw goal list.
    pub fn goals(&self) -> Vec<Value> {
        match self.get(KEY_GOALS) {
            Some(Value::Array(goals)) => goals,
            _ => Vec::new(),
        }
    }

    /// The settings mapping.
    pub fn settings(&self) -> Map<String, Value> {
        match self.get(KEY_SETTINGS) {
            Some(Value::Object(settings)) => settings,
            _ => Map::new(),
        }
    }

    /// Ensures required keys exist with the right shape and drops journal
    /// entries that lack a usable `id`, `content` or `timestamp`.
    ///
    /// # Errors
    ///
    /// Fails if the medium cannot be listed or read, or if a required key
    /// holds a value of the wrong JSON shape. `Store::open` answers such a
    /// failure with salvage-and-rebuild.
    pub fn validate(&mut self) -> AppResult<()> {
        let existing = self.medium.keys()?;
        debug!("Validating storage with {} records", existing.len());

        for (key, shape) in REQUIRED_KEYS {
            match self.try_get(key) {
                Ok(Some(value)) if shape.matches(&value) => {}
                Ok(Some(_)) => {
                    return Err(StorageError::Shape {
                        key: key.to_string(),
                        expected: shape.describe(),
                    }
                    .into())
                }
                Ok(None) => {
                    debug!("Initialising missing record '{}'", key);
                    self.write_raw_value(key, &shape.empty())?;
                }
                Err(AppError::Storage(StorageError::Decode { message, .. })) => {
                    warn!("Resetting undecodable record '{}': {}", key, message);
                    self.write_raw_value(key, &shape.empty())?;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(Value::Array(records)) = self.try_get(KEY_JOURNAL_ENTRIES)? {
            let before = records.len();
            let valid: Vec<Value> = records
                .into_iter()
                .filter(is_entry_record)
                .collect();
            if valid.len() != before {
                warn!(
                    "Dropped {} structurally invalid journal entries",
                    before - valid.len()
                );
                self.write_raw_value(KEY_JOURNAL_ENTRIES, &Value::Array(valid))?;
            }
        }

        Ok(())
    }

    /// Salvages every record that still decodes and rebuilds the medium.
    fn recover(&mut self) -> AppResult<()> {
        let keys = self.medium.keys()?;
        let mut salvaged: Vec<(String, String)> = Vec::new();

        for key in keys {
            let text = match self.medium.read(&key) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Discarding unreadable record '{}': {}", key, e);
                    continue;
                }
            };
            match encoding::decode(&key, &text) {
                Ok(value) => {
                    let wrong_shape =
                        required_shape(&key).is_some_and(|shape| !shape.matches(&value));
                    if wrong_shape {
                        warn!("Discarding record '{}' with unexpected shape", key);
                    } else {
                        salvaged.push((key, text));
                    }
                }
                Err(e) => warn!("Discarding corrupted record '{}': {}", key, e),
            }
        }

        info!("Salvaged {} records, rebuilding storage", salvaged.len());
        self.medium.clear()?;
        for (key, text) in &salvaged {
            self.medium.write(key, text)?;
        }

        self.validate()
    }

    /// Runs the capacity reclamation policy over every managed collection.
    ///
    /// Journal entries are sorted newest first and cut to `max_entries`,
    /// drafts cut to `max_drafts`, and completed goals whose completion time
    /// is older than the retention window are dropped.
    pub fn reclaim_at(&mut self, now: DateTime<Utc>) -> AppResult<ReclaimReport> {
        self.reclaim_except(None, now)
    }

    fn reclaim_except(&mut self, skip: Option<&str>, now: DateTime<Utc>) -> AppResult<ReclaimReport> {
        let mut report = ReclaimReport::default();

        if skip != Some(KEY_JOURNAL_ENTRIES) {
            if let Some(Value::Array(mut entries)) = self.get(KEY_JOURNAL_ENTRIES) {
                report.entries_removed = capacity::keep_newest(&mut entries, self.limits.max_entries);
                self.write_raw_value(KEY_JOURNAL_ENTRIES, &Value::Array(entries))?;
            }
        }

        if skip != Some(KEY_DRAFTS) {
            if let Some(Value::Array(mut drafts)) = self.get(KEY_DRAFTS) {
                report.drafts_removed = capacity::keep_newest(&mut drafts, self.limits.max_drafts);
                if report.drafts_removed > 0 {
                    self.write_raw_value(KEY_DRAFTS, &Value::Array(drafts))?;
                }
            }
        }

        if skip != Some(KEY_GOALS) {
            if let Some(Value::Array(mut goals)) = self.get(KEY_GOALS) {
                report.goals_removed =
                    capacity::prune_goals(&mut goals, now, self.limits.goal_retention);
                if report.goals_removed > 0 {
                    self.write_raw_value(KEY_GOALS, &Value::Array(goals))?;
                }
            }
        }

        info!(
            "Capacity reclamation removed {} entries, {} drafts, {} goals",
            report.entries_removed, report.drafts_removed, report.goals_removed
        );
        Ok(report)
    }

    fn collection_limit(&self, key: &str) -> Option<usize> {
        match key {
            KEY_JOURNAL_ENTRIES => Some(self.limits.max_entries),
            KEY_DRAFTS => Some(self.limits.max_drafts),
            _ => None,
        }
    }

    fn projected_usage(&self, key: &str, text: &str) -> AppResult<u64> {
        let current = self.medium.used_bytes()?;
        let previous = self
            .medium
            .read(key)?
            .map(|old| (key.len() + old.len()) as u64)
            .unwrap_or(0);
        Ok(current.saturating_sub(previous) + (key.len() + text.len()) as u64)
    }

    /// Writes without limits; used by validation and reclamation themselves.
    fn write_raw_value(&mut self, key: &str, value: &Value) -> AppResult<()> {
        let text = encoding::encode(key, value)?;
        self.medium.write(key, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn entry(id: &str, timestamp: &str) -> Value {
        json!({"id": id, "content": format!("entry {}", id), "mood": "😊", "tags": [], "timestamp": timestamp})
    }

    fn open_memory() -> Store {
        Store::open(MemoryMedium::new(), StoreLimits::default()).unwrap()
    }

    #[test]
    fn test_open_initialises_required_keys() {
        let store = open_memory();
        assert_eq!(store.get(KEY_JOURNAL_ENTRIES), Some(json!([])));
        assert_eq!(store.get(KEY_GOALS), Some(json!([])));
        assert_eq!(store.get(KEY_SETTINGS), Some(json!({})));
        assert_eq!(store.get(KEY_DRAFTS), Some(json!([])));
        assert_eq!(store.get("lastBackup"), None);
    }

    #[test]
    fn test_set_then_get() {
        let mut store = open_memory();
        assert!(store.set("currentMood", &json!(3)));
        assert_eq!(store.get("currentMood"), Some(json!(3)));
        assert_eq!(store.get_as::<u8>("currentMood"), Some(3));
        assert_eq!(store.get_as::<String>("currentMood"), None);
    }

    #[test]
    fn test_set_rejects_invalid_key() {
        let mut store = open_memory();
        assert!(!store.set("../outside", &json!(1)));
    }

    #[test]
    fn test_set_rejects_wrong_shape_for_required_key() {
        let mut store = open_memory();
        let entries = json!([entry("1", "2024-01-01")]);
        assert!(store.set(KEY_JOURNAL_ENTRIES, &entries));

        assert!(!store.set(KEY_JOURNAL_ENTRIES, &json!({})));
        assert!(!store.set(KEY_GOALS, &json!("x")));
        assert!(!store.set(KEY_SETTINGS, &json!([])));
        assert!(matches!(
            store.try_set(KEY_DRAFTS, &json!(null)),
            Err(AppError::Storage(StorageError::Shape { .. }))
        ));

        assert_eq!(store.get(KEY_JOURNAL_ENTRIES), Some(entries));
        assert_eq!(store.get(KEY_GOALS), Some(json!([])));
        assert_eq!(store.get(KEY_SETTINGS), Some(json!({})));
        assert_eq!(store.get(KEY_DRAFTS), Some(json!([])));
    }

    #[test]
    fn test_corrupted_record_reads_as_none() {
        let mut store = open_memory();
        store.medium_mut().write("stats", "%%% not encoded %%%").unwrap();
        assert_eq!(store.get("stats"), None);
        assert!(store.try_get("stats").is_err());
    }

    #[test]
    fn test_remove() {
        let mut store = open_memory();
        store.set("githubToken", &json!("abc"));
        assert!(store.remove("githubToken"));
        assert_eq!(store.get("githubToken"), None);
    }

    #[test]
    fn test_validate_drops_invalid_entries() {
        let mut medium = MemoryMedium::new();
        let entries = json!([
            entry("1", "2024-01-01"),
            {"id": "2", "content": "no timestamp"},
            {"content": "no id", "timestamp": "2024-01-02"},
            entry("3", "2024-01-03")
        ]);
        medium.insert_raw(
            KEY_JOURNAL_ENTRIES,
            &encoding::encode(KEY_JOURNAL_ENTRIES, &entries).unwrap(),
        );

        let store = Store::open(medium, StoreLimits::default()).unwrap();
        let ids: Vec<String> = store.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_validate_keeps_loosely_typed_entries() {
        let mut medium = MemoryMedium::new();
        let entries = json!([
            {"id": "1", "content": "numeric mood", "mood": 3, "tags": [], "timestamp": "2024-01-03"},
            {"id": "2", "content": "string tags", "tags": "work", "timestamp": "2024-01-02"},
            {"id": 3, "content": "no tags at all", "timestamp": "2024-01-01"}
        ]);
        medium.insert_raw(
            KEY_JOURNAL_ENTRIES,
            &encoding::encode(KEY_JOURNAL_ENTRIES, &entries).unwrap(),
        );

        let store = Store::open(medium, StoreLimits::default()).unwrap();
        assert_eq!(store.get(KEY_JOURNAL_ENTRIES), Some(entries));
        let ids: Vec<String> = store.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_wrong_shape_triggers_recovery() {
        let mut medium = MemoryMedium::new();
        medium.insert_raw(
            KEY_JOURNAL_ENTRIES,
            &encoding::encode(KEY_JOURNAL_ENTRIES, &json!({"not": "an array"})).unwrap(),
        );
        medium.insert_raw("darkMode", &encoding::encode("darkMode", &json!(true)).unwrap());
        medium.insert_raw("stats", "corrupted!");

        let store = Store::open(medium, StoreLimits::default()).unwrap();
        assert_eq!(store.get(KEY_JOURNAL_ENTRIES), Some(json!([])));
        assert_eq!(store.get("darkMode"), Some(json!(true)));
        assert!(!store.keys().contains(&"stats".to_string()));
    }

    #[test]
    fn test_undecodable_required_key_is_reset() {
        let mut medium = MemoryMedium::new();
        medium.insert_raw(KEY_GOALS, "garbage");
        let store = Store::open(medium, StoreLimits::default()).unwrap();
        assert_eq!(store.get(KEY_GOALS), Some(json!([])));
    }

    #[test]
    fn test_entries_trimmed_to_max_on_write() {
        let limits = StoreLimits {
            max_entries: 3,
            ..StoreLimits::default()
        };
        let mut store = Store::open(MemoryMedium::new(), limits).unwrap();
        let entries = json!([
            entry("a", "2024-01-01"),
            entry("b", "2024-01-02"),
            entry("c", "2024-01-03"),
            entry("d", "2024-01-04")
        ]);
        assert!(store.set(KEY_JOURNAL_ENTRIES, &entries));
        let ids: Vec<String> = store.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["d", "c", "b"]);
    }

    #[test]
    fn test_over_budget_write_reclaims_expired_goals() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut store = open_memory();
        let goals = json!([
            {"id": "done", "text": "x".repeat(200), "completed": true, "completedAt": "2024-01-01T00:00:00Z"},
            {"id": "open", "text": "keep me", "completed": false}
        ]);
        store.try_set_at(KEY_GOALS, &goals, now).unwrap();

        let usage = store.usage().unwrap();
        store.limits = StoreLimits {
            storage_limit: usage + 40,
            ..StoreLimits::default()
        };

        store
            .try_set_at("stats", &json!({"note": "y".repeat(60)}), now)
            .unwrap();
        let remaining = store.goals();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["id"], "open");
    }

    #[test]
    fn test_write_fails_when_reclamation_is_not_enough() {
        let mut store = open_memory();
        let usage = store.usage().unwrap();
        store.limits.storage_limit = usage + 10;

        assert!(!store.set("stats", &json!("z".repeat(100))));
        assert_eq!(store.get("stats"), None);
        assert!(matches!(
            store.try_set("stats", &json!("z".repeat(100))),
            Err(AppError::Storage(StorageError::QuotaExceeded { .. }))
        ));
    }

    #[test]
    fn test_reclaim_trims_drafts_and_goals() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let limits = StoreLimits {
            max_drafts: 2,
            goal_retention: Duration::days(30),
            ..StoreLimits::default()
        };
        let mut store = Store::open(MemoryMedium::new(), limits).unwrap();
        store
            .medium_mut()
            .write(
                KEY_DRAFTS,
                &encoding::encode(
                    KEY_DRAFTS,
                    &json!([
                        {"id": "1", "content": "a", "timestamp": "2024-05-01"},
                        {"id": "2", "content": "b", "timestamp": "2024-05-02"},
                        {"id": "3", "content": "c", "timestamp": "2024-05-03"}
                    ]),
                )
                .unwrap(),
            )
            .unwrap();
        store.set(
            KEY_GOALS,
            &json!([
                {"id": "g1", "text": "old", "completed": true, "completedAt": "2024-01-01T00:00:00Z"},
                {"id": "g2", "text": "undated", "completed": true}
            ]),
        );

        let report = store.reclaim_at(now).unwrap();
        assert_eq!(report.drafts_removed, 1);
        assert_eq!(report.goals_removed, 1);
        assert_eq!(report.entries_removed, 0);
        assert_eq!(report.total(), 2);

        let drafts = store.get(KEY_DRAFTS).unwrap();
        assert_eq!(drafts[0]["id"], "3");
        assert_eq!(drafts[1]["id"], "2");
        assert_eq!(store.goals()[0]["id"], "g2");
    }

    #[test]
    fn test_set_many_rolls_back_on_failure() {
        let mut store = Store::open(MemoryMedium::with_hard_quota(400), StoreLimits::default())
            .unwrap();
        store.set(KEY_SETTINGS, &json!({"theme": "light"}));
        let now = Utc::now();

        let result = store.set_many(
            &[
                (KEY_SETTINGS, json!({"theme": "dark"})),
                ("stats", json!("q".repeat(1000))),
            ],
            now,
        );
        assert!(result.is_err());
        assert_eq!(store.settings()["theme"], json!("light"));
        assert_eq!(store.get("stats"), None);
    }

    struct BrokenMedium;

    impl Medium for BrokenMedium {
        fn read(&self, _key: &str) -> AppResult<Option<String>> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn write(&mut self, _key: &str, _text: &str) -> AppResult<()> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn remove(&mut self, _key: &str) -> AppResult<()> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn keys(&self) -> AppResult<Vec<String>> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn clear(&mut self) -> AppResult<()> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    #[test]
    fn test_unusable_medium_is_fatal() {
        match Store::open(BrokenMedium, StoreLimits::default()) {
            Err(AppError::Storage(StorageError::Unrecoverable(message))) => {
                assert!(message.contains("disk on fire"));
            }
            other => panic!("Expected Unrecoverable, got {:?}", other),
        }
    }
}
