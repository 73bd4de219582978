//! Snapshot export and import.
//!
//! Export writes every entry, goal and setting (plus stats when recorded) to a
//! pretty-printed JSON file named after the current date and records the time
//! under `lastBackup`. Import validates such a file and merges it into the
//! store under a single lock hold, so nobody observes a half-applied import.

use crate::constants::{
    BACKUP_FILE_DATE_FORMAT, BACKUP_FILE_PREFIX, KEY_GOALS, KEY_JOURNAL_ENTRIES, KEY_LAST_BACKUP,
    KEY_SETTINGS, KEY_STATS,
};
use crate::errors::{AppError, AppResult, ImportError};
use crate::model::entry::is_entry_record;
use crate::model::Snapshot;
use crate::notify::Notifier;
use crate::ops::merge::{merge_entries, merge_goals, merge_settings, MergeReport};
use crate::store::{SharedStore, Store};
use blake3::Hasher;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Report of a completed export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Where the snapshot was written
    pub path: PathBuf,
    /// Number of journal entries in the snapshot
    pub total_entries: usize,
    /// Number of goals in the snapshot
    pub total_goals: usize,
    /// Size of the written file in bytes
    pub file_size: u64,
    /// BLAKE3 checksum of the written file
    pub checksum: String,
    /// Time the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Duration taken to write the export
    pub duration: Duration,
}

/// Report of a completed import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Entries contained in the imported file
    pub imported_entries: usize,
    /// What the merge changed
    pub merge: MergeReport,
    /// Duration taken to read, validate and merge
    pub duration: Duration,
}

/// File name of the export taken on `date`: `codemood-backup-YYYY-MM-DD.json`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!(
        "{}{}.json",
        BACKUP_FILE_PREFIX,
        date.format(BACKUP_FILE_DATE_FORMAT)
    )
}

/// Builds a snapshot of the store's current contents.
///
/// Entry records are copied as stored; only records an import would reject
/// are left out.
pub fn build_snapshot(store: &Store, now: DateTime<Utc>) -> Snapshot {
    let entries = store
        .entry_records()
        .into_iter()
        .filter(is_entry_record)
        .collect();
    Snapshot::new(
        now.to_rfc3339(),
        entries,
        store.goals(),
        store.settings(),
        store.get(KEY_STATS),
    )
}

/// Merges a validated snapshot into the store.
///
/// The three collections are written with [`Store::set_many`], so either all
/// of them change or none does.
///
/// # Errors
///
/// Returns `ImportError::Write` if writing the merged collections fails; the
/// store is left as it was.
pub fn apply_snapshot(
    store: &mut Store,
    snapshot: Snapshot,
    now: DateTime<Utc>,
) -> AppResult<MergeReport> {
    let (entries, entries_added, entries_updated) =
        merge_entries(store.entry_records(), snapshot.entries);
    let (goals, goals_added) = merge_goals(store.goals(), snapshot.goals);
    let (settings, settings_applied) = merge_settings(store.settings(), snapshot.settings);

    store
        .set_many(
            &[
                (KEY_JOURNAL_ENTRIES, Value::Array(entries)),
                (KEY_GOALS, Value::Array(goals)),
                (KEY_SETTINGS, Value::Object(settings)),
            ],
            now,
        )
        .map_err(|e| ImportError::Write(e.to_string()))?;

    Ok(MergeReport {
        entries_added,
        entries_updated,
        goals_added,
        settings_applied,
    })
}

/// Exports the store to `backup_dir`.
///
/// # Flow
///
/// 1. Snapshot the store under the lock
/// 2. Serialize to pretty JSON
/// 3. Write to a temporary file and rename it to `codemood-backup-<date>.json`
/// 4. Checksum the written bytes
/// 5. Record `lastBackup` under the lock
///
/// A failure to record `lastBackup` is logged but does not fail the export.
///
/// # Errors
///
/// Returns an error if serialization or writing the file fails.
pub async fn export_data(store: &SharedStore, backup_dir: &Path) -> AppResult<ExportReport> {
    let start_time = Instant::now();
    let now = Utc::now();
    info!("Exporting snapshot to {:?}", backup_dir);

    let snapshot = {
        let guard = store.lock().await;
        build_snapshot(&guard, now)
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    tokio::fs::create_dir_all(backup_dir).await.map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create backup directory: {}", e),
        ))
    })?;

    let path = backup_dir.join(backup_file_name(Local::now().date_naive()));
    let temp_path = path.with_extension("json.tmp");
    debug!("Writing snapshot to {:?}", temp_path);
    tokio::fs::write(&temp_path, json.as_bytes())
        .await
        .map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write backup file: {}", e),
            ))
        })?;
    tokio::fs::rename(&temp_path, &path).await?;

    let mut hasher = Hasher::new();
    hasher.update(json.as_bytes());
    let checksum = hasher.finalize().to_hex().to_string();
    debug!("Backup checksum: {}", checksum);

    {
        let mut guard = store.lock().await;
        if let Err(e) = guard.try_set(KEY_LAST_BACKUP, &Value::String(now.to_rfc3339())) {
            warn!("Export written but last backup time not recorded: {}", e);
        }
    }

    let duration = start_time.elapsed();
    info!(
        "Export completed: {} entries, {} goals, {} bytes",
        snapshot.entries.len(),
        snapshot.goals.len(),
        json.len()
    );

    Ok(ExportReport {
        path,
        total_entries: snapshot.entries.len(),
        total_goals: snapshot.goals.len(),
        file_size: json.len() as u64,
        checksum,
        taken_at: now,
        duration,
    })
}

/// Imports the snapshot file at `path` into the store.
///
/// # Errors
///
/// - `AppError::Io` if the file cannot be read
/// - `AppError::Import` if the content is not a valid snapshot or the merged
///   result cannot be written; stored state is unchanged in both cases
pub async fn import_data(store: &SharedStore, path: &Path) -> AppResult<ImportReport> {
    let start_time = Instant::now();
    info!("Importing snapshot from {:?}", path);

    let raw = tokio::fs::read_to_string(path).await?;
    let snapshot = Snapshot::parse(&raw)?;
    let imported_entries = snapshot.entries.len();
    debug!(
        "Snapshot version {} taken at {} with {} entries",
        snapshot.version, snapshot.timestamp, imported_entries
    );

    let merge = {
        let mut guard = store.lock().await;
        apply_snapshot(&mut guard, snapshot, Utc::now())?
    };

    info!(
        "Import completed: {} entries added, {} updated, {} goals added",
        merge.entries_added, merge.entries_updated, merge.goals_added
    );
    Ok(ImportReport {
        imported_entries,
        merge,
        duration: start_time.elapsed(),
    })
}

/// Exports and reports the outcome through `notifier`. Returns success.
pub async fn export_with_notice(
    store: &SharedStore,
    backup_dir: &Path,
    notifier: &dyn Notifier,
) -> bool {
    match export_data(store, backup_dir).await {
        Ok(report) => {
            notifier.success(&format!(
                "Exported {} entries to {}",
                report.total_entries,
                report.path.display()
            ));
            true
        }
        Err(e) => {
            notifier.failure(&format!("Export failed: {}", e));
            false
        }
    }
}

/// Imports and reports the outcome through `notifier`. Returns success.
pub async fn import_with_notice(store: &SharedStore, path: &Path, notifier: &dyn Notifier) -> bool {
    match import_data(store, path).await {
        Ok(report) => {
            notifier.success(&format!(
                "Imported {} entries ({} new, {} updated)",
                report.imported_entries, report.merge.entries_added, report.merge.entries_updated
            ));
            true
        }
        Err(e) => {
            notifier.failure(&format!("Import failed: {}", e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryMedium, StoreLimits};
    use serde_json::json;

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(backup_file_name(date), "codemood-backup-2024-03-09.json");
    }

    #[test]
    fn test_build_snapshot_includes_stats_only_when_present() {
        let mut store = Store::open(MemoryMedium::new(), StoreLimits::default()).unwrap();
        let snapshot = build_snapshot(&store, Utc::now());
        assert_eq!(snapshot.version, "1.0");
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.stats.is_none());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("stats").is_none());

        store.set(KEY_STATS, &json!({"entriesWritten": 4}));
        let snapshot = build_snapshot(&store, Utc::now());
        assert_eq!(snapshot.stats, Some(json!({"entriesWritten": 4})));
    }

    #[test]
    fn test_apply_snapshot_merges_all_collections() {
        let mut store = Store::open(MemoryMedium::new(), StoreLimits::default()).unwrap();
        store.set(
            KEY_JOURNAL_ENTRIES,
            &json!([{"id": "1", "content": "old", "tags": [], "timestamp": "2024-01-01"}]),
        );
        store.set(KEY_SETTINGS, &json!({"theme": "light", "sound": true}));

        let snapshot = Snapshot::from_value(json!({
            "version": "1.0",
            "timestamp": "2024-01-04",
            "entries": [
                {"id": "1", "content": "new", "tags": [], "timestamp": "2024-01-02"},
                {"id": "2", "content": "two", "tags": ["x"], "timestamp": "2024-01-03"}
            ],
            "goals": [{"id": "g", "text": "goal", "completed": false}],
            "settings": {"theme": "dark"}
        }))
        .unwrap();

        let report = apply_snapshot(&mut store, snapshot, Utc::now()).unwrap();
        assert_eq!(report.entries_added, 1);
        assert_eq!(report.entries_updated, 1);
        assert_eq!(report.goals_added, 1);
        assert!(!report.is_noop());

        let ids: Vec<String> = store.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(store.entries()[1].content, "new");
        assert_eq!(
            Value::Object(store.settings()),
            json!({"theme": "dark", "sound": true})
        );
        assert_eq!(store.goals().len(), 1);
    }

    #[test]
    fn test_apply_snapshot_keeps_loosely_typed_stored_entries() {
        let mut store = Store::open(MemoryMedium::new(), StoreLimits::default()).unwrap();
        let stored = json!({"id": "1", "content": "legacy", "mood": 3, "tags": [], "timestamp": "2024-01-01"});
        assert!(store.set(KEY_JOURNAL_ENTRIES, &json!([stored.clone()])));

        let snapshot = Snapshot::from_value(json!({
            "version": "1.0",
            "timestamp": "2024-01-04",
            "entries": [{"id": "2", "content": "two", "tags": [], "timestamp": "2024-01-02"}]
        }))
        .unwrap();
        apply_snapshot(&mut store, snapshot, Utc::now()).unwrap();

        let records = store.entry_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "2");
        assert_eq!(records[1], stored);
    }
}
