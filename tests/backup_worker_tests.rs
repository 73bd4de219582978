//! Integration tests for the periodic backup worker.

use chrono::{Duration as ChronoDuration, Utc};
use codemood::constants::{KEY_JOURNAL_ENTRIES, KEY_LAST_BACKUP};
use codemood::notify::{NoticeKind, RecordingNotifier};
use codemood::ops::{run_backup_check, BackupSchedule, BackupWorker};
use codemood::store::{MemoryMedium, SharedStore, Store, StoreLimits};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn schedule() -> BackupSchedule {
    BackupSchedule {
        interval: DAY,
        check_every: Duration::from_millis(20),
    }
}

fn store_with_last_backup(last_backup: Option<String>) -> SharedStore {
    let mut store = Store::open(MemoryMedium::new(), StoreLimits::default()).expect("open store");
    store.set(
        KEY_JOURNAL_ENTRIES,
        &json!([{"id": "1", "content": "hi", "tags": [], "timestamp": "2024-01-01T00:00:00Z"}]),
    );
    if let Some(time) = last_backup {
        store.set(KEY_LAST_BACKUP, &Value::String(time));
    }
    store.into_shared()
}

fn backup_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .count()
        })
        .unwrap_or(0)
}

fn successes(notifier: &RecordingNotifier) -> usize {
    notifier
        .notices()
        .iter()
        .filter(|(kind, _)| *kind == NoticeKind::Success)
        .count()
}

#[tokio::test]
async fn test_worker_exports_once_when_never_backed_up() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let store = store_with_last_backup(None);
    let notifier = Arc::new(RecordingNotifier::new());

    let worker = BackupWorker::spawn(
        store.clone(),
        temp_dir.path().to_path_buf(),
        schedule(),
        notifier.clone(),
    );
    assert!(worker.is_running());

    // First check runs immediately; later checks see a fresh lastBackup.
    tokio::time::sleep(Duration::from_millis(300)).await;
    worker.stop().await.expect("stop worker");

    assert_eq!(successes(&notifier), 1);
    assert_eq!(backup_files(temp_dir.path()), 1);
    assert!(store.lock().await.get(KEY_LAST_BACKUP).is_some());
}

#[tokio::test]
async fn test_worker_skips_fresh_backup() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let backup_dir = temp_dir.path().join("backups");
    let store = store_with_last_backup(Some(Utc::now().to_rfc3339()));
    let notifier = Arc::new(RecordingNotifier::new());

    let worker = BackupWorker::spawn(store, backup_dir.clone(), schedule(), notifier.clone());
    tokio::time::sleep(Duration::from_millis(150)).await;
    worker.stop().await.expect("stop worker");

    assert!(notifier.notices().is_empty());
    assert!(!backup_dir.exists());
}

#[tokio::test]
async fn test_worker_exports_stale_backup() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let stale = (Utc::now() - ChronoDuration::days(2)).to_rfc3339();
    let store = store_with_last_backup(Some(stale.clone()));
    let notifier = Arc::new(RecordingNotifier::new());

    let worker = BackupWorker::spawn(
        store.clone(),
        temp_dir.path().to_path_buf(),
        schedule(),
        notifier.clone(),
    );
    tokio::time::sleep(Duration::from_millis(150)).await;
    worker.stop().await.expect("stop worker");

    assert_eq!(successes(&notifier), 1);
    let recorded = store.lock().await.get(KEY_LAST_BACKUP);
    assert_ne!(recorded, Some(Value::String(stale)));
}

#[tokio::test]
async fn test_stopped_worker_does_no_more_work() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let store = store_with_last_backup(None);
    let notifier = Arc::new(RecordingNotifier::new());

    let worker = BackupWorker::spawn(
        store.clone(),
        temp_dir.path().to_path_buf(),
        schedule(),
        notifier.clone(),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    worker.stop().await.expect("stop worker");
    let after_stop = notifier.notices().len();

    // Make a backup due again; a live worker would take it.
    store.lock().await.remove(KEY_LAST_BACKUP);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(notifier.notices().len(), after_stop);
}

#[tokio::test]
async fn test_run_backup_check_reports_only_when_due() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let store = store_with_last_backup(None);

    let first = run_backup_check(&store, temp_dir.path(), DAY)
        .await
        .expect("first check");
    assert!(first.is_some());

    let second = run_backup_check(&store, temp_dir.path(), DAY)
        .await
        .expect("second check");
    assert!(second.is_none());
}
