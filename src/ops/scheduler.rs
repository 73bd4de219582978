//! Periodic background backup.
//!
//! The worker wakes up on a fixed check interval (immediately on start, then
//! every `check_every`) and exports a snapshot when the last recorded backup
//! is older than the backup interval. It runs until stopped or dropped.

use crate::constants::KEY_LAST_BACKUP;
use crate::errors::{AppError, AppResult};
use crate::model::parse_timestamp;
use crate::notify::Notifier;
use crate::ops::backup::{export_data, ExportReport};
use crate::store::SharedStore;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// How often the worker backs up and how often it checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupSchedule {
    /// Minimum time between two backups
    pub interval: Duration,
    /// Time between two checks
    pub check_every: Duration,
}

/// Whether a backup is due given the stored `lastBackup` value.
///
/// Due once the time since the last backup exceeds `interval`. A missing or
/// unparseable value counts as due.
pub fn backup_due(last_backup: Option<&str>, now: DateTime<Utc>, interval: Duration) -> bool {
    let Some(last) = last_backup.and_then(parse_timestamp) else {
        return true;
    };
    match chrono::Duration::from_std(interval) {
        Ok(interval) => now - last > interval,
        Err(_) => false,
    }
}

/// Runs one check: exports if the last backup is older than `interval`.
///
/// Returns the export report when a backup was taken.
pub async fn run_backup_check(
    store: &SharedStore,
    backup_dir: &Path,
    interval: Duration,
) -> AppResult<Option<ExportReport>> {
    let last_backup = {
        let guard = store.lock().await;
        guard
            .get(KEY_LAST_BACKUP)
            .and_then(|value| value.as_str().map(str::to_string))
    };

    if !backup_due(last_backup.as_deref(), Utc::now(), interval) {
        debug!("Backup not due, last backup at {:?}", last_backup);
        return Ok(None);
    }

    export_data(store, backup_dir).await.map(Some)
}

/// Handle to the background backup task.
///
/// Dropping the handle aborts the task; [`BackupWorker::stop`] stops it
/// cleanly and waits for an in-flight backup to finish.
pub struct BackupWorker {
    stop_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl BackupWorker {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn(
        store: SharedStore,
        backup_dir: PathBuf,
        schedule: BackupSchedule,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let check_every = schedule.check_every.max(Duration::from_millis(10));

        info!(
            "Starting backup worker: interval {:?}, checking every {:?}",
            schedule.interval, check_every
        );

        let join_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(check_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!("Backup worker received stop signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        match run_backup_check(&store, &backup_dir, schedule.interval).await {
                            Ok(Some(report)) => notifier.success(&format!(
                                "Automatic backup saved to {}",
                                report.path.display()
                            )),
                            Ok(None) => {}
                            Err(e) => notifier.failure(&format!("Automatic backup failed: {}", e)),
                        }
                    }
                }
            }
        });

        BackupWorker {
            stop_tx: Some(stop_tx),
            join_handle: Some(join_handle),
        }
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the worker to stop and waits for it to finish.
    pub async fn stop(mut self) -> AppResult<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            join_handle.await.map_err(|err| {
                AppError::Io(std::io::Error::other(format!(
                    "backup worker join: {}",
                    err
                )))
            })?;
        }

        info!("Backup worker stopped");
        Ok(())
    }
}

impl Drop for BackupWorker {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.abort();
        }
    }
}

/// Reads the recorded last backup time, if any.
pub fn last_backup_time(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value.and_then(Value::as_str).and_then(parse_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_backup_due() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();

        assert!(backup_due(None, now, DAY));
        assert!(backup_due(Some("garbage"), now, DAY));
        assert!(backup_due(Some("2024-06-01T11:00:00Z"), now, DAY));
        assert!(backup_due(Some("2024-06-01T11:59:59Z"), now, DAY));
        assert!(!backup_due(Some("2024-06-01T12:00:00Z"), now, DAY));
        assert!(!backup_due(Some("2024-06-02T00:00:00Z"), now, DAY));
    }

    #[test]
    fn test_last_backup_time() {
        let value = Value::String("2024-06-01T00:00:00Z".to_string());
        assert!(last_backup_time(Some(&value)).is_some());
        assert!(last_backup_time(Some(&Value::Bool(true))).is_none());
        assert!(last_backup_time(None).is_none());
    }
}
