//! Application context.
//!
//! `AppContext` owns everything a command needs: the configuration, the
//! shared store and the notifier, plus the background backup worker when one
//! was started. It is built in a fixed order: config, medium, store (which
//! validates the medium), notifier, and finally the optional worker.

use crate::config::Config;
use crate::constants::BACKUP_CHECK_INTERVAL_SECS;
use crate::errors::AppResult;
use crate::notify::{LogNotifier, Notifier};
use crate::ops::scheduler::{BackupSchedule, BackupWorker};
use crate::store::{FileMedium, SharedStore, Store};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Handles shared by every command of one invocation.
pub struct AppContext {
    config: Config,
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
    worker: Option<BackupWorker>,
}

impl AppContext {
    /// Opens the file medium under `config.data_dir` and builds the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, another process
    /// holds the data directory, or the medium is beyond recovery.
    pub fn open(config: Config, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        config.validate()?;
        debug!("Opening store with {:?}", config);

        let medium = FileMedium::open(&config.data_dir)?;
        let store = Store::open(medium, config.limits())?.into_shared();

        Ok(AppContext {
            config,
            store,
            notifier,
            worker: None,
        })
    }

    /// Builds a context around an existing store, for embedding and tests.
    pub fn with_store(config: Config, store: Store, notifier: Arc<dyn Notifier>) -> Self {
        AppContext {
            config,
            store: store.into_shared(),
            notifier,
            worker: None,
        }
    }

    /// Starts the periodic backup worker if it is not running yet.
    ///
    /// The worker reports through the log only, whatever notifier the
    /// context uses, so it never writes over interactive output.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start_backup_worker(&mut self) {
        if self.worker.is_some() {
            return;
        }
        let schedule = BackupSchedule {
            interval: self.config.backup_interval(),
            check_every: Duration::from_secs(BACKUP_CHECK_INTERVAL_SECS),
        };
        self.start_backup_worker_with(schedule, Arc::new(LogNotifier));
    }

    /// Starts the worker with an explicit schedule and notifier.
    pub fn start_backup_worker_with(
        &mut self,
        schedule: BackupSchedule,
        notifier: Arc<dyn Notifier>,
    ) {
        if self.worker.is_some() {
            return;
        }
        self.worker = Some(BackupWorker::spawn(
            self.store.clone(),
            self.config.backup_dir.clone(),
            schedule,
            notifier,
        ));
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared store.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// The notifier for user-facing outcomes.
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Whether the backup worker is running.
    pub fn worker_running(&self) -> bool {
        self.worker.as_ref().is_some_and(BackupWorker::is_running)
    }

    /// Stops the backup worker, if any, and waits for it.
    pub async fn shutdown(mut self) -> AppResult<()> {
        if let Some(worker) = self.worker.take() {
            worker.stop().await?;
        }
        info!("Application context shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::store::{MemoryMedium, StoreLimits};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            data_dir: dir.join("data"),
            backup_dir: dir.join("backups"),
            ..Config::default()
        }
    }

    #[test]
    fn test_open_creates_data_dir_and_locks_it() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());

        let context = AppContext::open(config.clone(), Arc::new(RecordingNotifier::new())).unwrap();
        assert!(config.data_dir.is_dir());
        assert!(!context.worker_running());

        assert!(AppContext::open(config, Arc::new(RecordingNotifier::new())).is_err());
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let config = Config {
            data_dir: PathBuf::from("relative"),
            backup_dir: PathBuf::from("/tmp"),
            ..Config::default()
        };
        assert!(AppContext::open(config, Arc::new(RecordingNotifier::new())).is_err());
    }

    #[tokio::test]
    async fn test_worker_starts_once_and_shuts_down() {
        let temp = tempdir().unwrap();
        let store = Store::open(MemoryMedium::new(), StoreLimits::default()).unwrap();
        let mut context = AppContext::with_store(
            config_in(temp.path()),
            store,
            Arc::new(RecordingNotifier::new()),
        );

        let schedule = BackupSchedule {
            interval: Duration::from_secs(3600),
            check_every: Duration::from_secs(3600),
        };
        context.start_backup_worker_with(schedule, Arc::new(RecordingNotifier::new()));
        context.start_backup_worker_with(schedule, Arc::new(RecordingNotifier::new()));
        assert!(context.worker_running());

        context.shutdown().await.unwrap();
    }
}
