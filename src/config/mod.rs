//! Configuration management for codemood.
//!
//! Settings are read from environment variables with sensible defaults. Paths
//! are expanded with `shellexpand`, so `~` and `$VAR` references work.
//!
//! # Environment Variables
//!
//! - `CODEMOOD_DIR`: data directory holding the store (defaults to ~/.local/share/codemood)
//! - `CODEMOOD_BACKUP_DIR`: where exports are written (defaults to `<CODEMOOD_DIR>/backups`)
//! - `CODEMOOD_MAX_ENTRIES`: journal entries kept (defaults to 1000)
//! - `CODEMOOD_MAX_DRAFTS`: drafts kept (defaults to 10)
//! - `CODEMOOD_GOAL_RETENTION_DAYS`: days a completed goal survives reclamation (defaults to 30)
//! - `CODEMOOD_STORAGE_LIMIT`: total storage budget in bytes (defaults to 5 MiB)
//! - `CODEMOOD_BACKUP_INTERVAL_HOURS`: hours between periodic backups (defaults to 24)
//! - `HOME`: used for expanding the default data directory path

use crate::constants::{
    DEFAULT_BACKUP_INTERVAL_HOURS, DEFAULT_BACKUP_SUBDIR, DEFAULT_DATA_SUBDIR,
    DEFAULT_GOAL_RETENTION_DAYS, DEFAULT_MAX_DRAFTS, DEFAULT_MAX_ENTRIES,
    DEFAULT_STORAGE_LIMIT_BYTES, ENV_VAR_BACKUP_INTERVAL_HOURS, ENV_VAR_CODEMOOD_BACKUP_DIR,
    ENV_VAR_CODEMOOD_DIR, ENV_VAR_GOAL_RETENTION_DAYS, ENV_VAR_HOME, ENV_VAR_MAX_DRAFTS,
    ENV_VAR_MAX_ENTRIES, ENV_VAR_STORAGE_LIMIT, MAX_BACKUP_INTERVAL_HOURS,
    MAX_GOAL_RETENTION_DAYS, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use crate::store::StoreLimits;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for codemood.
///
/// # Examples
///
/// Building a configuration by hand:
/// ```
/// use codemood::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/tmp/codemood"),
///     backup_dir: PathBuf::from("/tmp/codemood/backups"),
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.limits().max_entries, 1000);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the file medium.
    pub data_dir: PathBuf,

    /// Directory receiving exported snapshots, manual and periodic.
    pub backup_dir: PathBuf,

    /// Maximum number of journal entries kept; older ones are dropped on write.
    pub max_entries: usize,

    /// Maximum number of drafts kept.
    pub max_drafts: usize,

    /// Days a completed goal is kept before reclamation may drop it.
    pub goal_retention_days: i64,

    /// Total storage budget in bytes.
    pub storage_limit: u64,

    /// Hours between two periodic backups.
    pub backup_interval_hours: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &REDACTED_PLACEHOLDER)
            .field("backup_dir", &REDACTED_PLACEHOLDER)
            .field("max_entries", &self.max_entries)
            .field("max_drafts", &self.max_drafts)
            .field("goal_retention_days", &self.goal_retention_days)
            .field("storage_limit", &self.storage_limit)
            .field("backup_interval_hours", &self.backup_interval_hours)
            .finish()
    }
}

impl Default for Config {
    /// Default limits with empty paths; `load` fills the paths in.
    fn default() -> Self {
        Config {
            data_dir: PathBuf::new(),
            backup_dir: PathBuf::new(),
            max_entries: DEFAULT_MAX_ENTRIES,
            max_drafts: DEFAULT_MAX_DRAFTS,
            goal_retention_days: DEFAULT_GOAL_RETENTION_DAYS,
            storage_limit: DEFAULT_STORAGE_LIMIT_BYTES,
            backup_interval_hours: DEFAULT_BACKUP_INTERVAL_HOURS,
        }
    }
}

fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Reads a numeric variable, falling back to `default` when unset.
fn env_number<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AppError::Config(format!("{} must be a number, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a path cannot be expanded, a numeric
    /// variable does not parse, or the result fails [`Config::validate`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use codemood::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Storing data in {:?}", config.data_dir),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_CODEMOOD_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });
        let data_dir = expand_path(&data_dir_str)?;

        let backup_dir = match env::var(ENV_VAR_CODEMOOD_BACKUP_DIR) {
            Ok(raw) => expand_path(&raw)?,
            Err(_) => data_dir.join(DEFAULT_BACKUP_SUBDIR),
        };

        let config = Config {
            data_dir,
            backup_dir,
            max_entries: env_number(ENV_VAR_MAX_ENTRIES, DEFAULT_MAX_ENTRIES)?,
            max_drafts: env_number(ENV_VAR_MAX_DRAFTS, DEFAULT_MAX_DRAFTS)?,
            goal_retention_days: env_number(
                ENV_VAR_GOAL_RETENTION_DAYS,
                DEFAULT_GOAL_RETENTION_DAYS,
            )?,
            storage_limit: env_number(ENV_VAR_STORAGE_LIMIT, DEFAULT_STORAGE_LIMIT_BYTES)?,
            backup_interval_hours: env_number(
                ENV_VAR_BACKUP_INTERVAL_HOURS,
                DEFAULT_BACKUP_INTERVAL_HOURS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a directory is empty or relative, or a
    /// limit is zero or negative.
    pub fn validate(&self) -> AppResult<()> {
        for (name, dir) in [("Data", &self.data_dir), ("Backup", &self.backup_dir)] {
            if dir.as_os_str().is_empty() {
                return Err(AppError::Config(format!("{} directory path is empty", name)));
            }
            if !dir.is_absolute() {
                return Err(AppError::Config(format!(
                    "{} directory must be an absolute path",
                    name
                )));
            }
        }

        if self.max_entries == 0 {
            return Err(AppError::Config("max_entries must be at least 1".to_string()));
        }
        if self.max_drafts == 0 {
            return Err(AppError::Config("max_drafts must be at least 1".to_string()));
        }
        if self.goal_retention_days < 0 {
            return Err(AppError::Config(
                "goal_retention_days cannot be negative".to_string(),
            ));
        }
        if self.goal_retention_days > MAX_GOAL_RETENTION_DAYS {
            return Err(AppError::Config(format!(
                "goal_retention_days cannot exceed {}",
                MAX_GOAL_RETENTION_DAYS
            )));
        }
        if self.storage_limit == 0 {
            return Err(AppError::Config("storage_limit must be positive".to_string()));
        }
        if self.backup_interval_hours == 0 {
            return Err(AppError::Config(
                "backup_interval_hours must be at least 1".to_string(),
            ));
        }
        if self.backup_interval_hours > MAX_BACKUP_INTERVAL_HOURS {
            return Err(AppError::Config(format!(
                "backup_interval_hours cannot exceed {}",
                MAX_BACKUP_INTERVAL_HOURS
            )));
        }

        Ok(())
    }

    /// Store limits derived from this configuration.
    ///
    /// The retention is clamped to the range `validate` accepts.
    pub fn limits(&self) -> StoreLimits {
        let retention_days = self.goal_retention_days.clamp(0, MAX_GOAL_RETENTION_DAYS);
        StoreLimits {
            max_entries: self.max_entries,
            max_drafts: self.max_drafts,
            goal_retention: chrono::Duration::days(retention_days),
            storage_limit: self.storage_limit,
        }
    }

    /// Interval between periodic backups, clamped to the range `validate` accepts.
    pub fn backup_interval(&self) -> Duration {
        let hours = self.backup_interval_hours.clamp(1, MAX_BACKUP_INTERVAL_HOURS);
        Duration::from_secs(hours * 60 * 60)
    }
}
