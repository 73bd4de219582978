//! Constants used throughout the application.
//!
//! This module contains all constants used in codemood, organized into logical
//! groups. Storage keys live here so every component reads and writes the same
//! records.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "codemood";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A developer mood journal with local, size-bounded storage";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the data directory holding the storage medium.
pub const ENV_VAR_CODEMOOD_DIR: &str = "CODEMOOD_DIR";
/// Environment variable for the directory receiving exported snapshots.
pub const ENV_VAR_CODEMOOD_BACKUP_DIR: &str = "CODEMOOD_BACKUP_DIR";
/// Environment variable overriding the maximum number of journal entries kept.
pub const ENV_VAR_MAX_ENTRIES: &str = "CODEMOOD_MAX_ENTRIES";
/// Environment variable overriding the maximum number of drafts kept.
pub const ENV_VAR_MAX_DRAFTS: &str = "CODEMOOD_MAX_DRAFTS";
/// Environment variable overriding how long completed goals are kept, in days.
pub const ENV_VAR_GOAL_RETENTION_DAYS: &str = "CODEMOOD_GOAL_RETENTION_DAYS";
/// Environment variable overriding the total storage budget, in bytes.
pub const ENV_VAR_STORAGE_LIMIT: &str = "CODEMOOD_STORAGE_LIMIT";
/// Environment variable overriding the periodic backup interval, in hours.
pub const ENV_VAR_BACKUP_INTERVAL_HOURS: &str = "CODEMOOD_BACKUP_INTERVAL_HOURS";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default sub-directory for the data directory within the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".local/share/codemood";
/// Sub-directory of the data directory used for exports when none is configured.
pub const DEFAULT_BACKUP_SUBDIR: &str = "backups";

// Storage Limits
/// Default maximum number of journal entries retained.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Default maximum number of drafts retained.
pub const DEFAULT_MAX_DRAFTS: usize = 10;
/// Default retention for completed goals, in days.
pub const DEFAULT_GOAL_RETENTION_DAYS: i64 = 30;
/// Longest accepted retention for completed goals, in days (100 years).
pub const MAX_GOAL_RETENTION_DAYS: i64 = 36_500;
/// Default total storage budget in bytes (the usual browser local storage quota).
pub const DEFAULT_STORAGE_LIMIT_BYTES: u64 = 5 * 1024 * 1024;
/// Default interval between periodic backups, in hours.
pub const DEFAULT_BACKUP_INTERVAL_HOURS: u64 = 24;
/// Longest accepted interval between periodic backups, in hours (10 years).
pub const MAX_BACKUP_INTERVAL_HOURS: u64 = 87_600;
/// How often the backup worker checks whether a backup is due, in seconds.
pub const BACKUP_CHECK_INTERVAL_SECS: u64 = 60 * 60;

// Storage Keys
/// Journal entries, newest first.
pub const KEY_JOURNAL_ENTRIES: &str = "journalEntries";
/// Goal list.
pub const KEY_GOALS: &str = "goals";
/// Option → value mapping.
pub const KEY_SETTINGS: &str = "settings";
/// Unsaved drafts.
pub const KEY_DRAFTS: &str = "drafts";
/// RFC 3339 timestamp of the last successful export.
pub const KEY_LAST_BACKUP: &str = "lastBackup";
/// Index of the currently selected mood.
pub const KEY_CURRENT_MOOD: &str = "currentMood";
/// Dark theme flag.
pub const KEY_DARK_MODE: &str = "darkMode";
/// Pomodoro session counters.
pub const KEY_POMODORO_STATS: &str = "pomodoroStats";
/// Free-form usage statistics, exported alongside snapshots.
pub const KEY_STATS: &str = "stats";
/// GitHub token used by the activity display.
pub const KEY_GITHUB_TOKEN: &str = "githubToken";
/// Every key the application persists.
pub const KNOWN_KEYS: &[&str] = &[
    KEY_JOURNAL_ENTRIES,
    KEY_GOALS,
    KEY_SETTINGS,
    KEY_DRAFTS,
    KEY_LAST_BACKUP,
    KEY_CURRENT_MOOD,
    KEY_DARK_MODE,
    KEY_POMODORO_STATS,
    KEY_STATS,
    KEY_GITHUB_TOKEN,
];

// File System Parameters
/// File extension of a stored record in the file medium.
pub const RECORD_FILE_EXTENSION: &str = "rec";
/// Name of the lock file guarding a file medium.
pub const LOCK_FILE_NAME: &str = ".codemood.lock";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Snapshots
/// Version written into every exported snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";
/// Prefix of exported snapshot file names.
pub const BACKUP_FILE_PREFIX: &str = "codemood-backup-";
/// Date format used in exported snapshot file names.
pub const BACKUP_FILE_DATE_FORMAT: &str = "%Y-%m-%d";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "codemood";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";
