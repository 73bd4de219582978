//! High-level operations on the journal store.
//!
//! This module holds the user-facing operations built on top of
//! [`crate::store::Store`]: everyday journal edits, snapshot export and
//! import with merging, and the periodic backup worker.

pub mod backup;
pub mod journal;
pub mod merge;
pub mod scheduler;

// Re-export commonly used functions
pub use backup::{
    export_data, export_with_notice, import_data, import_with_notice, ExportReport, ImportReport,
};
pub use merge::MergeReport;
pub use scheduler::{backup_due, run_backup_check, BackupSchedule, BackupWorker};
