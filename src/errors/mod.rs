//! Error handling utilities for the codemood application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Most storage failures never reach callers of the store's `get`/`set` façade:
//! they are logged and turned into `None` or `false` there. The typed errors
//! below are what the fallible layer underneath produces.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors raised by the storage medium or the record encoding.
///
/// # Examples
///
/// ```
/// use codemood::errors::StorageError;
///
/// let error = StorageError::QuotaExceeded { needed: 120, limit: 100 };
/// assert!(format!("{}", error).contains("120"));
/// assert!(format!("{}", error).contains("100"));
/// ```
#[derive(Debug, Error)]
pub enum StorageError {
    /// A value could not be turned into its stored text form.
    #[error("Failed to encode value for key '{key}': {message}")]
    Encode {
        /// The key being written
        key: String,
        /// What went wrong
        message: String,
    },

    /// Stored text could not be turned back into a value.
    #[error("Failed to decode record '{key}': {message}")]
    Decode {
        /// The key being read
        key: String,
        /// What went wrong
        message: String,
    },

    /// The write would exceed the storage budget even after reclamation.
    #[error("Storage budget exceeded: {needed} bytes needed, limit is {limit} bytes")]
    QuotaExceeded {
        /// Bytes the medium would hold after the write
        needed: u64,
        /// Configured budget
        limit: u64,
    },

    /// The key cannot be represented in the medium.
    #[error("Invalid storage key '{0}': only ASCII letters, digits, '_' and '-' are allowed")]
    InvalidKey(String),

    /// A required record holds a value of the wrong shape.
    #[error("Record '{key}' has an unexpected shape: expected {expected}")]
    Shape {
        /// The offending key
        key: String,
        /// The JSON shape that was expected
        expected: &'static str,
    },

    /// Validation failed and salvaging the medium failed too.
    #[error("Storage is corrupted and could not be recovered: {0}")]
    Unrecoverable(String),
}

/// Represents errors that can occur when attempting to lock the storage medium.
///
/// # Examples
///
/// ```
/// use codemood::errors::LockError;
/// use std::path::PathBuf;
///
/// let error = LockError::StoreBusy {
///     path: PathBuf::from("/path/to/data"),
/// };
///
/// assert!(format!("{}", error).contains("already in use"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Error when the medium is already locked by another process.
    #[error("Storage at {path} is already in use by another codemood process. Close the other session and try again.")]
    StoreBusy {
        /// The data directory that is locked
        path: PathBuf,
    },

    /// Error when acquiring the lock fails for a technical reason.
    #[error("Failed to acquire lock for storage at {path}: {source}. Please check that the directory is accessible.")]
    AcquisitionFailed {
        /// The data directory that couldn't be locked
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents the ways an imported snapshot can be rejected.
///
/// # Examples
///
/// ```
/// use codemood::errors::ImportError;
///
/// let error = ImportError::MissingField("version");
/// assert!(format!("{}", error).contains("version"));
/// ```
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload is not JSON at all.
    #[error("Import file is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// A required top-level field is absent or not a string.
    #[error("Import file is missing the '{0}' field")]
    MissingField(&'static str),

    /// A top-level field has the wrong JSON type.
    #[error("Import field '{field}' must be {expected}")]
    WrongType {
        /// The offending field
        field: &'static str,
        /// The JSON shape that was expected
        expected: &'static str,
    },

    /// An entry lacks one of the fields every entry must carry.
    #[error("Imported entry #{index} is invalid: missing or malformed '{field}'")]
    InvalidEntry {
        /// Position of the entry in the `entries` array
        index: usize,
        /// The missing field
        field: &'static str,
    },

    /// The merged result could not be written back.
    #[error("Failed to write imported data: {0}")]
    Write(String),
}

/// Represents all possible errors that can occur in the codemood application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use codemood::errors::AppError;
///
/// let error = AppError::Config("Missing data directory".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing data directory");
/// ```
///
/// Converting from an IO error:
/// ```
/// use codemood::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors outside of record encoding.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by the storage medium or the record encoding.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Errors related to locking the storage medium.
    #[error("Storage locking error: {0}")]
    Lock(#[from] LockError),

    /// Errors raised while importing a snapshot.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Errors in journal operations (unknown ids, invalid input).
    #[error("Journal error: {0}")]
    Journal(String),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use codemood::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Journal("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let app_io_error = AppError::Io(io_error);
        assert_eq!(format!("{}", app_io_error), "I/O error: permission denied");

        let journal_error = AppError::Journal("Unknown goal".to_string());
        assert_eq!(format!("{}", journal_error), "Journal error: Unknown goal");
    }

    #[test]
    fn test_storage_error_wraps_into_app_error() {
        let error: AppError = StorageError::InvalidKey("../etc".to_string()).into();
        let message = format!("{}", error);
        assert!(message.starts_with("Storage error:"));
        assert!(message.contains("../etc"));
    }

    #[test]
    fn test_import_error_messages() {
        let error = ImportError::InvalidEntry {
            index: 3,
            field: "tags",
        };
        let message = format!("{}", error);
        assert!(message.contains("#3"));
        assert!(message.contains("tags"));

        let wrapped: AppError = ImportError::MissingField("timestamp").into();
        assert!(format!("{}", wrapped).contains("timestamp"));
    }

    #[test]
    fn test_lock_error_display() {
        let error = LockError::AcquisitionFailed {
            path: PathBuf::from("/data"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = format!("{}", error);
        assert!(message.contains("Failed to acquire lock"));
        assert!(message.contains("denied"));
    }
}
