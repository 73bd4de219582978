//! Key-value media the store writes encoded records into.
//!
//! A medium only moves opaque text around. Encoding, validation and capacity
//! policy all live in the store on top of it.

use crate::constants::{LOCK_FILE_NAME, RECORD_FILE_EXTENSION};
use crate::errors::{AppError, AppResult, LockError, StorageError};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A string-keyed store of encoded text records.
pub trait Medium: Send {
    /// Reads the raw text stored under `key`, if any.
    fn read(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores `text` under `key`, replacing any previous record.
    fn write(&mut self, key: &str, text: &str) -> AppResult<()>;

    /// Deletes the record under `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> AppResult<()>;

    /// Lists every key currently stored, sorted.
    fn keys(&self) -> AppResult<Vec<String>>;

    /// Deletes every record.
    fn clear(&mut self) -> AppResult<()>;

    /// Bytes used by all keys and records, counted the way the budget is.
    fn used_bytes(&self) -> AppResult<u64> {
        let mut total = 0u64;
        for key in self.keys()? {
            let size = self.read(&key)?.map(|text| text.len()).unwrap_or(0);
            total += (key.len() + size) as u64;
        }
        Ok(total)
    }
}

impl<M: Medium + ?Sized> Medium for Box<M> {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, text: &str) -> AppResult<()> {
        (**self).write(key, text)
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        (**self).keys()
    }

    fn clear(&mut self) -> AppResult<()> {
        (**self).clear()
    }

    fn used_bytes(&self) -> AppResult<u64> {
        (**self).used_bytes()
    }
}

/// Checks that a key can be used as a record file name.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// An in-memory medium.
///
/// Used by tests and by sessions that should leave nothing on disk. An
/// optional hard quota makes writes fail the way a full disk would.
#[derive(Debug, Default, Clone)]
pub struct MemoryMedium {
    records: BTreeMap<String, String>,
    hard_quota: Option<u64>,
}

impl MemoryMedium {
    /// Creates an empty medium without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty medium that refuses writes beyond `bytes`.
    pub fn with_hard_quota(bytes: u64) -> Self {
        MemoryMedium {
            records: BTreeMap::new(),
            hard_quota: Some(bytes),
        }
    }

    /// Stores raw text without going through the store, e.g. to plant a
    /// corrupted record in a test.
    pub fn insert_raw(&mut self, key: &str, text: &str) {
        self.records.insert(key.to_string(), text.to_string());
    }
}

impl Medium for MemoryMedium {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, text: &str) -> AppResult<()> {
        validate_key(key)?;
        if let Some(quota) = self.hard_quota {
            let current = self.used_bytes()?;
            let previous = self
                .records
                .get(key)
                .map(|old| (key.len() + old.len()) as u64)
                .unwrap_or(0);
            let needed = current - previous + (key.len() + text.len()) as u64;
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed,
                    limit: quota,
                }
                .into());
            }
        }
        self.records.insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        self.records.remove(key);
        Ok(())
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }

    fn clear(&mut self) -> AppResult<()> {
        self.records.clear();
        Ok(())
    }
}

/// A directory-backed medium with one file per key.
///
/// Each record lives in `<dir>/<key>.rec`. Writes go through a temporary file
/// in the same directory that is renamed over the record, so a crash leaves
/// either the old or the new record. An exclusive advisory lock on
/// `<dir>/.codemood.lock` is held for the lifetime of the value.
#[derive(Debug)]
pub struct FileMedium {
    dir: PathBuf,
    lock_file: File,
}

impl FileMedium {
    /// Opens (creating if needed) the medium rooted at `dir` and locks it.
    ///
    /// # Errors
    ///
    /// - `AppError::Io` if the directory cannot be created
    /// - `AppError::Lock(LockError::StoreBusy)` if another process holds the lock
    /// - `AppError::Lock(LockError::AcquisitionFailed)` if locking fails otherwise
    pub fn open(dir: &Path) -> AppResult<Self> {
        ensure_data_directory_exists(dir)?;

        let lock_path = dir.join(LOCK_FILE_NAME);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: dir.to_path_buf(),
                source,
            })?;

        if let Err(source) = lock_file.try_lock_exclusive() {
            let contended = source.kind() == ErrorKind::WouldBlock
                || source.raw_os_error() == fs2::lock_contended_error().raw_os_error();
            return Err(if contended {
                LockError::StoreBusy {
                    path: dir.to_path_buf(),
                }
            } else {
                LockError::AcquisitionFailed {
                    path: dir.to_path_buf(),
                    source,
                }
            }
            .into());
        }

        info!("Opened storage medium");
        debug!("Storage directory: {:?}", dir);
        Ok(FileMedium {
            dir: dir.to_path_buf(),
            lock_file,
        })
    }

    /// The directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> AppResult<PathBuf> {
        validate_key(key)?;
        Ok(self
            .dir
            .join(format!("{}.{}", key, RECORD_FILE_EXTENSION)))
    }
}

impl Drop for FileMedium {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock_file) {
            warn!("Failed to release storage lock: {}", e);
        }
    }
}

impl Medium for FileMedium {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    fn write(&mut self, key: &str, text: &str) -> AppResult<()> {
        let path = self.record_path(key)?;

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(text.as_bytes())?;
        temp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use crate::constants::DEFAULT_FILE_PERMISSIONS;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(DEFAULT_FILE_PERMISSIONS))?;
        }

        temp.persist(&path).map_err(|e| AppError::Io(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_record = path
                .extension()
                .is_some_and(|ext| ext == RECORD_FILE_EXTENSION);
            if !is_record {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_key(stem).is_ok() {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn clear(&mut self) -> AppResult<()> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }
}

/// Ensures the data directory exists, creating it with owner-only access.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory or its permissions cannot be set up.
pub fn ensure_data_directory_exists(dir: &Path) -> AppResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create data directory: {}", e),
            ))
        })?;

        #[cfg(unix)]
        {
            use crate::constants::DEFAULT_DIR_PERMISSIONS;
            fs::set_permissions(dir, fs::Permissions::from_mode(DEFAULT_DIR_PERMISSIONS))
                .map_err(|e| {
                    AppError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to set secure permissions on data directory: {}", e),
                    ))
                })?;
            debug!("Set 0o700 permissions on data directory");
        }
    }
    Ok(())
}
