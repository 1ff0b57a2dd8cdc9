//! File-backed storage: one file per key under a data directory.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::{DEFAULT_QUOTA_BYTES, StorageBackend, StorageError};

/// A [`StorageBackend`] that keeps each key in its own file under one
/// directory, surviving process restarts.
///
/// Keys are used verbatim as file names, so they must not contain path
/// separators; the cart's own keys (`warung.cart.v1` and friends) are
/// safe. Writes land in a sibling temp file first and are renamed into
/// place, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct DirBackend {
    dir: PathBuf,
    quota_bytes: usize,
}

impl DirBackend {
    /// Open a backend rooted at `dir` (created if missing) with the
    /// default quota.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::open_with_quota(dir, DEFAULT_QUOTA_BYTES)
    }

    /// Open a backend with an explicit byte quota.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created.
    pub fn open_with_quota(dir: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota_bytes })
    }

    /// Bytes currently accounted against the quota (file names plus file
    /// sizes).
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be scanned.
    pub fn usage_bytes(&self) -> Result<usize, StorageError> {
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let name_len = entry.file_name().to_string_lossy().len();
                let size = usize::try_from(entry.metadata()?.len()).unwrap_or(usize::MAX);
                total += name_len + size;
            }
        }
        Ok(total)
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("key {key:?} is not usable as a file name"),
            )));
        }
        Ok(self.dir.join(key))
    }
}

impl StorageBackend for DirBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        let replaced = fs::metadata(&path).map_or(0, |meta| {
            key.len() + usize::try_from(meta.len()).unwrap_or(usize::MAX)
        });
        let projected = self
            .usage_bytes()?
            .saturating_sub(replaced)
            .saturating_add(key.len() + value.len());
        if projected > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                requested: key.len() + value.len(),
                quota: self.quota_bytes,
            });
        }

        let tmp = self.dir.join(format!("{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "wrote storage entry");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file()
                && let Some(name) = entry.file_name().to_str()
                && !name.ends_with(".tmp")
            {
                keys.push(name.to_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
