//! In-memory storage backend with a byte quota.

use std::collections::BTreeMap;

use super::{StorageBackend, StorageError};

/// Default byte budget, sized like a browser's local storage area.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// An in-memory [`StorageBackend`] with local-storage-like accounting.
///
/// Usage is the sum of key and value lengths; a write that would exceed
/// the quota fails without changing the store. The primary backend for
/// tests, and a faithful stand-in for the quota behavior the persistence
/// layer has to survive in production.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
    quota_bytes: usize,
}

impl MemoryBackend {
    /// Create a backend with the default quota.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// Create a backend with an explicit byte quota.
    #[must_use]
    pub const fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes,
        }
    }

    /// Bytes currently accounted against the quota.
    #[must_use]
    pub fn usage_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let replaced = self
            .entries
            .get(key)
            .map_or(0, |old| key.len() + old.len());
        let projected = self.usage_bytes() - replaced + key.len() + value.len();
        if projected > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                requested: key.len() + value.len(),
                quota: self.quota_bytes,
            });
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
