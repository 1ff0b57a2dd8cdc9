//! Bounded key-value byte storage behind the cart's persistence.
//!
//! The durable store is modeled on a browser's local storage area: string
//! keys, string values, a byte budget, and writes that fail once the
//! budget is spent. Backends implement [`StorageBackend`]; the persistence
//! layer assumes nothing beyond this trait, so tests and embedders can
//! swap in their own.

mod file;
mod memory;

pub use file::DirBackend;
pub use memory::{DEFAULT_QUOTA_BYTES, MemoryBackend};

use thiserror::Error;

/// Errors a storage backend can raise.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would push the store past its byte budget. The store is
    /// left unchanged.
    #[error("storage quota exceeded: {requested} bytes requested against a {quota}-byte budget")]
    QuotaExceeded {
        /// Bytes the rejected write asked for (key plus value).
        requested: usize,
        /// The backend's total budget.
        quota: usize,
    },
    /// The backend itself failed (I/O, permissions, bad key).
    #[error("storage backend error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this is the quota-exceeded failure class, which has its own
    /// recovery ladder in the persistence layer.
    #[must_use]
    pub const fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// A bounded key-value byte store.
///
/// All methods are synchronous; the cart engine has no async surface.
/// `set` must reject, rather than partially apply, writes that do not fit
/// the backend's budget.
pub trait StorageBackend {
    /// Read the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backend cannot be read at all; a
    /// missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] when the write does not fit
    /// the byte budget (leaving the store unchanged), or an I/O error.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot delete the entry.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be enumerated.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
