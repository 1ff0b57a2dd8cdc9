//! Durable persistence for the cart item sequence.
//!
//! One logical key in a bounded [`StorageBackend`] holds the serialized
//! cart. The adapter owns the entire quota recovery ladder and reports
//! what happened as a closed [`SaveOutcome`] instead of leaking backend
//! error identities:
//!
//! 1. payloads over [`PersistenceConfig::max_payload_bytes`] are truncated
//!    to the newest [`PersistenceConfig::truncate_keep`] items before the
//!    write is attempted;
//! 2. a quota-exceeded write retries with only the newest
//!    [`PersistenceConfig::minimal_keep`] items;
//! 3. if even that fails, the key is erased and the cart starts over.
//!
//! Loads never fail outward: unparseable or unknown-version payloads are
//! discarded (key removed) and the cart starts empty; a backend read
//! failure starts empty without touching the key.

mod payload;

use tracing::{debug, error, info, warn};

use warung_core::CartItem;

use crate::config::PersistenceConfig;
use crate::storage::{StorageBackend, StorageError};

/// What a save attempt did, as a closed set callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The full item sequence is durable.
    Saved,
    /// Only the newest `kept` items are durable; older ones were dropped
    /// to fit. The in-memory cart must be reconciled to the same set.
    SavedTruncated {
        /// How many of the newest items survived.
        kept: usize,
    },
    /// Nothing could be written; the durable key was erased and the cart
    /// must start over empty.
    Reset,
    /// The write failed for a reason other than quota. Nothing was
    /// changed; in-memory state should be kept as the source of truth.
    Failed,
}

/// Persistence adapter: owns the durable key and every degrade decision.
#[derive(Debug)]
pub struct CartPersistence<S> {
    storage: S,
    config: PersistenceConfig,
}

impl<S: StorageBackend> CartPersistence<S> {
    /// Create an adapter over `storage`.
    #[must_use]
    pub const fn new(storage: S, config: PersistenceConfig) -> Self {
        Self { storage, config }
    }

    /// Read access to the underlying backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Startup sequence: drop legacy keys, purge foreign keys when usage
    /// is over the high-water mark, then load whatever survives.
    pub fn initialize(&mut self) -> Vec<CartItem> {
        self.cleanup();
        self.load()
    }

    /// Load the persisted item sequence.
    ///
    /// Never fails outward; see the module docs for how bad payloads are
    /// handled.
    pub fn load(&mut self) -> Vec<CartItem> {
        let raw = match self.storage.get(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read cart payload, starting empty");
                return Vec::new();
            }
        };
        match payload::decode(&raw) {
            Ok(items) => {
                debug!(count = items.len(), "restored cart payload");
                items
            }
            Err(e) => {
                warn!(error = %e, "discarding unusable cart payload");
                self.discard_key();
                Vec::new()
            }
        }
    }

    /// Persist `items`, degrading along the recovery ladder when the
    /// store pushes back.
    pub fn save(&mut self, items: &[CartItem]) -> SaveOutcome {
        let (encoded, kept) = match self.encode_fitting(items) {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "could not serialize cart payload");
                return SaveOutcome::Failed;
            }
        };

        match self.storage.set(&self.config.storage_key, &encoded) {
            Ok(()) if kept == items.len() => SaveOutcome::Saved,
            Ok(()) => {
                info!(kept, total = items.len(), "cart payload truncated to fit size limit");
                SaveOutcome::SavedTruncated { kept }
            }
            Err(e) if e.is_quota_exceeded() => self.save_minimal(items),
            Err(e) => {
                error!(error = %e, "cart save failed, keeping in-memory state");
                SaveOutcome::Failed
            }
        }
    }

    /// Erase the durable cart.
    pub fn clear(&mut self) {
        self.discard_key();
    }

    /// Serialize, pre-truncating to the newest `truncate_keep` items when
    /// the full payload is over the size limit.
    fn encode_fitting(&self, items: &[CartItem]) -> Result<(String, usize), serde_json::Error> {
        let full = payload::encode(items)?;
        if full.len() <= self.config.max_payload_bytes {
            return Ok((full, items.len()));
        }
        let kept = items.len().min(self.config.truncate_keep);
        let truncated = payload::encode(newest(items, kept))?;
        Ok((truncated, kept))
    }

    /// Quota ladder, tier two: keep only the newest `minimal_keep` items;
    /// tier three: erase the key entirely.
    fn save_minimal(&mut self, items: &[CartItem]) -> SaveOutcome {
        let kept = items.len().min(self.config.minimal_keep);
        warn!(kept, total = items.len(), "storage quota exceeded, retrying with newest items");

        let encoded = match payload::encode(newest(items, kept)) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, "could not serialize minimal cart payload");
                self.discard_key();
                return SaveOutcome::Reset;
            }
        };
        match self.storage.set(&self.config.storage_key, &encoded) {
            Ok(()) if kept == items.len() => SaveOutcome::Saved,
            Ok(()) => SaveOutcome::SavedTruncated { kept },
            Err(e) => {
                error!(error = %e, "minimal cart save failed, erasing durable cart");
                self.discard_key();
                SaveOutcome::Reset
            }
        }
    }

    fn cleanup(&mut self) {
        let legacy = self.config.legacy_keys.clone();
        for key in &legacy {
            if let Err(e) = self.storage.remove(key) {
                debug!(key, error = %e, "could not remove legacy cart key");
            }
        }

        match self.usage_bytes() {
            Ok(usage) if usage > self.config.high_water_bytes => {
                warn!(
                    usage,
                    limit = self.config.high_water_bytes,
                    "storage over high-water mark, purging foreign keys"
                );
                self.purge_foreign_keys();
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not measure storage usage"),
        }
    }

    fn usage_bytes(&self) -> Result<usize, StorageError> {
        let mut total = 0;
        for key in self.storage.keys()? {
            let value_len = self.storage.get(&key)?.map_or(0, |v| v.len());
            total += key.len() + value_len;
        }
        Ok(total)
    }

    fn purge_foreign_keys(&mut self) {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "could not enumerate storage keys");
                return;
            }
        };
        for key in keys {
            if key != self.config.storage_key
                && let Err(e) = self.storage.remove(&key)
            {
                warn!(key, error = %e, "could not purge storage key");
            }
        }
    }

    fn discard_key(&mut self) {
        if let Err(e) = self.storage.remove(&self.config.storage_key) {
            warn!(error = %e, "could not remove cart key");
        }
    }
}

/// Newest `n` items by insertion order (the tail of the sequence).
fn newest(items: &[CartItem], n: usize) -> &[CartItem] {
    let start = items.len().saturating_sub(n);
    items.get(start..).unwrap_or_default()
}
