//! Engine configuration: persistence limits, stock refresh policy, and the
//! checkout destination.
//!
//! Configuration is plain data handed to [`crate::CartSession`] at
//! construction time. Nothing here reads the environment; the embedding
//! application (see the CLI crate) decides where values come from.

use std::str::FromStr;

use thiserror::Error;

const MIB: usize = 1024 * 1024;

/// How the cart treats each item's stock ceiling after add time.
///
/// The ceiling is always captured when an item is first added. Whether it
/// is ever re-read from the catalog afterwards is an explicit choice; the
/// default keeps the add-time ceiling for the life of the entry, which
/// tolerates an unreachable catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockRefreshPolicy {
    /// Keep the add-time ceiling until the entry is removed.
    #[default]
    Never,
    /// Re-read stock from the catalog whenever the cart overlay opens.
    OnOpen,
    /// Re-read stock from the catalog right before checkout handoff.
    OnCheckout,
}

/// Error parsing a [`StockRefreshPolicy`] from text.
#[derive(Debug, Error)]
#[error("unknown stock refresh policy {0:?} (expected never, on-open, or on-checkout)")]
pub struct ParsePolicyError(String);

impl FromStr for StockRefreshPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "on-open" => Ok(Self::OnOpen),
            "on-checkout" => Ok(Self::OnCheckout),
            other => Err(ParsePolicyError(other.to_owned())),
        }
    }
}

/// Size and key limits for the durable cart store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// The one logical key the cart payload lives under.
    pub storage_key: String,
    /// Keys written by earlier cart versions, removed during startup
    /// cleanup.
    pub legacy_keys: Vec<String>,
    /// Aggregate stored-bytes high-water mark. When total usage exceeds
    /// it at startup, every key except [`storage_key`](Self::storage_key)
    /// is purged.
    pub high_water_bytes: usize,
    /// Serialized payloads larger than this are truncated before the
    /// write is even attempted.
    pub max_payload_bytes: usize,
    /// Newest items kept when a payload is truncated for size.
    pub truncate_keep: usize,
    /// Newest items kept by the minimal retry after a quota-exceeded
    /// write.
    pub minimal_keep: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            storage_key: "warung.cart.v1".to_owned(),
            legacy_keys: vec!["warung.cart".to_owned(), "cart".to_owned()],
            high_water_bytes: 3 * MIB,
            max_payload_bytes: 4 * MIB,
            truncate_keep: 30,
            minimal_keep: 5,
        }
    }
}

/// Checkout handoff configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Destination for the order channel: a WhatsApp number in any human
    /// notation. Non-digits are stripped when the deep link is built, and
    /// an empty value makes checkout fail with a clear error.
    pub destination: String,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartConfig {
    /// Durable store limits.
    pub persistence: PersistenceConfig,
    /// When stock ceilings are re-read from the catalog.
    pub stock_refresh: StockRefreshPolicy,
    /// Order channel settings.
    pub checkout: CheckoutConfig,
}
