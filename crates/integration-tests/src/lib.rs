//! Integration tests for the Warung cart engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p warung-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - action dispatch, stock clamping and restart durability
//! - `cart_persistence` - envelope format, legacy upgrade, startup cleanup
//! - `quota_degrade` - the save ladder under size and quota pressure
//! - `checkout_handoff` - order message grammar and the WhatsApp deep link
//!
//! This library holds the shared fixtures: catalog product builders, a
//! storage backend with scriptable write failures, and session
//! constructors. The tests themselves live under `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cell::Cell;
use std::rc::Rc;

use rust_decimal::Decimal;

use warung_cart::services::{BufferNotifier, NullNotifier, StaticCatalog};
use warung_cart::storage::{MemoryBackend, StorageBackend, StorageError};
use warung_cart::{CartConfig, CartSession, CartState};
use warung_core::{CatalogProduct, ProductId};

/// A catalog product with the given price and stock.
#[must_use]
pub fn product(id: &str, price: i64, stock: u32) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        slug: id.to_owned(),
        price: Decimal::from(price),
        price_after_discount: None,
        image: String::new(),
        stock,
    }
}

/// A product currently on discount.
#[must_use]
pub fn discounted(id: &str, price: i64, discounted_price: i64, stock: u32) -> CatalogProduct {
    CatalogProduct {
        price_after_discount: Some(Decimal::from(discounted_price)),
        ..product(id, price, stock)
    }
}

/// A product whose serialized form is dominated by `image_bytes` of image
/// URL, for exercising size-based truncation.
#[must_use]
pub fn bulky(id: &str, image_bytes: usize, stock: u32) -> CatalogProduct {
    CatalogProduct {
        image: "x".repeat(image_bytes),
        ..product(id, 10_000, stock)
    }
}

/// A session over `backend` with an empty catalog, default configuration
/// and no notice capture.
#[must_use]
pub fn restore_session<S: StorageBackend>(backend: S) -> CartSession<S> {
    CartSession::restore(
        CartConfig::default(),
        backend,
        Box::new(StaticCatalog::default()),
        Box::new(NullNotifier),
    )
}

/// A session whose notices are captured for inspection.
#[must_use]
pub fn observed_session<S: StorageBackend>(
    config: CartConfig,
    backend: S,
) -> (CartSession<S>, Rc<BufferNotifier>) {
    let notifier = Rc::new(BufferNotifier::new());
    let session = CartSession::restore(
        config,
        backend,
        Box::new(StaticCatalog::default()),
        Box::new(Rc::clone(&notifier)),
    );
    (session, notifier)
}

/// The item ids currently in the cart, in order.
#[must_use]
pub fn item_ids(state: &CartState) -> Vec<&str> {
    state.items().iter().map(|item| item.id.as_str()).collect()
}

/// The raw payload stored under `key`, if any.
///
/// # Panics
///
/// Panics if the backend read itself fails.
#[must_use]
pub fn stored_payload<S: StorageBackend>(backend: &S, key: &str) -> Option<String> {
    backend.get(key).expect("storage read failed")
}

/// How [`FaultyBackend`] treats the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultMode {
    /// Writes pass through.
    #[default]
    None,
    /// The next write reports a full store, then writes pass again.
    QuotaOnce,
    /// Every write reports a full store.
    Quota,
    /// Every write fails with a plain I/O error.
    Io,
}

/// In-memory backend with scriptable write failures.
///
/// Reads, removals and key listing always pass through, so discard and
/// cleanup paths behave exactly as they would on a healthy store.
pub struct FaultyBackend {
    inner: MemoryBackend,
    mode: Rc<Cell<FaultMode>>,
}

impl FaultyBackend {
    /// A healthy backend plus the handle that scripts its failures.
    #[must_use]
    pub fn new() -> (Self, Rc<Cell<FaultMode>>) {
        let mode = Rc::new(Cell::new(FaultMode::None));
        let backend = Self {
            inner: MemoryBackend::new(),
            mode: Rc::clone(&mode),
        };
        (backend, mode)
    }
}

impl StorageBackend for FaultyBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self.mode.get() {
            FaultMode::None => self.inner.set(key, value),
            FaultMode::QuotaOnce => {
                self.mode.set(FaultMode::None);
                Err(StorageError::QuotaExceeded {
                    requested: key.len() + value.len(),
                    quota: 0,
                })
            }
            FaultMode::Quota => Err(StorageError::QuotaExceeded {
                requested: key.len() + value.len(),
                quota: 0,
            }),
            FaultMode::Io => Err(StorageError::Io(std::io::Error::other(
                "injected write failure",
            ))),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }
}
