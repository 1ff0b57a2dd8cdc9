//! Warung cart engine.
//!
//! The cart is an in-memory ledger of selected items with three duties:
//!
//! - stay consistent under a closed set of mutation actions
//!   ([`CartAction`], applied by the pure [`reduce`] function);
//! - survive process restarts through a size-bounded key-value store
//!   ([`CartPersistence`] over a [`StorageBackend`]), degrading gracefully
//!   when the store pushes back;
//! - produce a deterministic order message for an external, human-operated
//!   channel ([`checkout`]).
//!
//! [`CartSession`] ties the pieces together: it owns the state, dispatches
//! actions through the reducer, persists every item change as a trailing
//! effect, and surfaces degraded saves through the [`services::Notifier`]
//! seam. Construct one per running consumer and pass it by reference;
//! there is no global cart.
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use warung_cart::services::{NullNotifier, StaticCatalog};
//! use warung_cart::storage::MemoryBackend;
//! use warung_cart::{CartAction, CartConfig, CartSession};
//! use warung_core::{CatalogProduct, ProductId};
//!
//! let product = CatalogProduct {
//!     id: ProductId::new("kopi-gayo"),
//!     name: "Kopi Gayo 250g".to_owned(),
//!     slug: "kopi-gayo".to_owned(),
//!     price: Decimal::from(85_000),
//!     price_after_discount: None,
//!     image: "/img/kopi-gayo.webp".to_owned(),
//!     stock: 12,
//! };
//!
//! let mut session = CartSession::restore(
//!     CartConfig::default(),
//!     MemoryBackend::new(),
//!     Box::new(StaticCatalog::default()),
//!     Box::new(NullNotifier),
//! );
//! session.dispatch(CartAction::AddItem(product));
//! assert_eq!(session.state().total_items(), 1);
//! assert!(session.state().is_open());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod action;
pub mod checkout;
pub mod config;
pub mod persistence;
pub mod reducer;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

pub use action::CartAction;
pub use checkout::CheckoutError;
pub use config::{CartConfig, CheckoutConfig, PersistenceConfig, StockRefreshPolicy};
pub use persistence::{CartPersistence, SaveOutcome};
pub use reducer::reduce;
pub use session::{CartSession, CheckoutHandoff};
pub use state::{CartState, CartTotals};
pub use storage::{StorageBackend, StorageError};
