//! The cart session: an explicit store object plus the persistence
//! observer.
//!
//! A session owns the state, the persistence adapter, and the collaborator
//! handles. It is constructed once at the application root and passed
//! where needed; there is no module-level singleton. Dispatch applies the
//! pure reducer first, then, when the item sequence may have changed,
//! saves as a trailing effect and branches on the [`SaveOutcome`]:
//! reconciling forced truncations, resetting after unrecoverable failures,
//! and raising user notices. In-memory state is updated before any I/O and
//! a failed write never rolls it back.

use tracing::debug;
use url::Url;

use warung_core::CartItem;

use crate::action::CartAction;
use crate::checkout::{self, CheckoutError};
use crate::config::{CartConfig, StockRefreshPolicy};
use crate::persistence::{CartPersistence, SaveOutcome};
use crate::reducer::reduce;
use crate::services::{Catalog, Notice, Notifier, PriceFormatter};
use crate::state::CartState;
use crate::storage::StorageBackend;

/// Everything the consumer needs to finish an order by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutHandoff {
    /// The human-readable order text.
    pub message: String,
    /// Deep link carrying the text to the order channel.
    pub url: Url,
}

/// One consumer's cart: state, durability, and collaborators in one
/// place.
pub struct CartSession<S> {
    state: CartState,
    persistence: CartPersistence<S>,
    catalog: Box<dyn Catalog>,
    notifier: Box<dyn Notifier>,
    config: CartConfig,
}

impl<S: StorageBackend> CartSession<S> {
    /// Restore a session from durable storage.
    ///
    /// Runs the startup cleanup, loads whatever survives, and pushes it
    /// through the reducer's load normalization, so the invariants hold
    /// even for payloads written by older versions. A fresh consumer
    /// starts with an empty, closed cart.
    #[must_use]
    pub fn restore(
        config: CartConfig,
        storage: S,
        catalog: Box<dyn Catalog>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let mut persistence = CartPersistence::new(storage, config.persistence.clone());
        let items = persistence.initialize();
        let state = reduce(CartState::default(), CartAction::LoadCart(items));
        debug!(items = state.items().len(), "cart session restored");
        Self {
            state,
            persistence,
            catalog,
            notifier,
            config,
        }
    }

    /// Current state. Read-only; mutate through
    /// [`dispatch`](Self::dispatch).
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// The persistence adapter (read access for diagnostics and tests).
    #[must_use]
    pub const fn persistence(&self) -> &CartPersistence<S> {
        &self.persistence
    }

    /// Apply one action.
    ///
    /// The reducer runs first. If the action can change the item
    /// sequence, the new sequence is saved as a trailing effect and the
    /// session branches on the outcome. Returns that outcome, or `None`
    /// when the action only touched visibility and no save was attempted.
    pub fn dispatch(&mut self, action: CartAction) -> Option<SaveOutcome> {
        let affects_items = action.affects_items();
        let was_open = self.state.is_open();
        self.apply(action);

        let outcome = if affects_items {
            Some(self.save_and_reconcile())
        } else {
            None
        };

        // The on-open policy fires on the closed-to-open edge, wherever
        // it came from (explicit open, toggle, or a first add).
        if self.config.stock_refresh == StockRefreshPolicy::OnOpen
            && !was_open
            && self.state.is_open()
        {
            self.refresh_stock();
        }

        outcome
    }

    /// Re-read stock ceilings from the catalog and re-clamp the cart.
    ///
    /// A product the catalog no longer knows keeps its frozen ceiling; a
    /// refreshed stock of zero removes the entry. Changes flow through
    /// the normal dispatch path so they persist like any other item
    /// change. Called automatically per [`StockRefreshPolicy`], or by the
    /// embedder whenever it has reason to believe stock moved.
    pub fn refresh_stock(&mut self) {
        let refreshed: Vec<CartItem> = self
            .state
            .items()
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Some(product) = self.catalog.product(&item.id) {
                    item.stock = product.stock;
                }
                item
            })
            .collect();
        if refreshed.as_slice() != self.state.items() {
            debug!("stock refresh changed ceilings, reloading cart");
            self.dispatch(CartAction::LoadCart(refreshed));
        }
    }

    /// Produce the checkout handoff and clear the cart.
    ///
    /// With [`StockRefreshPolicy::OnCheckout`], ceilings are refreshed
    /// first so the message reflects what can actually be fulfilled.
    /// Opening the returned link is the consumer's job; by the time this
    /// returns, the cart (and its durable copy) is already empty. On any
    /// error the cart is left untouched.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] when there is nothing to order;
    /// destination and link errors from the handoff builder.
    pub fn checkout(
        &mut self,
        prices: &dyn PriceFormatter,
    ) -> Result<CheckoutHandoff, CheckoutError> {
        if self.config.stock_refresh == StockRefreshPolicy::OnCheckout {
            self.refresh_stock();
        }
        if self.state.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let message = checkout::order_message(self.state.items(), prices);
        let url = checkout::handoff_url(&self.config.checkout.destination, &message)?;
        self.dispatch(CartAction::ClearCart);
        Ok(CheckoutHandoff { message, url })
    }

    /// Run the pure reducer with no persistence side effect.
    fn apply(&mut self, action: CartAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    fn save_and_reconcile(&mut self) -> SaveOutcome {
        let outcome = self.persistence.save(self.state.items());
        match outcome {
            SaveOutcome::Saved | SaveOutcome::Failed => {}
            SaveOutcome::SavedTruncated { kept } => {
                self.reconcile_to_newest(kept);
                // The silent size-limit tier keeps more items than the
                // quota tier; only the latter is worth interrupting the
                // user for.
                if kept <= self.config.persistence.minimal_keep {
                    self.notifier.notify(Notice::warning(
                        "Older cart items were dropped to keep your cart saved",
                    ));
                }
            }
            SaveOutcome::Reset => {
                self.apply(CartAction::ClearCart);
                self.notifier.notify(Notice::error(
                    "Your saved cart could not be kept and was reset",
                ));
            }
        }
        outcome
    }

    /// Match the in-memory sequence to the newest `kept` items the
    /// adapter persisted, without triggering another save.
    fn reconcile_to_newest(&mut self, kept: usize) {
        let items = self.state.items();
        let start = items.len().saturating_sub(kept);
        let tail: Vec<CartItem> = items.get(start..).unwrap_or_default().to_vec();
        debug!(kept = tail.len(), "reconciling cart to the persisted tail");
        self.apply(CartAction::LoadCart(tail));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::rc::Rc;

    use rust_decimal::Decimal;

    use warung_core::{CatalogProduct, ProductId};

    use super::*;
    use crate::config::PersistenceConfig;
    use crate::services::{BufferNotifier, NoticeLevel, NullNotifier, StaticCatalog};
    use crate::storage::{MemoryBackend, StorageError};

    fn product(id: &str, price: i64, stock: u32) -> CatalogProduct {
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

    fn session_over(backend: MemoryBackend) -> CartSession<MemoryBackend> {
        CartSession::restore(
            CartConfig::default(),
            backend,
            Box::new(StaticCatalog::default()),
            Box::new(NullNotifier),
        )
    }

    fn stored_ids<S: StorageBackend>(session: &CartSession<S>) -> String {
        session
            .persistence()
            .storage()
            .get("warung.cart.v1")
            .unwrap()
            .unwrap_or_default()
    }

    // ==== Observer behavior ====

    #[test]
    fn test_item_actions_save_and_visibility_actions_do_not() {
        let mut session = session_over(MemoryBackend::new());

        let outcome = session.dispatch(CartAction::AddItem(product("a", 1000, 5)));
        assert_eq!(outcome, Some(SaveOutcome::Saved));
        assert!(stored_ids(&session).contains("\"a\""));

        // A visibility action must leave the durable copy byte-identical.
        let before = stored_ids(&session);
        let outcome = session.dispatch(CartAction::ToggleCart);
        assert_eq!(outcome, None);
        assert_eq!(stored_ids(&session), before);
    }

    #[test]
    fn test_restore_round_trips_through_the_backend() {
        let mut first = session_over(MemoryBackend::new());
        first.dispatch(CartAction::AddItem(product("a", 1000, 5)));
        first.dispatch(CartAction::AddItem(product("a", 1000, 5)));

        // Clone the backend contents into a fresh session, as a restart
        // of the same consumer would see them.
        let backend = first.persistence().storage().clone();
        let second = session_over(backend);
        assert_eq!(second.state().items().len(), 1);
        assert_eq!(second.state().items()[0].quantity, 2);
        assert!(
            !second.state().is_open(),
            "restored carts start with the overlay closed"
        );
    }

    #[test]
    fn test_restore_normalizes_defective_payloads() {
        let mut backend = MemoryBackend::new();
        backend
            .set(
                "warung.cart.v1",
                r#"[{"id":"a","price":1000,"quantity":10,"stock":4},
                    {"id":"b","price":1000,"quantity":2,"stock":0},
                    {"id":"a","price":1000,"quantity":1,"stock":4}]"#,
            )
            .unwrap();

        let session = session_over(backend);
        let items = session.state().items();
        assert_eq!(items.len(), 1, "zero-stock and duplicate entries must drop");
        assert_eq!(items[0].quantity, 4, "quantity must clamp to stock");
    }

    // ==== Degrade ladder through the session ====

    // One bulky item serializes to ~700 bytes, so a 2000-byte payload
    // limit flips from "fits" to "truncate" at the fourth item.
    fn bulky(id: &str, stock: u32) -> CatalogProduct {
        CatalogProduct {
            image: "x".repeat(600),
            ..product(id, 10_000, stock)
        }
    }

    fn degrade_config() -> CartConfig {
        CartConfig {
            persistence: PersistenceConfig {
                max_payload_bytes: 2000,
                truncate_keep: 3,
                minimal_keep: 1,
                ..PersistenceConfig::default()
            },
            ..CartConfig::default()
        }
    }

    #[test]
    fn test_truncated_save_reconciles_the_in_memory_cart() {
        let notifier = Rc::new(BufferNotifier::new());
        let mut session = CartSession::restore(
            degrade_config(),
            MemoryBackend::new(),
            Box::new(StaticCatalog::default()),
            Box::new(Rc::clone(&notifier)),
        );

        for i in 0..8 {
            session.dispatch(CartAction::AddItem(bulky(&format!("p{i}"), 5)));
        }

        let items = session.state().items();
        assert_eq!(items.len(), 3, "in-memory cart must match the durable tail");
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["p5", "p6", "p7"]);
        assert!(
            notifier.is_empty(),
            "the silent size tier must not raise a notice"
        );
    }

    #[test]
    fn test_quota_tier_keeps_minimal_items_and_warns() {
        let notifier = Rc::new(BufferNotifier::new());
        // Two bulky items fit the quota, three do not; the minimal retry
        // (one item) always fits.
        let mut session = CartSession::restore(
            degrade_config(),
            MemoryBackend::with_quota(1500),
            Box::new(StaticCatalog::default()),
            Box::new(Rc::clone(&notifier)),
        );

        session.dispatch(CartAction::AddItem(bulky("p0", 5)));
        session.dispatch(CartAction::AddItem(bulky("p1", 5)));
        assert!(notifier.is_empty());

        let outcome = session.dispatch(CartAction::AddItem(bulky("p2", 5)));
        assert_eq!(outcome, Some(SaveOutcome::SavedTruncated { kept: 1 }));
        assert_eq!(session.state().items().len(), 1);
        assert_eq!(session.state().items()[0].id.as_str(), "p2");

        let notices = notifier.drain();
        assert_eq!(notices.len(), 1, "the quota tier must warn the user");
        assert_eq!(notices[0].level, NoticeLevel::Warning);
    }

    /// Backend whose writes always fail with a quota error.
    struct AlwaysFull(MemoryBackend);

    impl StorageBackend for AlwaysFull {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded { requested: 1, quota: 0 })
        }
        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            self.0.keys()
        }
    }

    #[test]
    fn test_cascading_failure_resets_the_cart_and_raises_an_error() {
        let notifier = Rc::new(BufferNotifier::new());
        let mut session = CartSession::restore(
            CartConfig::default(),
            AlwaysFull(MemoryBackend::new()),
            Box::new(StaticCatalog::default()),
            Box::new(Rc::clone(&notifier)),
        );

        let outcome = session.dispatch(CartAction::AddItem(product("a", 1000, 5)));
        assert_eq!(outcome, Some(SaveOutcome::Reset));
        assert!(session.state().is_empty(), "a reset empties the cart");

        let notices = notifier.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    /// Backend whose writes always fail with a non-quota I/O error.
    struct BrokenDisk(MemoryBackend);

    impl StorageBackend for BrokenDisk {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("no disk")))
        }
        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            self.0.keys()
        }
    }

    #[test]
    fn test_non_quota_failure_keeps_the_in_memory_cart() {
        let mut session = CartSession::restore(
            CartConfig::default(),
            BrokenDisk(MemoryBackend::new()),
            Box::new(StaticCatalog::default()),
            Box::new(NullNotifier),
        );

        let outcome = session.dispatch(CartAction::AddItem(product("a", 1000, 5)));
        assert_eq!(outcome, Some(SaveOutcome::Failed));
        assert_eq!(
            session.state().items().len(),
            1,
            "the session must stay usable when the disk is gone"
        );
    }

    // ==== Stock refresh policies ====

    fn catalog_with(stock: u32) -> StaticCatalog {
        StaticCatalog::new(vec![product("a", 1000, stock)])
    }

    #[test]
    fn test_refresh_clamps_to_the_new_ceiling() {
        let mut session = CartSession::restore(
            CartConfig::default(),
            MemoryBackend::new(),
            Box::new(catalog_with(2)),
            Box::new(NullNotifier),
        );
        session.dispatch(CartAction::AddItem(product("a", 1000, 5)));
        session.dispatch(CartAction::UpdateQuantity {
            id: ProductId::new("a"),
            quantity: 5,
        });
        assert_eq!(session.state().items()[0].quantity, 5);

        session.refresh_stock();
        assert_eq!(session.state().items()[0].quantity, 2);
        assert_eq!(session.state().items()[0].stock, 2);
    }

    #[test]
    fn test_refresh_removes_entries_the_catalog_zeroed() {
        let mut session = CartSession::restore(
            CartConfig::default(),
            MemoryBackend::new(),
            Box::new(catalog_with(0)),
            Box::new(NullNotifier),
        );
        session.dispatch(CartAction::AddItem(product("a", 1000, 5)));

        session.refresh_stock();
        assert!(session.state().is_empty());
    }

    #[test]
    fn test_refresh_keeps_frozen_ceilings_for_unknown_products() {
        let mut session = CartSession::restore(
            CartConfig::default(),
            MemoryBackend::new(),
            Box::new(StaticCatalog::default()),
            Box::new(NullNotifier),
        );
        session.dispatch(CartAction::AddItem(product("a", 1000, 5)));

        session.refresh_stock();
        assert_eq!(session.state().items()[0].stock, 5);
    }

    #[test]
    fn test_on_open_policy_refreshes_when_the_overlay_opens() {
        // A payload from a previous run holds five units; the catalog now
        // only has two.
        let mut backend = MemoryBackend::new();
        backend
            .set(
                "warung.cart.v1",
                r#"{"version":1,"items":[{"id":"a","name":"Product a","slug":"a","price":"1000","quantity":5,"stock":5}]}"#,
            )
            .unwrap();

        let config = CartConfig {
            stock_refresh: StockRefreshPolicy::OnOpen,
            ..CartConfig::default()
        };
        let mut session = CartSession::restore(
            config,
            backend,
            Box::new(catalog_with(2)),
            Box::new(NullNotifier),
        );
        assert_eq!(
            session.state().items()[0].quantity,
            5,
            "restore alone must not refresh"
        );

        session.dispatch(CartAction::OpenCart);
        assert_eq!(
            session.state().items()[0].quantity,
            2,
            "opening the overlay must re-clamp against fresh stock"
        );
        assert!(
            stored_ids(&session).contains("\"quantity\":2"),
            "the re-clamped cart must be persisted"
        );
    }

    // ==== Checkout ====

    fn plain(amount: Decimal) -> String {
        amount.to_string()
    }

    fn checkout_config() -> CartConfig {
        CartConfig {
            checkout: crate::config::CheckoutConfig {
                destination: "+62 812-0000-1111".to_owned(),
            },
            ..CartConfig::default()
        }
    }

    #[test]
    fn test_checkout_produces_handoff_and_clears_everything() {
        let mut session = CartSession::restore(
            checkout_config(),
            MemoryBackend::new(),
            Box::new(StaticCatalog::default()),
            Box::new(NullNotifier),
        );
        session.dispatch(CartAction::AddItem(product("a", 50_000, 5)));
        session.dispatch(CartAction::AddItem(product("a", 50_000, 5)));

        let handoff = session.checkout(&plain).unwrap();
        assert!(handoff.message.contains("Qty: 2"));
        assert!(handoff.message.ends_with("*Total: 100000*"));
        assert!(handoff.url.as_str().starts_with("https://wa.me/6281200001111?text="));

        assert!(session.state().is_empty(), "checkout must clear the cart");
        assert_eq!(
            stored_ids(&session),
            "{\"version\":1,\"items\":[]}",
            "the durable copy must be cleared too"
        );
    }

    #[test]
    fn test_checkout_refuses_an_empty_cart() {
        let mut session = CartSession::restore(
            checkout_config(),
            MemoryBackend::new(),
            Box::new(StaticCatalog::default()),
            Box::new(NullNotifier),
        );
        assert!(matches!(session.checkout(&plain), Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_checkout_with_no_destination_keeps_the_cart() {
        let mut session = session_over(MemoryBackend::new());
        session.dispatch(CartAction::AddItem(product("a", 1000, 5)));

        assert!(matches!(
            session.checkout(&plain),
            Err(CheckoutError::MissingDestination)
        ));
        assert_eq!(session.state().items().len(), 1, "failed checkout must not clear");
    }

    #[test]
    fn test_on_checkout_policy_reflects_fresh_stock_in_the_message() {
        let config = CartConfig {
            stock_refresh: StockRefreshPolicy::OnCheckout,
            ..checkout_config()
        };
        let mut session = CartSession::restore(
            config,
            MemoryBackend::new(),
            Box::new(catalog_with(1)),
            Box::new(NullNotifier),
        );
        session.dispatch(CartAction::AddItem(product("a", 1000, 5)));
        session.dispatch(CartAction::AddItem(product("a", 1000, 5)));

        let handoff = session.checkout(&plain).unwrap();
        assert!(
            handoff.message.contains("Qty: 1"),
            "the message must reflect the refreshed ceiling: {}",
            handoff.message
        );
    }

    #[test]
    fn test_on_checkout_policy_can_empty_the_cart() {
        let config = CartConfig {
            stock_refresh: StockRefreshPolicy::OnCheckout,
            ..checkout_config()
        };
        let mut session = CartSession::restore(
            config,
            MemoryBackend::new(),
            Box::new(catalog_with(0)),
            Box::new(NullNotifier),
        );
        session.dispatch(CartAction::AddItem(product("a", 1000, 5)));

        assert!(matches!(session.checkout(&plain), Err(CheckoutError::EmptyCart)));
    }
}
