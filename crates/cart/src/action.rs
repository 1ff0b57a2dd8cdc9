//! Cart actions: the closed set of transitions the reducer understands.

use warung_core::{CartItem, CatalogProduct, ProductId};

/// A transition request against the cart.
///
/// Actions are plain data; applying one is the job of [`crate::reduce`].
/// The set is closed on purpose: every consumer goes through these
/// variants, so the reducer can uphold the cart invariants in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Put one unit of a product in the cart.
    ///
    /// A product already present has its quantity incremented (clamped to
    /// that entry's stock ceiling) without touching visibility; a new
    /// product is appended with quantity 1 and opens the overlay. A
    /// product with zero stock is ignored entirely.
    AddItem(CatalogProduct),
    /// Delete the entry with the given id. Unknown ids are a no-op.
    RemoveItem(ProductId),
    /// Set an entry's quantity. Zero or negative behaves as removal;
    /// anything above the entry's stock ceiling is clamped down to it;
    /// unknown ids are a no-op.
    UpdateQuantity {
        /// Which entry to change.
        id: ProductId,
        /// Requested quantity. Signed so "decrement below zero" flows
        /// arrive here unclamped and become removals.
        quantity: i64,
    },
    /// Empty the item sequence. Visibility is untouched.
    ClearCart,
    /// Flip the cart overlay between open and closed.
    ToggleCart,
    /// Open the cart overlay.
    OpenCart,
    /// Close the cart overlay.
    CloseCart,
    /// Wholesale-replace the item sequence.
    ///
    /// Used by the persistence layer at startup and after a forced
    /// truncation. Incoming items are normalized (quantity clamped, names
    /// bounded, duplicate ids dropped), so even a payload written by an
    /// older or buggy writer cannot break the invariants.
    LoadCart(Vec<CartItem>),
}

impl CartAction {
    /// Whether applying this action can change the item sequence, and must
    /// therefore be followed by a durable save.
    #[must_use]
    pub const fn affects_items(&self) -> bool {
        match self {
            Self::AddItem(_)
            | Self::RemoveItem(_)
            | Self::UpdateQuantity { .. }
            | Self::ClearCart
            | Self::LoadCart(_) => true,
            Self::ToggleCart | Self::OpenCart | Self::CloseCart => false,
        }
    }
}
