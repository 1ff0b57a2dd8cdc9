//! Cart line items.

use rust_decimal::Decimal;

use crate::{CatalogProduct, ProductId};

/// Maximum number of characters kept from a product's display name.
///
/// Names are truncated when the snapshot is taken so a hostile or buggy
/// catalog entry cannot bloat the persisted cart payload.
pub const NAME_MAX_CHARS: usize = 100;

/// One cart entry: a product snapshot plus the selected quantity.
///
/// The cart reducer is the only writer and maintains the invariants
/// `1 <= quantity <= stock` and id uniqueness within a cart. `stock` is the
/// ceiling captured when the item was added (or last refreshed), not a live
/// catalog read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Catalog identity of the snapshotted product.
    pub id: ProductId,
    /// Display name, at most [`NAME_MAX_CHARS`] characters.
    pub name: String,
    /// Navigation reference.
    pub slug: String,
    /// Unit price at snapshot time.
    pub price: Decimal,
    /// Discounted unit price at snapshot time, if any.
    pub price_after_discount: Option<Decimal>,
    /// Primary image reference.
    pub image: String,
    /// Selected quantity.
    pub quantity: u32,
    /// Quantity ceiling for this entry.
    pub stock: u32,
}

impl CartItem {
    /// Snapshot a catalog product into a cart entry with the given
    /// quantity.
    ///
    /// The display name is truncated to [`NAME_MAX_CHARS`] characters. The
    /// quantity is stored as passed; clamping against `stock` is the
    /// reducer's job.
    #[must_use]
    pub fn from_product(product: &CatalogProduct, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: bounded_name(&product.name),
            slug: product.slug.clone(),
            price: product.price,
            price_after_discount: product.price_after_discount,
            image: product.image.clone(),
            quantity,
            stock: product.stock,
        }
    }

    /// The unit price a buyer actually pays: the discounted price when one
    /// is present, the regular price otherwise.
    #[must_use]
    pub fn effective_unit_price(&self) -> Decimal {
        self.price_after_discount.unwrap_or(self.price)
    }

    /// Line subtotal: effective unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_unit_price() * Decimal::from(self.quantity)
    }
}

/// Truncate a display name to [`NAME_MAX_CHARS`] characters.
///
/// Operates on characters, not bytes, so multi-byte names cannot be split
/// mid-codepoint.
#[must_use]
pub fn bounded_name(name: &str) -> String {
    name.chars().take(NAME_MAX_CHARS).collect()
}
