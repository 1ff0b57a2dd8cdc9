//! Cart state: ordered items, overlay visibility, derived totals.

use rust_decimal::Decimal;
use warung_core::{CartItem, ProductId};

/// Derived cart totals.
///
/// Always computed from the item sequence on demand; nothing caches them,
/// so they cannot drift from the items they summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of all quantities.
    pub items: u32,
    /// Sum of line totals, honoring discounted prices where present.
    pub price: Decimal,
}

/// The cart: an insertion-ordered item sequence plus overlay visibility.
///
/// State only changes through [`crate::reduce`]; consumers read it through
/// the accessors here. Display order is insertion order, and ids are
/// unique within the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub(crate) items: Vec<CartItem>,
    pub(crate) is_open: bool,
}

impl CartState {
    /// Items in display (insertion) order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart overlay is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Total unit count across all items.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Total price across all items, honoring discounts.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Both totals as one snapshot.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            items: self.total_items(),
            price: self.total_price(),
        }
    }
}
