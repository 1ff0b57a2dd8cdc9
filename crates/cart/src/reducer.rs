//! The pure cart reducer.
//!
//! [`reduce`] is a total function from `(state, action)` to the next
//! state: no I/O, no panics, no error channel. Every quantity-affecting
//! arm clamps against the per-entry stock ceiling captured at add time, so
//! the invariants (`1 <= quantity <= stock`, unique ids, insertion order)
//! hold after every transition regardless of what the consumer throws at
//! it. Actions that cannot apply (unknown id, zero-stock product) leave
//! the state unchanged rather than failing.

use warung_core::{CartItem, CatalogProduct, ProductId, bounded_name};

use crate::action::CartAction;
use crate::state::CartState;

/// Apply one action to the cart and return the next state.
#[must_use]
pub fn reduce(state: CartState, action: CartAction) -> CartState {
    match action {
        CartAction::AddItem(product) => add_item(state, &product),
        CartAction::RemoveItem(id) => remove_item(state, &id),
        CartAction::UpdateQuantity { id, quantity } => update_quantity(state, &id, quantity),
        CartAction::ClearCart => CartState {
            items: Vec::new(),
            ..state
        },
        CartAction::ToggleCart => CartState {
            is_open: !state.is_open,
            ..state
        },
        CartAction::OpenCart => CartState {
            is_open: true,
            ..state
        },
        CartAction::CloseCart => CartState {
            is_open: false,
            ..state
        },
        CartAction::LoadCart(items) => load_cart(state, items),
    }
}

fn add_item(mut state: CartState, product: &CatalogProduct) -> CartState {
    if let Some(existing) = state.items.iter_mut().find(|item| item.id == product.id) {
        // Repeat add: bump the quantity, capped at the ceiling captured
        // when the entry was created. Visibility stays as it was.
        existing.quantity = existing.quantity.saturating_add(1).min(existing.stock);
        return state;
    }
    if product.stock == 0 {
        // Nothing can be held, so no entry and no overlay open.
        return state;
    }
    state.items.push(CartItem::from_product(product, 1));
    // Only the first add of a product opens the overlay.
    state.is_open = true;
    state
}

fn remove_item(mut state: CartState, id: &ProductId) -> CartState {
    state.items.retain(|item| &item.id != id);
    state
}

fn update_quantity(mut state: CartState, id: &ProductId, quantity: i64) -> CartState {
    if quantity <= 0 {
        return remove_item(state, id);
    }
    let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
    if let Some(item) = state.items.iter_mut().find(|item| &item.id == id) {
        item.quantity = requested.min(item.stock);
    }
    state
}

fn load_cart(mut state: CartState, items: Vec<CartItem>) -> CartState {
    let mut accepted: Vec<CartItem> = Vec::with_capacity(items.len());
    for mut item in items {
        if accepted.iter().any(|kept| kept.id == item.id) {
            // First occurrence wins; ids stay unique.
            continue;
        }
        let clamped = item.quantity.min(item.stock);
        if clamped == 0 {
            // Zero quantity or zero stock cannot satisfy the invariant.
            continue;
        }
        item.quantity = clamped;
        item.name = bounded_name(&item.name);
        accepted.push(item);
    }
    state.items = accepted;
    state
}
