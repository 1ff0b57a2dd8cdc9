//! Checkout handoff: the deterministic order text and the deep link that
//! carries it to the order channel.
//!
//! There is no payment or order API behind this cart. Checkout renders the
//! item sequence as a human-readable message and wraps it in a `wa.me`
//! link; a person on the other end reads the text and completes the sale.
//! The message grammar is stable on purpose: the receiving side knows it
//! by shape.

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use warung_core::CartItem;

use crate::services::PriceFormatter;

/// Errors building a checkout handoff.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requires at least one item.
    #[error("cannot check out an empty cart")]
    EmptyCart,
    /// No destination is configured for the order channel.
    #[error("no order destination configured")]
    MissingDestination,
    /// The assembled deep link did not parse as a URL.
    #[error("invalid handoff link: {0}")]
    InvalidLink(#[from] url::ParseError),
}

/// Render the order message for a cart snapshot.
///
/// One block per item in display order (name, quantity, effective unit
/// price, line subtotal), blocks separated by blank lines, closed by a
/// bold grand total. Deterministic for a given snapshot; the price
/// formatter is the only collaborator.
#[must_use]
pub fn order_message(items: &[CartItem], prices: &dyn PriceFormatter) -> String {
    let total: Decimal = items.iter().map(CartItem::line_total).sum();
    let grand_total = format!("*Total: {}*", prices.format(total));

    if items.is_empty() {
        return grand_total;
    }

    let blocks: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "• {}\n  Qty: {}\n  Harga: {}\n  Subtotal: {}",
                item.name,
                item.quantity,
                prices.format(item.effective_unit_price()),
                prices.format(item.line_total()),
            )
        })
        .collect();

    format!("{}\n\n{grand_total}", blocks.join("\n\n"))
}

/// Build the deep link that hands the order text to the messaging
/// channel.
///
/// The destination is reduced to its digits, so human notations like
/// `+62 812-3456-7890` work as configured. The message is URL-encoded
/// into the `text` query parameter.
///
/// # Errors
///
/// [`CheckoutError::MissingDestination`] when no digits remain after
/// stripping; [`CheckoutError::InvalidLink`] when the assembled link does
/// not parse.
pub fn handoff_url(destination: &str, message: &str) -> Result<Url, CheckoutError> {
    let digits: String = destination.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(CheckoutError::MissingDestination);
    }
    let link = format!("https://wa.me/{digits}?text={}", urlencoding::encode(message));
    Ok(Url::parse(&link)?)
}
