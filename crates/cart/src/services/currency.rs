//! Price formatting seam.
//!
//! Currency symbols, separators, and locale rules live outside the cart;
//! the engine only ever asks for "this amount, as text".

use rust_decimal::Decimal;

/// Renders an amount for human eyes (`"Rp150.000"`, `"150000"`, ...).
pub trait PriceFormatter {
    /// Format one amount.
    fn format(&self, amount: Decimal) -> String;
}

/// Any `Fn(Decimal) -> String` is a formatter, so tests and small
/// embedders can pass a closure or a plain function.
impl<F> PriceFormatter for F
where
    F: Fn(Decimal) -> String,
{
    fn format(&self, amount: Decimal) -> String {
        self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closures_are_formatters() {
        let plain = |amount: Decimal| amount.to_string();
        let formatter: &dyn PriceFormatter = &plain;
        assert_eq!(formatter.format(Decimal::from(150_000)), "150000");
    }
}
