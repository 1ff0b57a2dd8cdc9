//! Catalog product snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A product as the catalog describes it at one point in time.
///
/// Adding a product to the cart copies these fields into the cart entry;
/// the cart does not observe later catalog edits unless a stock refresh is
/// explicitly requested. Wire names are `camelCase` to match the catalog
/// JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// Catalog identity.
    pub id: ProductId,
    /// Display name shown in the cart and in the order message.
    pub name: String,
    /// Navigation reference (product page path segment).
    pub slug: String,
    /// Unit price.
    pub price: Decimal,
    /// Discounted unit price, when a promotion is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_after_discount: Option<Decimal>,
    /// Primary image reference.
    #[serde(default)]
    pub image: String,
    /// Units available at snapshot time; becomes the cart's quantity
    /// ceiling for this product.
    pub stock: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new("kopi-gayo"),
            name: "Kopi Gayo 250g".to_owned(),
            slug: "kopi-gayo".to_owned(),
            price: Decimal::from(85_000),
            price_after_discount: Some(Decimal::from(75_000)),
            image: "/img/kopi-gayo.webp".to_owned(),
            stock: 12,
        }
    }

    #[test]
    fn test_catalog_product_uses_camel_case_wire_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"priceAfterDiscount\""));
        assert!(!json.contains("price_after_discount"));
    }

    #[test]
    fn test_catalog_product_discount_field_is_optional() {
        let raw = r#"{
            "id": "teh-melati",
            "name": "Teh Melati",
            "slug": "teh-melati",
            "price": "20000",
            "stock": 3
        }"#;
        let product: CatalogProduct = serde_json::from_str(raw).unwrap();
        assert_eq!(product.price_after_discount, None);
        assert_eq!(product.image, "");
        assert_eq!(product.stock, 3);
    }

    #[test]
    fn test_catalog_product_price_accepts_bare_numbers() {
        let raw = r#"{"id":"a","name":"A","slug":"a","price":15000,"stock":1}"#;
        let product: CatalogProduct = serde_json::from_str(raw).unwrap();
        assert_eq!(product.price, Decimal::from(15_000));
    }
}
