//! Durable cart payload: a versioned envelope with a legacy upgrade path.
//!
//! Version 1 wraps the item array as `{"version": 1, "items": [...]}`. The
//! first cart release wrote a bare JSON array with no version field; those
//! payloads are still accepted and upgraded on read. Envelopes from
//! writers this crate does not know are rejected so a newer payload is
//! discarded instead of misread.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warung_core::{CartItem, ProductId};

/// Envelope version written by this crate.
pub(crate) const PAYLOAD_VERSION: u32 = 1;

/// Why a stored payload could not be used.
#[derive(Debug, Error)]
pub(crate) enum PayloadError {
    /// Not valid JSON, or JSON of a shape no known writer produces.
    #[error("malformed cart payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A versioned envelope from a writer this crate does not understand.
    #[error("unsupported cart payload version {0}")]
    UnsupportedVersion(u32),
}

/// One item as it sits in durable storage.
///
/// Field names mirror the wire shape (`camelCase`). Unknown fields are
/// ignored and absent ones default, so payloads from older writers load as
/// far as their content allows: a missing quantity becomes 1 and a missing
/// stock ceiling falls back to the stored quantity. Prices deserialize
/// from both the decimal strings this crate writes and the bare numbers
/// the legacy writer used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCartItem {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price_after_discount: Option<Decimal>,
    #[serde(default)]
    image: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(default)]
    stock: Option<u32>,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    items: Vec<StoredCartItem>,
}

/// Either shape found in storage.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredPayload {
    Envelope(Envelope),
    /// The unversioned array written before the envelope existed.
    Legacy(Vec<StoredCartItem>),
}

impl From<&CartItem> for StoredCartItem {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_str().to_owned(),
            name: item.name.clone(),
            slug: item.slug.clone(),
            price: item.price,
            price_after_discount: item.price_after_discount,
            image: item.image.clone(),
            quantity: item.quantity,
            stock: Some(item.stock),
        }
    }
}

impl From<StoredCartItem> for CartItem {
    fn from(stored: StoredCartItem) -> Self {
        // A payload without a stock ceiling keeps its items: the ceiling
        // falls back to the stored quantity, leaving the invariant
        // satisfiable until a refresh supplies a real value.
        let stock = stored.stock.unwrap_or(stored.quantity);
        Self {
            id: ProductId::new(stored.id),
            name: stored.name,
            slug: stored.slug,
            price: stored.price,
            price_after_discount: stored.price_after_discount,
            image: stored.image,
            quantity: stored.quantity,
            stock,
        }
    }
}

/// Serialize `items` as the current envelope.
pub(crate) fn encode(items: &[CartItem]) -> Result<String, serde_json::Error> {
    let envelope = Envelope {
        version: PAYLOAD_VERSION,
        items: items.iter().map(StoredCartItem::from).collect(),
    };
    serde_json::to_string(&envelope)
}

/// Parse a raw payload, branching on shape and version.
pub(crate) fn decode(raw: &str) -> Result<Vec<CartItem>, PayloadError> {
    match serde_json::from_str::<StoredPayload>(raw)? {
        StoredPayload::Envelope(envelope) => {
            if envelope.version != PAYLOAD_VERSION {
                return Err(PayloadError::UnsupportedVersion(envelope.version));
            }
            Ok(envelope.items.into_iter().map(CartItem::from).collect())
        }
        StoredPayload::Legacy(items) => {
            tracing::debug!(count = items.len(), "upgrading legacy cart payload");
            Ok(items.into_iter().map(CartItem::from).collect())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use warung_core::CatalogProduct;

    use super::*;

    fn item(id: &str, price: i64, quantity: u32, stock: u32) -> CartItem {
        let product = CatalogProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: id.to_owned(),
            price: Decimal::from(price),
            price_after_discount: None,
            image: format!("/img/{id}.webp"),
            stock,
        };
        CartItem::from_product(&product, quantity)
    }

    #[test]
    fn test_encode_writes_a_version_one_envelope() {
        let encoded = encode(&[item("a", 50_000, 2, 5)]).unwrap();
        assert!(encoded.starts_with("{\"version\":1,\"items\":["));
        // Wire names are camelCase and prices are decimal strings.
        assert!(encoded.contains("\"price\":\"50000\""));
        assert!(encoded.contains("\"quantity\":2"));
        assert!(encoded.contains("\"stock\":5"));
    }

    #[test]
    fn test_encode_omits_absent_discounts() {
        let encoded = encode(&[item("a", 1000, 1, 5)]).unwrap();
        assert!(!encoded.contains("priceAfterDiscount"));
    }

    #[test]
    fn test_decode_round_trips_the_envelope() {
        let items = vec![item("a", 50_000, 2, 5), item("b", 1000, 1, 9)];
        let decoded = decode(&encode(&items).unwrap()).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_decode_accepts_the_legacy_bare_array() {
        // The legacy writer stored bare numbers for prices and no version.
        let raw = r#"[
            {"id":"a","name":"A","slug":"a","price":150000,"quantity":2,"stock":4},
            {"id":"b","name":"B","slug":"b","price":9000.5,"priceAfterDiscount":8000,"quantity":1,"stock":2}
        ]"#;
        let decoded = decode(raw).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].price, Decimal::from(150_000));
        assert_eq!(decoded[1].price_after_discount, Some(Decimal::from(8000)));
    }

    #[test]
    fn test_decode_defaults_missing_quantity_to_one() {
        let raw = r#"[{"id":"a","price":1000,"stock":7}]"#;
        let decoded = decode(raw).unwrap();
        assert_eq!(decoded[0].quantity, 1);
        assert_eq!(decoded[0].stock, 7);
    }

    #[test]
    fn test_decode_defaults_missing_stock_to_the_quantity() {
        let raw = r#"[{"id":"a","price":1000,"quantity":3}]"#;
        let decoded = decode(raw).unwrap();
        assert_eq!(decoded[0].quantity, 3);
        assert_eq!(decoded[0].stock, 3, "ceiling must fall back to quantity");
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let raw = r#"{"version":1,"items":[{"id":"a","price":1000,"quantity":1,"stock":2,"addedAt":"2024-01-01"}]}"#;
        let decoded = decode(raw).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_decode_rejects_unknown_envelope_versions() {
        let raw = r#"{"version":2,"items":[{"id":"a","price":1000,"quantity":1,"stock":2}]}"#;
        match decode(raw) {
            Err(PayloadError::UnsupportedVersion(2)) => {}
            other => panic!("expected UnsupportedVersion(2), got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("not json"), Err(PayloadError::Malformed(_))));
        assert!(matches!(decode("42"), Err(PayloadError::Malformed(_))));
        assert!(matches!(
            decode(r#"{"hello":"world"}"#),
            Err(PayloadError::Malformed(_))
        ));
    }
}
