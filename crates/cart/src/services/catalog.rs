//! Catalog lookups: the read-only product source.

use warung_core::{CatalogProduct, ProductId};

/// Read-only access to the product catalog.
///
/// Consulted when a product is added (to take the snapshot) and again
/// during an explicit stock refresh. The cart never writes back; stock is
/// decremented by order fulfillment elsewhere, not by carting.
pub trait Catalog {
    /// The product with the given id, if the catalog knows it.
    fn product(&self, id: &ProductId) -> Option<CatalogProduct>;
}

/// A fixed, in-memory catalog.
///
/// Backs the CLI (products loaded from a JSON file) and tests. A real
/// storefront wires its own product source behind [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<CatalogProduct>,
}

impl StaticCatalog {
    /// Build from a product list.
    #[must_use]
    pub const fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    /// All products, in listing order.
    #[must_use]
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }
}

impl Catalog for StaticCatalog {
    fn product(&self, id: &ProductId) -> Option<CatalogProduct> {
        self.products.iter().find(|p| &p.id == id).cloned()
    }
}
