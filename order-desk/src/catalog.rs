//! Catalog snapshot
//!
//! Immutable point-in-time copy of the purchasable products. Loaded fresh
//! each time an order-creation session starts and shared with the draft
//! that prices against it.

use crate::error::CatalogError;
use crate::pricing;
use crate::route::Route;
use rust_decimal::Decimal;
use sales_client::{HttpClient, endpoints};
use shared::{Product, ProductId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogSnapshot {
    products: Vec<Product>,
}

impl CatalogSnapshot {
    /// Builds a snapshot, keeping the first product for any repeated id
    ///
    /// Products priced outside `[0, MAX_AMOUNT]` are not purchasable and
    /// are left out.
    pub fn new(products: Vec<Product>) -> Self {
        let mut unique: Vec<Product> = Vec::with_capacity(products.len());
        for product in products {
            if !pricing::amount_in_range(product.unit_price) {
                tracing::warn!(
                    product_id = product.id,
                    price = %product.unit_price,
                    "Product price out of range, ignoring"
                );
                continue;
            }
            if unique.iter().any(|p| p.id == product.id) {
                tracing::warn!(product_id = product.id, "Duplicate product in catalog, ignoring");
                continue;
            }
            unique.push(product);
        }
        Self { products: unique }
    }

    /// Fetches the catalog; no partial snapshot is ever returned
    pub async fn load(http: &HttpClient) -> Result<Self, CatalogError> {
        match http.get::<Vec<Product>>(endpoints::PRODUCTS).await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Catalog loaded");
                Ok(Self::new(products))
            }
            Err(e) if e.is_auth_failure() => {
                http.session().remember_destination(Route::CreateOrder.path());
                Err(CatalogError::Unauthenticated)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog load failed");
                Err(CatalogError::Unavailable(e))
            }
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn unit_price(&self, id: ProductId) -> Option<Decimal> {
        self.get(id).map(|p| p.unit_price)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
