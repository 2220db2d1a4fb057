//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product identifier
pub type ProductId = i64;

/// Product entity (read-only, owned by the catalog service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in currency unit (backend sends "2500.00")
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub description: String,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_price_from_string() {
        let json = r#"{"id":1,"name":"Dandruff Oil Bottle","price":"2500.00","description":""}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.unit_price, Decimal::new(250000, 2));
    }

    #[test]
    fn test_product_price_from_number_without_description() {
        let json = r#"{"id":2,"name":"Shampoo","price":450.5}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.unit_price, Decimal::new(4505, 1));
        assert!(product.description.is_empty());
    }
}
