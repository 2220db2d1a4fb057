//! Order desk error types
//!
//! Validation errors stay inside the draft; every network failure carries
//! the [`ClientError`] that caused it. Any auth failure is folded into an
//! `Unauthenticated` variant so callers can hand control back to login.

use crate::draft::Step;
use crate::validator::Field;
use sales_client::ClientError;
use shared::{OrderId, ProductId};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Catalog load failure; fatal to the order-creation flow
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(#[source] ClientError),

    #[error("Session expired, please login again")]
    Unauthenticated,
}

/// Local draft mutation failure
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Product {0} is not in the catalog")]
    UnknownProduct(ProductId),

    #[error("Quantity {quantity} for product {product_id} exceeds maximum allowed ({max})")]
    QuantityTooLarge {
        product_id: ProductId,
        quantity: u32,
        max: u32,
    },

    #[error("Payment attachment error: {0}")]
    Attachment(String),
}

/// Every violated rule of a step or a whole draft, keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation; the first message per field wins
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.errors {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Submission failure; the draft is kept so the user can retry
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Orders can only be submitted from the review step (currently on {0})")]
    NotOnReviewStep(Step),

    #[error("Order is invalid: {0}")]
    Invalid(ValidationErrors),

    #[error("A submission for this order is already in flight")]
    InFlight,

    #[error("Session expired, please login again")]
    Unauthenticated,

    #[error("Failed to submit order: {0}")]
    Failed(#[source] ClientError),
}

/// Order list failure; the last good list stays visible
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to fetch orders: {0}")]
    FetchFailed(#[source] ClientError),

    #[error("Failed to update order {order_id}: {source}")]
    UpdateFailed {
        order_id: OrderId,
        #[source]
        source: ClientError,
    },

    #[error("Failed to delete order {order_id}: {source}")]
    DeleteFailed {
        order_id: OrderId,
        #[source]
        source: ClientError,
    },

    #[error("Session expired, please login again")]
    Unauthenticated,
}

/// Any order desk failure
#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl DeskError {
    /// True when the caller must stop and send the user to login
    pub fn requires_login(&self) -> bool {
        match self {
            Self::Catalog(CatalogError::Unauthenticated)
            | Self::Submit(SubmitError::Unauthenticated)
            | Self::Reconcile(ReconcileError::Unauthenticated) => true,
            Self::Client(e) => e.is_auth_failure(),
            _ => false,
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::OrderProducts, "At least one product must be selected");
        errors.add(Field::OrderProducts, "Discount cannot exceed the subtotal amount");
        errors.add(Field::City, "City is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get(Field::OrderProducts),
            Some("At least one product must be selected")
        );
        assert_eq!(
            errors.to_string(),
            "city: City is required; order_products: At least one product must be selected"
        );
    }

    #[test]
    fn test_requires_login() {
        assert!(DeskError::from(SubmitError::Unauthenticated).requires_login());
        assert!(DeskError::from(ClientError::Unauthorized).requires_login());
        assert!(!DeskError::from(SubmitError::InFlight).requires_login());
        assert!(!DeskError::from(ReconcileError::FetchFailed(ClientError::NotFound("x".into())))
            .requires_login());
    }

    #[test]
    fn test_empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
