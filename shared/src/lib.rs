//! Shared types for the sales order desk
//!
//! Wire models used by both the HTTP client and the order engine:
//! catalog products, remote orders, the create-order payload and
//! the auth/profile DTOs.

pub mod client;
pub mod models;

// Re-exports
pub use models::{
    CreateOrderLine, CreateOrderPayload, CreatedOrder, Order, OrderId, OrderLineRecord,
    OrderStatus, PaymentMethod, Product, ProductId, StatusUpdate,
};
pub use serde::{Deserialize, Serialize};
