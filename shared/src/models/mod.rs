//! Data models
//!
//! Shared between sales-client and order-desk (via the remote API).
//! All IDs are `i64`; all money values are `rust_decimal::Decimal`.

pub mod order;
pub mod product;

// Re-exports
pub use order::*;
pub use product::*;
