//! API paths, relative to [`ClientConfig::base_url`](crate::ClientConfig)

use shared::OrderId;

pub const LOGIN: &str = "account/login/";
pub const REFRESH: &str = "account/auth/refresh/";
pub const PROFILE: &str = "account/profile/";

pub const PRODUCTS: &str = "sales/products";
pub const ORDERS: &str = "sales/orders/";

/// Single order resource (PATCH / DELETE)
pub fn order(id: OrderId) -> String {
    format!("sales/orders/{id}/")
}
