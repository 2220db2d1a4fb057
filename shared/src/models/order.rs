//! Order Model

use super::product::{Product, ProductId};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Remote order identifier
pub type OrderId = i64;

/// Order status (owned by the backend, transitions requested by the client)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "Prepaid")]
    Prepaid,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [Self::CashOnDelivery, Self::Prepaid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Prepaid => "Prepaid",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product line of a remote order, with the product as it was when ordered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRecord {
    pub id: i64,
    pub product: Product,
    pub quantity: u32,
    pub discount: Decimal,
    /// Server-computed line total
    #[serde(rename = "get_total_price")]
    pub line_total: Decimal,
}

/// Order entity (remote record, read by the order list)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub distributor: Option<i64>,
    #[serde(default)]
    pub sales_person: Option<i64>,
    pub full_name: String,
    pub city: String,
    pub delivery_address: String,
    #[serde(default)]
    pub landmark: Option<String>,
    pub phone_number: String,
    #[serde(default)]
    pub alternate_phone_number: Option<String>,
    pub delivery_charge: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default, rename = "payment_screenshot")]
    pub payment_screenshot_url: Option<String>,
    pub order_status: OrderStatus,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default, rename = "order_products")]
    pub order_lines: Vec<OrderLineRecord>,
}

/// Product line of a create-order request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub discount: Decimal,
}

/// Create order payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderPayload {
    pub full_name: String,
    pub city: String,
    pub delivery_address: String,
    pub landmark: String,
    pub phone_number: String,
    pub alternate_phone_number: String,
    pub delivery_charge: Decimal,
    pub payment_method: PaymentMethod,
    /// Screenshot as a `data:<mime>;base64,...` URL
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_screenshot: Option<String>,
    pub remarks: String,
    pub order_products: Vec<CreateOrderLine>,
}

/// Response of the create-order call (extra fields ignored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
}

/// Status update payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub order_status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "id": 43,
        "distributor": 1,
        "sales_person": 3,
        "full_name": "Sita Sharma",
        "city": "Pokhara",
        "delivery_address": "Lakeside Road 6",
        "landmark": "",
        "phone_number": "9866316114",
        "alternate_phone_number": null,
        "delivery_charge": "100.00",
        "payment_method": "Cash on Delivery",
        "payment_screenshot": null,
        "order_status": "Shipped",
        "created_at": "2024-12-01T10:15:30.123456+05:45",
        "updated_at": "2024-12-02T08:00:00Z",
        "total_amount": 2590.0,
        "remarks": "",
        "order_products": [
            {
                "id": 7,
                "product": {"id": 1, "name": "Dandruff Oil Bottle", "price": "2500.00", "description": ""},
                "quantity": 1,
                "discount": "10.00",
                "get_total_price": 2490.0
            }
        ]
    }"#;

    #[test]
    fn test_order_from_backend_json() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.id, 43);
        assert_eq!(order.order_status, OrderStatus::Shipped);
        assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(order.total_amount, Decimal::from(2590));
        assert_eq!(order.delivery_charge, Decimal::from(100));
        assert_eq!(order.order_lines.len(), 1);
        assert_eq!(order.order_lines[0].line_total, Decimal::from(2490));
        assert!(order.alternate_phone_number.is_none());
    }

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"Cash on Delivery\""
        );
        let update = StatusUpdate {
            order_status: OrderStatus::Cancelled,
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"order_status":"Cancelled"}"#
        );
    }

    #[test]
    fn test_payload_omits_missing_screenshot() {
        let payload = CreateOrderPayload {
            full_name: "Sita".into(),
            city: "Pokhara".into(),
            delivery_address: "Lakeside".into(),
            landmark: String::new(),
            phone_number: "9866316114".into(),
            alternate_phone_number: String::new(),
            delivery_charge: Decimal::ZERO,
            payment_method: PaymentMethod::Prepaid,
            payment_screenshot: None,
            remarks: String::new(),
            order_products: vec![CreateOrderLine {
                product_id: 1,
                quantity: 2,
                discount: Decimal::from(5),
            }],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("payment_screenshot").is_none());
        assert_eq!(value["order_products"][0]["product_id"], 1);
        assert_eq!(value["payment_method"], "Prepaid");
    }
}
