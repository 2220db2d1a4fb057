//! Order list aggregates for the dashboard

use crate::pricing::round_money;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{Order, OrderStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OrderStats {
    pub total_orders: usize,
    pub by_status: BTreeMap<OrderStatus, usize>,
    /// Sum of `total_amount` over orders that are not cancelled
    pub revenue: Decimal,
    /// `revenue` per non-cancelled order; zero when there are none
    pub average_order_value: Decimal,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut by_status: BTreeMap<OrderStatus, usize> =
            OrderStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut revenue = Decimal::ZERO;
        let mut billable = 0usize;

        for order in orders {
            *by_status.entry(order.order_status).or_insert(0) += 1;
            if order.order_status != OrderStatus::Cancelled {
                revenue = revenue.saturating_add(order.total_amount);
                billable += 1;
            }
        }

        let average_order_value = if billable == 0 {
            Decimal::ZERO
        } else {
            round_money(revenue / Decimal::from(billable))
        };

        Self {
            total_orders: orders.len(),
            by_status,
            revenue,
            average_order_value,
        }
    }

    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
