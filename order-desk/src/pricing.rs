//! Price calculation using rust_decimal
//!
//! Pure functions over draft lines and the catalog snapshot. Nothing here
//! is cached: totals are recomputed from the current lines on every read,
//! so repeated calls with unchanged inputs return identical values.
//!
//! - `line_subtotal = unit_price * quantity`
//! - `line_total = max(0, line_subtotal - discount)`, or zero when `quantity == 0`
//! - `products_total = Σ line_total`
//! - `grand_total = products_total + delivery_charge`
//!
//! Inputs are bounded before they get here: catalog prices and delivery
//! charges by [`MAX_AMOUNT`], quantities by [`MAX_QUANTITY`]. Arithmetic
//! still saturates so out-of-range data can never panic.

use crate::catalog::CatalogSnapshot;
use crate::draft::OrderLine;
use rust_decimal::prelude::*;
use serde::Serialize;
use shared::ProductId;

/// Rounding for monetary values (2 decimal places, half away from zero)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum unit price or delivery charge (1,000,000)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum quantity per line
pub const MAX_QUANTITY: u32 = 9999;

/// True for a non-negative amount no larger than [`MAX_AMOUNT`]
pub fn amount_in_range(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= MAX_AMOUNT
}

#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price * quantity`
pub fn line_subtotal(unit_price: Decimal, quantity: u32) -> Decimal {
    round_money(unit_price.saturating_mul(Decimal::from(quantity)))
}

/// Amount a line contributes to the order
///
/// A zero-quantity line contributes nothing whatever discount it still
/// holds; a discount larger than the subtotal floors the line at zero.
pub fn line_total(unit_price: Decimal, quantity: u32, discount: Decimal) -> Decimal {
    if quantity == 0 {
        return Decimal::ZERO;
    }
    line_subtotal(unit_price, quantity)
        .saturating_sub(round_money(discount))
        .max(Decimal::ZERO)
}

/// Derived totals of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DraftTotals {
    pub products_total: Decimal,
    pub delivery_charge: Decimal,
    pub grand_total: Decimal,
}

/// Per-line figures for the review step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineBreakdown {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

fn unit_price(catalog: &CatalogSnapshot, product_id: ProductId) -> Decimal {
    catalog.unit_price(product_id).unwrap_or_default()
}

/// Totals for a set of lines priced against `catalog`
pub fn calculate_totals(
    lines: &[OrderLine],
    catalog: &CatalogSnapshot,
    delivery_charge: Decimal,
) -> DraftTotals {
    let products_total = lines
        .iter()
        .map(|line| line_total(unit_price(catalog, line.product_id), line.quantity, line.discount))
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let delivery_charge = round_money(delivery_charge);

    DraftTotals {
        products_total,
        delivery_charge,
        grand_total: products_total.saturating_add(delivery_charge),
    }
}

/// Breakdown of every line with a positive quantity, in catalog order
pub fn breakdown(lines: &[OrderLine], catalog: &CatalogSnapshot) -> Vec<LineBreakdown> {
    lines
        .iter()
        .filter(|line| line.quantity > 0)
        .filter_map(|line| {
            let product = catalog.get(line.product_id)?;
            Some(LineBreakdown {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.unit_price,
                quantity: line.quantity,
                subtotal: line_subtotal(product.unit_price, line.quantity),
                discount: round_money(line.discount),
                total: line_total(product.unit_price, line.quantity, line.discount),
            })
        })
        .collect()
}
