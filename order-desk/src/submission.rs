//! Order submission
//!
//! Turns a reviewed draft into the create-order payload and sends it
//! exactly once. There is no automatic retry; a failed submission leaves
//! the draft untouched for the user to send again. While a submission is
//! in flight, further submits of the same draft are refused.

use crate::draft::{OrderDraft, Step};
use crate::error::SubmitError;
use crate::route::Route;
use crate::validator;
use sales_client::{HttpClient, endpoints};
use shared::{CreateOrderLine, CreateOrderPayload, CreatedOrder, OrderId};
use std::sync::atomic::{AtomicBool, Ordering};

/// Marks a draft as submitting until dropped
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Create-order payload for a draft
///
/// Only lines with a positive quantity are sent.
pub fn build_payload(draft: &OrderDraft) -> CreateOrderPayload {
    let customer = draft.customer();
    let order_products = draft
        .selected_lines()
        .map(|line| CreateOrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
            discount: line.discount,
        })
        .collect();

    CreateOrderPayload {
        full_name: customer.full_name.trim().to_string(),
        city: customer.city.trim().to_string(),
        delivery_address: customer.delivery_address.trim().to_string(),
        landmark: customer.landmark.trim().to_string(),
        phone_number: customer.phone_number.trim().to_string(),
        alternate_phone_number: customer.alternate_phone_number.trim().to_string(),
        delivery_charge: draft.delivery_charge(),
        payment_method: draft.payment_method(),
        payment_screenshot: draft.attachment().map(|a| a.data_url()),
        remarks: draft.remarks().to_string(),
        order_products,
    }
}

/// Submits a draft from the review step
///
/// Checks run in order: review step, full validation, nothing already in
/// flight. Then a single create request is sent. On success the caller
/// discards the draft and opens [`Route::OrderList`].
pub async fn submit(draft: &OrderDraft, http: &HttpClient) -> Result<OrderId, SubmitError> {
    if draft.step() != Step::Review {
        return Err(SubmitError::NotOnReviewStep(draft.step()));
    }
    validator::validate_all(draft).map_err(SubmitError::Invalid)?;

    let Some(_guard) = InFlightGuard::acquire(draft.submitting_flag()) else {
        tracing::debug!("Submit ignored, order already in flight");
        return Err(SubmitError::InFlight);
    };

    let payload = build_payload(draft);
    let lines = payload.order_products.len();
    match http.post::<CreatedOrder, _>(endpoints::ORDERS, &payload).await {
        Ok(created) => {
            let total = draft.totals().grand_total;
            tracing::info!(order_id = created.id, lines, total = %total, "Order created");
            if let Some(user) = http.session().user() {
                tracing::info!(
                    target: "audit",
                    user = %user.username,
                    action = "create",
                    resource = %format!("order:{}", created.id)
                );
            }
            Ok(created.id)
        }
        Err(e) if e.is_auth_failure() => {
            tracing::warn!(error = %e, "Order submission needs login");
            http.session().remember_destination(Route::CreateOrder.path());
            Err(SubmitError::Unauthenticated)
        }
        Err(e) => {
            tracing::warn!(error = %e, lines, "Order submission failed");
            Err(SubmitError::Failed(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;
    use crate::draft::CustomerInfo;
    use rust_decimal::Decimal;
    use shared::{PaymentMethod, Product};
    use std::sync::Arc;

    fn draft() -> OrderDraft {
        let catalog = CatalogSnapshot::new(vec![
            Product::new(1, "Oil", Decimal::from(2500)),
            Product::new(2, "Shampoo", Decimal::from(450)),
            Product::new(3, "Comb", Decimal::from(50)),
        ]);
        let mut draft = OrderDraft::new(Arc::new(catalog));
        draft.set_customer(CustomerInfo {
            full_name: " Sita Sharma ".into(),
            city: "Pokhara".into(),
            delivery_address: "Lakeside Road 6".into(),
            phone_number: "9866316114".into(),
            ..Default::default()
        });
        draft
    }

    #[test]
    fn test_payload_keeps_only_selected_lines() {
        let mut draft = draft();
        draft.set_quantity(2, 3).unwrap();
        draft.set_discount(2, Decimal::from(50)).unwrap();
        draft.set_quantity(3, 1).unwrap();
        draft.set_quantity(3, 0).unwrap();
        draft.set_delivery_charge(Decimal::from(100));
        draft.set_payment_method(PaymentMethod::Prepaid);

        let payload = build_payload(&draft);

        assert_eq!(payload.full_name, "Sita Sharma");
        assert_eq!(
            payload.order_products,
            vec![CreateOrderLine {
                product_id: 2,
                quantity: 3,
                discount: Decimal::from(50),
            }]
        );
        assert_eq!(payload.payment_method, PaymentMethod::Prepaid);
        assert!(payload.payment_screenshot.is_none());
        assert_eq!(payload.landmark, "");
    }

    #[test]
    fn test_guard_is_exclusive_and_released() {
        let flag = AtomicBool::new(false);
        {
            let _first = InFlightGuard::acquire(&flag).unwrap();
            assert!(InFlightGuard::acquire(&flag).is_none());
        }
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
