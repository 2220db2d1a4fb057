//! Order list reconciliation against the in-memory backend

use order_desk::{OrderListReconciler, ReconcileError};
use rust_decimal::Decimal;
use sales_client::mock::{Endpoint, MockBackend};
use sales_client::{HttpClient, Role, Session};
use shared::OrderStatus;
use std::sync::Arc;

/// Backend holding orders 1..=8, all pending, and a logged-in client
fn setup() -> (Arc<MockBackend>, OrderListReconciler) {
    let backend = Arc::new(MockBackend::new().with_user("vishal", "secret", Role::SalesPerson));
    for i in 1..=8 {
        backend.seed_order(&format!("Customer {i}"), OrderStatus::Pending, Decimal::from(1000));
    }
    let session = Session::shared();
    session.set_tokens(backend.issue_tokens());
    let http = HttpClient::new(backend.clone(), session);
    (backend, OrderListReconciler::new(http))
}

#[tokio::test]
async fn test_status_change_is_seen_through_refetch() {
    let (backend, mut reconciler) = setup();
    reconciler.refresh().await.unwrap();
    assert_eq!(reconciler.find(7).unwrap().order_status, OrderStatus::Pending);

    reconciler.change_status(7, OrderStatus::Shipped).await.unwrap();

    assert_eq!(backend.calls(Endpoint::UpdateStatus), 1);
    assert_eq!(backend.calls(Endpoint::ListOrders), 2);
    assert_eq!(reconciler.find(7).unwrap().order_status, OrderStatus::Shipped);

    let listed = reconciler.list().await.unwrap();
    let seven = listed.iter().find(|o| o.id == 7).unwrap();
    assert_eq!(seven.order_status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_refetch_picks_up_remote_changes() {
    let (backend, mut reconciler) = setup();
    reconciler.refresh().await.unwrap();

    // another user edits order 2 while we change order 7
    backend.set_order_status(2, OrderStatus::Delivered);
    reconciler.change_status(7, OrderStatus::Processing).await.unwrap();

    assert_eq!(reconciler.find(2).unwrap().order_status, OrderStatus::Delivered);
    assert_eq!(reconciler.find(7).unwrap().order_status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_failed_update_still_refetches() {
    let (backend, mut reconciler) = setup();
    reconciler.refresh().await.unwrap();
    backend.fail(Endpoint::UpdateStatus);
    backend.set_order_status(3, OrderStatus::Cancelled);

    let result = reconciler.change_status(7, OrderStatus::Shipped).await;

    assert!(matches!(
        result,
        Err(ReconcileError::UpdateFailed { order_id: 7, .. })
    ));
    assert_eq!(backend.calls(Endpoint::ListOrders), 2);
    assert_eq!(reconciler.find(7).unwrap().order_status, OrderStatus::Pending);
    assert_eq!(reconciler.find(3).unwrap().order_status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_delete_then_refetch() {
    let (backend, mut reconciler) = setup();
    reconciler.refresh().await.unwrap();

    reconciler.delete(4).await.unwrap();

    assert_eq!(backend.calls(Endpoint::DeleteOrder), 1);
    assert_eq!(reconciler.orders().len(), 7);
    assert!(reconciler.find(4).is_none());
}

#[tokio::test]
async fn test_delete_missing_order_fails_and_refetches() {
    let (backend, mut reconciler) = setup();

    let result = reconciler.delete(99).await;

    assert!(matches!(
        result,
        Err(ReconcileError::DeleteFailed { order_id: 99, .. })
    ));
    assert_eq!(backend.calls(Endpoint::ListOrders), 1);
    assert_eq!(reconciler.orders().len(), 8);
}

#[tokio::test]
async fn test_fetch_failure_keeps_previous_list() {
    let (backend, mut reconciler) = setup();
    reconciler.refresh().await.unwrap();
    backend.fail(Endpoint::ListOrders);

    let result = reconciler.refresh().await;

    assert!(matches!(result, Err(ReconcileError::FetchFailed(_))));
    assert_eq!(reconciler.orders().len(), 8);

    backend.recover(Endpoint::ListOrders);
    assert_eq!(reconciler.refresh().await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_successful_update_with_failed_refetch_reports_fetch() {
    let (backend, mut reconciler) = setup();
    reconciler.refresh().await.unwrap();
    backend.fail(Endpoint::ListOrders);

    let result = reconciler.change_status(1, OrderStatus::Shipped).await;

    assert!(matches!(result, Err(ReconcileError::FetchFailed(_))));
    // cache is stale until the next successful fetch, never patched locally
    assert_eq!(reconciler.find(1).unwrap().order_status, OrderStatus::Pending);
    assert_eq!(
        backend.orders().iter().find(|o| o.id == 1).unwrap().order_status,
        OrderStatus::Shipped
    );
}

#[tokio::test]
async fn test_expired_session_sends_user_to_login() {
    let (backend, mut reconciler) = setup();
    backend.expire_access_tokens();
    backend.revoke_refresh_tokens();

    let result = reconciler.change_status(1, OrderStatus::Shipped).await;

    assert!(matches!(result, Err(ReconcileError::Unauthenticated)));
    assert_eq!(backend.calls(Endpoint::Refresh), 1);
    assert_eq!(backend.calls(Endpoint::ListOrders), 0);
}

#[tokio::test]
async fn test_transitions_filters_and_stats() {
    let (backend, mut reconciler) = setup();
    backend.set_order_status(1, OrderStatus::Cancelled);
    backend.set_order_status(2, OrderStatus::Delivered);
    reconciler.refresh().await.unwrap();

    let cancelled = reconciler.find(1).unwrap();
    assert!(OrderListReconciler::available_transitions(cancelled).is_empty());
    let delivered = reconciler.find(2).unwrap();
    assert_eq!(
        OrderListReconciler::available_transitions(delivered),
        &[
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled
        ]
    );

    let pending = reconciler.filter_by_status(&[OrderStatus::Pending]);
    assert_eq!(pending.len(), 6);
    let closed = reconciler.filter_by_status(&[OrderStatus::Delivered, OrderStatus::Cancelled]);
    assert_eq!(closed.len(), 2);

    let stats = reconciler.stats();
    assert_eq!(stats.total_orders, 8);
    assert_eq!(stats.count(OrderStatus::Pending), 6);
    assert_eq!(stats.revenue, Decimal::from(7000));
    assert_eq!(stats.average_order_value, Decimal::from(1000));
}

#[tokio::test]
async fn test_search_by_customer_name() {
    let (backend, mut reconciler) = setup();
    let sita = backend.seed_order("Sita Sharma", OrderStatus::Pending, Decimal::from(500));
    let ram = backend.seed_order("Ram SHARMA", OrderStatus::Delivered, Decimal::from(700));
    reconciler.refresh().await.unwrap();

    let ids = |orders: Vec<&shared::Order>| {
        let mut ids: Vec<_> = orders.iter().map(|o| o.id).collect();
        ids.sort();
        ids
    };

    assert_eq!(ids(reconciler.search("sharma")), vec![sita, ram]);
    assert_eq!(ids(reconciler.search("  SITA ")), vec![sita]);
    assert!(reconciler.search("Gita").is_empty());
    assert_eq!(reconciler.search("").len(), 10);

    // composes with the status filter
    assert_eq!(
        ids(reconciler.select("sharma", &[OrderStatus::Delivered])),
        vec![ram]
    );
    assert_eq!(reconciler.select("customer", &[OrderStatus::Pending]).len(), 8);
    assert!(reconciler.select("sita", &[OrderStatus::Cancelled]).is_empty());
}
