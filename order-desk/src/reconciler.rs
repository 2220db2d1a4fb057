//! Order list reconciler
//!
//! Holds the last successfully fetched order list. Status changes and
//! deletes are sent to the backend and always followed by a full refetch,
//! whether or not they succeeded; the cached list is never patched in
//! place. A failed fetch leaves the previous list untouched.

use crate::error::ReconcileError;
use crate::route::Route;
use crate::stats::OrderStats;
use sales_client::{ClientError, HttpClient, endpoints};
use shared::{Order, OrderId, OrderStatus, StatusUpdate};

/// Transitions offered for any order that is not cancelled
const OPEN_TRANSITIONS: [OrderStatus; 4] = [
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
];

#[derive(Debug, Clone)]
pub struct OrderListReconciler {
    http: HttpClient,
    orders: Vec<Order>,
}

impl OrderListReconciler {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            orders: Vec::new(),
        }
    }

    /// Last successfully fetched list
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Fetches the remote list without touching the cache
    pub async fn list(&self) -> Result<Vec<Order>, ReconcileError> {
        self.http
            .get::<Vec<Order>>(endpoints::ORDERS)
            .await
            .map_err(|e| self.fail(e, ReconcileError::FetchFailed))
    }

    /// Refetches and replaces the cached list
    pub async fn refresh(&mut self) -> Result<&[Order], ReconcileError> {
        match self.list().await {
            Ok(orders) => {
                tracing::debug!(count = orders.len(), "Order list refreshed");
                self.orders = orders;
                Ok(&self.orders)
            }
            Err(e) => {
                tracing::warn!(error = %e, cached = self.orders.len(), "Keeping previous order list");
                Err(e)
            }
        }
    }

    /// Requests a status change, then refetches
    ///
    /// A failed update is reported even if the refetch succeeds.
    pub async fn change_status(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ReconcileError> {
        let update = StatusUpdate {
            order_status: status,
        };
        let result = self
            .http
            .patch::<serde_json::Value, _>(&endpoints::order(order_id), &update)
            .await
            .map(|_| ())
            .map_err(|e| {
                self.fail(e, |source| ReconcileError::UpdateFailed { order_id, source })
            });

        match &result {
            Ok(()) => {
                tracing::info!(order_id, status = %status, "Order status updated");
                self.audit("update_status", order_id);
            }
            Err(e) => tracing::warn!(order_id, error = %e, "Order status update failed"),
        }
        self.after_mutation(result).await
    }

    /// Deletes an order, then refetches
    pub async fn delete(&mut self, order_id: OrderId) -> Result<(), ReconcileError> {
        let result = self
            .http
            .delete(&endpoints::order(order_id))
            .await
            .map_err(|e| {
                self.fail(e, |source| ReconcileError::DeleteFailed { order_id, source })
            });

        match &result {
            Ok(()) => {
                tracing::info!(order_id, "Order deleted");
                self.audit("delete", order_id);
            }
            Err(e) => tracing::warn!(order_id, error = %e, "Order delete failed"),
        }
        self.after_mutation(result).await
    }

    /// Refetch that follows every mutation; the mutation's own error wins
    async fn after_mutation(
        &mut self,
        mutation: Result<(), ReconcileError>,
    ) -> Result<(), ReconcileError> {
        if matches!(mutation, Err(ReconcileError::Unauthenticated)) {
            return mutation;
        }
        let refreshed = self.refresh().await.map(|_| ());
        mutation.and(refreshed)
    }

    /// Maps an auth failure to `Unauthenticated`, anything else through `wrap`
    fn fail(
        &self,
        error: ClientError,
        wrap: impl FnOnce(ClientError) -> ReconcileError,
    ) -> ReconcileError {
        if error.is_auth_failure() {
            self.http
                .session()
                .remember_destination(Route::OrderList.path());
            ReconcileError::Unauthenticated
        } else {
            wrap(error)
        }
    }

    fn audit(&self, action: &str, order_id: OrderId) {
        if let Some(user) = self.http.session().user() {
            tracing::info!(
                target: "audit",
                user = %user.username,
                action,
                resource = %format!("order:{order_id}")
            );
        }
    }

    /// Status actions offered for an order; none once it is cancelled
    pub fn available_transitions(order: &Order) -> &'static [OrderStatus] {
        if order.order_status == OrderStatus::Cancelled {
            &[]
        } else {
            &OPEN_TRANSITIONS
        }
    }

    /// Cached orders whose status is one of `statuses`
    pub fn filter_by_status(&self, statuses: &[OrderStatus]) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| statuses.contains(&o.order_status))
            .collect()
    }

    /// Cached orders whose customer name contains `query`, ignoring case
    ///
    /// A blank query matches every order.
    pub fn search(&self, query: &str) -> Vec<&Order> {
        self.select(query, &[])
    }

    /// Name search and status filter combined; an empty `statuses` slice
    /// accepts every status
    pub fn select(&self, query: &str, statuses: &[OrderStatus]) -> Vec<&Order> {
        let needle = query.trim().to_lowercase();
        self.orders
            .iter()
            .filter(|o| statuses.is_empty() || statuses.contains(&o.order_status))
            .filter(|o| needle.is_empty() || o.full_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn find(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn stats(&self) -> OrderStats {
        OrderStats::from_orders(&self.orders)
    }
}
