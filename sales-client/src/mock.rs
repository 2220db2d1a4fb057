//! In-memory backend for tests
//!
//! [`MockBackend`] implements [`Transport`] and simulates the catalog,
//! order and account services: it issues and rotates tokens, prices and
//! stores orders, counts calls per endpoint, and can inject latency,
//! failures and token expiry.

use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::{ClientResult, endpoints};
use async_trait::async_trait;
use chrono::Utc;
use http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use shared::client::{LoginRequest, ProfileUpdate, RefreshRequest, Role, TokenPair, UserProfile};
use shared::{
    CreateOrderPayload, Order, OrderId, OrderLineRecord, OrderStatus, PaymentMethod, Product,
    StatusUpdate,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Endpoints the mock distinguishes, for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Refresh,
    Profile,
    Products,
    ListOrders,
    CreateOrder,
    UpdateStatus,
    DeleteOrder,
}

#[derive(Debug, Default)]
struct MockState {
    username: String,
    password: String,
    profile: Option<UserProfile>,
    products: Vec<Product>,
    orders: BTreeMap<OrderId, Order>,
    next_order_id: OrderId,
    token_counter: u64,
    valid_access: HashSet<String>,
    valid_refresh: HashSet<String>,
    calls: HashMap<Endpoint, usize>,
    failing: HashSet<Endpoint>,
    delays: HashMap<Endpoint, Duration>,
    created_payloads: Vec<CreateOrderPayload>,
}

/// In-memory sales backend
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.lock().next_order_id = 1;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers the single account the backend accepts
    pub fn with_user(self, username: &str, password: &str, role: Role) -> Self {
        {
            let mut state = self.lock();
            state.username = username.to_string();
            state.password = password.to_string();
            state.profile = Some(UserProfile {
                id: 1,
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: format!("{username}@example.com"),
                phone_number: "9800000000".to_string(),
                address: String::new(),
                role,
                is_active: true,
                distributor: Some("Baliyo Ventures".to_string()),
            });
        }
        self
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    /// Inserts an order directly, as if created by another client
    pub fn seed_order(&self, full_name: &str, status: OrderStatus, total: Decimal) -> OrderId {
        let mut state = self.lock();
        let id = state.next_order_id;
        state.next_order_id += 1;
        let now = Utc::now().fixed_offset();
        state.orders.insert(
            id,
            Order {
                id,
                distributor: Some(1),
                sales_person: Some(1),
                full_name: full_name.to_string(),
                city: "Kathmandu".to_string(),
                delivery_address: "New Road".to_string(),
                landmark: None,
                phone_number: "9800000000".to_string(),
                alternate_phone_number: None,
                delivery_charge: Decimal::ZERO,
                payment_method: PaymentMethod::CashOnDelivery,
                payment_screenshot_url: None,
                order_status: status,
                created_at: now,
                updated_at: now,
                total_amount: total,
                remarks: None,
                order_lines: Vec::new(),
            },
        );
        id
    }

    /// Changes an order behind the client's back
    pub fn set_order_status(&self, id: OrderId, status: OrderStatus) {
        if let Some(order) = self.lock().orders.get_mut(&id) {
            order.order_status = status;
            order.updated_at = Utc::now().fixed_offset();
        }
    }

    /// Issues a valid token pair without a login round-trip
    pub fn issue_tokens(&self) -> TokenPair {
        Self::mint(&mut self.lock())
    }

    /// Invalidates every access token; refresh tokens stay valid
    pub fn expire_access_tokens(&self) {
        self.lock().valid_access.clear();
    }

    /// Invalidates every refresh token
    pub fn revoke_refresh_tokens(&self) {
        self.lock().valid_refresh.clear();
    }

    /// Makes an endpoint answer 500 until [`recover`](Self::recover)
    pub fn fail(&self, endpoint: Endpoint) {
        self.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failing.remove(&endpoint);
    }

    /// Delays every response of an endpoint
    pub fn set_delay(&self, endpoint: Endpoint, delay: Duration) {
        self.lock().delays.insert(endpoint, delay);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    pub fn created_payloads(&self) -> Vec<CreateOrderPayload> {
        self.lock().created_payloads.clone()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.values().cloned().collect()
    }

    fn mint(state: &mut MockState) -> TokenPair {
        state.token_counter += 1;
        let tokens = TokenPair {
            access: format!("access-{}", state.token_counter),
            refresh: format!("refresh-{}", state.token_counter),
        };
        state.valid_access.insert(tokens.access.clone());
        state.valid_refresh.insert(tokens.refresh.clone());
        tokens
    }

    fn classify(method: &Method, path: &str) -> Option<(Endpoint, Option<OrderId>)> {
        let path = path.trim_start_matches('/');
        let order_id = path
            .strip_prefix("sales/orders/")
            .and_then(|rest| rest.trim_end_matches('/').parse::<OrderId>().ok());

        let endpoint = match path {
            endpoints::LOGIN if *method == Method::POST => Endpoint::Login,
            endpoints::REFRESH if *method == Method::POST => Endpoint::Refresh,
            endpoints::PROFILE if *method == Method::GET || *method == Method::PATCH => {
                Endpoint::Profile
            }
            endpoints::PRODUCTS if *method == Method::GET => Endpoint::Products,
            endpoints::ORDERS if *method == Method::GET => Endpoint::ListOrders,
            endpoints::ORDERS if *method == Method::POST => Endpoint::CreateOrder,
            _ if order_id.is_some() && *method == Method::PATCH => Endpoint::UpdateStatus,
            _ if order_id.is_some() && *method == Method::DELETE => Endpoint::DeleteOrder,
            _ => return None,
        };
        Some((endpoint, order_id))
    }

    fn handle(
        &self,
        endpoint: Endpoint,
        order_id: Option<OrderId>,
        request: &TransportRequest,
    ) -> TransportResponse {
        let mut state = self.lock();

        if state.failing.contains(&endpoint) {
            return TransportResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"detail": "Simulated failure"}),
            );
        }

        let authorized = request
            .bearer
            .as_ref()
            .is_some_and(|t| state.valid_access.contains(t));
        if !matches!(endpoint, Endpoint::Login | Endpoint::Refresh) && !authorized {
            return unauthorized();
        }

        let body = request.body.clone().unwrap_or(serde_json::Value::Null);
        match endpoint {
            Endpoint::Login => {
                let Ok(login) = serde_json::from_value::<LoginRequest>(body) else {
                    return bad_request("Malformed login request");
                };
                if state.profile.is_none()
                    || login.username != state.username
                    || login.password != state.password
                {
                    return unauthorized();
                }
                let tokens = Self::mint(&mut state);
                ok(StatusCode::OK, &tokens)
            }
            Endpoint::Refresh => {
                let Ok(refresh) = serde_json::from_value::<RefreshRequest>(body) else {
                    return bad_request("Malformed refresh request");
                };
                if !state.valid_refresh.remove(&refresh.refresh) {
                    return unauthorized();
                }
                let tokens = Self::mint(&mut state);
                ok(StatusCode::OK, &tokens)
            }
            Endpoint::Profile if request.method == Method::PATCH => {
                let Ok(update) = serde_json::from_value::<ProfileUpdate>(body) else {
                    return bad_request("Malformed profile update");
                };
                let Some(profile) = state.profile.as_mut() else {
                    return not_found();
                };
                if let Some(v) = update.first_name {
                    profile.first_name = v;
                }
                if let Some(v) = update.last_name {
                    profile.last_name = v;
                }
                if let Some(v) = update.email {
                    profile.email = v;
                }
                if let Some(v) = update.phone_number {
                    profile.phone_number = v;
                }
                if let Some(v) = update.address {
                    profile.address = v;
                }
                ok(StatusCode::OK, &*profile)
            }
            Endpoint::Profile => match &state.profile {
                Some(profile) => ok(StatusCode::OK, profile),
                None => not_found(),
            },
            Endpoint::Products => ok(StatusCode::OK, &state.products),
            Endpoint::ListOrders => {
                let orders: Vec<&Order> = state.orders.values().rev().collect();
                ok(StatusCode::OK, &orders)
            }
            Endpoint::CreateOrder => {
                let Ok(payload) = serde_json::from_value::<CreateOrderPayload>(body) else {
                    return bad_request("Malformed order");
                };
                match Self::create_order(&mut state, payload) {
                    Ok(order) => ok(StatusCode::CREATED, &order),
                    Err(message) => bad_request(&message),
                }
            }
            Endpoint::UpdateStatus => {
                let Ok(update) = serde_json::from_value::<StatusUpdate>(body) else {
                    return bad_request("Malformed status update");
                };
                let Some(id) = order_id else {
                    return not_found();
                };
                let Some(order) = state.orders.get_mut(&id) else {
                    return not_found();
                };
                order.order_status = update.order_status;
                order.updated_at = Utc::now().fixed_offset();
                ok(StatusCode::OK, &*order)
            }
            Endpoint::DeleteOrder => match order_id.and_then(|id| state.orders.remove(&id)) {
                Some(_) => TransportResponse::empty(StatusCode::NO_CONTENT),
                None => not_found(),
            },
        }
    }

    fn create_order(state: &mut MockState, payload: CreateOrderPayload) -> Result<Order, String> {
        if payload.order_products.is_empty() {
            return Err("order_products must not be empty".into());
        }

        let mut lines = Vec::with_capacity(payload.order_products.len());
        let mut products_total = Decimal::ZERO;
        for (idx, line) in payload.order_products.iter().enumerate() {
            let product = state
                .products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| format!("Unknown product {}", line.product_id))?;
            let line_total = product.unit_price * Decimal::from(line.quantity) - line.discount;
            products_total += line_total;
            lines.push(OrderLineRecord {
                id: idx as i64 + 1,
                product: product.clone(),
                quantity: line.quantity,
                discount: line.discount,
                line_total,
            });
        }

        let id = state.next_order_id;
        state.next_order_id += 1;
        let now = Utc::now().fixed_offset();
        let order = Order {
            id,
            distributor: Some(1),
            sales_person: state.profile.as_ref().map(|p| p.id),
            full_name: payload.full_name.clone(),
            city: payload.city.clone(),
            delivery_address: payload.delivery_address.clone(),
            landmark: Some(payload.landmark.clone()).filter(|s| !s.is_empty()),
            phone_number: payload.phone_number.clone(),
            alternate_phone_number: Some(payload.alternate_phone_number.clone())
                .filter(|s| !s.is_empty()),
            delivery_charge: payload.delivery_charge,
            payment_method: payload.payment_method,
            payment_screenshot_url: payload
                .payment_screenshot
                .as_ref()
                .map(|_| format!("/media/payments/{id}.png")),
            order_status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            total_amount: products_total + payload.delivery_charge,
            remarks: Some(payload.remarks.clone()).filter(|s| !s.is_empty()),
            order_lines: lines,
        };
        state.orders.insert(id, order.clone());
        state.created_payloads.push(payload);
        Ok(order)
    }
}

fn ok<T: serde::Serialize + ?Sized>(status: StatusCode, value: &T) -> TransportResponse {
    match serde_json::to_vec(value) {
        Ok(body) => TransportResponse::new(status, body),
        Err(e) => TransportResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn unauthorized() -> TransportResponse {
    TransportResponse::json(
        StatusCode::UNAUTHORIZED,
        &json!({"detail": "Given token not valid for any token type"}),
    )
}

fn not_found() -> TransportResponse {
    TransportResponse::json(StatusCode::NOT_FOUND, &json!({"detail": "Not found."}))
}

fn bad_request(message: &str) -> TransportResponse {
    TransportResponse::json(StatusCode::BAD_REQUEST, &json!({"detail": message}))
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        let Some((endpoint, order_id)) = Self::classify(&request.method, &request.path) else {
            return Ok(not_found());
        };

        let delay = {
            let mut state = self.lock();
            *state.calls.entry(endpoint).or_insert(0) += 1;
            state.delays.get(&endpoint).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.handle(endpoint, order_id, &request))
    }
}
