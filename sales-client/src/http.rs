//! HTTP client with bearer attachment and refresh-on-expiry
//!
//! Every request carries the session's access token. When the backend
//! answers 401 and a refresh token exists, the client performs one refresh
//! and retries the request once with the new token. Refreshes are
//! single-flight: concurrent 401s wait for the one in-flight refresh and
//! reuse its result instead of issuing their own.

use crate::endpoints;
use crate::session::Session;
use crate::transport::{NetworkTransport, Transport, TransportRequest, TransportResponse};
use crate::{ClientConfig, ClientError, ClientResult};
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::client::{RefreshRequest, TokenPair};
use std::sync::Arc;

/// Authenticated JSON client for the sales API
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client over any transport
    pub fn new(transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    /// Create a network client from configuration
    pub fn from_config(config: &ClientConfig, session: Arc<Session>) -> ClientResult<Self> {
        let transport = NetworkTransport::new(config.clone())?;
        Ok(Self::new(Arc::new(transport), session))
    }

    /// The session this client authenticates with
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.execute(TransportRequest::new(Method::GET, path)).await?;
        decode(response)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = TransportRequest::new(Method::POST, path).with_body(serde_json::to_value(body)?);
        decode(self.execute(request).await?)
    }

    /// Make a POST request without credentials (login)
    pub async fn post_anonymous<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = TransportRequest::new(Method::POST, path).with_body(serde_json::to_value(body)?);
        decode(self.transport.send(request).await?)
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = TransportRequest::new(Method::PATCH, path).with_body(serde_json::to_value(body)?);
        decode(self.execute(request).await?)
    }

    /// Make a DELETE request; any success status counts, the body is ignored
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self.execute(TransportRequest::new(Method::DELETE, path)).await?;
        check_status(&response)
    }

    /// Sends with the current token; on 401 refreshes once and retries once
    async fn execute(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        let credential = self.session.credential();
        let response = self
            .transport
            .send(request.clone().with_bearer(credential.access))
            .await?;

        if response.status != StatusCode::UNAUTHORIZED || self.session.refresh_token().is_none() {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "Access token rejected, refreshing");
        self.refresh(credential.generation).await?;

        let retry = request.with_bearer(self.session.access_token());
        self.transport.send(retry).await
    }

    /// Refreshes the token pair unless another caller already did
    ///
    /// `seen_generation` is the session generation the rejected request was
    /// sent with; a newer generation means the refresh already happened.
    async fn refresh(&self, seen_generation: u64) -> ClientResult<()> {
        let _guard = self.session.refresh_lock().lock().await;

        if self.session.generation() != seen_generation {
            return if self.session.is_authenticated() {
                Ok(())
            } else {
                Err(ClientError::Unauthenticated)
            };
        }

        let Some(refresh) = self.session.refresh_token() else {
            return Err(ClientError::Unauthenticated);
        };

        let body = serde_json::to_value(RefreshRequest { refresh })?;
        let request = TransportRequest::new(Method::POST, endpoints::REFRESH).with_body(body);
        let outcome = match self.transport.send(request).await {
            Ok(response) => decode::<TokenPair>(response),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(tokens) => {
                self.session.set_tokens(tokens);
                tracing::info!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.session.clear();
                Err(ClientError::Unauthenticated)
            }
        }
    }
}

/// Maps a non-success status to its error
fn check_status(response: &TransportResponse) -> ClientResult<()> {
    let status = response.status;
    if status.is_success() {
        return Ok(());
    }

    let text = response.text();
    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(text),
        StatusCode::NOT_FOUND => ClientError::NotFound(text),
        StatusCode::BAD_REQUEST => ClientError::Validation(text),
        _ => ClientError::Api {
            status: status.as_u16(),
            message: text,
        },
    })
}

/// Handle the HTTP response; an empty body decodes as JSON `null`
fn decode<T: DeserializeOwned>(response: TransportResponse) -> ClientResult<T> {
    check_status(&response)?;
    let body: &[u8] = if response.body.is_empty() {
        b"null"
    } else {
        &response.body
    };
    serde_json::from_slice(body)
        .map_err(|e| ClientError::InvalidResponse(format!("{e}: {}", response.text())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Endpoint, MockBackend};
    use rust_decimal::Decimal;
    use shared::{Order, Product};
    use std::time::Duration;

    fn backend() -> Arc<MockBackend> {
        Arc::new(MockBackend::new().with_products(vec![Product::new(1, "Oil", Decimal::from(2500))]))
    }

    fn logged_in(backend: &Arc<MockBackend>) -> HttpClient {
        let session = Session::shared();
        session.set_tokens(backend.issue_tokens());
        HttpClient::new(backend.clone(), session)
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let backend = backend();
        let client = logged_in(&backend);
        backend.expire_access_tokens();
        backend.set_delay(Endpoint::Refresh, Duration::from_millis(50));

        let (products, orders) = tokio::join!(
            client.get::<Vec<Product>>(endpoints::PRODUCTS),
            client.get::<Vec<Order>>(endpoints::ORDERS),
        );

        assert_eq!(products.unwrap().len(), 1);
        assert!(orders.unwrap().is_empty());
        assert_eq!(backend.calls(Endpoint::Refresh), 1);
        // original attempt + one retry each
        assert_eq!(backend.calls(Endpoint::Products), 2);
        assert_eq!(backend.calls(Endpoint::ListOrders), 2);
        assert!(client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let backend = backend();
        let client = logged_in(&backend);
        backend.expire_access_tokens();
        backend.revoke_refresh_tokens();

        let result = client.get::<Vec<Product>>(endpoints::PRODUCTS).await;

        assert!(matches!(result, Err(ClientError::Unauthenticated)));
        assert_eq!(backend.calls(Endpoint::Refresh), 1);
        assert!(!client.session().is_authenticated());
        assert!(client.session().refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_no_refresh_without_session() {
        let backend = backend();
        let client = HttpClient::new(backend.clone(), Session::shared());

        let result = client.get::<Vec<Product>>(endpoints::PRODUCTS).await;

        assert!(matches!(result, Err(ClientError::Unauthorized)));
        assert_eq!(backend.calls(Endpoint::Refresh), 0);
    }

    #[tokio::test]
    async fn test_valid_token_needs_no_refresh() {
        let backend = backend();
        let client = logged_in(&backend);

        let products = client.get::<Vec<Product>>(endpoints::PRODUCTS).await.unwrap();

        assert_eq!(products[0].name, "Oil");
        assert_eq!(backend.calls(Endpoint::Refresh), 0);
        assert_eq!(backend.calls(Endpoint::Products), 1);
    }

    #[test]
    fn test_status_mapping() {
        let forbidden = TransportResponse::new(StatusCode::FORBIDDEN, "nope");
        assert!(matches!(check_status(&forbidden), Err(ClientError::Forbidden(m)) if m == "nope"));

        let unauthorized = TransportResponse::empty(StatusCode::UNAUTHORIZED);
        assert!(matches!(check_status(&unauthorized), Err(ClientError::Unauthorized)));

        let teapot = TransportResponse::new(StatusCode::IM_A_TEAPOT, "short and stout");
        assert!(matches!(
            check_status(&teapot),
            Err(ClientError::Api { status: 418, .. })
        ));
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let response = TransportResponse::empty(StatusCode::NO_CONTENT);
        let value: Option<serde_json::Value> = decode(response).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_decode_garbage_is_invalid_response() {
        let response = TransportResponse::new(StatusCode::OK, "<html>");
        let result: ClientResult<TokenPair> = decode(response);
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }
}
