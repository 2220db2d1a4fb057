//! Transport seam
//!
//! [`HttpClient`](crate::HttpClient) speaks to the backend only through the
//! [`Transport`] trait, so the auth/refresh logic can run against the real
//! network ([`NetworkTransport`]) or an in-memory backend in tests.

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use http::{Method, StatusCode};
use reqwest::Client;

/// A single outgoing API request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Path relative to the API root
    pub path: String,
    /// JSON body, if any
    pub body: Option<serde_json::Value>,
    /// Bearer token to attach, if any
    pub bearer: Option<String>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// Raw response: status plus body bytes
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, Vec::new())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse>;
}

/// Network transport over reqwest
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    client: Client,
    config: ClientConfig,
}

impl NetworkTransport {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// API root this transport talks to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        let url = self.config.url(&request.path);
        let mut req = self.client.request(request.method.clone(), &url);
        if let Some(token) = &request.bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        tracing::debug!(method = %request.method, path = %request.path, status = %status, "API response");

        Ok(TransportResponse { status, body })
    }
}
