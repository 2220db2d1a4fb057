//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request was rejected with 401 and could not be recovered
    #[error("Authentication required")]
    Unauthorized,

    /// No valid session can be established; hand control back to login
    #[error("Session expired, please login again")]
    Unauthenticated,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// True when the caller must stop and return to the login flow
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Unauthenticated)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
