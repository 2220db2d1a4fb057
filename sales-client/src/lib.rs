//! Sales Client - HTTP client for the sales order API
//!
//! Provides the transport seam, the shared session context, token
//! refresh, and the auth service used by the order desk.

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod session;
pub mod transport;

pub use auth::AuthService;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use self::http::HttpClient;
pub use session::Session;
pub use transport::{NetworkTransport, Transport, TransportRequest, TransportResponse};

// Re-export shared types for convenience
pub use shared::client::{LoginRequest, ProfileUpdate, Role, TokenPair, UserProfile};
