//! Client configuration

/// Default API root when `SALES_API_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration for connecting to the sales API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root (e.g., "http://127.0.0.1:8000/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("sales-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `SALES_API_URL` (default [`DEFAULT_BASE_URL`])
    /// - `SALES_API_TIMEOUT_SECS` (default [`DEFAULT_TIMEOUT_SECS`])
    pub fn from_env() -> Self {
        let base_url = std::env::var("SALES_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout_secs = std::env::var("SALES_API_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url).with_timeout(timeout_secs)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = ClientConfig::new("http://localhost:8000/api/");
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(
            config.url("/sales/orders/"),
            "http://localhost:8000/api/sales/orders/"
        );
        assert_eq!(config.url("sales/products"), "http://localhost:8000/api/sales/products");
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::default().with_timeout(5).with_user_agent("desk");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "desk");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
