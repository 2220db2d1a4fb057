//! Order desk configuration

use sales_client::{ClientConfig, ClientError, ClientResult, LoginRequest};

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Sales API connection
    pub client: ClientConfig,
    /// Log level (env: LOG_LEVEL, default "info")
    pub log_level: String,
    /// JSON log output (env: LOG_JSON)
    pub log_json: bool,
    /// Rotating log directory (env: LOG_DIR), console only when unset
    pub log_dir: Option<String>,
    /// Operator account (env: SALES_USERNAME / SALES_PASSWORD)
    pub username: Option<String>,
    pub password: Option<String>,
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl DeskConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: non_empty("LOG_JSON").is_some_and(|v| parse_bool(&v)),
            log_dir: non_empty("LOG_DIR"),
            username: non_empty("SALES_USERNAME"),
            password: non_empty("SALES_PASSWORD"),
        }
    }

    /// Login request from the configured account; both parts must be set
    pub fn credentials(&self) -> ClientResult<LoginRequest> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(LoginRequest::new(username, password)),
            _ => Err(ClientError::Config(
                "SALES_USERNAME and SALES_PASSWORD must be set".into(),
            )),
        }
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            username: None,
            password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" ON "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn test_credentials_need_both_parts() {
        let mut config = DeskConfig {
            username: Some("vishal".into()),
            ..Default::default()
        };
        assert!(matches!(config.credentials(), Err(ClientError::Config(_))));

        config.password = Some("secret".into());
        let login = config.credentials().unwrap();
        assert_eq!(login.username, "vishal");
        assert_eq!(login.password, "secret");
    }
}
