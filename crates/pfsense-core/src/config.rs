//! Configuration structures for pfSense clients.
//!
//! This module provides the provider-level configuration: where the appliance lives,
//! which API client credentials to exchange for a token, and transport settings.

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Configuration for one appliance connection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PfsenseConfig {
    /// API base URL (e.g., "https://fw.example.com/api/v1")
    #[validate(url)]
    pub api_url: String,

    /// API client identifier
    #[validate(length(min = 1))]
    pub client_id: String,

    /// API client token, exchanged for a bearer token on connect
    #[serde(skip_serializing)]
    pub client_token: SecretString,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub tls_insecure: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    300
}

impl PfsenseConfig {
    /// Create a new configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the URL is invalid, the client id is empty
    /// or the timeout is out of range.
    pub fn new(
        api_url: impl Into<String>,
        client_id: impl Into<String>,
        client_token: impl Into<String>,
    ) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            client_id: client_id.into(),
            client_token: SecretString::from(client_token.into()),
            tls_insecure: false,
            timeout_secs: default_timeout_secs(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Set whether to skip TLS certificate verification.
    #[must_use]
    pub const fn with_tls_insecure(mut self, insecure: bool) -> Self {
        self.tls_insecure = insecure;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_new() {
        let config =
            PfsenseConfig::new("https://fw.example.com/api/v1", "client", "token").unwrap();
        assert_eq!(config.api_url, "https://fw.example.com/api/v1");
        assert_eq!(config.client_id, "client");
        assert_eq!(config.client_token.expose_secret(), "token");
        assert!(!config.tls_insecure);
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_config_invalid_url() {
        let err = PfsenseConfig::new("not-a-url", "client", "token").unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
    }

    #[test]
    fn test_config_empty_client_id() {
        let err = PfsenseConfig::new("https://fw.example.com", "", "token").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_config_builder() {
        let config = PfsenseConfig::new("https://fw.example.com", "client", "token")
            .unwrap()
            .with_tls_insecure(true)
            .with_timeout(45);

        assert!(config.tls_insecure);
        assert_eq!(config.timeout(), Duration::from_secs(45));
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: PfsenseConfig = serde_json::from_str(
            r#"{"api_url":"https://fw.example.com","client_id":"c","client_token":"t"}"#,
        )
        .unwrap();
        assert!(!config.tls_insecure);
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.client_token.expose_secret(), "t");
    }

    #[test]
    fn test_config_serialization_omits_token() {
        let config = PfsenseConfig::new("https://fw.example.com", "client", "hunter2").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("client"));
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = PfsenseConfig::new("https://fw.example.com", "c", "t").unwrap();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.timeout_secs = 3601;
        assert!(config.validate().is_err());

        config.timeout_secs = 30;
        assert!(config.validate().is_ok());
    }
}
