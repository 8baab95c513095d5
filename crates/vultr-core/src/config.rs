//! Configuration for Vultr clients.
//!
//! [`VultrClientConfig`] is the serializable, validated description of how to
//! reach the API. It is turned into a live
//! [`ServiceClient`](crate::client::ServiceClient) by
//! [`ServiceClientBuilder::from_config`](crate::client::ServiceClientBuilder::from_config).

use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Public Vultr v2 API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.vultr.com/v2/";

/// Configuration for a Vultr client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct VultrClientConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Personal access token, sent as a bearer token
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of retry attempts (0 disables retries)
    #[validate(range(min = 0, max = 10))]
    #[serde(default)]
    pub max_retries: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl VultrClientConfig {
    /// Create a configuration for the given API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Parse a configuration from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or validation fails.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration JSON: {e}")))?;

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the API URL, making sure it ends with `/` so relative paths join under it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| Error::ConfigError(format!("Invalid API URL: {e}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl Default for VultrClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: 0,
        }
    }
}

impl std::fmt::Debug for VultrClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VultrClientConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("tls_verify", &self.tls_verify)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VultrClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_key.is_none());
        assert!(config.tls_verify);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = VultrClientConfig::new("not a url").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_builder_methods() {
        let config = VultrClientConfig::new("https://api.example.com/v2")
            .unwrap()
            .with_api_key("secret")
            .with_tls_verify(false)
            .with_timeout(60)
            .with_max_retries(2);

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(!config.tls_verify);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_parse_api_url_adds_trailing_slash() {
        let config = VultrClientConfig::new("https://api.example.com/v2").unwrap();
        let url = config.parse_api_url().unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v2/");
        assert_eq!(url.join("regions").unwrap().path(), "/v2/regions");
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let config = VultrClientConfig::from_json(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_from_json_validates_ranges() {
        let err = VultrClientConfig::from_json(r#"{"request_timeout_secs":0}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_api_key_not_serialized_or_printed() {
        let config = VultrClientConfig::default().with_api_key("topsecret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("topsecret"));
        assert!(!format!("{config:?}").contains("topsecret"));
    }
}
