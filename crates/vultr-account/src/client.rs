//! Asynchronous account client implementation.

use crate::models::Account;
use crate::Result;
use std::time::Duration;
use url::Url;
use vultr_core::client::{ClientConfig, RetryPolicy, DEFAULT_TIMEOUT_SECS};
use vultr_core::config::VultrClientConfig;
use vultr_core::{ErrorDomain, ResultExt, ServiceClient, ServiceClientBuilder};

const USER_AGENT: &str = concat!("vultr-account/", env!("CARGO_PKG_VERSION"));

/// Builder for [`AccountClient`].
#[derive(Debug, Clone)]
pub struct AccountClientBuilder {
    inner: ServiceClientBuilder,
}

impl AccountClientBuilder {
    /// Create a builder for the specified base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder =
            ServiceClientBuilder::new(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))?
                .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from a shared configuration.
    pub fn from_config(config: &VultrClientConfig) -> Result<Self> {
        Ok(Self {
            inner: ServiceClientBuilder::from_config(config)?.with_user_agent(USER_AGENT),
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Configure the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.inner = self.inner.with_api_key(api_key);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AccountClient> {
        let inner = self.inner.build()?;
        Ok(AccountClient { inner })
    }
}

/// Asynchronous account client.
#[derive(Clone)]
pub struct AccountClient {
    inner: ServiceClient,
}

impl AccountClient {
    /// Construct a client directly from the base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        AccountClientBuilder::new(base_url)?.build()
    }

    /// Wrap an already configured service client.
    #[must_use]
    pub fn from_service_client(inner: ServiceClient) -> Self {
        Self { inner }
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Fetch information about the account the API key belongs to.
    pub async fn get_account(&self) -> Result<Account> {
        let response = self
            .inner
            .get("account", &[])
            .await
            .in_domain(ErrorDomain::Account, "Failed to get account info")?;

        response
            .decode_field("account")
            .in_domain(ErrorDomain::Account, "Failed to deserialize account object")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vultr_core::Error;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_account_sends_bearer_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "account": {
                    "name": "Example Account",
                    "email": "admin@example.com",
                    "acls": ["manage_users"],
                    "balance": 0,
                    "pending_charges": 12.5,
                    "last_payment_date": "",
                    "last_payment_amount": 0
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AccountClientBuilder::new(server.uri())
            .unwrap()
            .with_api_key("test-key")
            .build()
            .unwrap();
        let account = client.get_account().await.unwrap();

        assert_eq!(account.email, "admin@example.com");
        assert!(account.last_payment_date.is_none());
        assert!(account.has_acl("billing"));
    }

    #[tokio::test]
    async fn unauthorized_is_account_domain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": "Invalid API token.", "status": 401})),
            )
            .mount(&server)
            .await;

        let err = AccountClient::new(server.uri())
            .unwrap()
            .get_account()
            .await
            .unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Account);
        assert_eq!(err.domain_code(), 301);
        assert_eq!(err.http_code(), Some(401));
        assert!(err.to_string().starts_with("Failed to get account info"));
        assert!(matches!(err.cause(), Some(Error::Status { status: 401, .. })));
    }

    #[tokio::test]
    async fn malformed_account_has_no_http_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"account": {"name": 7}})))
            .mount(&server)
            .await;

        let err = AccountClient::new(server.uri())
            .unwrap()
            .get_account()
            .await
            .unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Account);
        assert_eq!(err.http_code(), None);
        assert!(matches!(err.cause(), Some(Error::DeserializeError(_))));
    }
}
