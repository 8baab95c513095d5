//! Asynchronous backup client implementation.

use crate::models::Backup;
use crate::Result;
use std::time::Duration;
use url::Url;
use vultr_core::client::{ClientConfig, RetryPolicy, DEFAULT_TIMEOUT_SECS};
use vultr_core::config::VultrClientConfig;
use vultr_core::id::{BackupId, InstanceId};
use vultr_core::pagination::{ListOptions, Page};
use vultr_core::query::QueryParams;
use vultr_core::{ErrorDomain, ResultExt, ServiceClient, ServiceClientBuilder};

const USER_AGENT: &str = concat!("vultr-backups/", env!("CARGO_PKG_VERSION"));

/// Builder for [`BackupClient`].
#[derive(Debug, Clone)]
pub struct BackupClientBuilder {
    inner: ServiceClientBuilder,
}

impl BackupClientBuilder {
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
    pub fn build(self) -> Result<BackupClient> {
        let inner = self.inner.build()?;
        Ok(BackupClient { inner })
    }
}

/// Asynchronous backup client.
#[derive(Clone)]
pub struct BackupClient {
    inner: ServiceClient,
}

impl BackupClient {
    /// Construct a client directly from the base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        BackupClientBuilder::new(base_url)?.build()
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

    /// List one page of backups, optionally only those of one instance.
    pub async fn list_backups(
        &self,
        instance_id: Option<&InstanceId>,
        options: Option<&ListOptions>,
    ) -> Result<Page<Backup>> {
        let default_options = ListOptions::default();
        let options = options.unwrap_or(&default_options);

        let mut params = QueryParams::new();
        params.push_opt("instance_id", instance_id);

        self.inner
            .list("backups", "backups", options, &params.into_pairs())
            .await
            .in_domain(ErrorDomain::Backup, "Failed to get backups")
    }

    /// Fetch a single backup.
    pub async fn get_backup(&self, id: &BackupId) -> Result<Backup> {
        let path = format!("backups/{id}");
        let response = self
            .inner
            .get(&path, &[])
            .await
            .in_domain(ErrorDomain::Backup, "Failed to get backup")?;

        response
            .decode_field("backup")
            .in_domain(ErrorDomain::Backup, "Failed to deserialize backup object")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use vultr_core::Error;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BACKUP_ID: &str = "cb676a46-66fd-4dfb-b839-443f2e6c0b60";

    fn test_client(server: &MockServer) -> BackupClient {
        BackupClient::new(server.uri()).unwrap()
    }

    fn backup_json(id: &str) -> Value {
        json!({
            "id": id,
            "date_created": "2020-10-10T01:56:20+00:00",
            "description": "Example Backup",
            "size": 10_000_000,
            "status": "complete"
        })
    }

    #[tokio::test]
    async fn list_backups_filters_by_instance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/backups"))
            .and(query_param("instance_id", "abc123"))
            .and(query_param("per_page", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "backups": [backup_json("b-1"), backup_json("b-2")],
                "meta": {"total": 5, "links": {"next": "bmV4dA==", "prev": ""}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let instance = InstanceId::parse_str("abc123").unwrap();
        let options = ListOptions::new(25);
        let page = test_client(&server)
            .list_backups(Some(&instance), Some(&options))
            .await
            .unwrap();

        let ids: Vec<&str> = page.items.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "b-2"]);
        assert_eq!(page.next_options(&options).unwrap().cursor.as_deref(), Some("bmV4dA=="));
    }

    #[tokio::test]
    async fn get_backup_decodes_wrapped_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/backups/{BACKUP_ID}").as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"backup": backup_json(BACKUP_ID)})),
            )
            .mount(&server)
            .await;

        let id = BackupId::parse_str(BACKUP_ID).unwrap();
        let backup = test_client(&server).get_backup(&id).await.unwrap();
        assert_eq!(backup.id, id);
        assert_eq!(backup.size, 10_000_000);
        assert_eq!(backup.status, "complete");
    }

    #[tokio::test]
    async fn get_backup_not_found_is_backup_domain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/backups/{BACKUP_ID}").as_str()))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "Invalid backup ID.", "status": 404})),
            )
            .mount(&server)
            .await;

        let id = BackupId::parse_str(BACKUP_ID).unwrap();
        let err = test_client(&server).get_backup(&id).await.unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Backup);
        assert_eq!(err.domain_code(), 302);
        assert_eq!(err.http_code(), Some(404));
        assert_eq!(
            err.cause(),
            Some(&Error::Status {
                status: 404,
                message: "Invalid backup ID.".to_string()
            })
        );
    }
}
