//! Asynchronous snapshot client implementation.

use crate::models::{
    CreateSnapshotFromUrlRequest, CreateSnapshotRequest, Snapshot, UpdateSnapshotRequest,
};
use crate::Result;
use std::time::Duration;
use tracing::debug;
use url::Url;
use vultr_core::client::{ApiResponse, ClientConfig, RetryPolicy, DEFAULT_TIMEOUT_SECS};
use vultr_core::config::VultrClientConfig;
use vultr_core::id::{InstanceId, SnapshotId};
use vultr_core::pagination::{ListOptions, Page};
use vultr_core::query::QueryParams;
use vultr_core::{Error, ErrorDomain, ResultExt, ServiceClient, ServiceClientBuilder};

const USER_AGENT: &str = concat!("vultr-snapshots/", env!("CARGO_PKG_VERSION"));

/// Builder for [`SnapshotClient`].
#[derive(Debug, Clone)]
pub struct SnapshotClientBuilder {
    inner: ServiceClientBuilder,
}

impl SnapshotClientBuilder {
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
    pub fn build(self) -> Result<SnapshotClient> {
        let inner = self.inner.build()?;
        Ok(SnapshotClient { inner })
    }
}

/// Asynchronous snapshot client.
#[derive(Clone)]
pub struct SnapshotClient {
    inner: ServiceClient,
}

impl SnapshotClient {
    /// Construct a client directly from the base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        SnapshotClientBuilder::new(base_url)?.build()
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

    /// List one page of snapshots, optionally filtered by exact description.
    pub async fn list_snapshots(
        &self,
        description: Option<&str>,
        options: Option<&ListOptions>,
    ) -> Result<Page<Snapshot>> {
        let default_options = ListOptions::default();
        let options = options.unwrap_or(&default_options);

        let mut params = QueryParams::new();
        params.push_opt("description", description);

        self.inner
            .list("snapshots", "snapshots", options, &params.into_pairs())
            .await
            .in_domain(ErrorDomain::Snapshot, "Failed to get snapshots")
    }

    /// Fetch a single snapshot.
    pub async fn get_snapshot(&self, id: &SnapshotId) -> Result<Snapshot> {
        let path = format!("snapshots/{id}");
        let response = self
            .inner
            .get(&path, &[])
            .await
            .in_domain(ErrorDomain::Snapshot, "Failed to get snapshot")?;

        decode_snapshot(&response)
    }

    /// Snapshot a running instance.
    pub async fn create_snapshot(
        &self,
        instance_id: &InstanceId,
        description: &str,
    ) -> Result<Snapshot> {
        let request = CreateSnapshotRequest {
            instance_id: instance_id.clone(),
            description: description.to_string(),
        };

        let response = self
            .inner
            .post("snapshots", &request)
            .await
            .in_domain(ErrorDomain::Snapshot, "Failed to create snapshot")?;

        let snapshot = decode_snapshot(&response)?;
        debug!(snapshot = %snapshot.id, instance = %instance_id, "Created snapshot");
        Ok(snapshot)
    }

    /// Create a snapshot from a raw disk image hosted at `url`.
    pub async fn create_snapshot_from_url(&self, url: &str, description: &str) -> Result<Snapshot> {
        validate_image_url(url).in_domain(ErrorDomain::Snapshot, "Failed to create snapshot")?;

        let request = CreateSnapshotFromUrlRequest {
            url: url.to_string(),
            description: description.to_string(),
        };

        let response = self
            .inner
            .post("snapshots/create-from-url", &request)
            .await
            .in_domain(ErrorDomain::Snapshot, "Failed to create snapshot")?;

        let snapshot = decode_snapshot(&response)?;
        debug!(snapshot = %snapshot.id, url = %url, "Created snapshot from URL");
        Ok(snapshot)
    }

    /// Change a snapshot's description.
    pub async fn update_snapshot(&self, id: &SnapshotId, description: &str) -> Result<()> {
        let path = format!("snapshots/{id}");
        let request = UpdateSnapshotRequest {
            description: description.to_string(),
        };

        self.inner
            .put(&path, &request)
            .await
            .map(|_| ())
            .in_domain(ErrorDomain::Snapshot, "Failed to update snapshot")
    }

    /// Delete a snapshot.
    pub async fn delete_snapshot(&self, id: &SnapshotId) -> Result<()> {
        let path = format!("snapshots/{id}");
        self.inner
            .delete(&path)
            .await
            .map(|_| ())
            .in_domain(ErrorDomain::Snapshot, "Failed to delete snapshot")?;

        debug!(snapshot = %id, "Deleted snapshot");
        Ok(())
    }
}

fn decode_snapshot(response: &ApiResponse) -> Result<Snapshot> {
    response
        .decode_field("snapshot")
        .in_domain(ErrorDomain::Snapshot, "Failed to deserialize snapshot object")
}

fn validate_image_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|err| Error::ValidationError(format!("invalid image URL `{url}`: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::ValidationError(format!(
            "image URL must be http or https, got `{scheme}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SNAPSHOT_ID: &str = "5359435d-28b6-4e86-8e40-6e0e1a6ff3a1";

    fn test_client(server: &MockServer) -> SnapshotClient {
        SnapshotClientBuilder::new(server.uri())
            .unwrap()
            .with_api_key("test-key")
            .build()
            .unwrap()
    }

    fn snapshot_json(id: &str, description: &str) -> Value {
        json!({
            "id": id,
            "date_created": "2020-10-10T01:56:20+00:00",
            "description": description,
            "size": 42949672960u64,
            "compressed_size": 949678560u64,
            "status": "complete",
            "os_id": 215,
            "app_id": 0
        })
    }

    fn snapshot_id() -> SnapshotId {
        SnapshotId::parse_str(SNAPSHOT_ID).unwrap()
    }

    #[tokio::test]
    async fn list_snapshots_filters_by_description() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshots"))
            .and(query_param("description", "nightly"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "snapshots": [snapshot_json("s-2", "nightly"), snapshot_json("s-1", "nightly")],
                "meta": {"total": 2, "links": {"next": "", "prev": ""}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = test_client(&server)
            .list_snapshots(Some("nightly"), None)
            .await
            .unwrap();
        let ids: Vec<&str> = page.items.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s-2", "s-1"]);
        assert!(page.items.iter().all(Snapshot::is_complete));
    }

    #[tokio::test]
    async fn get_snapshot_decodes_wrapped_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/snapshots/{SNAPSHOT_ID}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"snapshot": snapshot_json(SNAPSHOT_ID, "base")})),
            )
            .mount(&server)
            .await;

        let snapshot = test_client(&server).get_snapshot(&snapshot_id()).await.unwrap();
        assert_eq!(snapshot.id, snapshot_id());
        assert_eq!(snapshot.os_id, 215);
        assert_eq!(snapshot.date_created.to_rfc3339(), "2020-10-10T01:56:20+00:00");
    }

    #[tokio::test]
    async fn get_snapshot_deserialize_failure_has_no_http_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/snapshots/{SNAPSHOT_ID}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snapshot": {"id": 5}})))
            .mount(&server)
            .await;

        let err = test_client(&server).get_snapshot(&snapshot_id()).await.unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Snapshot);
        assert_eq!(err.http_code(), None);
        assert!(err.to_string().starts_with("Failed to deserialize snapshot object"));
        assert!(matches!(err.cause(), Some(Error::DeserializeError(_))));
    }

    #[tokio::test]
    async fn create_snapshot_posts_instance_and_description() {
        let server = MockServer::start().await;
        let body = snapshot_json("new-snap", "nightly");
        Mock::given(method("POST"))
            .and(path("/snapshots"))
            .and(body_json(json!({"instance_id": "abc123", "description": "nightly"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"snapshot": body.clone()})))
            .expect(1)
            .mount(&server)
            .await;

        let instance = InstanceId::parse_str("abc123").unwrap();
        let snapshot = test_client(&server)
            .create_snapshot(&instance, "nightly")
            .await
            .unwrap();

        let expected: Snapshot = serde_json::from_value(body).unwrap();
        assert_eq!(snapshot, expected);
    }

    #[tokio::test]
    async fn create_snapshot_bad_body_is_snapshot_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/snapshots"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let instance = InstanceId::parse_str("abc123").unwrap();
        let err = test_client(&server)
            .create_snapshot(&instance, "nightly")
            .await
            .unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Snapshot);
        assert_eq!(err.domain_code(), 304);
        assert!(matches!(err.cause(), Some(Error::DeserializeError(_))));
    }

    #[tokio::test]
    async fn create_snapshot_from_url_posts_to_endpoint() {
        let server = MockServer::start().await;
        let url = "https://example.com/disk.raw";
        Mock::given(method("POST"))
            .and(path("/snapshots/create-from-url"))
            .and(body_json(json!({"url": url, "description": "imported"})))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(json!({"snapshot": snapshot_json("imp-1", "imported")})),
            )
            .mount(&server)
            .await;

        let snapshot = test_client(&server)
            .create_snapshot_from_url(url, "imported")
            .await
            .unwrap();
        assert_eq!(snapshot.id.as_str(), "imp-1");
    }

    #[tokio::test]
    async fn create_snapshot_from_url_rejects_bad_url_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        for bad in ["not a url", "ftp://example.com/disk.raw"] {
            let err = client.create_snapshot_from_url(bad, "x").await.unwrap_err();
            assert_eq!(err.domain(), ErrorDomain::Snapshot);
            assert!(matches!(err.cause(), Some(Error::ValidationError(_))));
        }
    }

    #[tokio::test]
    async fn update_snapshot_puts_description() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/snapshots/{SNAPSHOT_ID}").as_str()))
            .and(body_json(json!({"description": "renamed"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .update_snapshot(&snapshot_id(), "renamed")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_snapshot_is_silent_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/snapshots/{SNAPSHOT_ID}").as_str()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .delete_snapshot(&snapshot_id())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_snapshot_not_found_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/snapshots/{SNAPSHOT_ID}").as_str()))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "Invalid snapshot ID.", "status": 404})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server)
            .delete_snapshot(&snapshot_id())
            .await
            .unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Snapshot);
        assert_eq!(err.http_code(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(
            err.cause(),
            Some(&Error::Status {
                status: 404,
                message: "Invalid snapshot ID.".to_string()
            })
        );
    }

    #[tokio::test]
    async fn transport_failure_is_wrapped_unchanged() {
        // Nothing listens on port 9 of localhost.
        let client = SnapshotClient::new("http://127.0.0.1:9").unwrap();
        let direct = ServiceClient::new("http://127.0.0.1:9")
            .unwrap()
            .get(&format!("snapshots/{SNAPSHOT_ID}"), &[])
            .await
            .unwrap_err();

        let err = client.get_snapshot(&snapshot_id()).await.unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Snapshot);
        assert_eq!(err.http_code(), None);
        assert_eq!(err.cause(), Some(&direct));
    }
}
