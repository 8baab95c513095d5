//! Asynchronous region client implementation.

use crate::cache::{RegionCache, RegionSource};
use crate::models::{PlanType, Region, RegionAvailability};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use vultr_core::client::{ClientConfig, RetryPolicy, DEFAULT_TIMEOUT_SECS};
use vultr_core::config::VultrClientConfig;
use vultr_core::id::RegionId;
use vultr_core::pagination::{ListOptions, Page, MAX_PER_PAGE};
use vultr_core::query::QueryParams;
use vultr_core::{ErrorDomain, ResultExt, ServiceClient, ServiceClientBuilder};
use url::Url;

const USER_AGENT: &str = concat!("vultr-regions/", env!("CARGO_PKG_VERSION"));

/// Builder for [`RegionClient`].
#[derive(Debug, Clone)]
pub struct RegionClientBuilder {
    inner: ServiceClientBuilder,
    cache: Option<Arc<RegionCache>>,
}

impl RegionClientBuilder {
    /// Create a builder for the specified base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder =
            ServiceClientBuilder::new(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))?
                .with_user_agent(USER_AGENT);

        Ok(Self {
            inner: builder,
            cache: None,
        })
    }

    /// Create a builder from a shared configuration.
    pub fn from_config(config: &VultrClientConfig) -> Result<Self> {
        Ok(Self {
            inner: ServiceClientBuilder::from_config(config)?.with_user_agent(USER_AGENT),
            cache: None,
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

    /// Use an existing region cache instead of a fresh one.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<RegionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RegionClient> {
        let inner = self.inner.build()?;
        Ok(RegionClient {
            inner,
            cache: self.cache.unwrap_or_default(),
        })
    }
}

/// Asynchronous region client.
#[derive(Clone)]
pub struct RegionClient {
    inner: ServiceClient,
    cache: Arc<RegionCache>,
}

impl RegionClient {
    /// Construct a client directly from the base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        RegionClientBuilder::new(base_url)?.build()
    }

    /// Wrap an already configured service client with a fresh cache.
    #[must_use]
    pub fn from_service_client(inner: ServiceClient) -> Self {
        Self {
            inner,
            cache: Arc::default(),
        }
    }

    /// Replace the region cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<RegionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// The cache used by [`RegionClient::get_region`].
    #[must_use]
    pub fn cache(&self) -> &Arc<RegionCache> {
        &self.cache
    }

    /// List one page of regions. Without options the first 100 are returned.
    pub async fn list_regions(&self, options: Option<&ListOptions>) -> Result<Page<Region>> {
        let default_options = ListOptions::default();
        let options = options.unwrap_or(&default_options);
        self.inner
            .list("regions", "regions", options, &[])
            .await
            .in_domain(ErrorDomain::Region, "Failed to get regions")
    }

    /// Populate the region cache unless already populated.
    pub async fn cache_regions(&self) -> Result<()> {
        self.cache
            .load(self)
            .await
            .in_domain(ErrorDomain::Region, "Failed to cache regions")
    }

    /// Look up a region by id through the cache. Unknown ids yield `None`.
    pub async fn get_region(&self, id: &str) -> Result<Option<Region>> {
        self.cache_regions().await?;
        Ok(self.cache.get(id).cloned())
    }

    /// Plans currently deployable in `region_id`, optionally filtered by plan family.
    pub async fn list_availability(
        &self,
        region_id: &RegionId,
        plan_type: Option<PlanType>,
    ) -> Result<Vec<String>> {
        let path = format!("regions/{region_id}/availability");
        let mut params = QueryParams::new();
        params.push_opt("type", plan_type);

        let response = self
            .inner
            .get(&path, &params.into_pairs())
            .await
            .in_domain(ErrorDomain::Region, "Failed to get region availability")?;

        response
            .json::<RegionAvailability>()
            .map(|availability| availability.available_plans)
            .in_domain(ErrorDomain::Region, "Failed to deserialize region availability")
    }
}

#[async_trait]
impl RegionSource for RegionClient {
    async fn fetch_all_regions(&self) -> Result<Vec<Region>> {
        self.inner
            .list_all("regions", "regions", MAX_PER_PAGE, &[])
            .await
    }
}
