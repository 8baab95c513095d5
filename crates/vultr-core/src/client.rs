//! HTTP service base shared by every resource client.
//!
//! [`ServiceClient`] issues GET/POST/PUT/DELETE requests against the API base
//! URL, hands back the raw [`ApiResponse`], and turns non-success statuses and
//! transport failures into [`Error`]. It also implements the cursor-paginated
//! list convention used by all Vultr collection endpoints.

use bytes::Bytes;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::VultrClientConfig;
use crate::error::{ApiErrorBody, Error, Result};
use crate::pagination::{ListMeta, ListOptions, Page};
use crate::query::QueryParams;

const USER_AGENT: &str = concat!("vultr-rust/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default maximum number of retry attempts once retries are enabled
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial retry delay in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default maximum retry delay in milliseconds
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

/// Longest error body written to the log.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Retry policy with exponential backoff.
///
/// The client default is [`RetryPolicy::no_retry`]; callers opt in with
/// [`RetryPolicy::new`] or [`ServiceClientBuilder::with_retry_policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Initial delay before first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: u32,
}

impl RetryPolicy {
    /// Exponential backoff with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            backoff_multiplier: 2,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1,
        }
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Delay before retry number `attempt`: `min(initial * multiplier^(attempt-1), max)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.saturating_pow(attempt - 1);
        let initial_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(initial_ms.saturating_mul(u64::from(multiplier)));

        std::cmp::min(delay, self.max_delay)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Retry policy
    pub retry_policy: RetryPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Log failed responses
    pub enable_logging: bool,

    /// Accept gzip-compressed responses
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_policy: RetryPolicy::no_retry(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable logging of failed responses.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    base_url: Url,
    http_config: ClientConfig,
    user_agent: String,
    api_key: Option<Arc<SecretString>>,
    tls_verify: bool,
}

impl ServiceClientBuilder {
    /// Create a builder for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http_config: ClientConfig::new().with_timeout(timeout),
            user_agent: USER_AGENT.to_string(),
            api_key: None,
            tls_verify: true,
        })
    }

    /// Create a builder from a validated [`VultrClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API URL is invalid.
    pub fn from_config(config: &VultrClientConfig) -> Result<Self> {
        let base_url = config.parse_api_url()?;
        let retry_policy = if config.max_retries > 0 {
            RetryPolicy::new().with_max_retries(config.max_retries)
        } else {
            RetryPolicy::no_retry()
        };

        let mut builder = Self::new(base_url, config.timeout())?
            .with_retry_policy(retry_policy)
            .with_tls_verify(config.tls_verify);
        if let Some(key) = &config.api_key {
            builder = builder.with_api_key(key.clone());
        }
        Ok(builder)
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.http_config.retry_policy = retry;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Set the API key sent as `Authorization: Bearer`.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Arc::new(SecretString::from(api_key.into())));
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<ServiceClient> {
        let config = self.http_config;

        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent)
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .gzip(config.enable_compression);

        if !self.tls_verify {
            warn!("TLS verification disabled for Vultr client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(ServiceClient {
            http,
            base_url: self.base_url,
            api_key: self.api_key,
            retry_policy: config.retry_policy,
            enable_logging: config.enable_logging,
        })
    }
}

/// Raw response of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    body: Bytes,
}

impl ApiResponse {
    /// Wrap a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Raw body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// True when the response carried no body (e.g. 204).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Decode the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializeError`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Decode the object stored under `key`, e.g. `snapshot` in `{"snapshot": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializeError`] if the body is not a JSON object,
    /// `key` is missing, or its value does not match `T`.
    pub fn decode_field<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let mut root = self.json::<Value>()?;
        let value = take_field(&mut root, key)?;
        serde_json::from_value(value)
            .map_err(|err| Error::DeserializeError(format!("invalid `{key}` object: {err}")))
    }

    /// Decode a list response: the array under `collection` plus the `meta` block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializeError`] if `collection` is missing, is not an
    /// array, or an element does not match `T`.
    pub fn decode_page<T: DeserializeOwned>(&self, collection: &str) -> Result<Page<T>> {
        let mut root = self.json::<Value>()?;
        let items = take_field(&mut root, collection)?;
        if !items.is_array() {
            return Err(Error::DeserializeError(format!(
                "`{collection}` is not an array"
            )));
        }

        let items: Vec<T> = serde_json::from_value(items).map_err(|err| {
            Error::DeserializeError(format!("invalid `{collection}` element: {err}"))
        })?;

        let meta = match root.get_mut("meta").map(Value::take) {
            Some(Value::Null) | None => ListMeta::default(),
            Some(meta) => serde_json::from_value(meta)
                .map_err(|err| Error::DeserializeError(format!("invalid `meta` block: {err}")))?,
        };

        Ok(Page { items, meta })
    }
}

fn take_field(root: &mut Value, key: &str) -> Result<Value> {
    let object = root
        .as_object_mut()
        .ok_or_else(|| Error::DeserializeError("response is not a JSON object".to_string()))?;
    object
        .remove(key)
        .ok_or_else(|| Error::DeserializeError(format!("response has no `{key}` field")))
}

/// Asynchronous client for the Vultr API base.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    api_key: Option<Arc<SecretString>>,
    retry_policy: RetryPolicy,
    enable_logging: bool,
}

impl ServiceClient {
    /// Construct a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ServiceClientBuilder::new(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))?.build()
    }

    /// Construct a client from a [`VultrClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &VultrClientConfig) -> Result<Self> {
        ServiceClientBuilder::from_config(config)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the active retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// `GET path` with query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn get(&self, path: &str, params: &[(&'static str, String)]) -> Result<ApiResponse> {
        self.execute_with_retry(Method::GET, path, params, |request| request)
            .await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.execute_with_retry(Method::POST, path, &[], |request| request.json(body))
            .await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.execute_with_retry(Method::PUT, path, &[], |request| request.json(body))
            .await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute_with_retry(Method::DELETE, path, &[], |request| request)
            .await
    }

    /// Fetch one page of a collection.
    ///
    /// `extra` filters are sent alongside `per_page`/`cursor` from `options`;
    /// pagination keys in `extra` are overridden by `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if `options` is invalid, the request fails, or the
    /// response does not contain a `collection` array of `T`.
    pub async fn list<T>(
        &self,
        path: &str,
        collection: &str,
        options: &ListOptions,
        extra: &[(&'static str, String)],
    ) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        options.check()?;

        let mut params = QueryParams::new();
        params.merge(extra.iter().cloned());
        params.merge(options.to_pairs());
        let params = params.into_pairs();

        let response = self.get(path, &params).await?;
        let page = response.decode_page::<T>(collection)?;
        debug!(
            path = %path,
            count = page.items.len(),
            total = page.meta.total,
            has_next = page.has_next(),
            "Decoded list page"
        );
        Ok(page)
    }

    /// Fetch every page of a collection, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered while paging.
    pub async fn list_all<T>(
        &self,
        path: &str,
        collection: &str,
        per_page: u32,
        extra: &[(&'static str, String)],
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut options = ListOptions::new(per_page);
        let mut seen_cursors = HashSet::new();
        let mut items = Vec::new();

        loop {
            let page = self.list::<T>(path, collection, &options, extra).await?;
            let next = page.next_options(&options);
            items.extend(page.items);

            let Some(next) = next else { break };
            let cursor = next.cursor.clone().unwrap_or_default();
            if !seen_cursors.insert(cursor) {
                warn!(path = %path, cursor = ?next.cursor, "API repeated a cursor, stopping");
                break;
            }
            options = next;
        }

        Ok(items)
    }

    /// Send a request, retrying according to the retry policy.
    ///
    /// `configure` is applied to every attempt and may add headers or a body.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-retryable error.
    pub async fn execute_with_retry<F>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        configure: F,
    ) -> Result<ApiResponse>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.build_url(path)?;
        let mut attempt = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header("Accept", "application/json");
            if !params.is_empty() {
                request = request.query(params);
            }
            if let Some(api_key) = &self.api_key {
                request = request.bearer_auth(api_key.expose_secret());
            }
            request = configure(request);

            debug!(method = %method, path = %path, attempt, "Sending Vultr request");

            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response.bytes().await.map_err(Error::from)?;

                    if status.is_success() {
                        return Ok(ApiResponse::new(status.as_u16(), body));
                    }

                    self.status_error(status, &body)
                }
                Err(err) => Error::from(err),
            };

            if !error.is_retryable() || attempt >= self.retry_policy.max_retries {
                return Err(error);
            }

            attempt += 1;
            let delay = self.retry_policy.delay_for_attempt(attempt);
            debug!(path = %path, attempt, ?delay, error = %error, "Retrying Vultr request");
            if delay > Duration::from_millis(0) {
                sleep(delay).await;
            }
        }
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid path `{path}`: {err}")))
    }

    fn status_error(&self, status: StatusCode, body: &[u8]) -> Error {
        let text = String::from_utf8_lossy(body);
        let err = Error::Status {
            status: status.as_u16(),
            message: error_message(status, &text),
        };
        if self.enable_logging {
            if err.should_log() {
                error!(status = %status, body = %truncate_for_log(&text), "Vultr API error");
            } else {
                warn!(status = %status, body = %truncate_for_log(&text), "Vultr API error");
            }
        }
        err
    }
}

/// Error text from a response body, preferring the API's `error` field.
fn error_message(status: StatusCode, text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(text) {
        return body.error;
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn truncate_for_log(body: &str) -> String {
    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    if cleaned.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &cleaned[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        cleaned
    }
}
