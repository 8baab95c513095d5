//! Error types for Vultr API operations.
//!
//! A single [`Error`] enum covers transport failures, non-success HTTP
//! statuses, deserialization problems and local validation. Resource clients
//! re-wrap whatever they receive into [`Error::Service`], tagged with the
//! [`ErrorDomain`] of the resource that failed, so callers can tell both which
//! API area broke and (where available) the HTTP status it returned.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Resource area an [`Error::Service`] originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDomain {
    /// Generic service base (raw request plumbing)
    Service,
    /// Account information
    Account,
    /// Instance backups
    Backup,
    /// Regions and region availability
    Region,
    /// Snapshots
    Snapshot,
}

impl ErrorDomain {
    /// Stable numeric code for this domain.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::Service => 300,
            Self::Account => 301,
            Self::Backup => 302,
            Self::Region => 303,
            Self::Snapshot => 304,
        }
    }

    /// Lowercase domain name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Account => "account",
            Self::Backup => "backup",
            Self::Region => "region",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type for Vultr operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Could not connect to the API
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other transport-level failure
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The API answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error text reported by the API
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Failed to deserialize response: {0}")]
    DeserializeError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint or path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Malformed resource identifier
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failure attributed to one resource domain.
    #[error("{message}")]
    Service {
        /// Domain that raised the error
        domain: ErrorDomain,
        /// Human-readable message including context
        message: String,
        /// HTTP status, when the underlying failure had one
        http_code: Option<u16>,
        /// Wrapped underlying error
        #[source]
        source: Option<Box<Error>>,
    },
}

/// Specialized result type for Vultr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Body of an API error response, e.g. `{"error": "Invalid snapshot ID", "status": 404}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Error text
    pub error: String,
    /// Status echoed by the API
    #[serde(default)]
    pub status: Option<u16>,
}

impl Error {
    /// Build a domain error without an underlying cause.
    #[must_use]
    pub fn service(domain: ErrorDomain, message: impl Into<String>) -> Self {
        Self::Service {
            domain,
            message: message.into(),
            http_code: None,
            source: None,
        }
    }

    /// Re-wrap this error into `domain`, prefixing `context` to the message.
    ///
    /// The HTTP status of `self` is carried over and `self` becomes the
    /// wrapped cause.
    #[must_use]
    pub fn in_domain(self, domain: ErrorDomain, context: &str) -> Self {
        Self::Service {
            domain,
            message: format!("{context}: {self}"),
            http_code: self.http_code(),
            source: Some(Box::new(self)),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Status { .. } => "HTTP_STATUS",
            Self::DeserializeError(_) => "DESERIALIZE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidId(_) => "INVALID_ID",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Service { .. } => "SERVICE_ERROR",
        }
    }

    /// Domain this error belongs to; anything not yet wrapped is [`ErrorDomain::Service`].
    #[must_use]
    pub const fn domain(&self) -> ErrorDomain {
        match self {
            Self::Service { domain, .. } => *domain,
            _ => ErrorDomain::Service,
        }
    }

    /// Numeric code of [`Error::domain`].
    #[must_use]
    pub const fn domain_code(&self) -> u32 {
        self.domain().code()
    }

    /// HTTP status associated with this error, if any.
    #[must_use]
    pub const fn http_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Service { http_code, .. } => *http_code,
            _ => None,
        }
    }

    /// The directly wrapped error of a domain error.
    #[must_use]
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::Service { source, .. } => source.as_deref(),
            _ => None,
        }
    }

    /// Innermost error in the wrap chain (`self` if nothing is wrapped).
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }

    /// True when the API reported 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.http_code(), Some(404))
    }

    /// Whether repeating the request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.root_cause() {
            Self::ServiceUnavailable(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => matches!(*status, 429 | 500..=599),
            _ => false,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub fn should_log(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::ConfigError(_) | Self::DeserializeError(_) | Self::Status { status: 500..=599, .. }
        )
    }
}

/// Adapter for re-wrapping the error side of a [`Result`] into a domain.
pub trait ResultExt<T> {
    /// See [`Error::in_domain`].
    ///
    /// # Errors
    ///
    /// Returns the wrapped error if `self` is an error.
    fn in_domain(self, domain: ErrorDomain, context: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn in_domain(self, domain: ErrorDomain, context: &str) -> Result<T> {
        self.map_err(|err| err.in_domain(domain, context))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::DeserializeError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DeserializeError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
