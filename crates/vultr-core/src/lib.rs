//! # vultr-core
//!
//! Core types and HTTP plumbing for the Vultr v2 API.
//!
//! This crate provides the shared service base, error handling, pagination,
//! and configuration used by the per-resource client crates.
//!
//! ## Modules
//!
//! - [`error`] - Error type with resource-domain tagging and HTTP status preservation
//! - [`id`] - Strongly-typed resource identifiers
//! - [`pagination`] - Cursor-based list options and pages
//! - [`config`] - Serializable client configuration
//! - [`client`] - HTTP service base, retry policy, and raw responses
//! - [`query`] - Query parameter builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod pagination;
pub mod query;

// Re-export commonly used types
pub use client::{ApiResponse, ServiceClient, ServiceClientBuilder};
pub use error::{Error, ErrorDomain, Result, ResultExt};
pub use pagination::{ListOptions, Page};
