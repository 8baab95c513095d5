//! Region client for the Vultr API.
//!
//! Lists regions, resolves a region by id through an explicitly owned
//! [`RegionCache`], and queries per-region plan availability.

#![deny(missing_docs)]

pub mod cache;
pub mod client;
pub mod models;

pub use cache::{RegionCache, RegionSource};
pub use client::{RegionClient, RegionClientBuilder};
pub use models::{PlanType, Region, RegionAvailability};

/// Convenient result alias using the shared Vultr error type.
pub type Result<T> = vultr_core::Result<T>;
