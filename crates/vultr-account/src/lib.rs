//! Account client and data models for the Vultr API.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{AccountClient, AccountClientBuilder};
pub use models::Account;

/// Convenient result alias using the shared Vultr error type.
pub type Result<T> = vultr_core::Result<T>;
