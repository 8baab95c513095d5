//! Snapshot client and data models for the Vultr API.
//!
//! Provides typed snapshot records and an asynchronous client for listing,
//! creating (from an instance or a remote raw image), updating and deleting
//! snapshots.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{SnapshotClient, SnapshotClientBuilder};
pub use models::{
    CreateSnapshotFromUrlRequest, CreateSnapshotRequest, Snapshot, UpdateSnapshotRequest,
};

/// Convenient result alias using the shared Vultr error type.
pub type Result<T> = vultr_core::Result<T>;
