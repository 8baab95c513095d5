//! Snapshot models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vultr_core::id::{InstanceId, SnapshotId};

/// Snapshot status reported while the image is still being taken.
pub const STATUS_PENDING: &str = "pending";
/// Snapshot status once the image is usable.
pub const STATUS_COMPLETE: &str = "complete";

/// A snapshot as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Snapshot id.
    pub id: SnapshotId,
    /// Creation time.
    pub date_created: DateTime<Utc>,
    /// User-supplied description.
    #[serde(default)]
    pub description: String,
    /// Uncompressed size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Compressed size in bytes.
    #[serde(default)]
    pub compressed_size: u64,
    /// `pending`, `complete` or `deleted`.
    pub status: String,
    /// Operating system id of the source.
    #[serde(default)]
    pub os_id: u32,
    /// Application id of the source.
    #[serde(default)]
    pub app_id: u32,
}

impl Snapshot {
    /// Whether the snapshot finished and can be deployed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }

    /// Whether the snapshot is still being taken.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// Body of `POST /snapshots`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateSnapshotRequest {
    /// Instance to snapshot.
    pub instance_id: InstanceId,
    /// Snapshot description.
    pub description: String,
}

/// Body of `POST /snapshots/create-from-url`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateSnapshotFromUrlRequest {
    /// Publicly reachable URL of a raw disk image.
    pub url: String,
    /// Snapshot description.
    pub description: String,
}

/// Body of `PUT /snapshots/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpdateSnapshotRequest {
    /// New description.
    pub description: String,
}
