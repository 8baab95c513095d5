//! Backup models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vultr_core::id::BackupId;

/// An automatic instance backup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backup {
    /// Backup id.
    pub id: BackupId,
    /// Creation time.
    pub date_created: DateTime<Utc>,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Backup status, e.g. `complete`.
    pub status: String,
}
