//! Region lookup cache.
//!
//! The region list changes rarely, so lookups by id are served from a
//! [`RegionCache`] that is filled once from a [`RegionSource`] and then kept
//! for the lifetime of the cache value. The cache is owned by the caller and
//! handed to [`RegionClient`](crate::RegionClient); dropping or invalidating it
//! is the caller's decision.

use crate::models::Region;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::info;

/// Something that can produce the complete region list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegionSource: Send + Sync {
    /// Fetch every region, exhausting pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched.
    async fn fetch_all_regions(&self) -> Result<Vec<Region>>;
}

/// Regions keyed by id, populated at most once.
#[derive(Debug, Default)]
pub struct RegionCache {
    regions: OnceCell<HashMap<String, Region>>,
}

impl RegionCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the cache from `source` unless it is already populated.
    ///
    /// Concurrent callers share a single fetch. A failed fetch leaves the
    /// cache empty so a later call tries again.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the fetch fails.
    pub async fn load(&self, source: &dyn RegionSource) -> Result<()> {
        self.regions
            .get_or_try_init(|| async {
                let regions = source.fetch_all_regions().await?;
                info!(count = regions.len(), "Cached Vultr regions");
                Ok::<_, vultr_core::Error>(
                    regions
                        .into_iter()
                        .map(|region| (region.id.as_str().to_string(), region))
                        .collect(),
                )
            })
            .await?;
        Ok(())
    }

    /// Look up a region by id; `None` if unknown or the cache is not populated.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.get().and_then(|regions| regions.get(id))
    }

    /// Whether [`RegionCache::load`] has completed successfully.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.regions.initialized()
    }

    /// Number of cached regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.get().map_or(0, HashMap::len)
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over cached regions in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.get().into_iter().flat_map(HashMap::values)
    }

    /// Drop the cached regions so the next load fetches again.
    pub fn invalidate(&mut self) {
        self.regions.take();
    }
}
