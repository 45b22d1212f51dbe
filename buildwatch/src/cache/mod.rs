//! Multi-tiered cache for build status resolution.
//!
//! Three independent mappings with distinct invalidation rules:
//!
//! 1. [`JobMetadataCache`] — job identity to last known status; RUNNING
//!    entries are never trusted, terminal ones never expire.
//! 2. [`JobListCache`] — job category to timestamped identity list; stale
//!    for reads after a TTL, replaced wholesale on refresh.
//! 3. [`OwnerFilterCache`] — job identity to first-observed owner;
//!    first-writer-wins, never expires.
//!
//! The [`Cache`] aggregate is the concurrency boundary: each map guards its
//! own state and individual get/put operations are atomic. Multi-step
//! sequences (check, fetch, put) are not transactional; a duplicate fetch
//! under a race is an accepted outcome, never corruption.

mod job_list;
mod metadata;
mod owner;
mod store;

pub use job_list::{JobListCache, TimestampedList};
pub use metadata::JobMetadataCache;
pub use owner::OwnerFilterCache;
pub use store::{CacheStore, PersistenceError, METADATA_CACHE_FILE, OWNER_CACHE_FILE};

/// The three cache tiers behind one handle.
///
/// Raw maps are never exposed; callers get only the atomic operations on
/// each tier.
#[derive(Debug, Default)]
pub struct Cache {
    metadata: JobMetadataCache,
    job_lists: JobListCache,
    owners: OwnerFilterCache,
}

impl Cache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-job metadata tier.
    pub fn metadata(&self) -> &JobMetadataCache {
        &self.metadata
    }

    /// The per-category job-list tier.
    pub fn job_lists(&self) -> &JobListCache {
        &self.job_lists
    }

    /// The per-job owner filter tier.
    pub fn owners(&self) -> &OwnerFilterCache {
        &self.owners
    }

    /// Empty the metadata and owner tiers in place.
    ///
    /// The job-list tier is unaffected; its entries age out via the TTL.
    /// Not synchronized against in-flight fetches: a fetch that started
    /// before the clear may repopulate an entry after it.
    pub fn clear(&self) {
        self.metadata.clear();
        self.owners.clear();
    }
}
