//! Cache-backed job search.
//!
//! [`JobSearchResolver`] composes the three cache tiers with the external
//! [`DataSource`] to answer "find the current job for this search target"
//! while keeping remote calls to a minimum. Once the caches are warm,
//! repeated resolves against an unchanged server make zero external calls.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::Cache;
use crate::model::{JobIdentity, JobStatus, SearchTarget};
use crate::source::{DataSource, FetchError};

/// Default time-to-live for cached job lists.
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(30);

/// Resolves a [`SearchTarget`] to the owner's current [`JobStatus`].
pub struct JobSearchResolver {
    cache: Arc<Cache>,
    source: Arc<dyn DataSource>,
    list_ttl: Duration,
}

impl JobSearchResolver {
    /// Create a resolver with the default job-list TTL.
    pub fn new(cache: Arc<Cache>, source: Arc<dyn DataSource>) -> Self {
        Self {
            cache,
            source,
            list_ttl: DEFAULT_LIST_TTL,
        }
    }

    /// Sets a custom job-list TTL. Tests shrink this for determinism.
    pub fn with_list_ttl(mut self, list_ttl: Duration) -> Self {
        self.list_ttl = list_ttl;
        self
    }

    /// Fetch-through lookup of the job list for a category.
    ///
    /// Serves the cached list while it is within the TTL; otherwise fetches
    /// from the data source and replaces the entry with a fresh timestamp.
    pub async fn job_list(
        &self,
        project: &str,
        category: &str,
    ) -> Result<Vec<JobIdentity>, FetchError> {
        if let Some(list) = self.cache.job_lists().get(category) {
            if !list.is_stale(self.list_ttl) {
                return Ok(list.into_identities());
            }
        }

        let identities = self.source.fetch_jobs(project, category).await?;
        debug!(
            project,
            category,
            jobs = identities.len(),
            "Refreshed job list from data source"
        );
        self.cache.job_lists().put(category, identities.clone());
        Ok(identities)
    }

    /// Fetch-through lookup of one job's status.
    ///
    /// Serves the cached status unless it is absent or RUNNING; either way
    /// the fetched result overwrites the cache entry.
    pub async fn job_status(&self, id: &JobIdentity) -> Result<JobStatus, FetchError> {
        if let Some(status) = self.cache.metadata().get(id) {
            return Ok(status);
        }

        let status = self.source.fetch_job_data(id).await?;
        self.cache.metadata().put(id.clone(), status.clone());
        Ok(status)
    }

    /// Find the first job in the target's category owned by the target's
    /// owner.
    ///
    /// Walks the category's job list in server order, skipping jobs the
    /// owner filter has already proven belong to someone else, and returns
    /// on the first case-insensitive owner match. No match is a normal
    /// outcome: the [`JobStatus::unknown`] sentinel, never an error.
    pub async fn resolve(&self, target: &SearchTarget) -> Result<JobStatus, FetchError> {
        let candidates = self.job_list(&target.project, &target.category).await?;

        for id in candidates {
            if !self.cache.owners().permits(&id, &target.owner) {
                continue;
            }

            let status = self.job_status(&id).await?;
            self.cache
                .owners()
                .put_if_absent(id, status.owner.clone());

            if status.owner.eq_ignore_ascii_case(&target.owner) {
                debug!(%target, job = %status.identity, "Resolved job for target");
                return Ok(status);
            }
        }

        debug!(%target, "No job matched target");
        Ok(JobStatus::unknown())
    }
}
