//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::resolver::DEFAULT_LIST_TTL;
use crate::scheduler::DEFAULT_POLL_INTERVAL;

/// Configuration for [`BuildWatchService`](crate::service::BuildWatchService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the persisted cache snapshots.
    pub cache_dir: PathBuf,
    /// Interval between polls of the tracked target.
    pub poll_interval: Duration,
    /// Time-to-live for cached job lists.
    pub list_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("buildwatch");

        Self {
            cache_dir,
            poll_interval: DEFAULT_POLL_INTERVAL,
            list_ttl: DEFAULT_LIST_TTL,
        }
    }
}

impl ServiceConfig {
    /// Set the cache directory.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the job-list TTL.
    pub fn with_list_ttl(mut self, list_ttl: Duration) -> Self {
        self.list_ttl = list_ttl;
        self
    }
}
