//! Per-category job-list cache.
//!
//! Maps a job category to the ordered list of job identities the remote
//! server last reported, stamped with the capture time. Entries become
//! invalid for reads after a TTL but are never proactively deleted: a stale
//! read triggers a fresh fetch and a wholesale replacement with a reset
//! timestamp.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::model::JobIdentity;

/// An ordered list of job identities plus the time it was captured.
#[derive(Debug, Clone)]
pub struct TimestampedList {
    identities: Vec<JobIdentity>,
    captured_at: Instant,
}

impl TimestampedList {
    /// Create a list captured now.
    pub fn new(identities: Vec<JobIdentity>) -> Self {
        Self {
            identities,
            captured_at: Instant::now(),
        }
    }

    /// Returns true once more than `ttl` has elapsed since capture.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.captured_at.elapsed() > ttl
    }

    /// The captured identities, in server order.
    pub fn identities(&self) -> &[JobIdentity] {
        &self.identities
    }

    /// Consume the list, yielding the captured identities.
    pub fn into_identities(self) -> Vec<JobIdentity> {
        self.identities
    }
}

/// Concurrent map of job category to timestamped job list.
#[derive(Debug, Default)]
pub struct JobListCache {
    lists: Mutex<HashMap<String, TimestampedList>>,
}

impl JobListCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached list for a category, stale or not.
    ///
    /// Staleness is the caller's call: the resolver checks
    /// [`TimestampedList::is_stale`] against its configured TTL.
    pub fn get(&self, category: &str) -> Option<TimestampedList> {
        let lists = self.lists.lock().unwrap();
        lists.get(category).cloned()
    }

    /// Store a list for a category, captured now. Replaces any previous
    /// entry and resets the timestamp.
    pub fn put(&self, category: impl Into<String>, identities: Vec<JobIdentity>) {
        let mut lists = self.lists.lock().unwrap();
        lists.insert(category.into(), TimestampedList::new(identities));
    }

    /// Number of cached categories.
    pub fn len(&self) -> usize {
        let lists = self.lists.lock().unwrap();
        lists.len()
    }

    /// Returns true if no category has a cached list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
