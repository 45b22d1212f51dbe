//! Per-job metadata cache.
//!
//! Maps a [`JobIdentity`] to its last known [`JobStatus`]. There is no TTL:
//! staleness is purely result-driven. Terminal results (SUCCESS, FAILURE,
//! ABORTED, UNSTABLE) never change for a recorded build, so they are trusted
//! forever. RUNNING entries are treated as a miss on every lookup.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::{JobIdentity, JobStatus};

/// Concurrent map of job identity to last known status.
#[derive(Debug, Default)]
pub struct JobMetadataCache {
    entries: Mutex<HashMap<JobIdentity, JobStatus>>,
}

impl JobMetadataCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached status for a job.
    ///
    /// Returns `None` when the job is absent or its cached result is
    /// RUNNING. A RUNNING entry stays in the map (it is overwritten in place
    /// by the next `put`) but is never served.
    pub fn get(&self, id: &JobIdentity) -> Option<JobStatus> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(id)
            .filter(|status| !status.result.is_running())
            .cloned()
    }

    /// Store a status, overwriting any previous entry for the job.
    pub fn put(&self, id: JobIdentity, status: JobStatus) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(id, status);
    }

    /// Returns true if an entry exists for the job, RUNNING or not.
    pub fn contains(&self, id: &JobIdentity) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.contains_key(id)
    }

    /// Number of entries, RUNNING ones included.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
    }

    /// Copy out all entries for persistence.
    pub fn snapshot(&self) -> Vec<(JobIdentity, JobStatus)> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .map(|(id, status)| (id.clone(), status.clone()))
            .collect()
    }

    /// Replace the cache contents with persisted entries.
    pub fn restore(&self, snapshot: Vec<(JobIdentity, JobStatus)>) {
        let mut entries = self.entries.lock().unwrap();
        *entries = snapshot.into_iter().collect();
    }
}
