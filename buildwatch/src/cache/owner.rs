//! Per-job owner filter cache.
//!
//! Maps a [`JobIdentity`] to the first owner ever observed for it. Build
//! records are immutable on the server, so the first observation stands:
//! writes are first-writer-wins and entries never expire. Only a full
//! `clear` removes them.
//!
//! This is a pure optimization layer. Removing it changes call volume, not
//! resolution results: it lets the resolver skip metadata fetches for jobs
//! already proven to belong to someone else.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::JobIdentity;

/// Concurrent map of job identity to first-observed owner.
#[derive(Debug, Default)]
pub struct OwnerFilterCache {
    owners: Mutex<HashMap<JobIdentity, String>>,
}

impl OwnerFilterCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded owner for a job, if one was ever observed.
    pub fn get(&self, id: &JobIdentity) -> Option<String> {
        let owners = self.owners.lock().unwrap();
        owners.get(id).cloned()
    }

    /// Record an owner for a job. Only the first call per job has effect.
    pub fn put_if_absent(&self, id: JobIdentity, owner: impl Into<String>) {
        let mut owners = self.owners.lock().unwrap();
        owners.entry(id).or_insert_with(|| owner.into());
    }

    /// Returns true if `owner` may own the job: no owner recorded yet, or
    /// the recorded owner matches case-insensitively.
    pub fn permits(&self, id: &JobIdentity, owner: &str) -> bool {
        let owners = self.owners.lock().unwrap();
        match owners.get(id) {
            Some(recorded) => recorded.eq_ignore_ascii_case(owner),
            None => true,
        }
    }

    /// Number of recorded owners.
    pub fn len(&self) -> usize {
        let owners = self.owners.lock().unwrap();
        owners.len()
    }

    /// Returns true if no owner has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut owners = self.owners.lock().unwrap();
        owners.clear();
    }

    /// Copy out all entries for persistence.
    pub fn snapshot(&self) -> Vec<(JobIdentity, String)> {
        let owners = self.owners.lock().unwrap();
        owners
            .iter()
            .map(|(id, owner)| (id.clone(), owner.clone()))
            .collect()
    }

    /// Replace the cache contents with persisted entries.
    pub fn restore(&self, snapshot: Vec<(JobIdentity, String)>) {
        let mut owners = self.owners.lock().unwrap();
        *owners = snapshot.into_iter().collect();
    }
}
