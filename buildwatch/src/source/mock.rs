//! Scripted in-memory data source.
//!
//! Stands in for the remote server in tests and in the CLI demo. Every
//! fetch is counted, so tests can assert exact call volumes — the central
//! property of the caching layer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DataSource, FetchError};
use crate::model::{JobIdentity, JobStatus};

/// A [`DataSource`] backed by scripted maps and call counters.
#[derive(Debug, Default)]
pub struct MockDataSource {
    jobs: Mutex<HashMap<(String, String), Vec<JobIdentity>>>,
    statuses: Mutex<HashMap<JobIdentity, JobStatus>>,
    list_calls: AtomicUsize,
    data_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockDataSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the job list for a (project, category) pair.
    pub fn set_jobs(
        &self,
        project: impl Into<String>,
        category: impl Into<String>,
        identities: Vec<JobIdentity>,
    ) {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.insert((project.into(), category.into()), identities);
    }

    /// Script the status returned for its job identity.
    pub fn set_status(&self, status: JobStatus) {
        let mut statuses = self.statuses.lock().unwrap();
        statuses.insert(status.identity.clone(), status);
    }

    /// Make every subsequent fetch fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `fetch_jobs` calls observed.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_job_data` calls observed.
    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_jobs(
        &self,
        project: &str,
        category: &str,
    ) -> Result<Vec<JobIdentity>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Transport("scripted failure".to_string()));
        }

        let jobs = self.jobs.lock().unwrap();
        Ok(jobs
            .get(&(project.to_string(), category.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_job_data(&self, id: &JobIdentity) -> Result<JobStatus, FetchError> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Transport("scripted failure".to_string()));
        }

        let statuses = self.statuses.lock().unwrap();
        statuses
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::Parse(format!("no scripted status for job {id}")))
    }
}
