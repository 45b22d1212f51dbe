//! Build data source abstraction.
//!
//! The remote build-automation server is an external collaborator: this
//! crate only specifies its boundary. Callers supply a [`DataSource`]
//! implementation that talks whatever transport the server speaks; the
//! cache and resolver layers treat it as a pair of fallible fetches.

mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{JobIdentity, JobStatus};

pub use mock::MockDataSource;

/// Errors from the remote data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport failed (connection refused, timeout, HTTP 5xx, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server responded but the payload could not be understood.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A source of build jobs and their status.
///
/// Both fetches are the only suspension points in the core; everything else
/// is in-memory. Implementations own their own timeout policy.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the current job identities for a category, newest first as the
    /// server reports them.
    async fn fetch_jobs(
        &self,
        project: &str,
        category: &str,
    ) -> Result<Vec<JobIdentity>, FetchError>;

    /// Fetch the current status of one job.
    async fn fetch_job_data(&self, id: &JobIdentity) -> Result<JobStatus, FetchError>;
}
