//! Core domain types for tracked CI builds.
//!
//! These are small immutable value types: they identify a build run
//! ([`JobIdentity`]), capture a snapshot of its state ([`JobStatus`]), and
//! describe what a caller wants tracked ([`SearchTarget`]).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Terminal or in-flight result of a build run.
///
/// Terminal results never change for a recorded build, which is why the
/// metadata cache trusts them forever; only `Running` records are refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Failure,
    Success,
    Running,
    Aborted,
    Unstable,
    Unknown,
}

impl BuildResult {
    /// Returns true if the build is still in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, BuildResult::Running)
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildResult::Failure => "FAILURE",
            BuildResult::Success => "SUCCESS",
            BuildResult::Running => "RUNNING",
            BuildResult::Aborted => "ABORTED",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Identity of one build run: (project, job id, job category).
///
/// Value-equality over all three fields; used as a map key throughout the
/// cache layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity {
    pub project: String,
    pub job_id: String,
    pub category: String,
}

impl JobIdentity {
    /// Create a new job identity.
    pub fn new(
        project: impl Into<String>,
        job_id: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            job_id: job_id.into(),
            category: category.into(),
        }
    }

    /// The sentinel identity for "no job resolved".
    pub fn unknown() -> Self {
        Self::new("", "unknown", "unknown")
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.project, self.category, self.job_id)
    }
}

/// Immutable snapshot of one build run's state.
///
/// Equality intentionally covers (identity, owner, result, stage) only:
/// comment and duration change between polls of the same logical state and
/// are excluded so receivers can use equality for "any news" checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub identity: JobIdentity,
    pub result: BuildResult,
    pub owner: String,
    pub comment: Option<String>,
    pub stage: Option<String>,
    pub duration_ms: u64,
}

impl JobStatus {
    /// Create a status snapshot with no comment, stage, or duration.
    pub fn new(identity: JobIdentity, result: BuildResult, owner: impl Into<String>) -> Self {
        Self {
            identity,
            result,
            owner: owner.into(),
            comment: None,
            stage: None,
            duration_ms: 0,
        }
    }

    /// The sentinel status for "no matching job found".
    ///
    /// This is a normal value, not an error: resolving a target with no
    /// matching job yields it.
    pub fn unknown() -> Self {
        Self::new(JobIdentity::unknown(), BuildResult::Unknown, "unknown")
    }

    /// Returns true if this is the "no matching job" sentinel.
    pub fn is_unknown(&self) -> bool {
        self.result == BuildResult::Unknown && self.identity == JobIdentity::unknown()
    }

    /// Attach a review comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attach the pipeline stage the build is in.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Attach the build duration in milliseconds.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

impl PartialEq for JobStatus {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
            && self.result == other.result
            && self.owner == other.owner
            && self.stage == other.stage
    }
}

impl Eq for JobStatus {}

impl Hash for JobStatus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
        self.result.hash(state);
        self.owner.hash(state);
        self.stage.hash(state);
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JobStatus [identity={}, owner={}, result={}, stage={}]",
            self.identity,
            self.owner,
            self.result,
            self.stage.as_deref().unwrap_or("-")
        )
    }
}

/// What a caller wants tracked: the newest build in `category` under
/// `project` that belongs to `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTarget {
    pub project: String,
    pub category: String,
    pub owner: String,
}

impl SearchTarget {
    /// Create a new search target.
    pub fn new(
        project: impl Into<String>,
        category: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            category: category.into(),
            owner: owner.into(),
        }
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.project, self.category, self.owner)
    }
}
