//! BuildWatch - cached polling core for CI build status
//!
//! This library answers "what is the current build status for person P in
//! category C" against a remote build-automation server while minimizing
//! redundant remote calls. It layers a multi-tiered cache under a resolver,
//! persists the long-lived tiers to disk, and polls a single tracked target
//! on a fixed cadence, fanning results out to subscribers.
//!
//! # High-Level API
//!
//! Most hosts use the [`service`] facade:
//!
//! ```ignore
//! use std::sync::Arc;
//! use buildwatch::model::SearchTarget;
//! use buildwatch::service::{BuildWatchService, ServiceConfig};
//!
//! let service = BuildWatchService::open(ServiceConfig::default(), data_source);
//! service.subscribe(Arc::new(|status: &buildwatch::model::JobStatus| {
//!     println!("{status}");
//! }));
//! service.track(SearchTarget::new("project", "category", "owner")).await;
//! // ... later:
//! service.close();
//! ```

pub mod cache;
pub mod logging;
pub mod model;
pub mod notify;
pub mod resolver;
pub mod scheduler;
pub mod service;
pub mod source;

/// Version of the BuildWatch library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
