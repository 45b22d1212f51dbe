//! High-level API for embedding the polling core.
//!
//! [`BuildWatchService`] is the facade most hosts want: open it with a
//! [`DataSource`](crate::source::DataSource), subscribe listeners, track a
//! target, close it on the way out.

mod config;
mod facade;

pub use config::ServiceConfig;
pub use facade::BuildWatchService;
