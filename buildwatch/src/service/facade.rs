//! High-level service facade.
//!
//! Wires the cache tiers, the resolver, the polling scheduler, and the
//! notification dispatcher behind one handle with an explicit lifecycle:
//! [`BuildWatchService::open`] loads persisted caches,
//! [`BuildWatchService::close`] stops polling and saves them. There are no
//! implicit process-exit hooks; the surrounding process decides when state
//! hits disk.

use std::sync::Arc;

use tracing::info;

use crate::cache::{Cache, CacheStore};
use crate::model::{JobStatus, SearchTarget};
use crate::notify::{NotificationDispatcher, StatusListener};
use crate::resolver::JobSearchResolver;
use crate::scheduler::PollingScheduler;
use crate::service::ServiceConfig;
use crate::source::{DataSource, FetchError};

/// One handle over the whole polling core.
pub struct BuildWatchService {
    cache: Arc<Cache>,
    store: CacheStore,
    resolver: Arc<JobSearchResolver>,
    scheduler: Arc<PollingScheduler>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl BuildWatchService {
    /// Open the service: create the caches, load persisted snapshots, and
    /// wire the resolver and scheduler to the given data source.
    pub fn open(config: ServiceConfig, source: Arc<dyn DataSource>) -> Self {
        let cache = Arc::new(Cache::new());
        let store = CacheStore::new(&config.cache_dir);
        store.load(&cache);

        let dispatcher = Arc::new(NotificationDispatcher::new());
        let resolver = Arc::new(
            JobSearchResolver::new(Arc::clone(&cache), source).with_list_ttl(config.list_ttl),
        );
        let scheduler = Arc::new(
            PollingScheduler::new(Arc::clone(&resolver), Arc::clone(&dispatcher))
                .with_interval(config.poll_interval),
        );

        info!(
            cache_dir = %config.cache_dir.display(),
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            list_ttl_ms = config.list_ttl.as_millis() as u64,
            "BuildWatch service opened"
        );

        Self {
            cache,
            store,
            resolver,
            scheduler,
            dispatcher,
        }
    }

    /// Resolve a target once, synchronously with respect to the caller.
    ///
    /// Unlike scheduled ticks, data source failures propagate here.
    pub async fn resolve(&self, target: &SearchTarget) -> Result<JobStatus, FetchError> {
        self.resolver.resolve(target).await
    }

    /// Start polling a target. See [`PollingScheduler::track`].
    pub async fn track(&self, target: SearchTarget) {
        self.scheduler.track(target).await;
    }

    /// Start polling a target without blocking the caller.
    pub fn track_async(&self, target: SearchTarget) {
        Arc::clone(&self.scheduler).track_async(target);
    }

    /// Stop polling the tracked target.
    pub fn stop_tracking(&self) {
        self.scheduler.stop_tracking();
    }

    /// The currently tracked target, if any.
    pub fn tracked_target(&self) -> Option<SearchTarget> {
        self.scheduler.tracked_target()
    }

    /// Subscribe a listener to every resolved status.
    pub fn subscribe(&self, listener: Arc<dyn StatusListener>) {
        self.dispatcher.subscribe(listener);
    }

    /// Empty the metadata and owner caches. The next lookup refetches.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Cache cleared");
    }

    /// Flush the caches to disk now, without closing.
    pub fn persist(&self) {
        self.store.save(&self.cache);
    }

    /// Stop polling and save the caches. Consumes the service.
    pub fn close(self) {
        self.scheduler.stop_tracking();
        self.store.save(&self.cache);
        info!("BuildWatch service closed");
    }
}
