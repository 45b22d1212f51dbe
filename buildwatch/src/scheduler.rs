//! Single-target polling scheduler.
//!
//! Tracks exactly one [`SearchTarget`] at a time: an immediate resolve and
//! notify, then a fixed-rate repeating poll. Switching targets cancels the
//! previous schedule; a failing tick is logged and the schedule survives,
//! the poll cadence doubling as the retry interval.
//!
//! Ticks for one target never overlap: each schedule is a single task that
//! awaits its tick to completion before waiting for the next interval
//! (missed ticks are delayed, not bunched).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::SearchTarget;
use crate::notify::NotificationDispatcher;
use crate::resolver::JobSearchResolver;

/// Default interval between polls (30 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Schedules repeated resolves of the tracked target.
pub struct PollingScheduler {
    resolver: Arc<JobSearchResolver>,
    dispatcher: Arc<NotificationDispatcher>,
    interval: Duration,
    state: Mutex<PollState>,
}

/// Mutable scheduler state: Idle (both `None`) or Tracking.
#[derive(Default)]
struct PollState {
    tracked: Option<SearchTarget>,
    cancel: Option<CancellationToken>,
}

impl PollingScheduler {
    /// Create a scheduler with the default poll interval.
    pub fn new(resolver: Arc<JobSearchResolver>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            resolver,
            dispatcher,
            interval: DEFAULT_POLL_INTERVAL,
            state: Mutex::new(PollState::default()),
        }
    }

    /// Sets a custom poll interval. Tests shrink this for determinism.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The currently tracked target, if any.
    pub fn tracked_target(&self) -> Option<SearchTarget> {
        let state = self.state.lock().unwrap();
        state.tracked.clone()
    }

    /// Start tracking a target.
    ///
    /// No-op if `target` is already tracked. Otherwise performs one
    /// immediate resolve+notify on the caller's task, cancels the previous
    /// schedule, and starts a fixed-rate schedule whose first repeat fires
    /// after one interval.
    pub async fn track(&self, target: SearchTarget) {
        {
            let state = self.state.lock().unwrap();
            if state.tracked.as_ref() == Some(&target) {
                debug!(%target, "Already tracking target");
                return;
            }
        }

        info!(%target, interval_ms = self.interval.as_millis() as u64, "Tracking target");
        run_tick(&self.resolver, &self.dispatcher, &target).await;

        let cancel = CancellationToken::new();
        tokio::spawn(poll_loop(
            Arc::clone(&self.resolver),
            Arc::clone(&self.dispatcher),
            target.clone(),
            self.interval,
            cancel.clone(),
        ));

        let mut state = self.state.lock().unwrap();
        if state.tracked.as_ref() == Some(&target) {
            // A concurrent track for the same target won the race; keep its
            // schedule and tear down ours.
            cancel.cancel();
            return;
        }
        if let Some(previous) = state.cancel.take() {
            previous.cancel();
        }
        state.tracked = Some(target);
        state.cancel = Some(cancel);
    }

    /// Submit `track(target)` to run on a worker task instead of blocking
    /// the caller on the immediate resolve.
    pub fn track_async(self: Arc<Self>, target: SearchTarget) {
        tokio::spawn(async move {
            self.track(target).await;
        });
    }

    /// Cancel the active schedule and return to Idle.
    ///
    /// Interruption of an in-flight fetch is best-effort: the tick future is
    /// dropped at its next suspension point.
    pub fn stop_tracking(&self) {
        let mut state = self.state.lock().unwrap();
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        if let Some(target) = state.tracked.take() {
            info!(%target, "Stopped tracking target");
        }
    }
}

/// Repeating poll for one target, until cancelled.
async fn poll_loop(
    resolver: Arc<JobSearchResolver>,
    dispatcher: Arc<NotificationDispatcher>,
    target: SearchTarget,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The immediate tick was already run by `track`.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = interval.tick() => {}
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = run_tick(&resolver, &dispatcher, &target) => {}
        }
    }

    debug!(%target, "Polling schedule cancelled");
}

/// One poll tick: resolve and notify. Errors are logged, never propagated;
/// the next tick is the retry.
async fn run_tick(
    resolver: &JobSearchResolver,
    dispatcher: &NotificationDispatcher,
    target: &SearchTarget,
) {
    debug!(%target, "Fetching details for target");
    match resolver.resolve(target).await {
        Ok(status) => dispatcher.notify(&status),
        Err(error) => warn!(%target, error = %error, "Poll tick failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::model::{BuildResult, JobIdentity, JobStatus};
    use crate::source::{DataSource, MockDataSource};
    use std::sync::Mutex as StdMutex;

    struct TestContext {
        source: Arc<MockDataSource>,
        scheduler: Arc<PollingScheduler>,
        seen: Arc<StdMutex<Vec<JobStatus>>>,
    }

    fn create_test_setup(interval: Duration) -> TestContext {
        let cache = Arc::new(Cache::new());
        let source = Arc::new(MockDataSource::new());
        let resolver = Arc::new(JobSearchResolver::new(
            cache,
            Arc::clone(&source) as Arc<dyn DataSource>,
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new());

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe(Arc::new(move |status: &JobStatus| {
            sink.lock().unwrap().push(status.clone());
        }));

        let scheduler =
            Arc::new(PollingScheduler::new(resolver, dispatcher).with_interval(interval));

        TestContext {
            source,
            scheduler,
            seen,
        }
    }

    fn script_job(source: &MockDataSource, job_id: &str, owner: &str) {
        let id = JobIdentity::new("PROJECT_1", job_id, "JOB_CATEGORY");
        source.set_jobs("PROJECT_1", "JOB_CATEGORY", vec![id.clone()]);
        source.set_status(JobStatus::new(id, BuildResult::Success, owner));
    }

    fn target(owner: &str) -> SearchTarget {
        SearchTarget::new("PROJECT_1", "JOB_CATEGORY", owner)
    }

    #[tokio::test]
    async fn test_track_notifies_immediately() {
        let ctx = create_test_setup(Duration::from_secs(60));
        script_job(&ctx.source, "JOB_ID_1", "user-1");

        ctx.scheduler.track(target("user-1")).await;

        let seen = ctx.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].owner, "user-1");
    }

    #[tokio::test]
    async fn test_track_same_target_twice_is_noop() {
        let ctx = create_test_setup(Duration::from_secs(60));
        script_job(&ctx.source, "JOB_ID_1", "user-1");

        ctx.scheduler.track(target("user-1")).await;
        ctx.scheduler.track(target("user-1")).await;

        // No second immediate notification and no extra fetches.
        assert_eq!(ctx.seen.lock().unwrap().len(), 1);
        assert_eq!(ctx.source.list_calls(), 1);
        assert_eq!(ctx.scheduler.tracked_target(), Some(target("user-1")));
    }

    #[tokio::test]
    async fn test_track_switch_replaces_target() {
        let ctx = create_test_setup(Duration::from_secs(60));
        script_job(&ctx.source, "JOB_ID_1", "user-1");

        ctx.scheduler.track(target("user-1")).await;
        ctx.scheduler.track(target("user-2")).await;

        assert_eq!(ctx.scheduler.tracked_target(), Some(target("user-2")));
    }

    #[tokio::test]
    async fn test_scheduled_ticks_fire_at_interval() {
        let ctx = create_test_setup(Duration::from_millis(50));
        script_job(&ctx.source, "JOB_ID_1", "user-1");

        ctx.scheduler.track(target("user-1")).await;
        tokio::time::sleep(Duration::from_millis(180)).await;

        // Immediate notification plus at least two scheduled ticks.
        assert!(ctx.seen.lock().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn test_stop_tracking_halts_notifications() {
        let ctx = create_test_setup(Duration::from_millis(50));
        script_job(&ctx.source, "JOB_ID_1", "user-1");

        ctx.scheduler.track(target("user-1")).await;
        ctx.scheduler.stop_tracking();
        assert_eq!(ctx.scheduler.tracked_target(), None);

        // Any tick already past its cancellation check may still land; the
        // count must then stay flat.
        tokio::time::sleep(Duration::from_millis(120)).await;
        let settled = ctx.seen.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(ctx.seen.lock().unwrap().len(), settled);
    }

    #[tokio::test]
    async fn test_failing_tick_keeps_schedule_alive() {
        let ctx = create_test_setup(Duration::from_millis(50));
        script_job(&ctx.source, "JOB_ID_1", "user-1");
        ctx.source.set_failing(true);

        // Immediate tick fails; no notification, no panic.
        ctx.scheduler.track(target("user-1")).await;
        assert_eq!(ctx.seen.lock().unwrap().len(), 0);

        // Once the source recovers, the surviving schedule delivers.
        ctx.source.set_failing(false);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!ctx.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_track_async_does_not_require_await() {
        let ctx = create_test_setup(Duration::from_secs(60));
        script_job(&ctx.source, "JOB_ID_1", "user-1");

        Arc::clone(&ctx.scheduler).track_async(target("user-1"));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        while ctx.scheduler.tracked_target().is_none() {
            assert!(tokio::time::Instant::now() < deadline, "track never ran");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(ctx.scheduler.tracked_target(), Some(target("user-1")));
    }
}
