//! Integration tests for the service facade: lifecycle, persistence, and
//! tracking end to end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use buildwatch::cache::METADATA_CACHE_FILE;
use buildwatch::model::{BuildResult, JobIdentity, JobStatus, SearchTarget};
use buildwatch::service::{BuildWatchService, ServiceConfig};
use buildwatch::source::{DataSource, MockDataSource};
use tempfile::TempDir;

const PROJECT: &str = "PROJECT_1";
const CATEGORY: &str = "JOB_CATEGORY";

fn identity(job_id: &str) -> JobIdentity {
    JobIdentity::new(PROJECT, job_id, CATEGORY)
}

fn target(owner: &str) -> SearchTarget {
    SearchTarget::new(PROJECT, CATEGORY, owner)
}

fn scripted_source() -> Arc<MockDataSource> {
    let source = Arc::new(MockDataSource::new());
    let id = identity("JOB_ID_1");
    source.set_jobs(PROJECT, CATEGORY, vec![id.clone()]);
    source.set_status(
        JobStatus::new(id, BuildResult::Success, "user-1").with_stage("integration"),
    );
    source
}

fn open_service(dir: &TempDir, source: Arc<MockDataSource>) -> BuildWatchService {
    let config = ServiceConfig::default()
        .with_cache_dir(dir.path())
        .with_poll_interval(Duration::from_millis(50))
        .with_list_ttl(Duration::from_secs(30));
    BuildWatchService::open(config, source as Arc<dyn DataSource>)
}

fn recording_listener(service: &BuildWatchService) -> Arc<Mutex<Vec<JobStatus>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    service.subscribe(Arc::new(move |status: &JobStatus| {
        sink.lock().unwrap().push(status.clone());
    }));
    seen
}

#[tokio::test]
async fn resolve_through_facade_populates_caches() {
    let dir = TempDir::new().unwrap();
    let source = scripted_source();
    let service = open_service(&dir, Arc::clone(&source));

    let status = service.resolve(&target("user-1")).await.unwrap();

    assert_eq!(status.result, BuildResult::Success);
    assert_eq!(source.list_calls(), 1);
    assert_eq!(source.data_calls(), 1);

    // Warm now: no further remote calls.
    service.resolve(&target("user-1")).await.unwrap();
    assert_eq!(source.list_calls(), 1);
    assert_eq!(source.data_calls(), 1);
}

#[tokio::test]
async fn close_persists_metadata_across_restarts() {
    let dir = TempDir::new().unwrap();

    let source = scripted_source();
    let service = open_service(&dir, Arc::clone(&source));
    service.resolve(&target("user-1")).await.unwrap();
    service.close();

    // A fresh process with a fresh source: the job list is not persisted
    // (it goes stale in seconds) so one list call happens, but the terminal
    // metadata and owner entries come from disk.
    let fresh_source = Arc::new(MockDataSource::new());
    fresh_source.set_jobs(PROJECT, CATEGORY, vec![identity("JOB_ID_1")]);
    let service = open_service(&dir, Arc::clone(&fresh_source));

    let status = service.resolve(&target("user-1")).await.unwrap();

    assert_eq!(status.result, BuildResult::Success);
    assert_eq!(status.stage.as_deref(), Some("integration"));
    assert_eq!(fresh_source.list_calls(), 1);
    assert_eq!(fresh_source.data_calls(), 0);
}

#[tokio::test]
async fn corrupt_snapshot_degrades_to_cold_cache() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(METADATA_CACHE_FILE), "corrupt bytes").unwrap();

    let source = scripted_source();
    let service = open_service(&dir, Arc::clone(&source));

    let status = service.resolve(&target("user-1")).await.unwrap();

    assert_eq!(status.result, BuildResult::Success);
    assert_eq!(source.data_calls(), 1);
}

#[tokio::test]
async fn clear_cache_forces_refetch_through_facade() {
    let dir = TempDir::new().unwrap();
    let source = scripted_source();
    let service = open_service(&dir, Arc::clone(&source));

    service.resolve(&target("user-1")).await.unwrap();
    assert_eq!(source.data_calls(), 1);

    service.clear_cache();

    service.resolve(&target("user-1")).await.unwrap();
    assert_eq!(source.data_calls(), 2);
}

#[tokio::test]
async fn tracking_switch_only_notifies_new_target() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(MockDataSource::new());
    let id_1 = identity("JOB_ID_1");
    let id_2 = identity("JOB_ID_2");
    source.set_jobs(PROJECT, CATEGORY, vec![id_1.clone(), id_2.clone()]);
    source.set_status(JobStatus::new(id_1.clone(), BuildResult::Success, "user-1"));
    source.set_status(JobStatus::new(id_2.clone(), BuildResult::Failure, "user-2"));

    let service = open_service(&dir, Arc::clone(&source));
    let seen = recording_listener(&service);

    service.track(target("user-1")).await;
    service.track(target("user-2")).await;
    assert_eq!(service.tracked_target(), Some(target("user-2")));

    // Let several ticks land for the new target.
    tokio::time::sleep(Duration::from_millis(200)).await;
    service.stop_tracking();

    let seen = seen.lock().unwrap();
    // The immediate notification for user-1 happened before the switch;
    // every notification after the switch belongs to user-2's job.
    assert_eq!(seen[0].identity, id_1);
    assert!(seen.len() >= 3);
    for status in &seen[2..] {
        assert_eq!(status.identity, id_2);
    }
}

#[tokio::test]
async fn track_async_eventually_tracks_and_notifies() {
    let dir = TempDir::new().unwrap();
    let source = scripted_source();
    let service = open_service(&dir, Arc::clone(&source));
    let seen = recording_listener(&service);

    service.track_async(target("user-1"));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while seen.lock().unwrap().is_empty() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "no notification arrived"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(service.tracked_target(), Some(target("user-1")));
}

#[tokio::test]
async fn failed_tick_leaves_last_notified_state_standing() {
    let dir = TempDir::new().unwrap();
    let source = scripted_source();
    let service = open_service(&dir, Arc::clone(&source));
    let seen = recording_listener(&service);

    service.track(target("user-1")).await;
    assert_eq!(seen.lock().unwrap().len(), 1);

    // Break the source mid-tracking; clear caches so ticks really hit it.
    source.set_failing(true);
    service.clear_cache();
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Failing ticks produced no new notifications; the last one stands.
    let count_during_outage = seen.lock().unwrap().len();
    assert_eq!(count_during_outage, 1);

    // Recovery: the schedule was never torn down.
    source.set_failing(false);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(seen.lock().unwrap().len() > count_during_outage);

    service.stop_tracking();
}
