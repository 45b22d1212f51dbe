//! BuildWatch CLI - headless polling demo
//!
//! Seeds a scripted data source, tracks one search target, and prints every
//! notification. A stand-in for a real host (tray icon, IDE widget) wired
//! to a real transport.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use buildwatch::logging::{default_log_dir, default_log_file, init_logging};
use buildwatch::model::{BuildResult, JobIdentity, JobStatus, SearchTarget};
use buildwatch::service::{BuildWatchService, ServiceConfig};
use buildwatch::source::{DataSource, MockDataSource};

#[derive(Parser)]
#[command(name = "buildwatch")]
#[command(about = "Poll build status for a tracked owner", long_about = None)]
#[command(version = buildwatch::VERSION)]
struct Args {
    /// Project to search in
    #[arg(long, default_value = "PROJECT_1")]
    project: String,

    /// Job category to search in
    #[arg(long, default_value = "JOB_CATEGORY")]
    category: String,

    /// Owner whose builds to track
    #[arg(long, default_value = "user-1")]
    owner: String,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "2000")]
    interval_ms: u64,

    /// How many poll intervals to run before exiting
    #[arg(long, default_value = "5")]
    ticks: u32,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

/// Seed the demo source with a few builds in the requested category.
fn seed_source(args: &Args) -> Arc<MockDataSource> {
    let source = Arc::new(MockDataSource::new());

    let newest = JobIdentity::new(&args.project, "build-103", &args.category);
    let mine = JobIdentity::new(&args.project, "build-102", &args.category);
    let older = JobIdentity::new(&args.project, "build-101", &args.category);

    source.set_jobs(
        &args.project,
        &args.category,
        vec![newest.clone(), mine.clone(), older.clone()],
    );
    source.set_status(JobStatus::new(newest, BuildResult::Running, "someone-else"));
    source.set_status(
        JobStatus::new(mine, BuildResult::Success, &args.owner)
            .with_stage("deploy")
            .with_duration_ms(312_000),
    );
    source.set_status(JobStatus::new(older, BuildResult::Failure, "someone-else"));

    source
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("Error: failed to initialize logging: {error}");
            process::exit(1);
        }
    };

    let mut config = ServiceConfig::default()
        .with_poll_interval(Duration::from_millis(args.interval_ms));
    if let Some(cache_dir) = &args.cache_dir {
        config = config.with_cache_dir(cache_dir);
    }

    let source = seed_source(&args);
    let service = BuildWatchService::open(config, source as Arc<dyn DataSource>);

    service.subscribe(Arc::new(|status: &JobStatus| {
        if status.is_unknown() {
            println!("no matching build");
        } else {
            println!("{status}");
        }
    }));

    let target = SearchTarget::new(&args.project, &args.category, &args.owner);
    println!("Tracking: {target}");
    service.track(target).await;

    let run_for = Duration::from_millis(args.interval_ms * u64::from(args.ticks));
    info!(run_for_ms = run_for.as_millis() as u64, "Polling");
    tokio::time::sleep(run_for).await;

    service.close();
}
