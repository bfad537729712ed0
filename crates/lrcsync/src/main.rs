mod cli;
mod lock;
mod pipeline;
mod provider;
mod resolver;
mod scan;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::{error, info, warn};

use cli::Args;
use common::summarize;
use lock::InstanceLock;
use pipeline::{run_pipeline, PipelineOptions};
use provider::{LrcLibClient, LyricsSource};

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let guard = match InstanceLock::acquire(&args.lock_file) {
        Ok(guard) => guard,
        Err(err) => {
            error!("Could not acquire instance lock: {}", err);
            std::process::exit(1);
        }
    };

    let code = run(&args).await;
    drop(guard);
    std::process::exit(code);
}

async fn run(args: &Args) -> i32 {
    let files = match scan::scan(&args.folder, args.limit) {
        Ok(files) => files,
        Err(err) => {
            error!("Scan failed: {}", err);
            return 1;
        }
    };
    info!("Found {} audio files under {:?}", files.len(), args.folder);

    let client = match Client::builder()
        .user_agent(&args.user_agent)
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            error!("Could not build HTTP client: {}", err);
            return 1;
        }
    };
    let source: Arc<dyn LyricsSource> = Arc::new(LrcLibClient::new(client));

    let options = PipelineOptions {
        workers: args.workers,
        pause: Duration::from_secs(args.pause_secs),
    };
    let outcomes = run_pipeline(files, source, options).await;

    let summary = summarize(&outcomes);
    info!(
        "Run complete: {} existing, {} downloaded, {} not found, {} failed ({} total)",
        summary.existing,
        summary.downloaded,
        summary.not_found,
        summary.failed,
        summary.total()
    );
    for path in &summary.unresolved {
        warn!("Unresolved: {:?}", path);
    }
    0
}
