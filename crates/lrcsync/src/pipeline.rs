use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use common::{AudioFormat, ProcessOutcome};
use tags::LyricsTag;

use crate::provider::LyricsSource;
use crate::resolver;

#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    pub workers: usize,
    pub pause: Duration,
}

/// Runs every file to completion on a fixed pool of worker tasks. Workers
/// pull from a shared queue and sleep `pause` between files once a file has
/// actually been looked at. Completion order is unspecified.
pub async fn run_pipeline(
    files: Vec<PathBuf>,
    source: Arc<dyn LyricsSource>,
    options: PipelineOptions,
) -> Vec<ProcessOutcome> {
    let total = files.len();
    let queue = Arc::new(Mutex::new(VecDeque::from(files)));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let workers = options.workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let source = Arc::clone(&source);
        let tx = tx.clone();
        let pause = options.pause;
        handles.push(tokio::spawn(async move {
            loop {
                let next = queue.lock().pop_front();
                let path = match next {
                    Some(path) => path,
                    None => break,
                };
                let (outcome, paced) = process_file(path, source.as_ref()).await;
                let _ = tx.send(outcome);
                // No point pacing when there is nothing left to take.
                if paced && !pause.is_zero() && !queue.lock().is_empty() {
                    tokio::time::sleep(pause).await;
                }
            }
        }));
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    for handle in handles {
        let _ = handle.await;
    }
    outcomes
}

/// Produces exactly one outcome for `path`. The bool says whether the worker
/// should pace afterwards; a file that vanished before processing does not
/// count as service traffic.
async fn process_file(path: PathBuf, source: &dyn LyricsSource) -> (ProcessOutcome, bool) {
    if !path.is_file() {
        warn!("File disappeared before processing: {:?}", path);
        return (ProcessOutcome::Failed(path), false);
    }

    let tag = match LyricsTag::for_format(AudioFormat::from_path(&path)) {
        Some(tag) => tag,
        None => {
            warn!("Unsupported format: {:?}", path);
            return (ProcessOutcome::Failed(path), true);
        }
    };

    let read_path = path.clone();
    match tokio::task::spawn_blocking(move || tag.read_lyrics(&read_path)).await {
        Ok(Some(_)) => {
            debug!("Lyrics already present in {:?}", path);
            return (ProcessOutcome::Existing(path), true);
        }
        Ok(None) => {}
        Err(err) => {
            warn!("Lyrics read join error for {:?}: {}", path, err);
            return (ProcessOutcome::Failed(path), true);
        }
    }

    let extract_path = path.clone();
    let track = match tokio::task::spawn_blocking(move || metadata::extract(&extract_path)).await {
        Ok(Ok(track)) => track,
        Ok(Err(err)) => {
            warn!("Metadata extraction failed for {:?}: {}", path, err);
            return (ProcessOutcome::Failed(path), true);
        }
        Err(err) => {
            warn!("Metadata extraction join error for {:?}: {}", path, err);
            return (ProcessOutcome::Failed(path), true);
        }
    };

    let lyrics = match resolver::resolve(source, &track).await {
        Some(lyrics) => lyrics,
        None => {
            info!("No lyrics found for {:?}", path);
            return (ProcessOutcome::NotFound(path), true);
        }
    };

    let write_path = path.clone();
    match tokio::task::spawn_blocking(move || tag.write_lyrics(&write_path, &lyrics)).await {
        Ok(Ok(())) => {
            info!("Lyrics written to {:?}", path);
            (ProcessOutcome::Downloaded(path), true)
        }
        Ok(Err(err)) => {
            warn!("Lyrics write failed for {:?}: {}", path, err);
            (ProcessOutcome::Failed(path), true)
        }
        Err(err) => {
            warn!("Lyrics write join error for {:?}: {}", path, err);
            (ProcessOutcome::Failed(path), true)
        }
    }
}
