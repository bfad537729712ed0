use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_USER_AGENT: &str = "lrcsync/0.1 (https://lrclib.net)";

/// Command-line options. Every flag also reads an `LRCSYNC_*` environment
/// variable so the tool can run unattended from cron.
#[derive(Debug, Parser)]
#[command(name = "lrcsync", about = "Fetch synchronized lyrics into audio file tags")]
pub struct Args {
    /// Root directory to scan for audio files.
    #[arg(long, env = "LRCSYNC_FOLDER")]
    pub folder: PathBuf,

    /// Maximum number of files to process; 0 means unlimited.
    #[arg(long, env = "LRCSYNC_LIMIT", default_value_t = 0)]
    pub limit: usize,

    /// Number of concurrent worker tasks.
    #[arg(long, env = "LRCSYNC_WORKERS", default_value_t = 1)]
    pub workers: usize,

    /// Seconds each worker waits between files, as a courtesy to the
    /// lyrics service.
    #[arg(long, env = "LRCSYNC_PAUSE_SECS", default_value_t = 25)]
    pub pause_secs: u64,

    /// User-Agent header sent with every lyrics request.
    #[arg(long, env = "LRCSYNC_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "LRCSYNC_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Lock file guarding against concurrent runs.
    #[arg(long, env = "LRCSYNC_LOCK_FILE", default_value = "/tmp/lrcsync.lock")]
    pub lock_file: PathBuf,
}
