use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use common::AudioFormat;

#[derive(Debug)]
pub enum ScanError {
    InvalidRoot(PathBuf),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::InvalidRoot(path) => write!(f, "not a directory: {:?}", path),
        }
    }
}

impl std::error::Error for ScanError {}

/// Collects supported audio files under `root`, depth-first with entries
/// sorted by file name so repeated runs visit files in the same order.
/// `limit > 0` caps the selection; `limit == 0` means unlimited. Entries
/// that cannot be read are skipped with a warning; only a bad root fails
/// the scan.
pub fn scan(root: &Path, limit: usize) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRoot(root.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !AudioFormat::from_path(entry.path()).is_supported() {
            continue;
        }
        files.push(entry.into_path());
        if limit > 0 && files.len() == limit {
            break;
        }
    }
    Ok(files)
}
