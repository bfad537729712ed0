use std::path::{Path, PathBuf};

/// Container format of a candidate file, derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Ogg,
    Unsupported,
}

impl AudioFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
            None => return AudioFormat::Unsupported,
        };
        match ext.as_str() {
            "mp3" => AudioFormat::Mp3,
            "ogg" => AudioFormat::Ogg,
            _ => AudioFormat::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unsupported)
    }
}

/// Metadata pulled from one audio file. Read-only after extraction.
#[derive(Clone, Debug)]
pub struct AudioTrack {
    pub path: PathBuf,
    pub format: AudioFormat,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_secs: Option<u64>,
}

/// Terminal classification of one file's processing attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The file already carried non-empty lyrics; nothing was fetched.
    Existing(PathBuf),
    /// Lyrics were fetched and written into the file.
    Downloaded(PathBuf),
    /// Every provider query came back empty.
    NotFound(PathBuf),
    /// The file could not be read, extracted, or written.
    Failed(PathBuf),
}

impl ProcessOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ProcessOutcome::Existing(path)
            | ProcessOutcome::Downloaded(path)
            | ProcessOutcome::NotFound(path)
            | ProcessOutcome::Failed(path) => path,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub existing: usize,
    pub downloaded: usize,
    pub not_found: usize,
    pub failed: usize,
    /// NotFound and Failed paths, in the order their outcomes arrived.
    pub unresolved: Vec<PathBuf>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.existing + self.downloaded + self.not_found + self.failed
    }
}

/// Pure fold over the per-file outcomes; order of the input only affects
/// the order of the unresolved list.
pub fn summarize(outcomes: &[ProcessOutcome]) -> RunSummary {
    let mut summary = RunSummary::default();
    for outcome in outcomes {
        match outcome {
            ProcessOutcome::Existing(_) => summary.existing += 1,
            ProcessOutcome::Downloaded(_) => summary.downloaded += 1,
            ProcessOutcome::NotFound(path) => {
                summary.not_found += 1;
                summary.unresolved.push(path.clone());
            }
            ProcessOutcome::Failed(path) => {
                summary.failed += 1;
                summary.unresolved.push(path.clone());
            }
        }
    }
    summary
}
