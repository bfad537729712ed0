use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum LockError {
    AlreadyRunning(PathBuf),
    Io(std::io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::AlreadyRunning(path) => {
                write!(f, "another instance holds the lock at {:?}", path)
            }
            LockError::Io(err) => write!(f, "lock io error: {}", err),
        }
    }
}

impl std::error::Error for LockError {}

impl From<std::io::Error> for LockError {
    fn from(err: std::io::Error) -> Self {
        LockError::Io(err)
    }
}

/// Exclusive run guard backed by a lock file. Creating the file with
/// `create_new` makes acquisition atomic: exactly one process wins. The
/// file is removed when the guard drops. A crashed run leaves a stale
/// lock behind; the operator removes it by hand.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(LockError::AlreadyRunning(path.to_path_buf()))
            }
            Err(err) => return Err(err.into()),
        };
        // PID payload is an operator aid for identifying the holder.
        writeln!(file, "{}", std::process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
