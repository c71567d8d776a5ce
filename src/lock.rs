//! Per-repository exclusive locks
//!
//! A lock file under the temp directory guards each repository, across
//! workers and across overlapping runs. Acquisition is polled for a short
//! timeout; contention is a normal outcome, not an error.

use crate::domain::RepoRef;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Delay between acquisition attempts
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// An acquired repository lock, released on drop
#[derive(Debug)]
pub struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Lock file path for a repository
    pub fn path_for(dir: &Path, repo: &RepoRef) -> PathBuf {
        dir.join(format!("{}.lock", repo.output_stem()))
    }

    /// Try to lock `repo` until `timeout` elapses
    ///
    /// Returns `Ok(None)` when another holder keeps the lock.
    pub async fn acquire(dir: &Path, repo: &RepoRef, timeout: Duration) -> io::Result<Option<Self>> {
        fs::create_dir_all(dir)?;
        let path = Self::path_for(dir, repo);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Some(Self { file, path })),
                Err(e) if is_contended(&e) => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
