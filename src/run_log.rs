//! Per-run side-channel log files
//!
//! Every run writes into `logs/<YYYY-MM-DD-HH-MM-SS>/`:
//! - `generic_error.txt`: repositories that errored, with the cause chain
//! - `num_errors.txt`: current value of the contention/error counter
//! - `probably_invalid_url.txt`: identifiers that resolved without a namespace
//! - `errors_on_cloning.txt`: repositories that could not be fetched

use crate::error::ConfigError;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const GENERIC_ERROR_FILE: &str = "generic_error.txt";
pub const NUM_ERRORS_FILE: &str = "num_errors.txt";
pub const INVALID_URL_FILE: &str = "probably_invalid_url.txt";
pub const CLONE_ERROR_FILE: &str = "errors_on_cloning.txt";

const DIR_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Side-channel files of one run plus the shared counter
#[derive(Debug)]
pub struct RunLog {
    dir: PathBuf,
    counter: Mutex<u64>,
    appends: Mutex<()>,
}

impl RunLog {
    /// Create the run directory for the current local time
    pub fn open(root: &Path) -> Result<Self, ConfigError> {
        Self::create(root, Local::now())
    }

    /// Create the run directory for `started` and initialize its files
    pub fn create(root: &Path, started: DateTime<Local>) -> Result<Self, ConfigError> {
        let dir = root.join(started.format(DIR_FORMAT).to_string());
        fs::create_dir_all(&dir).map_err(|e| ConfigError::directory(&dir, e))?;

        for name in [GENERIC_ERROR_FILE, INVALID_URL_FILE, CLONE_ERROR_FILE] {
            let path = dir.join(name);
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| ConfigError::directory(&path, e))?;
        }
        let counter_path = dir.join(NUM_ERRORS_FILE);
        fs::write(&counter_path, "0").map_err(|e| ConfigError::directory(&counter_path, e))?;

        tracing::debug!(dir = %dir.display(), "Run log created");
        Ok(Self {
            dir,
            counter: Mutex::new(0),
            appends: Mutex::new(()),
        })
    }

    /// The run directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Increment the shared counter and overwrite its file with the new value
    pub fn increment_errors(&self) -> u64 {
        let mut counter = self.counter.lock().unwrap_or_else(PoisonError::into_inner);
        *counter += 1;
        let path = self.dir.join(NUM_ERRORS_FILE);
        if let Err(e) = fs::write(&path, counter.to_string()) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to update error counter");
        }
        *counter
    }

    /// Current counter value
    pub fn error_count(&self) -> u64 {
        *self.counter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a repository that failed during analysis
    pub fn log_generic_error(&self, identity: &str, error: &anyhow::Error) {
        self.append(GENERIC_ERROR_FILE, &format!("{:#};{}", error, identity));
    }

    /// Record an identifier that resolved to a probably invalid URL
    pub fn log_invalid_url(&self, identifier: &str, url: &str) {
        self.append(INVALID_URL_FILE, &format!("{};{}", identifier, url));
    }

    /// Record a repository that could not be fetched
    pub fn log_clone_error(&self, identity: &str, error: &dyn std::fmt::Display) {
        self.append(CLONE_ERROR_FILE, &format!("{};{}", identity, error));
    }

    fn append(&self, name: &str, line: &str) {
        let _guard = self.appends.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.dir.join(name);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Failed to append to run log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn run_log(root: &Path) -> RunLog {
        let started = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        RunLog::create(root, started).unwrap()
    }

    #[test]
    fn test_creates_timestamped_directory() {
        let dir = TempDir::new().unwrap();
        let log = run_log(dir.path());
        assert_eq!(log.dir(), dir.path().join("2024-03-05-14-07-09"));
        for name in [GENERIC_ERROR_FILE, NUM_ERRORS_FILE, INVALID_URL_FILE, CLONE_ERROR_FILE] {
            assert!(log.dir().join(name).is_file(), "{} missing", name);
        }
        let counter = fs::read_to_string(log.dir().join(NUM_ERRORS_FILE)).unwrap();
        assert_eq!(counter, "0");
    }

    #[test]
    fn test_counter_overwrites_file() {
        let dir = TempDir::new().unwrap();
        let log = run_log(dir.path());
        log.increment_errors();
        assert_eq!(log.increment_errors(), 2);
        let counter = fs::read_to_string(log.dir().join(NUM_ERRORS_FILE)).unwrap();
        assert_eq!(counter, "2");
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let log = Arc::new(run_log(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        log.increment_errors();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.error_count(), 200);
        let counter = fs::read_to_string(log.dir().join(NUM_ERRORS_FILE)).unwrap();
        assert_eq!(counter, "200");
    }

    #[test]
    fn test_generic_error_includes_cause_chain() {
        let dir = TempDir::new().unwrap();
        let log = run_log(dir.path());
        let error = anyhow::anyhow!("disk full").context("failed to persist acme/shop");
        log.log_generic_error("https://github.com/acme/shop", &error);

        let content = fs::read_to_string(log.dir().join(GENERIC_ERROR_FILE)).unwrap();
        assert_eq!(
            content,
            "failed to persist acme/shop: disk full;https://github.com/acme/shop\n"
        );
    }

    #[test]
    fn test_side_channel_lines() {
        let dir = TempDir::new().unwrap();
        let log = run_log(dir.path());
        log.log_invalid_url("gitlab.com", "https://gitlab.com");
        log.log_clone_error("acme/shop", &"exit status 128");

        let invalid = fs::read_to_string(log.dir().join(INVALID_URL_FILE)).unwrap();
        assert_eq!(invalid, "gitlab.com;https://gitlab.com\n");
        let cloning = fs::read_to_string(log.dir().join(CLONE_ERROR_FILE)).unwrap();
        assert_eq!(cloning, "acme/shop;exit status 128\n");
    }
}
