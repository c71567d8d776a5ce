//! Validated run configuration

use crate::cli::{CliArgs, DEFAULT_MAX_SIZE_KB};
use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound of the default worker count
const MAX_DEFAULT_WORKERS: usize = 32;

/// How long lock acquisition is polled
pub const LOCK_TIMEOUT: Duration = Duration::from_millis(10);

/// Bound on reading the committer history
pub const COMMITTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Default worker count: `min(32, CPUs + 4)`
pub fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    MAX_DEFAULT_WORKERS.min(cpus + 4)
}

/// Configuration of one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub repos_dir: PathBuf,
    pub results_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub consts_dir: PathBuf,
    pub workers: usize,
    pub max_size_kb: u64,
    pub fix_errors: bool,
    pub debug: bool,
    pub lock_timeout: Duration,
    pub committer_timeout: Duration,
    pub show_progress: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            repos_dir: PathBuf::from("repos"),
            results_dir: PathBuf::from("results"),
            temp_dir: PathBuf::from("temp"),
            logs_dir: PathBuf::from("logs"),
            consts_dir: PathBuf::from("consts"),
            workers: default_workers(),
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            fix_errors: false,
            debug: false,
            lock_timeout: LOCK_TIMEOUT,
            committer_timeout: COMMITTER_TIMEOUT,
            show_progress: true,
        }
    }
}

impl AnalyzerConfig {
    /// Build a configuration from parsed arguments
    ///
    /// Debug mode forces a single worker.
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let workers = if args.debug {
            1
        } else {
            args.workers.unwrap_or_else(default_workers)
        };

        let config = Self {
            repos_dir: args.repos.clone(),
            results_dir: args.results.clone(),
            temp_dir: args.temp.clone(),
            logs_dir: args.logs.clone(),
            consts_dir: args.consts.clone(),
            workers,
            max_size_kb: args.max_size_kb,
            fix_errors: args.fix_errors,
            debug: args.debug,
            show_progress: !args.quiet,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that argument parsing cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers {
                value: self.workers,
            });
        }
        Ok(())
    }

    /// Create the results and temp directories
    pub fn prepare_directories(&self) -> Result<(), ConfigError> {
        for dir in [&self.results_dir, &self.temp_dir] {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::directory(dir, e))?;
        }
        Ok(())
    }
}
