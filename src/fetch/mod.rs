//! Repository acquisition and working-copy facts
//!
//! This module provides:
//! - The `RepositoryFetcher` seam (remote size lookup, clone)
//! - The `LanguageDetector` seam (detected-language list)
//! - GitHub and `github-linguist` implementations
//! - Working-copy helpers: location, committer count, content size

mod github;
mod linguist;
mod workspace;

pub use github::GitHubFetcher;
pub use linguist::{parse_linguist_output, GithubLinguist, LANGUAGE_THRESHOLD};
pub use workspace::{committer_count, content_size_kb, remove_workdir, workdir_for};

use crate::domain::RepoRef;
use crate::error::FetchError;
use async_trait::async_trait;
use std::path::Path;

/// Acquires repository content
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Size of the remote repository in KB; `None` when the host does not
    /// report one
    async fn remote_size_kb(&self, repo: &RepoRef) -> Result<Option<u64>, FetchError>;

    /// Clone the repository into `dest`
    async fn fetch(&self, repo: &RepoRef, dest: &Path) -> Result<(), FetchError>;
}

/// Detects the languages of a working copy
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Lowercased names of the languages above the detection threshold
    async fn detect(&self, workdir: &Path) -> Result<Vec<String>, FetchError>;
}
