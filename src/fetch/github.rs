//! GitHub-backed repository fetcher
//!
//! Size comes from the REST API (`GET /repos/{owner}/{repo}`, `size` in
//! KB); content is cloned over HTTPS with `git`. Prompts are disabled so a
//! private or missing repository fails instead of blocking a worker.

use super::RepositoryFetcher;
use crate::domain::RepoRef;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default GitHub API endpoint
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Timeout for metadata requests
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header, required by the GitHub API
const USER_AGENT: &str = concat!("msdetect/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    size: Option<u64>,
}

/// Fetcher for GitHub-hosted repositories
#[derive(Clone)]
pub struct GitHubFetcher {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubFetcher {
    /// Create a fetcher against the public API
    pub fn new() -> Result<Self, FetchError> {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Create a fetcher against a custom API endpoint
    pub fn with_api_base(api_base: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::size_lookup("", format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Authenticate API requests with a token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn slug(repo: &RepoRef) -> Result<(String, String), FetchError> {
        repo.github_slug().ok_or_else(|| FetchError::InvalidName {
            name: repo.name.clone(),
        })
    }
}

#[async_trait]
impl RepositoryFetcher for GitHubFetcher {
    async fn remote_size_kb(&self, repo: &RepoRef) -> Result<Option<u64>, FetchError> {
        let (owner, name) = Self::slug(repo)?;
        let url = format!("{}/repos/{}/{}", self.api_base, owner, name);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::size_lookup(&repo.name, e.to_string()))?;

        // Error bodies carry no size; the clone decides whether the repository exists
        if !response.status().is_success() {
            tracing::debug!(repo = %repo, status = %response.status(), "No size reported");
            return Ok(None);
        }

        let metadata: RepoMetadata = response
            .json()
            .await
            .map_err(|e| FetchError::size_lookup(&repo.name, format!("invalid response: {}", e)))?;
        Ok(metadata.size)
    }

    async fn fetch(&self, repo: &RepoRef, dest: &Path) -> Result<(), FetchError> {
        let (owner, name) = Self::slug(repo)?;
        let clone_url = format!("https://github.com/{}/{}", owner, name);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::clone_failed(&repo.name, e.to_string()))?;
        }

        tracing::debug!(repo = %repo, url = %clone_url, "Cloning");
        let output = Command::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg(&clone_url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| FetchError::clone_failed(&repo.name, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::clone_failed(&repo.name, stderr.trim()));
        }
        Ok(())
    }
}
