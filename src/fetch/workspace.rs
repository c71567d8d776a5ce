//! Working-copy location and facts

use crate::domain::RepoRef;
use crate::error::FetchError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use walkdir::WalkDir;

/// Working copy location: `<temp>/<owner>/<repo>`
pub fn workdir_for(temp: &Path, repo: &RepoRef) -> Result<PathBuf, FetchError> {
    let (owner, name) = repo.github_slug().ok_or_else(|| FetchError::InvalidName {
        name: repo.name.clone(),
    })?;
    Ok(temp.join(owner).join(name))
}

/// Number of distinct authors in the history; 0 when the history cannot be
/// read within `timeout`
pub async fn committer_count(workdir: &Path, timeout: Duration) -> usize {
    let git_dir = workdir.join(".git");
    let command = Command::new("git")
        .arg("--git-dir")
        .arg(&git_dir)
        .args(["shortlog", "-s", "HEAD"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, command).await {
        Ok(Ok(output)) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).lines().count()
        }
        Ok(Ok(output)) => {
            tracing::debug!(status = %output.status, "git shortlog failed");
            0
        }
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "git shortlog could not run");
            0
        }
        Err(_) => {
            tracing::debug!(timeout = ?timeout, "git shortlog timed out");
            0
        }
    }
}

/// Total size of the non-metadata files in KB
pub fn content_size_kb(workdir: &Path) -> u64 {
    let bytes: u64 = WalkDir::new(workdir)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum();
    bytes / 1000
}

/// Remove a working copy; failures are logged
pub fn remove_workdir(workdir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(workdir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %workdir.display(), error = %e, "Failed to remove working copy");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_workdir_for_github_repo() {
        let repo = RepoRef::from_url("https://github.com/acme/shop");
        assert_eq!(
            workdir_for(Path::new("temp"), &repo).unwrap(),
            PathBuf::from("temp/acme/shop")
        );
    }

    #[test]
    fn test_workdir_for_identifier_keeps_underscores() {
        let (repo, _) = RepoRef::from_identifier("acme_my_shop");
        assert_eq!(
            workdir_for(Path::new("temp"), &repo).unwrap(),
            PathBuf::from("temp/acme/my_shop")
        );
    }

    #[test]
    fn test_content_size_skips_git() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join(".git/objects/pack"), vec![0u8; 50_000]).unwrap();
        fs::write(dir.path().join("src/main.go"), vec![b'a'; 2_500]).unwrap();
        fs::write(dir.path().join("README.md"), vec![b'a'; 600]).unwrap();

        assert_eq!(content_size_kb(dir.path()), 3);
    }

    #[tokio::test]
    async fn test_committer_count_without_history() {
        let dir = TempDir::new().unwrap();
        assert_eq!(committer_count(dir.path(), Duration::from_secs(5)).await, 0);
    }

    #[test]
    fn test_remove_missing_workdir_is_quiet() {
        let dir = TempDir::new().unwrap();
        remove_workdir(&dir.path().join("absent"));
    }
}
