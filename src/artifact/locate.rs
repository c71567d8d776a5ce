//! Artifact detection inside a fetched working copy
//!
//! Features:
//! - Detects container files, descriptors and dependency manifests at any depth
//! - Skips version-control metadata
//! - Returns paths relative to the working copy, with a leading `/`

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Container file name
pub const DOCKERFILE: &str = "Dockerfile";

/// Multi-container descriptor file name
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Manifest file names matched exactly
const MANIFEST_NAMES: &[&str] = &["requirements.txt", "pom.xml", "package.json"];

/// Manifest file extensions
const MANIFEST_EXTENSIONS: &[&str] = &["gradle"];

/// Kind of artifact a file represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Container file
    Dockerfile,
    /// Multi-container descriptor
    Compose,
    /// Dependency manifest
    Manifest,
}

impl ArtifactKind {
    /// Classify a file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name == DOCKERFILE {
            return Some(ArtifactKind::Dockerfile);
        }
        if name == COMPOSE_FILE {
            return Some(ArtifactKind::Compose);
        }
        if MANIFEST_NAMES.contains(&name) {
            return Some(ArtifactKind::Manifest);
        }
        let extension = Path::new(name).extension().and_then(|e| e.to_str());
        match extension {
            Some(ext) if MANIFEST_EXTENSIONS.contains(&ext) => Some(ArtifactKind::Manifest),
            _ => None,
        }
    }
}

/// Artifacts found in a working copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Container files
    pub dockerfiles: Vec<String>,
    /// Descriptors; only the first is analyzed
    pub composes: Vec<String>,
    /// Dependency manifests
    pub manifests: Vec<String>,
}

impl ArtifactPaths {
    /// The descriptor to analyze, if any
    pub fn primary_compose(&self) -> Option<&str> {
        self.composes.first().map(String::as_str)
    }

    /// Absolute path of a relative artifact path
    pub fn resolve(root: &Path, relative: &str) -> PathBuf {
        root.join(relative.trim_start_matches('/'))
    }
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

/// Detect all artifacts under `root`, in file-name order per directory
pub fn locate_artifacts(root: &Path) -> ArtifactPaths {
    let mut found = ArtifactPaths::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_git_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(kind) = entry.file_name().to_str().and_then(ArtifactKind::from_file_name) else {
            continue;
        };
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = format!("/{}", relative.to_string_lossy());

        match kind {
            ArtifactKind::Dockerfile => found.dockerfiles.push(relative),
            ArtifactKind::Compose => found.composes.push(relative),
            ArtifactKind::Manifest => found.manifests.push(relative),
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_kind() {
        assert_eq!(ArtifactKind::from_file_name("Dockerfile"), Some(ArtifactKind::Dockerfile));
        assert_eq!(
            ArtifactKind::from_file_name("docker-compose.yml"),
            Some(ArtifactKind::Compose)
        );
        assert_eq!(
            ArtifactKind::from_file_name("build.gradle"),
            Some(ArtifactKind::Manifest)
        );
        assert_eq!(ArtifactKind::from_file_name("pom.xml"), Some(ArtifactKind::Manifest));
        assert_eq!(ArtifactKind::from_file_name("dockerfile"), None);
        assert_eq!(ArtifactKind::from_file_name("README.md"), None);
    }

    #[test]
    fn test_locate_nested_artifacts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::create_dir_all(root.join(".git/hooks")).unwrap();
        fs::write(root.join("docker-compose.yml"), "services: {}").unwrap();
        fs::write(root.join("api/Dockerfile"), "FROM java").unwrap();
        fs::write(root.join("api/pom.xml"), "<project/>").unwrap();
        fs::write(root.join("web/Dockerfile"), "FROM node").unwrap();
        fs::write(root.join("web/package.json"), "{}").unwrap();
        fs::write(root.join(".git/hooks/package.json"), "{}").unwrap();

        let found = locate_artifacts(root);
        assert_eq!(found.dockerfiles, vec!["/api/Dockerfile", "/web/Dockerfile"]);
        assert_eq!(found.primary_compose(), Some("/docker-compose.yml"));
        assert_eq!(found.manifests, vec!["/api/pom.xml", "/web/package.json"]);
    }

    #[test]
    fn test_resolve_relative_path() {
        let root = Path::new("/tmp/work");
        assert_eq!(
            ArtifactPaths::resolve(root, "/api/Dockerfile"),
            PathBuf::from("/tmp/work/api/Dockerfile")
        );
    }
}
