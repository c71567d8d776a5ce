//! Persisted result store
//!
//! One pretty-printed JSON document per analyzed repository. The presence
//! of a document marks its repository as done; documents are written to a
//! `.partial` file first and renamed into place so a crash never leaves a
//! truncated result behind.

use crate::domain::{identifier_from_output, RepoRef, RepositoryRecord};
use crate::error::StoreError;
use std::fs;
use std::path::PathBuf;

const RESULT_EXTENSION: &str = "json";
const PARTIAL_EXTENSION: &str = "partial";

/// Directory of result documents
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Document path for a repository
    pub fn path_for(&self, repo: &RepoRef) -> PathBuf {
        self.root
            .join(format!("{}.{}", repo.output_stem(), RESULT_EXTENSION))
    }

    /// Returns true if the repository already has a document
    pub fn exists(&self, repo: &RepoRef) -> bool {
        self.path_for(repo).is_file()
    }

    /// Write a record, replacing any previous document atomically
    pub fn persist(&self, repo: &RepoRef, record: &RepositoryRecord) -> Result<PathBuf, StoreError> {
        let path = self.path_for(repo);
        let partial = path.with_extension(format!("{}.{}", RESULT_EXTENSION, PARTIAL_EXTENSION));

        let json = serde_json::to_string_pretty(record).map_err(|e| StoreError::SerializeError {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&partial, json).map_err(|e| StoreError::write_error(&partial, e))?;
        fs::rename(&partial, &path).map_err(|e| StoreError::write_error(&path, e))?;

        tracing::debug!(path = %path.display(), "Result persisted");
        Ok(path)
    }

    /// Names of all persisted documents, sorted
    pub fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::ListError {
                    path: self.root.clone(),
                    source: e,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ListError {
                path: self.root.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RESULT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Identifiers of all persisted repositories, recovered from file names
    pub fn completed_identifiers(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .list_names()?
            .iter()
            .map(|name| identifier_from_output(name))
            .collect())
    }

    /// Number of persisted documents
    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list_names()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::EvidenceAggregator;
    use crate::compose::ComposeAnalysis;
    use crate::domain::RepositoryFacts;
    use tempfile::TempDir;

    fn record(repo: &RepoRef) -> RepositoryRecord {
        let facts = RepositoryFacts {
            url: repo.url.clone(),
            name: repo.name.clone(),
            committers: 1,
            size: 10,
            languages: vec!["go".to_string()],
        };
        EvidenceAggregator::new().aggregate(facts, Vec::new(), ComposeAnalysis::empty(""), Vec::new())
    }

    #[test]
    fn test_path_for_sanitizes_name() {
        let store = ResultStore::new("/results");
        let repo = RepoRef::from_url("https://github.com/acme/my_shop");
        assert_eq!(
            store.path_for(&repo),
            PathBuf::from("/results/acme#my#shop.json")
        );
    }

    #[test]
    fn test_persist_then_exists() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::new(dir.path());
        let repo = RepoRef::from_url("https://github.com/acme/shop");

        assert!(!store.exists(&repo));
        let path = store.persist(&repo, &record(&repo)).unwrap();
        assert!(store.exists(&repo));

        let content = fs::read_to_string(&path).unwrap();
        let parsed: RepositoryRecord = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.name, "acme/shop");
        assert_eq!(parsed.languages, vec!["go"]);

        // no partial file is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_list_names_ignores_partial_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a#b.json"), "{}").unwrap();
        fs::write(dir.path().join("c#d.json.partial"), "{").unwrap();
        let store = ResultStore::new(dir.path());

        assert_eq!(store.list_names().unwrap(), vec!["a#b.json"]);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.completed_identifiers().unwrap(), vec!["a_b"]);
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::new(dir.path().join("absent"));
        assert!(store.list_names().unwrap().is_empty());
    }
}
