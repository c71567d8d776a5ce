//! Dependency manifest analysis
//!
//! Manifests (`requirements.txt`, `*.gradle`, `pom.xml`, `package.json`)
//! are not parsed structurally; every word of the file is matched against
//! the infrastructure categories.

use crate::domain::Tags;
use crate::taxonomy::{match_alls, words, CategoryKind, Taxonomy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Analysis of one dependency manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestAnalysis {
    /// Path relative to the repository root
    pub path: String,
    /// Every matched tag per category
    #[serde(flatten)]
    pub tags: Tags,
}

/// Analyzes manifests against a taxonomy
#[derive(Debug, Clone)]
pub struct ManifestAnalyzer {
    taxonomy: Arc<Taxonomy>,
}

impl ManifestAnalyzer {
    /// Create an analyzer for `taxonomy`
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Analyze a manifest; content that is not valid UTF-8 yields an
    /// analysis holding only the path
    pub fn analyze(&self, path: &str, content: &[u8]) -> ManifestAnalysis {
        let mut analysis = ManifestAnalysis {
            path: path.to_string(),
            tags: Tags::new(),
        };

        let text = match std::str::from_utf8(content) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path, error = %e, "Manifest is not valid UTF-8");
                return analysis;
            }
        };

        let tokens = words(&text.lines().collect::<Vec<_>>().join(" "));
        for kind in CategoryKind::infrastructure() {
            let matched = match_alls(&tokens, self.taxonomy.category(*kind));
            analysis.tags.get_mut(*kind).extend(matched);
        }
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ManifestAnalyzer {
        let taxonomy = Taxonomy::from_words([
            (CategoryKind::Dbs, &["mongodb", "mysql", "redis"][..]),
            (CategoryKind::Buses, &["kafka"][..]),
            (CategoryKind::Discos, &["eureka"][..]),
            (CategoryKind::Langs, &["java"][..]),
        ]);
        ManifestAnalyzer::new(Arc::new(taxonomy))
    }

    #[test]
    fn test_collects_all_matches() {
        let content = br#"{
  "dependencies": {
    "mongodb": "^4.0.0",
    "redis": "^3.1.0",
    "kafka-node": "^5.0.0"
  }
}"#;
        let analysis = analyzer().analyze("/package.json", content);
        assert_eq!(analysis.tags.dbs.len(), 2);
        assert!(analysis.tags.dbs.contains("mongodb"));
        assert!(analysis.tags.buses.contains("kafka"));
    }

    #[test]
    fn test_languages_not_tagged() {
        let content = b"<dependency><artifactId>eureka-client</artifactId></dependency> java";
        let analysis = analyzer().analyze("/pom.xml", content);
        assert!(analysis.tags.discos.contains("eureka"));
        assert!(analysis.tags.langs.is_empty());
    }

    #[test]
    fn test_invalid_encoding_keeps_only_path() {
        let analysis = analyzer().analyze("/requirements.txt", &[0xc3, 0x28, 0xff]);
        assert_eq!(analysis.path, "/requirements.txt");
        assert_eq!(analysis.tags, Tags::new());
    }
}
