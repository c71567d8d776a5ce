//! Evidence aggregation
//!
//! Merges the tags produced by the descriptor, container-file and manifest
//! analyzers into one normalized [`RepositoryRecord`] and derives its
//! summary fields.

use crate::artifact::{ContainerFileAnalysis, ManifestAnalysis};
use crate::compose::{ComposeAnalysis, Service};
use crate::domain::{RepositoryFacts, RepositoryRecord, Tags};
use crate::taxonomy::CategoryKind;
use std::collections::{BTreeSet, HashSet};

/// Returns true if the dependency edges into database services outnumber
/// the distinct database services they reach
///
/// Each service counts at most one edge per database service.
pub fn shared_database(services: &[Service]) -> bool {
    let databases: HashSet<&str> = services
        .iter()
        .filter(|s| s.database().is_some())
        .map(|s| s.name.as_str())
        .collect();

    let mut edges = 0;
    let mut targets = HashSet::new();
    for service in services {
        let reached: HashSet<&str> = service
            .depends_on
            .iter()
            .map(String::as_str)
            .filter(|dep| databases.contains(dep))
            .collect();
        edges += reached.len();
        targets.extend(reached);
    }

    edges > targets.len()
}

/// Collapse generic sentinel tags in every category that has one
///
/// Database tags ending in the sentinel (`mongodb`, `couchdb`) collapse to
/// the bare sentinel. Then, if more than one distinct tag remains, the bare
/// sentinel is dropped.
pub fn normalize(tags: &mut Tags) {
    for kind in CategoryKind::all() {
        let Some(sentinel) = kind.sentinel() else {
            continue;
        };
        let set = tags.get_mut(*kind);
        if *kind == CategoryKind::Dbs {
            *set = set
                .iter()
                .map(|tag| collapse_suffix(tag, sentinel))
                .collect();
        }
        if set.len() > 1 {
            set.remove(sentinel);
        }
    }
}

fn collapse_suffix(tag: &str, sentinel: &str) -> String {
    if tag.ends_with(sentinel) {
        sentinel.to_string()
    } else {
        tag.to_string()
    }
}

/// Merges analyzer outputs into a repository record
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceAggregator;

impl EvidenceAggregator {
    /// Create an aggregator
    pub fn new() -> Self {
        Self
    }

    /// Build the record of one repository
    pub fn aggregate(
        &self,
        facts: RepositoryFacts,
        dockers: Vec<ContainerFileAnalysis>,
        structure: ComposeAnalysis,
        files: Vec<ManifestAnalysis>,
    ) -> RepositoryRecord {
        let mut tags = Tags::new();
        for file in &files {
            tags.merge(&file.tags);
        }
        for service in &structure.services {
            tags.merge(&service.tags);
        }
        for docker in &dockers {
            tags.merge(&docker.tags);
        }
        tags.langs.extend(facts.languages.iter().cloned());
        normalize(&mut tags);

        let images: BTreeSet<String> = dockers
            .iter()
            .filter(|d| !d.from.is_empty())
            .map(|d| d.from.clone())
            .collect();

        let num_dockers = dockers.len();
        let num_files = num_dockers + files.len() + 1;
        let avg_size_service = facts.size as f64 / num_dockers.max(1) as f64;

        RepositoryRecord {
            url: facts.url,
            name: facts.name,
            committers: facts.committers,
            size: facts.size,
            languages: facts.languages,
            num_services: structure.num_services,
            shared_dbs: structure.detected_dbs.shared_dbs,
            dockers,
            structure,
            files,
            counts: tags.counts(),
            tags,
            num_dockers,
            images: images.into_iter().collect(),
            num_files,
            avg_size_service,
        }
    }
}
