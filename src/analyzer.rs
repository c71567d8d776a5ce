//! Working-copy analysis
//!
//! Runs every artifact analyzer over a fetched working copy and aggregates
//! the results. All work here is blocking file I/O and CPU, so callers on
//! the async runtime run it through `spawn_blocking`.

use crate::aggregate::EvidenceAggregator;
use crate::artifact::{
    locate_artifacts, ArtifactPaths, ContainerFileAnalyzer, DockerfileParser, InstructionParser,
    ManifestAnalyzer,
};
use crate::compose::{ComposeAnalysis, ServiceGraphBuilder};
use crate::domain::{RepositoryFacts, RepositoryRecord};
use crate::taxonomy::Taxonomy;
use anyhow::Context;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Analyzes a working copy into a repository record
#[derive(Clone)]
pub struct RepositoryAnalyzer {
    compose: ServiceGraphBuilder,
    dockers: ContainerFileAnalyzer,
    manifests: ManifestAnalyzer,
    aggregator: EvidenceAggregator,
}

impl RepositoryAnalyzer {
    /// Create an analyzer with the built-in container-file parser
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self::with_parser(taxonomy, Arc::new(InstructionParser))
    }

    /// Create an analyzer with a specific container-file parser
    pub fn with_parser(taxonomy: Arc<Taxonomy>, parser: Arc<dyn DockerfileParser>) -> Self {
        Self {
            compose: ServiceGraphBuilder::new(Arc::clone(&taxonomy)),
            dockers: ContainerFileAnalyzer::new(Arc::clone(&taxonomy), parser),
            manifests: ManifestAnalyzer::new(taxonomy),
            aggregator: EvidenceAggregator::new(),
        }
    }

    /// Analyze the working copy at `workdir`
    pub fn analyze(&self, workdir: &Path, facts: RepositoryFacts) -> anyhow::Result<RepositoryRecord> {
        let artifacts = locate_artifacts(workdir);
        tracing::debug!(
            dockerfiles = artifacts.dockerfiles.len(),
            composes = artifacts.composes.len(),
            manifests = artifacts.manifests.len(),
            "Artifacts located"
        );

        let mut dockers = Vec::with_capacity(artifacts.dockerfiles.len());
        for path in &artifacts.dockerfiles {
            let content = read_artifact(workdir, path)?;
            dockers.push(self.dockers.analyze(path, &content));
        }

        let structure = match artifacts.primary_compose() {
            Some(path) => {
                let content = read_artifact(workdir, path)?;
                self.compose.analyze(path, &content)
            }
            None => ComposeAnalysis::empty(""),
        };

        let mut files = Vec::with_capacity(artifacts.manifests.len());
        for path in &artifacts.manifests {
            let content = read_artifact(workdir, path)?;
            files.push(self.manifests.analyze(path, &content));
        }

        Ok(self.aggregator.aggregate(facts, dockers, structure, files))
    }
}

fn read_artifact(workdir: &Path, relative: &str) -> anyhow::Result<Vec<u8>> {
    let path = ArtifactPaths::resolve(workdir, relative);
    fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
}
