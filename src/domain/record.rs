//! The persisted per-repository record

use super::{TagCounts, Tags};
use crate::artifact::{ContainerFileAnalysis, ManifestAnalysis};
use crate::compose::ComposeAnalysis;
use serde::{Deserialize, Serialize};

/// Repository facts gathered from the working copy before analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFacts {
    pub url: String,
    pub name: String,
    pub committers: usize,
    /// Size of the non-metadata content in KB
    pub size: u64,
    pub languages: Vec<String>,
}

/// Complete analysis of one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub url: String,
    pub name: String,
    pub committers: usize,
    /// Size in KB
    pub size: u64,
    /// Languages above the detection threshold
    pub languages: Vec<String>,
    /// Container-file analyses
    pub dockers: Vec<ContainerFileAnalysis>,
    /// Descriptor analysis, empty when the repository has no descriptor
    pub structure: ComposeAnalysis,
    /// Manifest analyses
    pub files: Vec<ManifestAnalysis>,
    /// Merged and normalized tags
    #[serde(flatten)]
    pub tags: Tags,
    #[serde(flatten)]
    pub counts: TagCounts,
    pub num_services: usize,
    pub shared_dbs: bool,
    pub num_dockers: usize,
    /// Distinct base images of the container files
    pub images: Vec<String>,
    pub num_files: usize,
    pub avg_size_service: f64,
}
