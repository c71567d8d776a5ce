//! Per-artifact analyzers
//!
//! This module provides:
//! - Detection of container files, descriptors and manifests in a working copy
//! - Container-file analysis (base image, commands, tags)
//! - Manifest analysis (all tags found in the file)
//!
//! Analyzers are independent and side-effect free; malformed input yields
//! an analysis carrying only the artifact path.

mod dockerfile;
mod locate;
mod manifest;

pub use dockerfile::{
    ContainerFileAnalysis, ContainerFileAnalyzer, DockerCommand, DockerfileError,
    DockerfileParser, InstructionParser,
};
pub use locate::{locate_artifacts, ArtifactKind, ArtifactPaths, COMPOSE_FILE, DOCKERFILE};
pub use manifest::{ManifestAnalysis, ManifestAnalyzer};
