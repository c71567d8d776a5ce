//! Core domain models for msdetect
//!
//! This module contains the fundamental types used throughout the application:
//! - Repository references and identifier resolution
//! - Per-category tag sets and their counts
//! - The persisted repository record

mod record;
mod repo_ref;
mod tags;

pub use record::{RepositoryFacts, RepositoryRecord};
pub use repo_ref::{identifier_from_output, resolve_identifier, sanitize, RepoRef, ResolvedUrl};
pub use tags::{TagCounts, Tags};
