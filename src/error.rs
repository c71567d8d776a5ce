//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: Issues with CLI configuration and taxonomy loading
//! - InputError: Issues reading repository lists
//! - FetchError: Issues acquiring repository content
//! - StoreError: Issues persisting analysis records
//! - GraphError: Invalid requests against a dependency graph

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Repository list related errors
    #[error(transparent)]
    Input(#[from] InputError),

    /// Repository acquisition errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Result persistence errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Graph query errors
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A taxonomy word list could not be read
    #[error("failed to read taxonomy file {path}: {source}")]
    TaxonomyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Worker pool size must be positive
    #[error("invalid worker count '{value}': expected a positive integer")]
    InvalidWorkers { value: usize },

    /// A working directory could not be prepared
    #[error("failed to prepare directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to repository list input
#[derive(Error, Debug)]
pub enum InputError {
    /// Failed to list or read an input file
    #[error("failed to read repository list {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header does not name a usable column
    #[error("repository list {path} has neither a 'URL' nor a 'ProjectID' column")]
    MissingColumn { path: PathBuf },
}

/// Errors related to fetching repository content
#[derive(Error, Debug)]
pub enum FetchError {
    /// Repository identity does not map to an owner/name pair
    #[error("cannot derive a clone location from '{name}'")]
    InvalidName { name: String },

    /// Remote metadata lookup failed
    #[error("failed to look up size of {repo}: {message}")]
    SizeLookup { repo: String, message: String },

    /// Clone command failed
    #[error("failed to clone {repo}: {message}")]
    Clone { repo: String, message: String },

    /// External tool invocation failed
    #[error("failed to run {tool}: {message}")]
    Tool { tool: String, message: String },
}

/// Errors related to result persistence
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to write or rename a result document
    #[error("failed to write result {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a record
    #[error("failed to serialize result {path}: {message}")]
    SerializeError { path: PathBuf, message: String },

    /// Failed to list the results directory
    #[error("failed to list results in {path}: {source}")]
    ListError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to graph queries
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// Longest path is undefined on graphs with a directed cycle
    #[error("longest path requested on a cyclic graph")]
    Cyclic,
}

impl ConfigError {
    /// Creates a new TaxonomyRead error
    pub fn taxonomy_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::TaxonomyRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Directory error
    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Directory {
            path: path.into(),
            source,
        }
    }
}

impl InputError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InputError::ReadError {
            path: path.into(),
            source,
        }
    }
}

impl FetchError {
    /// Creates a new SizeLookup error
    pub fn size_lookup(repo: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::SizeLookup {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Creates a new Clone error
    pub fn clone_failed(repo: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Clone {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Creates a new Tool error
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::WriteError {
            path: path.into(),
            source,
        }
    }
}
