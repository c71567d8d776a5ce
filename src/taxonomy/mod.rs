//! Curated role taxonomies
//!
//! This module provides:
//! - CategoryKind: the seven role categories a token can be classified into
//! - Category: an immutable, ordered word list for one category
//! - Taxonomy: all categories, loaded once at startup and shared read-only
//! - Exact-match classification and tokenization helpers

mod matcher;
mod words;

pub use matcher::{match_alls, match_one, match_ones};
pub use words::{keywords, words};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Role categories used to tag services and artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Databases and data stores
    Dbs,
    /// Web and application servers
    Servers,
    /// Message buses and brokers
    Buses,
    /// Programming languages
    Langs,
    /// API gateways and reverse proxies
    Gates,
    /// Monitoring and observability
    Monitors,
    /// Service discovery
    Discos,
}

impl CategoryKind {
    /// Returns the serialized key for this category
    pub fn key(&self) -> &'static str {
        match self {
            CategoryKind::Dbs => "dbs",
            CategoryKind::Servers => "servers",
            CategoryKind::Buses => "buses",
            CategoryKind::Langs => "langs",
            CategoryKind::Gates => "gates",
            CategoryKind::Monitors => "monitors",
            CategoryKind::Discos => "discos",
        }
    }

    /// Returns the word-list files this category is loaded from
    pub fn source_files(&self) -> &'static [&'static str] {
        match self {
            CategoryKind::Dbs => &["db.csv", "db-2.csv"],
            CategoryKind::Servers => &["server.csv"],
            CategoryKind::Buses => &["bus.csv"],
            CategoryKind::Langs => &["lang.csv"],
            CategoryKind::Gates => &["gateway.csv"],
            CategoryKind::Monitors => &["monitor.csv"],
            CategoryKind::Discos => &["discovery.csv"],
        }
    }

    /// Returns the generic tag that carries no discriminative value once
    /// a more specific tag of the same category is present
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            CategoryKind::Dbs => Some("db"),
            CategoryKind::Buses => Some("bus"),
            CategoryKind::Gates => Some("gateway"),
            CategoryKind::Monitors => Some("monitoring"),
            _ => None,
        }
    }

    /// Returns true if a service tagged with this category is infrastructure
    /// rather than business logic
    pub fn is_infrastructure(&self) -> bool {
        !matches!(self, CategoryKind::Langs)
    }

    /// Returns all categories
    pub fn all() -> &'static [CategoryKind] {
        &[
            CategoryKind::Dbs,
            CategoryKind::Servers,
            CategoryKind::Buses,
            CategoryKind::Langs,
            CategoryKind::Gates,
            CategoryKind::Monitors,
            CategoryKind::Discos,
        ]
    }

    /// Returns the categories used for descriptor services and manifests
    pub fn infrastructure() -> &'static [CategoryKind] {
        &[
            CategoryKind::Dbs,
            CategoryKind::Servers,
            CategoryKind::Buses,
            CategoryKind::Gates,
            CategoryKind::Monitors,
            CategoryKind::Discos,
        ]
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// An immutable, ordered word list for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    kind: CategoryKind,
    words: Vec<String>,
}

impl Category {
    /// Create a category; words are lowercased and deduplicated keeping
    /// their first position
    pub fn new<I, S>(kind: CategoryKind, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .filter(|w| seen.insert(w.clone()))
            .collect();
        Self { kind, words }
    }

    /// Returns the category kind
    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    /// Returns the words in load order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Returns true if the token equals any word, ignoring case
    pub fn matches(&self, token: &str) -> bool {
        match_one(token, self).is_some()
    }
}

/// All role categories, constructed once and passed explicitly to every
/// component that classifies tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Build a taxonomy from in-memory word lists; categories without an
    /// entry are empty
    pub fn from_words<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CategoryKind, &'a [&'a str])>,
    {
        let mut lists: Vec<(CategoryKind, Vec<&str>)> =
            CategoryKind::all().iter().map(|k| (*k, Vec::new())).collect();
        for (kind, words) in entries {
            if let Some((_, list)) = lists.iter_mut().find(|(k, _)| *k == kind) {
                list.extend_from_slice(words);
            }
        }
        Self {
            categories: lists
                .into_iter()
                .map(|(kind, words)| Category::new(kind, words))
                .collect(),
        }
    }

    /// Load every category from its word-list files in `dir`
    ///
    /// Each file holds one word per line. The database category merges two
    /// lists.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut categories = Vec::with_capacity(CategoryKind::all().len());
        for kind in CategoryKind::all() {
            let mut words = Vec::new();
            for file in kind.source_files() {
                let path = dir.join(file);
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::taxonomy_read(&path, e))?;
                words.extend(content.lines().map(str::to_string));
            }
            let category = Category::new(*kind, words);
            tracing::debug!(category = %kind, words = category.words().len(), "Loaded taxonomy");
            categories.push(category);
        }
        Ok(Self { categories })
    }

    /// Returns the category of the given kind
    pub fn category(&self, kind: CategoryKind) -> &Category {
        // Categories are stored in declaration order
        &self.categories[kind as usize]
    }

    /// Iterate over all categories
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }
}
