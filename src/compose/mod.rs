//! Multi-container descriptor analysis
//!
//! This module provides:
//! - Parsing of `docker-compose.yml` text into declared services
//! - Role tagging of each service from its image or build identity
//! - Full and reduced (business-logic only) dependency graphs
//! - Detection of database services and shared databases
//!
//! Malformed descriptors never fail the caller: they produce
//! [`ComposeParse::Unavailable`], which [`ServiceGraphBuilder::analyze`]
//! turns into an empty analysis.

mod service;

pub use service::{Service, ServiceBuilder};

use crate::aggregate::shared_database;
use crate::domain::Tags;
use crate::graph::{DependencyGraph, GraphMetrics};
use crate::taxonomy::{match_ones, words, CategoryKind, Taxonomy};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Database services found in a descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedDbs {
    /// Number of services tagged as a database
    pub num: usize,
    /// Distinct database tags
    pub names: Vec<String>,
    /// Names of the database services
    pub services: Vec<String>,
    /// True if at least two dependency edges target the same database service
    pub shared_dbs: bool,
}

/// Result of analyzing one descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeAnalysis {
    /// Descriptor path relative to the repository root
    pub path: String,
    /// Number of declared services
    pub num_services: usize,
    /// Declared services in descriptor order
    pub services: Vec<Service>,
    /// Database services
    pub detected_dbs: DetectedDbs,
    /// Metrics of the full dependency graph
    pub dep_graph_full: GraphMetrics,
    /// Metrics of the graph without infrastructure services
    pub dep_graph_micro: GraphMetrics,
    #[serde(skip)]
    full_graph: DependencyGraph,
    #[serde(skip)]
    micro_graph: DependencyGraph,
}

impl ComposeAnalysis {
    /// An analysis with no services and empty graphs
    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            num_services: 0,
            services: Vec::new(),
            detected_dbs: DetectedDbs::default(),
            dep_graph_full: GraphMetrics::default(),
            dep_graph_micro: GraphMetrics::default(),
            full_graph: DependencyGraph::new(),
            micro_graph: DependencyGraph::new(),
        }
    }

    /// The full dependency graph
    pub fn full_graph(&self) -> &DependencyGraph {
        &self.full_graph
    }

    /// The dependency graph restricted to business-logic services
    pub fn micro_graph(&self) -> &DependencyGraph {
        &self.micro_graph
    }
}

/// Outcome of parsing a descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum ComposeParse {
    /// The descriptor was readable
    Parsed(ComposeAnalysis),
    /// The descriptor could not be decoded or parsed
    Unavailable { reason: String },
}

/// Builds service graphs from descriptor text
#[derive(Debug, Clone)]
pub struct ServiceGraphBuilder {
    taxonomy: Arc<Taxonomy>,
}

impl ServiceGraphBuilder {
    /// Create a builder classifying services against `taxonomy`
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Analyze a descriptor, falling back to an empty analysis when it is
    /// unreadable
    pub fn analyze(&self, path: &str, content: &[u8]) -> ComposeAnalysis {
        match self.parse(path, content) {
            ComposeParse::Parsed(analysis) => analysis,
            ComposeParse::Unavailable { reason } => {
                tracing::debug!(path, %reason, "Descriptor unavailable");
                ComposeAnalysis::empty(path)
            }
        }
    }

    /// Parse descriptor bytes
    pub fn parse(&self, path: &str, content: &[u8]) -> ComposeParse {
        let text = match std::str::from_utf8(content) {
            Ok(text) => text,
            Err(e) => {
                return ComposeParse::Unavailable {
                    reason: format!("invalid encoding: {}", e),
                }
            }
        };

        let mut document: Value = match serde_yaml::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                return ComposeParse::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        if let Err(e) = document.apply_merge() {
            return ComposeParse::Unavailable {
                reason: e.to_string(),
            };
        }

        let services = match document.get("services") {
            Some(Value::Mapping(services)) => services,
            _ => return ComposeParse::Parsed(ComposeAnalysis::empty(path)),
        };

        ComposeParse::Parsed(self.build(path, services))
    }

    fn build(&self, path: &str, declared: &Mapping) -> ComposeAnalysis {
        let mut services = Vec::new();
        let mut full = DependencyGraph::new();

        for (key, spec) in declared {
            let Some(name) = scalar_string(key) else {
                continue;
            };
            let spec = match spec {
                Value::Mapping(spec) if !spec.is_empty() => spec,
                _ => continue,
            };

            let (image, image_full) = resolve_identity(spec);
            let depends_on = declared_dependencies(spec);
            let tags = self.classify(&image);

            full.add_node(&name);
            for dependency in &depends_on {
                full.add_edge(&name, dependency);
            }

            services.push(
                Service::builder(name)
                    .image(image, image_full)
                    .depends_on(depends_on)
                    .tags(tags)
                    .build(),
            );
        }

        let infrastructure: HashSet<&str> = services
            .iter()
            .filter(|s| s.is_infrastructure())
            .map(|s| s.name.as_str())
            .collect();
        let micro = full.without_nodes(&infrastructure);

        let detected_dbs = detect_databases(&services);

        ComposeAnalysis {
            path: path.to_string(),
            num_services: services.len(),
            dep_graph_full: GraphMetrics::compute(&full),
            dep_graph_micro: GraphMetrics::compute(&micro),
            services,
            detected_dbs,
            full_graph: full,
            micro_graph: micro,
        }
    }

    /// Tag an identity with at most one word per infrastructure category
    fn classify(&self, identity: &str) -> Tags {
        let tokens = words(identity);
        let mut tags = Tags::new();
        for kind in CategoryKind::infrastructure() {
            if let Some(tag) = match_ones(&tokens, self.taxonomy.category(*kind)) {
                tags.insert(*kind, tag);
            }
        }
        tags
    }
}

/// Identity of a service: image without tag, else build context
fn resolve_identity(spec: &Mapping) -> (String, String) {
    if let Some(image) = spec
        .get("image")
        .and_then(scalar_string)
        .filter(|i| !i.is_empty())
    {
        let stripped = image.split(':').next().unwrap_or_default().to_string();
        return (stripped, image);
    }

    let build = match spec.get("build") {
        Some(Value::Mapping(build)) => build.values().next().and_then(scalar_string),
        Some(other) => scalar_string(other),
        None => None,
    };
    match build {
        Some(build) => (build.clone(), build),
        None => (String::new(), String::new()),
    }
}

/// Dependencies from `depends_on` (list or mapping), else `links`
fn declared_dependencies(spec: &Mapping) -> Vec<String> {
    if let Some(depends_on) = spec.get("depends_on") {
        return names(depends_on);
    }
    if let Some(links) = spec.get("links") {
        // `service:alias` links name the service before the colon
        return names(links)
            .into_iter()
            .map(|link| link.split(':').next().unwrap_or_default().to_string())
            .filter(|link| !link.is_empty())
            .collect();
    }
    Vec::new()
}

fn names(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_string).collect(),
        Value::Mapping(map) => map.keys().filter_map(scalar_string).collect(),
        Value::Null => Vec::new(),
        other => scalar_string(other).into_iter().collect(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn detect_databases(services: &[Service]) -> DetectedDbs {
    let databases: Vec<(&str, &str)> = services
        .iter()
        .filter_map(|s| s.database().map(|db| (s.name.as_str(), db)))
        .collect();

    let names: BTreeSet<String> = databases.iter().map(|(_, db)| db.to_string()).collect();

    DetectedDbs {
        num: databases.len(),
        names: names.into_iter().collect(),
        services: databases.iter().map(|(s, _)| s.to_string()).collect(),
        shared_dbs: shared_database(services),
    }
}
