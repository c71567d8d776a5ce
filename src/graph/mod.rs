//! Service dependency graphs and their structural metrics
//!
//! This module provides:
//! - DependencyGraph: a directed graph of service names backed by petgraph
//! - GraphMetrics: node/edge counts, average out-degree, acyclicity and
//!   longest path

mod dependency_graph;
mod metrics;

pub use dependency_graph::DependencyGraph;
pub use metrics::GraphMetrics;
