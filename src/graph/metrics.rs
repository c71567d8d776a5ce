//! Structural invariants of a dependency graph

use super::DependencyGraph;
use serde::{Deserialize, Serialize};

/// Metrics computed for one dependency graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// Number of nodes, phantom nodes included
    pub nodes: usize,
    /// Number of distinct dependency edges
    pub edges: usize,
    /// Mean out-degree; 0 for an empty graph
    pub avg_deps_per_service: f64,
    /// True if the graph has no directed cycle
    pub acyclic: bool,
    /// Edges on the longest path; `None` when the graph is cyclic
    pub longest_path: Option<usize>,
}

impl GraphMetrics {
    /// Compute metrics for `graph`
    pub fn compute(graph: &DependencyGraph) -> Self {
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        let total_out: usize = graph
            .node_names()
            .into_iter()
            .map(|name| graph.out_degree(name))
            .sum();
        let avg_deps_per_service = if nodes == 0 {
            0.0
        } else {
            total_out as f64 / nodes as f64
        };

        let acyclic = graph.is_acyclic();
        let longest_path = if acyclic {
            graph.longest_path().ok()
        } else {
            None
        };

        Self {
            nodes,
            edges,
            avg_deps_per_service,
            acyclic,
            longest_path,
        }
    }
}

impl Default for GraphMetrics {
    fn default() -> Self {
        Self::compute(&DependencyGraph::new())
    }
}
