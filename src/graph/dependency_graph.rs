//! Service dependency graph implementation using petgraph.

use crate::error::GraphError;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// A directed graph of service names.
///
/// Edges point from a service to the service it depends on. Parallel edges
/// collapse into one; self-loops are kept. Adding an edge whose endpoint
/// was never added as a node creates that node.
///
/// # Example
///
/// ```rust
/// use msdetect::graph::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_node("web");
/// graph.add_node("db");
/// graph.add_edge("web", "db");
/// graph.add_edge("web", "cache"); // phantom node
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning the existing index if the name is known.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    /// Adds an edge `from -> to`, creating missing endpoints.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        if self.graph.contains_edge(from_idx, to_idx) {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, ());
        true
    }

    /// Returns true if the graph has a node with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    /// Returns true if the graph has the edge `from -> to`.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.node_indices.get(from), self.node_indices.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .map(String::as_str)
            .collect()
    }

    /// Out-degree of a node, 0 for unknown names.
    pub fn out_degree(&self, name: &str) -> usize {
        self.node_indices
            .get(name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Returns a copy of this graph without the named nodes and their
    /// incident edges.
    pub fn without_nodes(&self, removed: &HashSet<&str>) -> DependencyGraph {
        let mut reduced = DependencyGraph::new();
        for name in self.node_names() {
            if !removed.contains(name) {
                reduced.add_node(name);
            }
        }
        for edge in self.graph.edge_references() {
            let from = &self.graph[edge.source()];
            let to = &self.graph[edge.target()];
            if !removed.contains(from.as_str()) && !removed.contains(to.as_str()) {
                reduced.add_edge(from, to);
            }
        }
        reduced
    }

    /// Returns true if there is no directed cycle, self-loops included.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Number of edges on the longest directed path.
    ///
    /// Only defined for acyclic graphs; a cyclic graph yields
    /// [`GraphError::Cyclic`].
    pub fn longest_path(&self) -> Result<usize, GraphError> {
        let order = toposort(&self.graph, None).map_err(|_| GraphError::Cyclic)?;

        let mut distance: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
        let mut longest = 0;
        for idx in order {
            let here = distance.get(&idx).copied().unwrap_or(0);
            longest = longest.max(here);
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let entry = distance.entry(next).or_insert(0);
                *entry = (*entry).max(here + 1);
            }
        }
        Ok(longest)
    }
}

impl PartialEq for DependencyGraph {
    /// Graphs are equal when they have the same node names and edges,
    /// regardless of insertion order.
    fn eq(&self, other: &Self) -> bool {
        let nodes: HashSet<&str> = self.node_names().into_iter().collect();
        let other_nodes: HashSet<&str> = other.node_names().into_iter().collect();
        nodes == other_nodes
            && self.edge_count() == other.edge_count()
            && self.graph.edge_references().all(|edge| {
                other.has_edge(&self.graph[edge.source()], &self.graph[edge.target()])
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("a", "c");
        graph
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_node("a");
        let again = graph.add_node("a");
        assert_eq!(a, again);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_add_edge_creates_phantom_nodes() {
        let mut graph = DependencyGraph::new();
        graph.add_node("web");
        assert!(graph.add_edge("web", "ghost"));
        assert!(graph.contains("ghost"));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = DependencyGraph::new();
        assert!(graph.add_edge("a", "b"));
        assert!(!graph.add_edge("a", "b"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_out_degree() {
        let graph = chain();
        assert_eq!(graph.out_degree("a"), 2);
        assert_eq!(graph.out_degree("c"), 0);
        assert_eq!(graph.out_degree("missing"), 0);
    }

    #[test]
    fn test_without_nodes_restricts_edges() {
        let graph = chain();
        let removed: HashSet<&str> = ["b"].into_iter().collect();
        let reduced = graph.without_nodes(&removed);
        assert_eq!(reduced.node_count(), 2);
        assert_eq!(reduced.edge_count(), 1);
        assert!(reduced.has_edge("a", "c"));
        assert!(!reduced.contains("b"));
    }

    #[test]
    fn test_self_loop_is_cyclic() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "a");
        assert!(!graph.is_acyclic());
        assert_eq!(graph.longest_path(), Err(GraphError::Cyclic));
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = chain();
        graph.add_edge("c", "a");
        assert!(!graph.is_acyclic());
        assert!(graph.longest_path().is_err());
    }

    #[test]
    fn test_longest_path() {
        let graph = chain();
        assert!(graph.is_acyclic());
        assert_eq!(graph.longest_path(), Ok(2));
    }

    #[test]
    fn test_longest_path_empty_and_isolated() {
        assert_eq!(DependencyGraph::new().longest_path(), Ok(0));

        let mut graph = DependencyGraph::new();
        graph.add_node("solo");
        assert_eq!(graph.longest_path(), Ok(0));
    }
}
