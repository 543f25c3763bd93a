//! Start-order graph of container names using `petgraph`.
//!
//! Nodes are container names; an edge runs from a dependency to the
//! container waiting on it, so a topological sort yields dependencies first.

use std::collections::BTreeMap;

use navy_common::error::{NavyError, Result};
use petgraph::graph::NodeIndex;

/// A dependency graph of container names.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: petgraph::Graph<String, ()>,
    nodes: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container node, returning the existing index when the name
    /// is already present.
    pub fn add_container(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        let _ = self.nodes.insert(name.to_string(), index);
        index
    }

    /// Index of a previously added container.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.get(name).copied()
    }

    /// Adds a dependency edge: `dependent` waits on `dependency`.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependency, dependent, ());
    }

    /// Number of containers in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns container names in start order.
    ///
    /// # Errors
    ///
    /// Returns an error naming one container on the cycle if the graph
    /// contains cycles.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let name = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map_or("<unknown>", String::as_str);
                Err(NavyError::Config {
                    message: format!("cyclic dependency detected at container '{name}'"),
                })
            }
        }
    }
}
