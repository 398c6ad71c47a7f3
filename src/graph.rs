//! Directed constraint graph
//!
//! A thin container over a petgraph `DiGraph`: nodes keyed by id, edges
//! meaning "must be ordered before" in the sense the search expects.
//! Built fresh from a [`Problem`](crate::Problem) on every solve and
//! never mutated incrementally afterwards.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::fmt;

use crate::error::{CycleError, GraphError};
use crate::search::Search;

/// A directed graph of id nodes with adjacency edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// The underlying directed graph. Parallel edges are permitted;
    /// the search tolerates them.
    graph: DiGraph<String, ()>,

    /// Map from id to node index.
    node_map: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Registers a new node. Node identities are add-once: a second
    /// registration of the same id fails without changing the graph.
    pub fn add_node(&mut self, id: impl Into<String>) -> Result<(), GraphError> {
        let id = id.into();
        if self.node_map.contains_key(&id) {
            return Err(GraphError::NodeExists(id));
        }
        let idx = self.graph.add_node(id.clone());
        self.node_map.insert(id, idx);
        Ok(())
    }

    /// Adds an edge meaning `from` must be ordered before `to`.
    ///
    /// Fails naming whichever end is missing (`from` checked first).
    /// Duplicate edges between the same pair are permitted; they do not
    /// change the solved order or induce false cycles.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;
        self.graph.add_edge(from_idx, to_idx, ());
        Ok(())
    }

    /// Returns true if the graph contains a node with the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Computes a deterministic topological order of the nodes, or
    /// fails if the edges contain a cycle.
    pub fn solve(&self) -> Result<Vec<String>, CycleError> {
        Search::new(self).run()
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, ()> {
        &self.graph
    }

    fn index_of(&self, id: &str) -> Result<NodeIndex, GraphError> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeMissing(id.to_string()))
    }
}

/// Debug dump: node ids alphabetically, then edges sorted by source and
/// target. Not a stable machine format.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Empty graph");
        }

        let mut node_ids: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
        node_ids.sort_unstable();

        write!(f, "nodes\n-----")?;
        for id in node_ids {
            write!(f, "\n{id}")?;
        }

        let mut edges: Vec<(&str, &str)> = self
            .graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    self.graph[edge.target()].as_str(),
                )
            })
            .collect();
        edges.sort_unstable();

        if !edges.is_empty() {
            write!(f, "\n\nedges\n-----")?;
            for (from, to) in edges {
                write!(f, "\nfrom: {from}, to: {to}")?;
            }
        }

        Ok(())
    }
}
