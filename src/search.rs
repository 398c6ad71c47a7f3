//! Depth-first topological search
//!
//! Produces one valid topological order of a [`Graph`](crate::Graph),
//! or detects that none exists. Ties are broken the same way at every
//! step (reverse-alphabetical by id), so the result is a pure function
//! of the graph's node ids and edge set.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashSet, VecDeque};

use crate::error::CycleError;
use crate::graph::Graph;

/// Single-use search state over one graph snapshot.
///
/// Two distinct per-node states drive the traversal: `unvisited` tracks
/// completion (a node is removed once emitted), while `marked` tracks
/// ancestry on the current recursion stack and doubles as cycle
/// detection. The marked set is never cleared, which keeps the whole
/// run O(V+E).
pub(crate) struct Search<'a> {
    graph: &'a DiGraph<String, ()>,
    unvisited: HashSet<NodeIndex>,
    marked: HashSet<NodeIndex>,
    result: VecDeque<String>,
}

impl<'a> Search<'a> {
    pub(crate) fn new(graph: &'a Graph) -> Self {
        let graph = graph.inner();
        Self {
            graph,
            unvisited: graph.node_indices().collect(),
            marked: HashSet::new(),
            result: VecDeque::new(),
        }
    }

    /// Runs the search to completion and returns the ordered ids.
    pub(crate) fn run(mut self) -> Result<Vec<String>, CycleError> {
        while let Some(root) = self.next_root() {
            self.visit(root)?;
        }
        Ok(self.result.into())
    }

    /// Picks the unvisited node with the lexicographically greatest id.
    fn next_root(&self) -> Option<NodeIndex> {
        self.unvisited
            .iter()
            .copied()
            .max_by(|a, b| self.id(*a).cmp(self.id(*b)))
    }

    fn visit(&mut self, node: NodeIndex) -> Result<(), CycleError> {
        // Already fully processed via another path. This is also what
        // makes duplicate edges harmless.
        if !self.unvisited.contains(&node) {
            return Ok(());
        }

        // A marked node is an ancestor of itself in the current
        // recursion, so this must be a cycle.
        if !self.marked.insert(node) {
            return Err(CycleError {
                id: self.graph[node].clone(),
            });
        }

        // Visit edge targets in reverse-alphabetical order, then emit
        // the node at the front of the result. Post-order completion:
        // a node is only emitted once everything reachable from it has
        // been.
        let mut targets: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        targets.sort_by(|a, b| self.id(*b).cmp(self.id(*a)));
        for target in targets {
            self.visit(target)?;
        }

        self.unvisited.remove(&node);
        self.result.push_front(self.graph[node].clone());
        Ok(())
    }

    fn id(&self, node: NodeIndex) -> &str {
        self.graph[node].as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new();
        for node in nodes {
            graph.add_node(*node).unwrap();
        }
        for (from, to) in edges {
            graph.add_edge(from, to).unwrap();
        }
        graph
    }

    #[test]
    fn empty_graph_solves_to_empty_order() {
        let graph = Graph::new();
        assert_eq!(Search::new(&graph).run().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn unconstrained_nodes_come_out_alphabetical() {
        // Roots are picked reverse-alphabetically and prepended, so
        // independent nodes end up in alphabetical order.
        let graph = graph_of(&["c", "a", "b"], &[]);
        assert_eq!(Search::new(&graph).run().unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn edges_force_order() {
        let graph = graph_of(&["a", "b", "c"], &[("b", "a"), ("c", "b")]);
        assert_eq!(Search::new(&graph).run().unwrap(), ["c", "b", "a"]);
    }

    #[test]
    fn diamond_is_deterministic() {
        let graph = graph_of(
            &["top", "left", "right", "bottom"],
            &[
                ("top", "left"),
                ("top", "right"),
                ("left", "bottom"),
                ("right", "bottom"),
            ],
        );

        let order = Search::new(&graph).run().unwrap();
        assert_eq!(order, ["top", "left", "right", "bottom"]);
        assert_eq!(Search::new(&graph).run().unwrap(), order);
    }

    #[test]
    fn duplicate_edges_change_nothing() {
        let plain = graph_of(&["a", "b"], &[("a", "b")]);
        let doubled = graph_of(&["a", "b"], &[("a", "b"), ("a", "b"), ("a", "b")]);

        assert_eq!(
            Search::new(&plain).run().unwrap(),
            Search::new(&doubled).run().unwrap()
        );
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let graph = graph_of(&["a"], &[("a", "a")]);
        let error = Search::new(&graph).run().unwrap_err();
        assert_eq!(error.id, "a");
    }

    #[test]
    fn cycle_reports_first_marked_node_reached_again() {
        let graph = graph_of(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);

        // The root pick starts at 'c'; the cycle closes back on it.
        let error = Search::new(&graph).run().unwrap_err();
        assert_eq!(error.id, "c");
    }
}
