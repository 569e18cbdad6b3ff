//! Minimal directed graph over string-named nodes.
//!
//! Nodes and edges keep insertion order for reproducible output while
//! equality uses set semantics, so merged graphs compare equal
//! regardless of the order their parts arrived in.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A directed graph of component names.
///
/// No cycle detection is performed here; producers are responsible for
/// acyclicity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<String>,
    edges: Vec<(String, String)>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Builds a graph from predecessor/successor pairs.
    ///
    /// Every element appearing in any pair becomes a node. Pairs with a
    /// `None` successor, produced by windowing at the end of a
    /// sequence, contribute only their predecessor node. An empty input
    /// yields an empty graph.
    #[must_use]
    pub fn from_edge_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut graph = Self::new();
        for (from, to) in pairs {
            graph.add_node(from.clone());
            if let Some(to) = to {
                graph.add_node(to.clone());
                graph.add_edge(from, to);
            }
        }
        graph
    }

    /// Builds a linear chain from an ordered sequence of names.
    ///
    /// Consecutive overlapping pairs (window size 2, stride 1) become
    /// the edges; a single-element sequence yields one node and no
    /// edges.
    #[must_use]
    pub fn from_path<S: AsRef<str>>(path: &[S]) -> Self {
        Self::from_edge_pairs(windowed_pairs(path))
    }

    /// Adds a node, ignoring duplicates.
    pub fn add_node(&mut self, node: impl Into<String>) {
        let node = node.into();
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
    }

    /// Adds a directed edge, ignoring duplicates; endpoints become
    /// nodes.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        self.add_node(from.clone());
        self.add_node(to.clone());
        let edge = (from, to);
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Merges another graph into this one: union of nodes and edges.
    ///
    /// Commutative and associative under set equality, and idempotent
    /// when a graph is merged with itself.
    pub fn merge(&mut self, other: &Self) {
        for node in &other.nodes {
            self.add_node(node.clone());
        }
        for (from, to) in &other.edges {
            self.add_edge(from.clone(), to.clone());
        }
    }

    /// Returns the merge of two graphs, consuming the left one.
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        self.merge(other);
        self
    }

    /// Nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true when the node is present.
    #[must_use]
    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    /// Returns true when the directed edge is present.
    #[must_use]
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|(f, t)| f == from && t == to)
    }

    /// Returns true when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        let nodes_a: HashSet<&str> = self.nodes.iter().map(String::as_str).collect();
        let nodes_b: HashSet<&str> = other.nodes.iter().map(String::as_str).collect();
        if nodes_a != nodes_b {
            return false;
        }
        let edges_a: HashSet<(&str, &str)> = self
            .edges
            .iter()
            .map(|(f, t)| (f.as_str(), t.as_str()))
            .collect();
        let edges_b: HashSet<(&str, &str)> = other
            .edges
            .iter()
            .map(|(f, t)| (f.as_str(), t.as_str()))
            .collect();
        edges_a == edges_b
    }
}

impl Eq for Graph {}

/// Computes consecutive overlapping pairs over a sequence.
///
/// The final element pairs with `None` so its presence survives edge
/// construction.
fn windowed_pairs<S: AsRef<str>>(seq: &[S]) -> Vec<(String, Option<String>)> {
    seq.iter()
        .enumerate()
        .map(|(i, item)| {
            let next = seq.get(i + 1).map(|n| n.as_ref().to_string());
            (item.as_ref().to_string(), next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(names: &[&str]) -> Graph {
        Graph::from_path(names)
    }

    #[test]
    fn test_from_path_edges_are_consecutive_pairs() {
        let graph = path(&["a", "b", "c", "d"]);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains_edge("a", "b"));
        assert!(graph.contains_edge("b", "c"));
        assert!(graph.contains_edge("c", "d"));
        assert!(!graph.contains_edge("a", "c"));
    }

    #[test]
    fn test_from_path_single_element() {
        let graph = path(&["only"]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.contains_node("only"));
    }

    #[test]
    fn test_from_empty_sequence() {
        let graph = Graph::from_path::<&str>(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_from_path_is_deterministic() {
        assert_eq!(path(&["a", "b", "c"]), path(&["a", "b", "c"]));
    }

    #[test]
    fn test_edge_pairs_drop_none_successor() {
        let graph = Graph::from_edge_pairs(vec![
            ("a".to_string(), Some("b".to_string())),
            ("b".to_string(), None),
        ]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_merge_is_commutative_and_associative() {
        let a = path(&["x", "z"]);
        let b = path(&["y", "z"]);
        let c = path(&["w", "x"]);

        let ab_c = a.clone().merged(&b).merged(&c);
        let a_bc = a.clone().merged(&b.clone().merged(&c));
        let b_ac = b.clone().merged(&a.clone().merged(&c));

        assert_eq!(ab_c, a_bc);
        assert_eq!(ab_c, b_ac);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = path(&["x", "y", "z"]);
        let doubled = a.clone().merged(&a);
        assert_eq!(doubled, a);
        assert_eq!(doubled.edge_count(), 2);
    }

    #[test]
    fn test_merge_preserves_first_insertion_order() {
        let mut a = path(&["a", "b"]);
        a.merge(&path(&["b", "c"]));
        assert_eq!(a.nodes(), ["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b");
        graph.add_edge("a", "b");
        assert_eq!(graph.edge_count(), 1);
    }
}
