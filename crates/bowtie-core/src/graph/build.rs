//! Graph construction.
//!
//! # Overview
//!
//! [`LinkGraphBuilder`] accumulates nodes and edges from any source (the
//! CLI's edge-list loader, tests, benches) and freezes them into an
//! immutable [`LinkGraph`].
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A links to B". Searching forward follows outgoing
//! edges; searching backward follows incoming edges.
//!
//! ## Duplicate Edges
//!
//! The graph is multigraph-free. Adding an edge that already exists keeps a
//! single edge carrying the smaller of the two weights.
//!
//! ## Content Hash
//!
//! The frozen graph is tagged with a BLAKE3 hash of its sorted edge list so
//! reports can be traced back to the exact input they were computed from.

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use super::{DEFAULT_WEIGHT, LinkSource};

// ---------------------------------------------------------------------------
// LinkGraph
// ---------------------------------------------------------------------------

/// An immutable directed link graph.
///
/// Nodes are string identifiers; edge weights default to
/// [`DEFAULT_WEIGHT`].
#[derive(Debug, Clone)]
pub struct LinkGraph {
    /// Directed graph: nodes = identifiers, edges = links with weights.
    pub graph: DiGraph<String, f64>,
    /// Mapping from identifier to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 content hash of the edge set.
    pub content_hash: String,
}

impl LinkGraph {
    /// Build a graph from unit-weight `(source, target)` pairs.
    ///
    /// Convenience for tests and small callers; nodes appear in first-seen
    /// order.
    #[must_use]
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut builder = LinkGraphBuilder::new();
        for (from, to) in edges {
            builder.add_edge(from, to);
        }
        builder.build()
    }

    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for an identifier.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Return the identifier for a node.
    #[must_use]
    pub fn id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Number of incoming edges of `idx`.
    #[must_use]
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors_directed(idx, Direction::Incoming).count()
    }

    /// Number of outgoing edges of `idx`.
    #[must_use]
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors_directed(idx, Direction::Outgoing).count()
    }
}

impl LinkSource for LinkGraph {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    fn outgoing(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
    }

    fn incoming(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
    }

    fn weight(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.graph
            .find_edge(from, to)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }

    fn node_id(&self, node: NodeIndex) -> &str {
        self.id(node).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// LinkGraphBuilder
// ---------------------------------------------------------------------------

/// Incremental builder for [`LinkGraph`].
#[derive(Debug, Default)]
pub struct LinkGraphBuilder {
    graph: DiGraph<String, f64>,
    node_map: HashMap<String, NodeIndex>,
}

impl LinkGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` as a node if it is not present yet and return its index.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    /// Add a unit-weight edge `from → to`, creating endpoints on demand.
    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Self {
        self.add_weighted_edge(from, to, DEFAULT_WEIGHT)
    }

    /// Add an edge `from → to` with an explicit weight.
    ///
    /// A repeated edge keeps the minimum weight seen.
    pub fn add_weighted_edge(&mut self, from: &str, to: &str, weight: f64) -> &mut Self {
        let a = self.add_node(from);
        let b = self.add_node(to);
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if let Some(existing) = self.graph.edge_weight_mut(edge) {
                    *existing = existing.min(weight);
                }
            }
            None => {
                self.graph.add_edge(a, b, weight);
            }
        }
        self
    }

    /// Number of nodes added so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct edges added so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Freeze the builder into a [`LinkGraph`].
    #[must_use]
    pub fn build(self) -> LinkGraph {
        let content_hash = compute_edge_hash(&self.graph);
        LinkGraph {
            graph: self.graph,
            node_map: self.node_map,
            content_hash,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Compute a BLAKE3 hash over the sorted `(source, target, weight)` list.
fn compute_edge_hash(graph: &DiGraph<String, f64>) -> String {
    let mut edges: Vec<(&str, &str, u64)> = graph
        .edge_references()
        .map(|e| {
            (
                graph[e.source()].as_str(),
                graph[e.target()].as_str(),
                e.weight().to_bits(),
            )
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (from, to, weight) in edges {
        hasher.update(from.as_bytes());
        hasher.update(b"\x00");
        hasher.update(to.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&weight.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
