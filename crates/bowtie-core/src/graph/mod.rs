//! Link graph model consumed by the decomposition engine.
//!
//! # Overview
//!
//! The engine works on a read-only directed graph. [`LinkGraph`] is the
//! concrete petgraph-backed implementation; the reachability oracle and the
//! classifier only depend on the [`LinkSource`] capability trait, which
//! exposes node enumeration, outgoing and incoming neighbors, and edge
//! weights.
//!
//! ## Pipeline
//!
//! ```text
//! edge list (external loader)
//!        ↓  build::LinkGraphBuilder
//! LinkGraph (DiGraph<String, f64>, may contain cycles)
//!        ↓  scc::find_components()
//! Vec<Component>
//!        ↓  scc::select_giant() + classify::classify()
//! BowTie (Partition + component counts)
//! ```
//!
//! ## Direction strategy
//!
//! How a search frontier steps from a node is decided by an explicit
//! [`Traversal`] value rather than by inspecting the graph type.

pub mod build;
pub mod traversal;

use petgraph::graph::NodeIndex;

pub use build::{LinkGraph, LinkGraphBuilder};
pub use traversal::{Side, Traversal};

/// Edge weight used when none is given.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Read-only view of a directed, weighted link graph.
///
/// Implementors must guarantee that every index yielded by the neighbor
/// iterators is also yielded by [`LinkSource::node_indices`].
pub trait LinkSource {
    /// Number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Every node index, in insertion order.
    fn node_indices(&self) -> impl Iterator<Item = NodeIndex>;

    /// `(target, weight)` for each edge leaving `node`.
    fn outgoing(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)>;

    /// `(source, weight)` for each edge entering `node`.
    fn incoming(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)>;

    /// Weight of the edge `from → to`, if it exists.
    fn weight(&self, from: NodeIndex, to: NodeIndex) -> Option<f64>;

    /// External identifier of `node`.
    fn node_id(&self, node: NodeIndex) -> &str;
}
