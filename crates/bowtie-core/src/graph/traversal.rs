//! Direction strategies for frontier expansion.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::LinkSource;

/// Which end of a bidirectional search is expanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Frontier rooted at the start node, following edges forward.
    Forward,
    /// Frontier rooted at the stop node, following edges in reverse.
    Backward,
}

impl Side {
    /// The opposite side.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Array slot used for per-side search state.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Forward => 0,
            Self::Backward => 1,
        }
    }
}

/// How edges are followed when a frontier expands a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// Forward follows outgoing edges, backward follows incoming edges.
    #[default]
    Directed,
    /// Edges are followed regardless of orientation on both sides.
    Undirected,
}

impl Traversal {
    /// Call `visit(neighbor, weight)` for every neighbor of `node` reachable
    /// in one step on `side`.
    ///
    /// The weight is always the weight of the edge as stored, so the
    /// backward side sees `w → node` edges with their forward weight.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error produced by `visit`.
    pub fn try_for_each_neighbor<G, F, E>(
        self,
        graph: &G,
        node: NodeIndex,
        side: Side,
        mut visit: F,
    ) -> Result<(), E>
    where
        G: LinkSource,
        F: FnMut(NodeIndex, f64) -> Result<(), E>,
    {
        match (self, side) {
            (Self::Directed, Side::Forward) => {
                for (next, weight) in graph.outgoing(node) {
                    visit(next, weight)?;
                }
            }
            (Self::Directed, Side::Backward) => {
                for (prev, weight) in graph.incoming(node) {
                    visit(prev, weight)?;
                }
            }
            (Self::Undirected, _) => {
                for (next, weight) in graph.outgoing(node) {
                    visit(next, weight)?;
                }
                for (prev, weight) in graph.incoming(node) {
                    visit(prev, weight)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkGraph;

    fn collect(graph: &LinkGraph, t: Traversal, id: &str, side: Side) -> Vec<String> {
        let node = graph.node_index(id).expect("node");
        let mut out = Vec::new();
        t.try_for_each_neighbor(graph, node, side, |n, _| {
            out.push(graph.node_id(n).to_string());
            Ok::<(), ()>(())
        })
        .expect("visit");
        out.sort();
        out
    }

    #[test]
    fn directed_forward_and_backward() {
        let g = LinkGraph::from_edges([("a", "b"), ("c", "b"), ("b", "d")]);
        assert_eq!(collect(&g, Traversal::Directed, "b", Side::Forward), ["d"]);
        assert_eq!(
            collect(&g, Traversal::Directed, "b", Side::Backward),
            ["a", "c"]
        );
    }

    #[test]
    fn undirected_sees_both_orientations() {
        let g = LinkGraph::from_edges([("a", "b"), ("b", "c")]);
        assert_eq!(
            collect(&g, Traversal::Undirected, "b", Side::Forward),
            ["a", "c"]
        );
        assert_eq!(
            collect(&g, Traversal::Undirected, "b", Side::Backward),
            ["a", "c"]
        );
    }

    #[test]
    fn flip_alternates() {
        assert_eq!(Side::Forward.flip(), Side::Backward);
        assert_eq!(Side::Backward.flip().slot(), 0);
    }
}
