//! Strongly connected components and giant-component selection.
//!
//! # Overview
//!
//! A web crawl is full of cycles. Every node belongs to exactly one strongly
//! connected component (SCC); a node with no edges is a singleton component.
//! The bow-tie classifier never reasons about individual members of a
//! component, only about its [`Component::representative`], because the SCC
//! invariant already guarantees mutual reachability inside it.
//!
//! # Ordering
//!
//! [`find_components`] runs petgraph's Tarjan implementation, which is
//! linear in nodes + edges and deterministic for a given graph insertion
//! order. The position of each component in that output is its discovery
//! index ([`Component::id`]) and is what [`select_giant`] uses to break ties.

use petgraph::{algo::tarjan_scc, graph::NodeIndex};
use tracing::{debug, instrument};

use crate::error::{BowTieError, Result};
use crate::graph::{LinkGraph, LinkSource};

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A strongly connected component of the link graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Discovery index assigned by [`find_components`].
    pub id: usize,
    /// Member nodes, sorted by identifier. Never empty.
    members: Vec<NodeIndex>,
}

impl Component {
    /// Build a component from its members.
    ///
    /// Returns `None` for an empty member list. Members are sorted by
    /// identifier so the representative is stable for the life of the
    /// analysis.
    pub fn new<G: LinkSource>(id: usize, mut members: Vec<NodeIndex>, graph: &G) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        members.sort_unstable_by(|a, b| graph.node_id(*a).cmp(graph.node_id(*b)).then(a.cmp(b)));
        Some(Self { id, members })
    }

    /// The member used to stand in for the whole component in reachability
    /// queries: the one with the lexicographically smallest identifier.
    #[must_use]
    pub fn representative(&self) -> NodeIndex {
        self.members[0]
    }

    /// Member nodes, sorted by identifier.
    #[must_use]
    pub fn members(&self) -> &[NodeIndex] {
        &self.members
    }

    /// Number of member nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; components are non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Return `true` if this component contains more than one node.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.members.len() > 1
    }

    /// Member identifiers, in sorted order.
    pub fn member_ids<'a, G: LinkSource>(&'a self, graph: &'a G) -> impl Iterator<Item = &'a str> {
        self.members.iter().map(move |&n| graph.node_id(n))
    }
}

// ---------------------------------------------------------------------------
// SCC Finder
// ---------------------------------------------------------------------------

/// Partition the graph's nodes into strongly connected components.
///
/// The returned components are disjoint, cover every node, and are listed in
/// discovery order. An empty graph yields an empty list.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn find_components(graph: &LinkGraph) -> Vec<Component> {
    let components: Vec<Component> = tarjan_scc(&graph.graph)
        .into_iter()
        .enumerate()
        .filter_map(|(id, members)| Component::new(id, members, graph))
        .collect();

    debug!(
        components = components.len(),
        cycles = components.iter().filter(|c| c.is_cycle()).count(),
        "found strongly connected components"
    );
    components
}

// ---------------------------------------------------------------------------
// Giant Component Selector
// ---------------------------------------------------------------------------

/// Remove and return the largest component (the GSCC).
///
/// Ties are broken by the smallest discovery index, so the choice is
/// deterministic for a given graph. The remaining components are returned
/// in their original order.
///
/// # Errors
///
/// Returns [`BowTieError::InvalidInput`] when `components` is empty.
pub fn select_giant(mut components: Vec<Component>) -> Result<(Component, Vec<Component>)> {
    let mut best: Option<(usize, usize, usize)> = None;
    for (pos, c) in components.iter().enumerate() {
        let better = match best {
            None => true,
            Some((_, len, id)) => c.len() > len || (c.len() == len && c.id < id),
        };
        if better {
            best = Some((pos, c.len(), c.id));
        }
    }

    let Some((pos, _, _)) = best else {
        return Err(BowTieError::invalid(
            "cannot select a giant component from an empty component set",
        ));
    };

    let giant = components.remove(pos);
    debug!(size = giant.len(), id = giant.id, "selected giant component");
    Ok((giant, components))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
