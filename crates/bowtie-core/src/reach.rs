//! Bidirectional reachability oracle.
//!
//! # Algorithm
//!
//! Two Dijkstra frontiers grow at the same time: a forward one from `start`
//! over outgoing edges and a backward one from `stop` over incoming edges.
//! Each frontier is a min-priority queue keyed by accumulated edge weight
//! from its origin (ties broken by insertion order). The sides alternate in
//! strict round-robin, forward first:
//!
//! ```text
//! step 1: forward   step 2: backward   step 3: forward   ...
//! ```
//!
//! The search answers *whether* a path exists, not how long the shortest
//! one is. It stops as soon as a node is settled on one side after already
//! being settled on the other. If either queue runs dry first, no path
//! exists.
//!
//! # Integrity
//!
//! Weights are assumed non-negative. A settled node that is reached again on
//! the same side through a strictly shorter path can only be explained by a
//! negative weight, and aborts the query with
//! [`BowTieError::InconsistentWeights`].
//!
//! # Memory
//!
//! Queues use lazy deletion. Whenever a queue grows past the node count it
//! is compacted down to live entries, of which there is at most one per
//! node.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::error::{BowTieError, Result};
use crate::graph::{LinkGraph, LinkSource, Side, Traversal};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Answer "is there a directed path from `start` to `stop`?" with the
/// default (directed) traversal.
///
/// # Errors
///
/// Returns [`BowTieError::InconsistentWeights`] on negative-weight
/// contradictions.
pub fn can_reach<G: LinkSource>(graph: &G, start: NodeIndex, stop: NodeIndex) -> Result<bool> {
    Reachability::default().can_reach(graph, start, stop)
}

/// Like [`can_reach`] but addressed by node identifier.
///
/// # Errors
///
/// Returns [`BowTieError::InvalidInput`] if either identifier is unknown,
/// and propagates [`BowTieError::InconsistentWeights`].
pub fn can_reach_ids(graph: &LinkGraph, start: &str, stop: &str) -> Result<bool> {
    let lookup = |id: &str| {
        graph
            .node_index(id)
            .ok_or_else(|| BowTieError::invalid(format!("unknown node `{id}`")))
    };
    can_reach(graph, lookup(start)?, lookup(stop)?)
}

/// Outcome of one bidirectional search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Whether a path from start to stop exists.
    pub reachable: bool,
    /// Nodes settled across both sides before the search stopped.
    pub settled: usize,
}

/// Reachability oracle configured with a direction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reachability {
    traversal: Traversal,
}

impl Reachability {
    #[must_use]
    pub const fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    #[must_use]
    pub const fn traversal(self) -> Traversal {
        self.traversal
    }

    /// Whether `stop` can be reached from `start`.
    ///
    /// # Errors
    ///
    /// See [`Reachability::search`].
    pub fn can_reach<G: LinkSource>(
        self,
        graph: &G,
        start: NodeIndex,
        stop: NodeIndex,
    ) -> Result<bool> {
        self.search(graph, start, stop).map(|o| o.reachable)
    }

    /// Run the bidirectional search and report how much work it took.
    ///
    /// # Errors
    ///
    /// Returns [`BowTieError::InconsistentWeights`] if a settled node is
    /// reached again via a strictly shorter path on the same side.
    pub fn search<G: LinkSource>(
        self,
        graph: &G,
        start: NodeIndex,
        stop: NodeIndex,
    ) -> Result<SearchOutcome> {
        if start == stop {
            return Ok(SearchOutcome {
                reachable: true,
                settled: 0,
            });
        }

        let limit = graph.node_count().max(1);
        let mut seq: u64 = 0;
        let mut frontiers = [
            Frontier::rooted(start, &mut seq),
            Frontier::rooted(stop, &mut seq),
        ];
        // Flipped before the first pop, so forward goes first.
        let mut active = Side::Backward;

        loop {
            let [forward, backward] = &mut frontiers;
            if forward.queue.is_empty() || backward.queue.is_empty() {
                let settled = forward.settled.len() + backward.settled.len();
                trace!(settled, "reachability: frontier exhausted");
                return Ok(SearchOutcome {
                    reachable: false,
                    settled,
                });
            }

            active = active.flip();
            let (this, other) = match active {
                Side::Forward => (forward, &*backward),
                Side::Backward => (backward, &*forward),
            };

            let Some(Scored { cost, node, .. }) = this.queue.pop() else {
                continue;
            };
            if this.settled.contains_key(&node) {
                continue;
            }
            this.settled.insert(node, cost);

            if other.settled.contains_key(&node) {
                let settled = this.settled.len() + other.settled.len();
                trace!(settled, "reachability: frontiers met");
                return Ok(SearchOutcome {
                    reachable: true,
                    settled,
                });
            }

            self.traversal
                .try_for_each_neighbor(graph, node, active, |next, weight| {
                    this.relax(graph, next, cost + weight, &mut seq)
                })?;

            if this.queue.len() > limit {
                this.compact();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Queue entry ordered so that `BinaryHeap` pops the cheapest first.
#[derive(Debug, Clone, Copy)]
struct Scored {
    cost: f64,
    seq: u64,
    node: NodeIndex,
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Per-side search state.
#[derive(Debug, Default)]
struct Frontier {
    /// Final distances of settled nodes.
    settled: HashMap<NodeIndex, f64>,
    /// Best tentative distance seen for unsettled nodes.
    seen: HashMap<NodeIndex, f64>,
    queue: BinaryHeap<Scored>,
}

impl Frontier {
    fn rooted(origin: NodeIndex, seq: &mut u64) -> Self {
        let mut f = Self::default();
        f.seen.insert(origin, 0.0);
        f.push(origin, 0.0, seq);
        f
    }

    fn push(&mut self, node: NodeIndex, cost: f64, seq: &mut u64) {
        self.queue.push(Scored {
            cost,
            seq: *seq,
            node,
        });
        *seq += 1;
    }

    fn relax<G: LinkSource>(
        &mut self,
        graph: &G,
        node: NodeIndex,
        cost: f64,
        seq: &mut u64,
    ) -> Result<()> {
        if let Some(&done) = self.settled.get(&node) {
            if cost < done {
                return Err(BowTieError::InconsistentWeights {
                    node: graph.node_id(node).to_string(),
                });
            }
            return Ok(());
        }
        if self.seen.get(&node).is_none_or(|&best| cost < best) {
            self.seen.insert(node, cost);
            self.push(node, cost, seq);
        }
        Ok(())
    }

    /// Drop queue entries that are settled or superseded by a cheaper one.
    fn compact(&mut self) {
        let before = self.queue.len();
        let settled = &self.settled;
        let seen = &self.seen;
        self.queue.retain(|e| {
            !settled.contains_key(&e.node) && seen.get(&e.node).is_some_and(|&best| e.cost <= best)
        });
        trace!(before, after = self.queue.len(), "reachability: compacted queue");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
