//! PageRank over the link graph.
//!
//! # Algorithm
//!
//! Standard power method:
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ PR(u) / out_degree(u)   for each u → v
//! ```
//!
//! Dangling nodes (no outgoing links) spread their rank uniformly over all
//! nodes. Iteration stops once the L1 norm of the rank delta drops below
//! `tolerance`, or after `max_iter` rounds. Edge weights are ignored; every
//! link counts once.
//!
//! The default damping factor is 0.9, matching the crawl analyses this
//! crate reproduces, rather than the textbook 0.85.

use petgraph::{
    Direction,
    visit::{IntoNodeIdentifiers, NodeIndexable},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{RankOracle, Ranking};
use crate::graph::LinkGraph;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for PageRank computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a link vs teleporting).
    /// Default: 0.9.
    pub damping: f64,
    /// Convergence threshold: stop when L1 norm of rank delta < tolerance.
    /// Default: 1e-6.
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.9,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of a PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// Per-node scores, indexed by `NodeIndex::index()`.
    pub scores: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// PageRank
// ---------------------------------------------------------------------------

/// Compute PageRank on every node of `graph`.
#[must_use]
#[instrument(skip(graph, config), fields(nodes = graph.node_count()))]
pub fn pagerank(graph: &LinkGraph, config: &PageRankConfig) -> PageRankResult {
    let g = &graph.graph;
    let n = g.node_count();

    if n == 0 {
        return PageRankResult {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let n_f64 = n as f64;
    let base = (1.0 - config.damping) / n_f64;
    let out_degree: Vec<usize> = g
        .node_identifiers()
        .map(|node| g.neighbors_directed(node, Direction::Outgoing).count())
        .collect();

    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..config.max_iter {
        iterations += 1;

        // Dangling mass is spread uniformly, so fold it into the base.
        let dangling: f64 = (0..n)
            .filter(|&i| out_degree[i] == 0)
            .map(|i| ranks[i])
            .sum();
        let floor = config.damping.mul_add(dangling / n_f64, base);
        new_ranks.fill(floor);

        for node in g.node_identifiers() {
            let idx = g.to_index(node);
            let degree = out_degree[idx];
            if degree == 0 {
                continue;
            }
            let share = config.damping * ranks[idx] / degree as f64;
            for neighbor in g.neighbors_directed(node, Direction::Outgoing) {
                new_ranks[g.to_index(neighbor)] += share;
            }
        }

        let delta: f64 = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);

        if delta < config.tolerance {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(iterations, "pagerank converged");
    } else {
        warn!(iterations, "pagerank did not converge within max_iter");
    }

    PageRankResult {
        scores: ranks,
        iterations,
        converged,
    }
}

/// [`RankOracle`] backed by [`pagerank`].
#[derive(Debug, Clone, Default)]
pub struct PageRank {
    pub config: PageRankConfig,
}

impl PageRank {
    #[must_use]
    pub const fn new(config: PageRankConfig) -> Self {
        Self { config }
    }
}

impl RankOracle for PageRank {
    fn name(&self) -> &'static str {
        "pagerank"
    }

    fn rank(&self, graph: &LinkGraph) -> Ranking {
        let result = pagerank(graph, &self.config);
        Ranking::from_scores(
            graph
                .graph
                .node_indices()
                .map(|idx| (graph.graph[idx].clone(), result.scores[idx.index()])),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
