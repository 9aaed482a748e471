//! Rank oracles and the ranking sequence the report consumes.
//!
//! # Overview
//!
//! The decomposition engine never computes importance itself. It consumes
//! a [`Ranking`]: `(node, score)` pairs sorted by descending score,
//! optionally truncated to the top N. Anything implementing [`RankOracle`]
//! can produce one; two oracles ship with the crate:
//!
//! - [`pagerank::PageRank`]: power-method PageRank over the link graph.
//! - [`indegree::InDegree`]: number of incoming links.
//!
//! ```rust,ignore
//! use bowtie_core::rank::{RankOracle, pagerank::PageRank};
//!
//! let ranking = PageRank::default().rank(&graph).top(1000);
//! for (pos, entry) in ranking.entries().iter().enumerate() {
//!     println!("{pos:>5} {:.6} {}", entry.score, entry.node);
//! }
//! ```

pub mod indegree;
pub mod pagerank;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{BowTieError, Result};
use crate::graph::LinkGraph;

pub use indegree::InDegree;
pub use pagerank::{PageRank, PageRankConfig};

/// Anything that can score the nodes of a graph.
pub trait RankOracle {
    /// Short name used in logs and report headers.
    fn name(&self) -> &'static str;

    /// Score every node of `graph`.
    fn rank(&self, graph: &LinkGraph) -> Ranking;
}

/// One scored node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub node: String,
    pub score: f64,
}

/// Nodes ordered by descending score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ranking {
    entries: Vec<RankEntry>,
}

impl Ranking {
    /// Sort arbitrary scores into a ranking.
    ///
    /// Ties are broken by node identifier so the order is reproducible.
    #[must_use]
    pub fn from_scores(scores: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut entries: Vec<RankEntry> = scores
            .into_iter()
            .map(|(node, score)| RankEntry { node, score })
            .collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.node.cmp(&b.node)));
        Self { entries }
    }

    /// Accept an externally ordered sequence.
    ///
    /// # Errors
    ///
    /// Returns [`BowTieError::InvalidInput`] if scores are not
    /// non-increasing or a node appears twice.
    pub fn from_sorted(entries: Vec<RankEntry>) -> Result<Self> {
        if let Some(w) = entries.windows(2).find(|w| w[1].score > w[0].score) {
            return Err(BowTieError::invalid(format!(
                "ranking is not sorted by descending score at `{}`",
                w[1].node
            )));
        }
        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        if let Some(dup) = entries.iter().find(|e| !seen.insert(e.node.as_str())) {
            return Err(BowTieError::invalid(format!(
                "node `{}` appears twice in ranking",
                dup.node
            )));
        }
        Ok(Self { entries })
    }

    /// Keep only the first `n` entries.
    #[must_use]
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map node → (position, score). Positions are 0-based.
    #[must_use]
    pub fn positions(&self) -> HashMap<&str, (usize, f64)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.node.as_str(), (pos, e.score)))
            .collect()
    }
}
