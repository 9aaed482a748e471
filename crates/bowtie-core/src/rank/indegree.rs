//! In-degree ranking: the number of distinct pages linking to a node.

use super::{RankOracle, Ranking};
use crate::graph::LinkGraph;

/// [`RankOracle`] scoring each node by its in-degree.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDegree;

impl RankOracle for InDegree {
    fn name(&self) -> &'static str {
        "in-degree"
    }

    fn rank(&self, graph: &LinkGraph) -> Ranking {
        Ranking::from_scores(
            graph
                .graph
                .node_indices()
                .map(|idx| (graph.graph[idx].clone(), graph.in_degree(idx) as f64)),
        )
    }
}
