//! End-to-end pipeline: graph → components → giant → classification →
//! report.

use tracing::{info, instrument};

use crate::classify::{BowTie, ClassifyOptions, classify};
use crate::config::AnalysisConfig;
use crate::error::{BowTieError, Result};
use crate::graph::LinkGraph;
use crate::rank::{InDegree, PageRank, RankOracle};
use crate::report::{BowTieReport, NodeLabels, assemble};
use crate::scc::{find_components, select_giant};

/// Run the decomposition engine on `graph`.
///
/// # Errors
///
/// Returns [`BowTieError::InvalidInput`] for an empty graph and propagates
/// classifier failures.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn decompose(graph: &LinkGraph, options: &ClassifyOptions) -> Result<BowTie> {
    if graph.node_count() == 0 {
        return Err(BowTieError::invalid("graph has no nodes"));
    }

    let components = find_components(graph);
    info!(components = components.len(), "found strongly connected components");

    let (gscc, rest) = select_giant(components)?;
    info!(size = gscc.len(), "found giant component");

    classify(graph, gscc, rest, options)
}

/// Decompose `graph`, rank its nodes and assemble the report.
///
/// # Errors
///
/// See [`decompose`].
#[instrument(skip_all)]
pub fn analyze(
    graph: &LinkGraph,
    config: &AnalysisConfig,
    urls: Option<&NodeLabels>,
) -> Result<BowTieReport> {
    let bowtie = decompose(graph, &config.classify)?;

    let pagerank = PageRank::new(config.rank.pagerank_config()).rank(graph);
    let pagerank = match config.rank.top_n {
        Some(n) => pagerank.top(n),
        None => pagerank,
    };
    info!(entries = pagerank.len(), "pagerank calculated");

    let in_degree = config.rank.in_degree.then(|| InDegree.rank(graph));

    let mut report = assemble(&bowtie, &pagerank, in_degree.as_ref(), urls);
    report.content_hash = Some(graph.content_hash.clone());
    Ok(report)
}
