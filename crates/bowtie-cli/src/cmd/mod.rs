pub mod analyze;
pub mod completions;
pub mod components;
pub mod reach;

use std::path::Path;

use anyhow::Result;
use bowtie_core::error::ErrorCode;
use tracing::warn;

use crate::load::{LoadedGraph, load_edges};
use crate::output::WithCode;

/// Load the edge file every graph command starts from.
pub(crate) fn load_graph(path: &Path, node_limit: Option<usize>) -> Result<LoadedGraph> {
    let loaded = load_edges(path, node_limit).with_code(ErrorCode::GraphLoadFailed)?;
    if loaded.truncated {
        warn!(
            lines = loaded.lines,
            nodes = loaded.graph.node_count(),
            "node limit reached, rest of the edge file ignored"
        );
    }
    Ok(loaded)
}
