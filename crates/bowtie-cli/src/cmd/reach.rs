//! `bt reach`: single reachability query.

use std::path::PathBuf;

use anyhow::Result;
use bowtie_core::error::BowTieError;
use bowtie_core::graph::{LinkGraph, Traversal};
use bowtie_core::reach::Reachability;
use clap::Args;
use serde::Serialize;

use super::load_graph;
use crate::output::{OutputMode, render};

/// Arguments for `bt reach`.
#[derive(Args, Debug)]
pub struct ReachArgs {
    /// Edge list to query.
    #[arg(value_name = "EDGES")]
    pub edges: PathBuf,

    /// Node the path starts at.
    pub from: String,

    /// Node the path ends at.
    pub to: String,

    /// Ignore edge direction.
    #[arg(long)]
    pub undirected: bool,
}

#[derive(Debug, Serialize)]
struct ReachOutput {
    from: String,
    to: String,
    reachable: bool,
    settled: usize,
    traversal: Traversal,
}

fn query(graph: &LinkGraph, args: &ReachArgs) -> Result<ReachOutput, BowTieError> {
    let lookup = |id: &str| {
        graph
            .node_index(id)
            .ok_or_else(|| BowTieError::invalid(format!("unknown node `{id}`")))
    };
    let traversal = if args.undirected {
        Traversal::Undirected
    } else {
        Traversal::Directed
    };
    let outcome = Reachability::new(traversal).search(graph, lookup(&args.from)?, lookup(&args.to)?)?;
    Ok(ReachOutput {
        from: args.from.clone(),
        to: args.to.clone(),
        reachable: outcome.reachable,
        settled: outcome.settled,
        traversal,
    })
}

/// Execute `bt reach`.
///
/// # Errors
///
/// Fails if the edge file cannot be loaded, either node is unknown, or the
/// search hits contradictory weights.
pub fn run_reach(args: &ReachArgs, output: OutputMode, node_limit: Option<usize>) -> Result<()> {
    let loaded = load_graph(&args.edges, node_limit)?;
    let payload = query(&loaded.graph, args)?;
    render(output, &payload, |p, w| {
        let verdict = if p.reachable { "reachable" } else { "unreachable" };
        writeln!(w, "{} -> {}: {verdict} ({} settled)", p.from, p.to, p.settled)
    })
}
