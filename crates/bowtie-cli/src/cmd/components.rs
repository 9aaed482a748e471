//! `bt components`: list strongly connected components, largest first.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bowtie_core::graph::LinkGraph;
use bowtie_core::scc::{Component, find_components, select_giant};
use clap::Args;
use serde::Serialize;

use super::load_graph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bt components`.
#[derive(Args, Debug)]
pub struct ComponentsArgs {
    /// Edge list to analyse.
    #[arg(value_name = "EDGES")]
    pub edges: PathBuf,

    /// Stop loading edges once the graph holds this many nodes.
    #[arg(long, value_name = "N")]
    pub node_limit: Option<usize>,

    /// Hide components smaller than this.
    #[arg(long, default_value_t = 1)]
    pub min_size: usize,
}

#[derive(Debug, Serialize)]
struct ComponentRow {
    id: usize,
    size: usize,
    representative: String,
    giant: bool,
    members: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ComponentsOutput {
    node_count: usize,
    component_count: usize,
    giant: usize,
    components: Vec<ComponentRow>,
}

fn row(graph: &LinkGraph, component: &Component, giant: bool) -> ComponentRow {
    let members: Vec<String> = component.member_ids(graph).map(str::to_string).collect();
    ComponentRow {
        id: component.id,
        size: component.len(),
        representative: members.first().cloned().unwrap_or_default(),
        giant,
        members,
    }
}

fn collect(graph: &LinkGraph, min_size: usize) -> Result<ComponentsOutput> {
    let components = find_components(graph);
    let component_count = components.len();
    let (gscc, rest) = select_giant(components)?;

    let mut rows: Vec<ComponentRow> = std::iter::once(row(graph, &gscc, true))
        .chain(rest.iter().map(|c| row(graph, c, false)))
        .filter(|r| r.size >= min_size)
        .collect();
    rows.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)));

    Ok(ComponentsOutput {
        node_count: graph.node_count(),
        component_count,
        giant: gscc.id,
        components: rows,
    })
}

/// Execute `bt components`.
///
/// # Errors
///
/// Fails if the edge file cannot be loaded or holds no nodes.
pub fn run_components(
    args: &ComponentsArgs,
    output: OutputMode,
    node_limit: Option<usize>,
) -> Result<()> {
    let loaded = load_graph(&args.edges, args.node_limit.or(node_limit))?;
    let payload = collect(&loaded.graph, args.min_size)?;
    render_mode(output, &payload, render_components_text, render_components_pretty)
}

fn render_components_text(payload: &ComponentsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for c in &payload.components {
        writeln!(w, "{}\t{}\t{}", c.id, c.size, c.members.join(" "))?;
    }
    Ok(())
}

fn render_components_pretty(
    payload: &ComponentsOutput,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Strongly connected components")?;
    pretty_kv(w, "Nodes", payload.node_count.to_string())?;
    pretty_kv(w, "Components", payload.component_count.to_string())?;
    if payload.components.is_empty() {
        writeln!(w, "\nNo components at this size.")?;
        return Ok(());
    }
    writeln!(w)?;
    for c in &payload.components {
        let tag = if c.giant { "  (giant)" } else { "" };
        writeln!(w, "#{:<6} {:>8} nodes  rep {}{tag}", c.id, c.size, c.representative)?;
    }
    Ok(())
}
