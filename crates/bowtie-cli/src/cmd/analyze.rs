//! `bt analyze`: full bow-tie decomposition with rank annotations.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, ensure};
use bowtie_core::analyze::analyze;
use bowtie_core::classify::Label;
use bowtie_core::config::AnalysisConfig;
use bowtie_core::graph::Traversal;
use bowtie_core::report::{AnnotatedNode, BowTieReport, RankPosition};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::load_graph;
use crate::load::load_labels;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bt analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Edge list to analyse.
    #[arg(value_name = "EDGES")]
    pub edges: PathBuf,

    /// `node;label` file attaching a URL or title to each node.
    #[arg(long, value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// Keep only the best N PageRank entries.
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Stop loading edges once the graph holds this many nodes.
    #[arg(long, value_name = "N")]
    pub node_limit: Option<usize>,

    /// PageRank damping factor.
    #[arg(long)]
    pub damping: Option<f64>,

    /// Compute classification votes on all cores.
    #[arg(long)]
    pub parallel: bool,

    /// Ignore edge direction during reachability queries.
    #[arg(long)]
    pub undirected: bool,

    /// Skip the in-degree ranking.
    #[arg(long)]
    pub no_in_degree: bool,

    /// Only list nodes in this region (gscc, in, out, tendril, tube, disconnected).
    #[arg(long, value_name = "LABEL")]
    pub region: Option<Label>,

    /// Node rows to print in pretty/text output (0 prints none).
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

impl AnalyzeArgs {
    /// Layer command-line overrides on top of the file configuration.
    fn apply(&self, config: &mut AnalysisConfig) -> Result<()> {
        if let Some(d) = self.damping {
            ensure!((0.0..=1.0).contains(&d), "--damping must be within [0, 1], got {d}");
            config.rank.damping = d;
        }
        if self.top.is_some() {
            config.rank.top_n = self.top;
        }
        if self.no_in_degree {
            config.rank.in_degree = false;
        }
        if self.node_limit.is_some() {
            config.load.node_limit = self.node_limit;
        }
        if self.parallel {
            config.classify.parallel = true;
        }
        if self.undirected {
            config.classify.traversal = Traversal::Undirected;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    source: String,
    truncated: bool,
    #[serde(flatten)]
    report: BowTieReport,
}

/// Execute `bt analyze`.
///
/// # Errors
///
/// Fails if the inputs cannot be loaded, an override is out of range, or
/// the engine rejects the graph.
pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode, config: &AnalysisConfig) -> Result<()> {
    let mut config = config.clone();
    args.apply(&mut config)?;

    let loaded = load_graph(&args.edges, config.load.node_limit)?;
    let urls = args.labels.as_deref().map(load_labels).transpose()?;

    let mut report = analyze(&loaded.graph, &config, urls.as_ref())?;
    info!(
        nodes = report.summary.node_count,
        queries = report.summary.queries,
        "analysis complete"
    );
    if let Some(region) = args.region {
        report.nodes.retain(|n| n.label == region);
    }

    let payload = AnalyzeOutput {
        source: args.edges.display().to_string(),
        truncated: loaded.truncated,
        report,
    };
    let rows = args.rows;
    render_mode(
        output,
        &payload,
        |p, w| render_analyze_text(p, rows, w),
        |p, w| render_analyze_pretty(p, rows, w),
    )
}

fn position(rank: Option<RankPosition>) -> String {
    rank.map_or_else(|| "-".to_string(), |r| r.position.to_string())
}

fn render_analyze_text(
    payload: &AnalyzeOutput,
    rows: usize,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let summary = &payload.report.summary;
    writeln!(
        w,
        "nodes {} gscc_rep {} queries {}",
        summary.node_count, summary.gscc_representative, summary.queries
    )?;
    for share in &summary.shares {
        writeln!(
            w,
            "{}\t{}\t{}\t{:.2}",
            share.label, share.nodes, share.components, share.percent
        )?;
    }
    for node in payload.report.nodes.iter().take(rows) {
        write_text_row(node, w)?;
    }
    Ok(())
}

fn write_text_row(node: &AnnotatedNode, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}",
        node.node,
        node.label,
        position(node.pagerank),
        position(node.in_degree),
        node.url.as_deref().unwrap_or("-")
    )
}

fn render_analyze_pretty(
    payload: &AnalyzeOutput,
    rows: usize,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let report = &payload.report;
    let summary = &report.summary;

    pretty_section(w, "Bow-tie decomposition")?;
    pretty_kv(w, "Source", &payload.source)?;
    if payload.truncated {
        pretty_kv(w, "Loading", "stopped at node limit")?;
    }
    if let Some(hash) = &report.content_hash {
        pretty_kv(w, "Content", hash)?;
    }
    pretty_kv(w, "Nodes", summary.node_count.to_string())?;
    pretty_kv(w, "GSCC rep", &summary.gscc_representative)?;
    pretty_kv(w, "Queries", summary.queries.to_string())?;
    writeln!(w)?;

    writeln!(w, "{:<14} {:>10} {:>11} {:>8}", "REGION", "NODES", "COMPONENTS", "SHARE")?;
    for share in &summary.shares {
        writeln!(
            w,
            "{:<14} {:>10} {:>11} {:>7.2}%",
            share.label.as_str().to_uppercase(),
            share.nodes,
            share.components,
            share.percent
        )?;
    }

    if rows == 0 || report.nodes.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    pretty_section(w, "Nodes by PageRank")?;
    writeln!(w, "{:>6} {:<24} {:<13} {:>9}  URL", "RANK", "NODE", "REGION", "IN-DEG")?;
    for node in report.nodes.iter().take(rows) {
        writeln!(
            w,
            "{:>6} {:<24} {:<13} {:>9}  {}",
            position(node.pagerank),
            node.node,
            node.label.as_str(),
            node.in_degree.map_or_else(|| "-".to_string(), |r| format!("{:.0}", r.score)),
            node.url.as_deref().unwrap_or("")
        )?;
    }
    if report.nodes.len() > rows {
        writeln!(w, "... {} more (use --rows or --json)", report.nodes.len() - rows)?;
    }
    Ok(())
}
