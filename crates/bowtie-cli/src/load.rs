//! Edge-list and label-file loading.
//!
//! Two line shapes are accepted and may be mixed in one file:
//!
//! ```text
//! # plain edges, optional weight
//! a b
//! a c 2.5
//! # adjacency lines, as exported from a crawl
//! a -> {b c d}
//! ```
//!
//! Blank lines and `#` comments are skipped.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use bowtie_core::graph::{LinkGraph, LinkGraphBuilder};
use bowtie_core::report::NodeLabels;
use tracing::{debug, info, instrument};

/// A parsed edge file.
#[derive(Debug)]
pub struct LoadedGraph {
    pub graph: LinkGraph,
    /// Lines consumed before loading stopped.
    pub lines: usize,
    /// Set when the node limit cut loading short.
    pub truncated: bool,
}

/// Read and parse an edge file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is malformed.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_edges(path: &Path, node_limit: Option<usize>) -> Result<LoadedGraph> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read edge file {}", path.display()))?;
    let loaded = parse_edges(&text, node_limit)
        .with_context(|| format!("failed to parse edge file {}", path.display()))?;
    info!(
        nodes = loaded.graph.node_count(),
        edges = loaded.graph.edge_count(),
        truncated = loaded.truncated,
        "graph loaded"
    );
    Ok(loaded)
}

/// Parse edge-list text.
///
/// Loading stops before the first line read after the graph holds at least
/// `node_limit` nodes.
///
/// # Errors
///
/// Returns an error naming the offending line number if a line is
/// malformed.
pub fn parse_edges(text: &str, node_limit: Option<usize>) -> Result<LoadedGraph> {
    let mut builder = LinkGraphBuilder::new();
    let mut lines = 0;
    let mut truncated = false;

    for (no, raw) in text.lines().enumerate() {
        if node_limit.is_some_and(|limit| builder.node_count() >= limit) {
            debug!(line = no + 1, "node limit reached");
            truncated = true;
            break;
        }
        lines = no + 1;

        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }
        parse_line(&mut builder, line).with_context(|| format!("line {}: {raw:?}", no + 1))?;
    }

    Ok(LoadedGraph {
        graph: builder.build(),
        lines,
        truncated,
    })
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(head, _)| head).trim()
}

fn parse_line(builder: &mut LinkGraphBuilder, line: &str) -> Result<()> {
    if let Some((source, targets)) = line.split_once("->") {
        let source = source.trim();
        if source.is_empty() {
            bail!("adjacency line has no source node");
        }
        builder.add_node(source);
        let targets = targets.trim().trim_start_matches('{').trim_end_matches(['}', ';']);
        for target in targets
            .split(|c: char| c.is_whitespace() || c == ';' || c == ',')
            .filter(|t| !t.is_empty())
        {
            builder.add_edge(source, target);
        }
        return Ok(());
    }

    let mut fields = line.split_whitespace();
    let (Some(from), Some(to)) = (fields.next(), fields.next()) else {
        bail!("expected `source target [weight]`");
    };
    match fields.next() {
        None => {
            builder.add_edge(from, to);
        }
        Some(w) => {
            let weight: f64 = w.parse().with_context(|| format!("invalid weight {w:?}"))?;
            builder.add_weighted_edge(from, to, weight);
        }
    }
    if fields.next().is_some() {
        bail!("trailing fields after weight");
    }
    Ok(())
}

/// Read a `node;label` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line has no `;`.
pub fn load_labels(path: &Path) -> Result<NodeLabels> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read label file {}", path.display()))?;
    parse_labels(&text).with_context(|| format!("failed to parse label file {}", path.display()))
}

/// Parse `node;label` lines. Later lines win on duplicate nodes.
///
/// # Errors
///
/// Returns an error naming the first line without a `;` separator.
pub fn parse_labels(text: &str) -> Result<NodeLabels> {
    let mut labels = NodeLabels::new();
    for (no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((node, label)) = line.split_once(';') else {
            bail!("line {}: expected `node;label`, got {raw:?}", no + 1);
        };
        labels.insert(node.trim().to_string(), label.trim().to_string());
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_edges_and_comments() {
        let text = "# crawl\n\na b\nb a  # back link\nc a\n";
        let loaded = parse_edges(text, None).expect("parse");
        assert_eq!(loaded.graph.node_count(), 3);
        assert_eq!(loaded.graph.edge_count(), 3);
        assert!(!loaded.truncated);
        assert_eq!(loaded.lines, 5);
    }

    #[test]
    fn adjacency_lines() {
        let text = "1 -> {2 3 4}\n2 -> {1}\n5 -> {}\n";
        let loaded = parse_edges(text, None).expect("parse");
        let g = &loaded.graph;
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 4);
        let one = g.node_index("1").expect("1");
        assert_eq!(g.out_degree(one), 3);
        assert!(g.node_index("5").is_some());
    }

    #[test]
    fn adjacency_accepts_dot_separators() {
        let loaded = parse_edges("a -> {b; c;}\n", None).expect("parse");
        assert_eq!(loaded.graph.edge_count(), 2);
    }

    #[test]
    fn weighted_edge() {
        let loaded = parse_edges("a b 2.5\n", None).expect("parse");
        let g = &loaded.graph;
        let a = g.node_index("a").expect("a");
        let b = g.node_index("b").expect("b");
        let e = g.graph.find_edge(a, b).expect("edge");
        assert!((g.graph[e] - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_edges("lonely\n", None).is_err());
        assert!(parse_edges("a b heavy\n", None).is_err());
        assert!(parse_edges("a b 1 2\n", None).is_err());
        assert!(parse_edges(" -> {b}\n", None).is_err());
    }

    #[test]
    fn error_names_line_number() {
        let err = parse_edges("a b\nbroken\n", None).expect_err("malformed");
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn node_limit_stops_loading() {
        let text = "a b\nc d\ne f\n";
        let loaded = parse_edges(text, Some(3)).expect("parse");
        assert!(loaded.truncated);
        assert_eq!(loaded.graph.node_count(), 4);
        assert_eq!(loaded.lines, 2);
    }

    #[test]
    fn labels_parse() {
        let labels = parse_labels("1;https://a.example/\n\n2 ; https://b.example/x\n")
            .expect("parse");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["2"], "https://b.example/x");
    }

    #[test]
    fn labels_need_separator() {
        let err = parse_labels("1 https://a.example/\n").expect_err("no separator");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn load_edges_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_edges(&dir.path().join("nope.txt"), None).expect_err("missing");
        assert!(err.to_string().contains("failed to read edge file"));
    }
}
