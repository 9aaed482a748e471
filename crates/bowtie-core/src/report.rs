//! Merge a bow-tie partition with rank data into per-node records.
//!
//! Rows follow PageRank order. Nodes the ranking does not mention (for
//! example because it was truncated to a top-N) come after, sorted by
//! identifier, and simply carry no rank data. Ranking entries for nodes
//! outside the partition are ignored.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::classify::{BowTie, Label};
use crate::rank::Ranking;

/// Optional human-readable label per node, such as the page URL.
pub type NodeLabels = HashMap<String, String>;

/// Position of a node within one ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankPosition {
    /// 0-based position in descending-score order.
    pub position: usize,
    pub score: f64,
}

/// One reported node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedNode {
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub label: Label,
    pub pagerank: Option<RankPosition>,
    pub in_degree: Option<RankPosition>,
}

/// Size of one bow-tie region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: Label,
    /// Nodes in the region.
    pub nodes: usize,
    /// Components in the region.
    pub components: usize,
    /// Share of all nodes, in percent.
    pub percent: f64,
}

/// Totals for the whole graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub node_count: usize,
    pub gscc_representative: String,
    pub queries: usize,
    /// One entry per label, in [`Label::ALL`] order.
    pub shares: Vec<LabelShare>,
}

impl ReportSummary {
    /// Share entry for `label`.
    #[must_use]
    pub fn share(&self, label: Label) -> Option<&LabelShare> {
        self.shares.iter().find(|s| s.label == label)
    }
}

/// Full analysis output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowTieReport {
    /// Content hash of the analysed graph, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub summary: ReportSummary,
    pub nodes: Vec<AnnotatedNode>,
}

impl BowTieReport {
    /// Record for `node`, if present.
    #[must_use]
    pub fn node(&self, node: &str) -> Option<&AnnotatedNode> {
        self.nodes.iter().find(|n| n.node == node)
    }
}

/// Merge `bowtie` with the rank oracles' output.
#[must_use]
pub fn assemble(
    bowtie: &BowTie,
    pagerank: &Ranking,
    in_degree: Option<&Ranking>,
    urls: Option<&NodeLabels>,
) -> BowTieReport {
    let partition = &bowtie.partition;
    let in_degree_pos = in_degree.map(Ranking::positions).unwrap_or_default();
    let lookup = |positions: &HashMap<&str, (usize, f64)>, node: &str| {
        positions
            .get(node)
            .map(|&(position, score)| RankPosition { position, score })
    };

    let annotate = |node: &str, label: Label, rank: Option<RankPosition>| AnnotatedNode {
        node: node.to_string(),
        url: urls.and_then(|u| u.get(node)).cloned(),
        label,
        pagerank: rank,
        in_degree: lookup(&in_degree_pos, node),
    };

    let mut nodes = Vec::with_capacity(partition.len());
    let mut reported: HashSet<&str> = HashSet::with_capacity(partition.len());
    let mut foreign = 0_usize;

    for (position, entry) in pagerank.entries().iter().enumerate() {
        let Some(label) = partition.label_of(&entry.node) else {
            foreign += 1;
            continue;
        };
        if !reported.insert(entry.node.as_str()) {
            continue;
        }
        nodes.push(annotate(
            &entry.node,
            label,
            Some(RankPosition {
                position,
                score: entry.score,
            }),
        ));
    }

    let mut unranked = 0_usize;
    for (node, label) in partition.iter() {
        if reported.contains(node) {
            continue;
        }
        unranked += 1;
        nodes.push(annotate(node, label, None));
    }

    debug!(
        ranked = reported.len(),
        unranked, foreign, "assembled bow-tie report"
    );

    BowTieReport {
        content_hash: None,
        summary: summarize(bowtie),
        nodes,
    }
}

/// Per-label counts and percentages.
#[must_use]
pub fn summarize(bowtie: &BowTie) -> ReportSummary {
    let total = bowtie.partition.len();
    let shares = Label::ALL
        .into_iter()
        .map(|label| {
            let nodes = bowtie.partition.count(label);
            LabelShare {
                label,
                nodes,
                components: bowtie.components.get(&label).copied().unwrap_or_default(),
                percent: if total == 0 {
                    0.0
                } else {
                    100.0 * nodes as f64 / total as f64
                },
            }
        })
        .collect();

    ReportSummary {
        node_count: total,
        gscc_representative: bowtie.gscc_representative.clone(),
        queries: bowtie.queries,
        shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::decompose;
    use crate::classify::ClassifyOptions;
    use crate::graph::LinkGraph;
    use crate::rank::{InDegree, RankEntry, RankOracle};

    fn example() -> (LinkGraph, BowTie) {
        let g = LinkGraph::from_edges([
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("X", "A"),
            ("A", "Y"),
        ]);
        let bt = decompose(&g, &ClassifyOptions::default()).expect("decompose");
        (g, bt)
    }

    fn ranking(entries: &[(&str, f64)]) -> Ranking {
        Ranking::from_sorted(
            entries
                .iter()
                .map(|(n, s)| RankEntry {
                    node: (*n).to_string(),
                    score: *s,
                })
                .collect(),
        )
        .expect("sorted")
    }

    #[test]
    fn rows_follow_rank_order_then_identifier() {
        let (_, bt) = example();
        let r = ranking(&[("Y", 0.5), ("A", 0.3)]);
        let report = assemble(&bt, &r, None, None);
        let order: Vec<&str> = report.nodes.iter().map(|n| n.node.as_str()).collect();
        assert_eq!(order, ["Y", "A", "B", "C", "X"]);
        assert_eq!(
            report.nodes[0].pagerank,
            Some(RankPosition {
                position: 0,
                score: 0.5
            })
        );
    }

    #[test]
    fn missing_rank_entries_are_not_fatal() {
        let (_, bt) = example();
        let report = assemble(&bt, &Ranking::default(), None, None);
        assert_eq!(report.nodes.len(), 5);
        assert!(report.nodes.iter().all(|n| n.pagerank.is_none()));
        assert_eq!(report.node("X").map(|n| n.label), Some(Label::In));
    }

    #[test]
    fn foreign_rank_entries_are_ignored() {
        let (_, bt) = example();
        let r = ranking(&[("ghost", 0.9), ("A", 0.1)]);
        let report = assemble(&bt, &r, None, None);
        assert!(report.node("ghost").is_none());
        assert_eq!(
            report.node("A").and_then(|n| n.pagerank).map(|p| p.position),
            Some(1)
        );
    }

    #[test]
    fn in_degree_and_urls_are_attached() {
        let (g, bt) = example();
        let indeg = InDegree.rank(&g);
        let urls: NodeLabels = [("A".to_string(), "https://a.example".to_string())].into();
        let report = assemble(&bt, &Ranking::default(), Some(&indeg), Some(&urls));
        let a = report.node("A").expect("A");
        assert_eq!(a.url.as_deref(), Some("https://a.example"));
        assert_eq!(a.in_degree.map(|p| p.score), Some(2.0));
        assert!(report.node("B").and_then(|n| n.url.as_ref()).is_none());
    }

    #[test]
    fn summary_percentages() {
        let (_, bt) = example();
        let summary = summarize(&bt);
        assert_eq!(summary.node_count, 5);
        let gscc = summary.share(Label::Gscc).expect("gscc");
        assert_eq!(gscc.nodes, 3);
        assert_eq!(gscc.components, 1);
        assert!((gscc.percent - 60.0).abs() < 1e-9);
        let total: f64 = summary.shares.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn json_shape_is_stable() {
        let (_, bt) = example();
        let r = ranking(&[("A", 0.4)]);
        let report = assemble(&bt, &r, None, None);
        let v = serde_json::to_value(&report).expect("serialize");
        assert!(v.get("content_hash").is_none());
        assert_eq!(v["summary"]["shares"][1]["label"], "in");
        assert_eq!(v["nodes"][0]["node"], "A");
        assert_eq!(v["nodes"][0]["pagerank"]["position"], 0);
        assert!(v["nodes"][1]["pagerank"].is_null());
        assert!(v["nodes"][0].get("url").is_none());
    }
}
