//! Known-topology regression tests for the decomposition engine.
//!
//! Each test uses a hand-crafted graph whose bow-tie regions can be worked
//! out on paper. Expected regions are hardcoded.

use bowtie_core::analyze::decompose;
use bowtie_core::classify::{BowTie, ClassifyOptions, Label, classify};
use bowtie_core::error::BowTieError;
use bowtie_core::graph::{LinkGraph, LinkGraphBuilder, LinkSource};
use bowtie_core::reach::{can_reach, can_reach_ids};
use bowtie_core::scc::{find_components, select_giant};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_graph_with_isolated(nodes: &[&str], edges: &[(&str, &str)]) -> LinkGraph {
    let mut b = LinkGraphBuilder::new();
    for id in nodes {
        b.add_node(id);
    }
    for (from, to) in edges {
        b.add_edge(from, to);
    }
    b.build()
}

fn run(graph: &LinkGraph) -> BowTie {
    decompose(graph, &ClassifyOptions::default()).expect("decompose")
}

fn members(bt: &BowTie, label: Label) -> Vec<&str> {
    bt.partition
        .members(label)
        .iter()
        .map(String::as_str)
        .collect()
}

// ===========================================================================
// Topology 1: three-cycle plus isolated node
//
//   A → B → C → A        D
// ===========================================================================

#[test]
fn triangle_reachability() {
    let g = build_graph_with_isolated(&["D"], &[("A", "B"), ("B", "C"), ("C", "A")]);
    assert!(can_reach_ids(&g, "A", "C").expect("A->C"));
    assert!(!can_reach_ids(&g, "D", "A").expect("D->A"));
}

#[test]
fn triangle_components() {
    let g = build_graph_with_isolated(&["D"], &[("A", "B"), ("B", "C"), ("C", "A")]);
    let comps = find_components(&g);
    assert_eq!(comps.len(), 2);

    let (giant, rest) = select_giant(comps).expect("giant");
    let giant_ids: Vec<&str> = giant.member_ids(&g).collect();
    assert_eq!(giant_ids, ["A", "B", "C"]);
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].member_ids(&g).collect::<Vec<_>>(), ["D"]);
}

#[test]
fn triangle_isolated_node_is_disconnected() {
    let g = build_graph_with_isolated(&["D"], &[("A", "B"), ("B", "C"), ("C", "A")]);
    let bt = run(&g);
    assert_eq!(members(&bt, Label::Gscc), ["A", "B", "C"]);
    assert_eq!(members(&bt, Label::Disconnected), ["D"]);
}

// ===========================================================================
// Topology 2: textbook bow-tie
//
//        W
//        ↑
//        X ──→ A ⇄ B ⇄ C     (A → B → C → A)
//        │     │
//        ↓     ↓
//        Z ──→ Y
// ===========================================================================

fn bowtie_graph() -> LinkGraph {
    LinkGraph::from_edges([
        ("A", "B"),
        ("B", "C"),
        ("C", "A"),
        ("X", "A"),
        ("A", "Y"),
        ("X", "Z"),
        ("Z", "Y"),
        ("X", "W"),
    ])
}

#[test]
fn bowtie_regions() {
    let bt = run(&bowtie_graph());
    assert_eq!(members(&bt, Label::Gscc), ["A", "B", "C"]);
    assert_eq!(members(&bt, Label::In), ["X"]);
    assert_eq!(members(&bt, Label::Out), ["Y"]);
    assert_eq!(members(&bt, Label::Tube), ["Z"]);
    assert_eq!(members(&bt, Label::Tendril), ["W"]);
    assert!(members(&bt, Label::Disconnected).is_empty());
}

#[test]
fn bowtie_component_counts() {
    let bt = run(&bowtie_graph());
    assert_eq!(bt.components[&Label::Gscc], 1);
    assert_eq!(bt.components[&Label::In], 1);
    assert_eq!(bt.components[&Label::Out], 1);
    assert_eq!(bt.components[&Label::Tube], 1);
    assert_eq!(bt.components[&Label::Tendril], 1);
    assert_eq!(bt.components[&Label::Disconnected], 0);
}

#[test]
fn bowtie_is_idempotent() {
    let g = bowtie_graph();
    assert_eq!(run(&g), run(&g));
}

#[test]
fn bowtie_parallel_agrees() {
    let g = bowtie_graph();
    let par = decompose(
        &g,
        &ClassifyOptions {
            parallel: true,
            ..ClassifyOptions::default()
        },
    )
    .expect("parallel");
    assert_eq!(run(&g).partition, par.partition);
}

// ===========================================================================
// Topology 3: multi-node IN/OUT components and a tendril hanging off OUT
//
//   P ⇄ Q → A ⇄ B → R ⇄ S ← T        U (isolated)    V ⇄ V2
// ===========================================================================

#[test]
fn multi_node_regions() {
    let g = build_graph_with_isolated(
        &["U"],
        &[
            ("A", "B"),
            ("B", "A"),
            ("M", "A"),
            ("A", "M"),
            ("P", "Q"),
            ("Q", "P"),
            ("Q", "A"),
            ("B", "R"),
            ("R", "S"),
            ("S", "R"),
            ("T", "S"),
            ("V", "V2"),
            ("V2", "V"),
        ],
    );
    let bt = run(&g);
    assert_eq!(members(&bt, Label::Gscc), ["A", "B", "M"]);
    assert_eq!(members(&bt, Label::In), ["P", "Q"]);
    assert_eq!(members(&bt, Label::Out), ["R", "S"]);
    assert_eq!(members(&bt, Label::Tendril), ["T"]);
    assert_eq!(members(&bt, Label::Disconnected), ["U", "V", "V2"]);
    assert_eq!(bt.components[&Label::Disconnected], 2);
}

// ===========================================================================
// Topology 4: tendril reached from IN, not reaching OUT, chained twice
//
//   I → A ⇄ B → O
//   I → t1 → t2
// ===========================================================================

#[test]
fn chained_in_tendrils() {
    let g = LinkGraph::from_edges([
        ("A", "B"),
        ("B", "A"),
        ("I", "A"),
        ("B", "O"),
        ("I", "t1"),
        ("t1", "t2"),
    ]);
    let bt = run(&g);
    assert_eq!(members(&bt, Label::Tendril), ["t1", "t2"]);
    assert!(members(&bt, Label::Tube).is_empty());
}

// ===========================================================================
// Topology 5: first-match tie-break across IN-subsets
//
// I1 and I2 are both IN. C is reachable only from I2 and reaches OUT;
// D is reachable from both and does not reach OUT.
// ===========================================================================

#[test]
fn first_in_match_decides() {
    let g = LinkGraph::from_edges([
        ("A", "B"),
        ("B", "A"),
        ("I1", "A"),
        ("I2", "A"),
        ("A", "O"),
        ("I2", "C"),
        ("C", "O"),
        ("I1", "D"),
        ("I2", "D"),
    ]);
    let bt = run(&g);
    assert_eq!(bt.partition.label_of("C"), Some(Label::Tube));
    assert_eq!(bt.partition.label_of("D"), Some(Label::Tendril));
}

// ===========================================================================
// Error paths
// ===========================================================================

#[test]
fn empty_graph_is_rejected() {
    let g = LinkGraphBuilder::new().build();
    assert!(matches!(
        decompose(&g, &ClassifyOptions::default()),
        Err(BowTieError::InvalidInput(_))
    ));
}

#[test]
fn negative_weights_abort_classification() {
    // Components: giant {A,B}; S, N1, N2 and the Q chain are singletons.
    // Phase 1 asks whether S reaches the giant; the forward side settles
    // S, then N1 (1), then N2 (5) whose -10 edge contradicts N1.
    let mut b = LinkGraphBuilder::new();
    b.add_edge("A", "B").add_edge("B", "A");
    b.add_edge("Q2", "Q1").add_edge("Q1", "A");
    b.add_weighted_edge("S", "N1", 1.0);
    b.add_weighted_edge("S", "N2", 5.0);
    b.add_weighted_edge("N2", "N1", -10.0);
    let g = b.build();

    let s = g.node_index("S").expect("S");
    let a = g.node_index("A").expect("A");
    assert_eq!(
        can_reach(&g, s, a),
        Err(BowTieError::InconsistentWeights {
            node: "N1".to_string()
        })
    );

    let (gscc, rest) = select_giant(find_components(&g)).expect("giant");
    let err = classify(&g, gscc, rest, &ClassifyOptions::default()).expect_err("fatal");
    assert!(matches!(err, BowTieError::InconsistentWeights { .. }));
}

#[test]
fn every_node_id_is_labelled() {
    let g = bowtie_graph();
    let bt = run(&g);
    for idx in g.node_indices() {
        assert!(bt.partition.label_of(g.node_id(idx)).is_some());
    }
    assert_eq!(bt.partition.len(), g.node_count());
}
