//! Bow-tie classification of the components around the GSCC.
//!
//! # Overview
//!
//! Given the giant component and every other SCC, each remaining component
//! is placed in exactly one region:
//!
//! ```text
//!                 TENDRIL            TENDRIL
//!                    ↑                  ↑
//!     IN ─────────→ GSCC ─────────────→ OUT
//!      │                                 ↑
//!      └──────────── TUBE ───────────────┘
//!
//!     DISCONNECTED (no relation to GSCC, IN or OUT)
//! ```
//!
//! # Protocol
//!
//! **Phase 1** walks the unclassified components in discovery order. A
//! component whose representative reaches the GSCC representative joins IN;
//! otherwise, one reachable from the GSCC joins OUT. IN is checked first.
//! Classified components are appended to the IN-subset or OUT-subset list.
//!
//! **Phase 2** walks what is left. The IN-subsets are scanned in Phase-1
//! order and only the *first* one that reaches the component decides the
//! outcome: TUBE if the component reaches any OUT-subset, TENDRIL otherwise.
//! When no IN-subset reaches it, the component is a TENDRIL if it reaches
//! any OUT-subset and DISCONNECTED if not.
//!
//! # State
//!
//! A [`ClassifierContext`] owns an arena of component slots. Each slot moves
//! from `Unclassified` to `Classified(label)` exactly once through
//! [`ClassifierContext::assign`]; nothing is removed from a list while it is
//! being iterated.
//!
//! # Parallelism
//!
//! With [`ClassifyOptions::parallel`] the per-component votes of each phase
//! are computed on the rayon pool against frozen inputs (the GSCC
//! representative in Phase 1, the IN/OUT-subset lists as they stand at the
//! start of Phase 2) and applied afterwards by a single writer in discovery
//! order. Sequential and parallel runs produce the same partition.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::error::{BowTieError, Result};
use crate::graph::{LinkSource, Traversal};
use crate::reach::Reachability;
use crate::scc::Component;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Bow-tie region of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Gscc,
    In,
    Out,
    Tendril,
    Tube,
    Disconnected,
}

impl Label {
    /// Every label, in report order.
    pub const ALL: [Self; 6] = [
        Self::Gscc,
        Self::In,
        Self::Out,
        Self::Tendril,
        Self::Tube,
        Self::Disconnected,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gscc => "gscc",
            Self::In => "in",
            Self::Out => "out",
            Self::Tendril => "tendril",
            Self::Tube => "tube",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = BowTieError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BowTieError::invalid(format!("unknown bow-tie label `{s}`")))
    }
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// Assignment of every graph node to exactly one [`Label`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    #[serde(skip)]
    assignment: BTreeMap<String, Label>,
    /// Sorted member identifiers per label; every label is present.
    sets: BTreeMap<Label, Vec<String>>,
}

impl Partition {
    fn from_assignment(assignment: BTreeMap<String, Label>) -> Self {
        let mut sets: BTreeMap<Label, Vec<String>> =
            Label::ALL.into_iter().map(|l| (l, Vec::new())).collect();
        for (node, label) in &assignment {
            sets.entry(*label).or_default().push(node.clone());
        }
        Self { assignment, sets }
    }

    /// Label assigned to `node`, if it is part of the graph.
    #[must_use]
    pub fn label_of(&self, node: &str) -> Option<Label> {
        self.assignment.get(node).copied()
    }

    /// Sorted identifiers of the nodes carrying `label`.
    #[must_use]
    pub fn members(&self, label: Label) -> &[String] {
        self.sets.get(&label).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of nodes carrying `label`.
    #[must_use]
    pub fn count(&self, label: Label) -> usize {
        self.members(label).len()
    }

    /// Total number of labelled nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// `(node, label)` pairs sorted by node identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Label)> {
        self.assignment.iter().map(|(n, l)| (n.as_str(), *l))
    }
}

// ---------------------------------------------------------------------------
// Options and output
// ---------------------------------------------------------------------------

/// Knobs for a classification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    /// Compute per-phase votes on the rayon thread pool.
    pub parallel: bool,
    /// Direction strategy handed to the reachability oracle.
    pub traversal: Traversal,
    /// Emit a progress event every this many components (0 disables).
    pub progress_interval: usize,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            traversal: Traversal::Directed,
            progress_interval: 100,
        }
    }
}

/// Result of a full classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BowTie {
    /// Node-level partition.
    pub partition: Partition,
    /// Identifier of the GSCC representative.
    pub gscc_representative: String,
    /// Number of components that ended in each region (GSCC counts as one).
    pub components: BTreeMap<Label, usize>,
    /// Reachability queries issued by the classifier.
    pub queries: usize,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Classify every component around `gscc`.
///
/// `rest` holds every other component of the graph, in discovery order.
///
/// # Errors
///
/// Any reachability failure aborts the run. [`BowTieError::IncompletePartition`]
/// is returned if the final partition does not cover every node exactly
/// once.
#[instrument(skip_all, fields(gscc = gscc.len(), components = rest.len() + 1))]
pub fn classify<G>(
    graph: &G,
    gscc: Component,
    rest: Vec<Component>,
    options: &ClassifyOptions,
) -> Result<BowTie>
where
    G: LinkSource + Sync,
{
    let mut ctx = ClassifierContext::new(graph, gscc, rest, options);
    ctx.split_in_out()?;
    ctx.split_periphery()?;
    ctx.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Unclassified,
    Classified(Label),
}

#[derive(Debug)]
struct Slot {
    component: Component,
    state: SlotState,
}

/// Working state of one classification run.
#[derive(Debug)]
pub struct ClassifierContext<'g, G> {
    graph: &'g G,
    oracle: Reachability,
    options: ClassifyOptions,
    gscc: Component,
    slots: Vec<Slot>,
    /// Slot indices of IN components, in classification order.
    in_subsets: Vec<usize>,
    /// Slot indices of OUT components, in classification order.
    out_subsets: Vec<usize>,
    queries: AtomicUsize,
}

impl<'g, G> ClassifierContext<'g, G>
where
    G: LinkSource + Sync,
{
    /// Set up a context with every non-giant component unclassified.
    pub fn new(graph: &'g G, gscc: Component, rest: Vec<Component>, options: &ClassifyOptions) -> Self {
        let slots = rest
            .into_iter()
            .map(|component| Slot {
                component,
                state: SlotState::Unclassified,
            })
            .collect();
        Self {
            graph,
            oracle: Reachability::new(options.traversal),
            options: options.clone(),
            gscc,
            slots,
            in_subsets: Vec::new(),
            out_subsets: Vec::new(),
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of components still waiting for a label.
    #[must_use]
    pub fn unclassified_count(&self) -> usize {
        self.unclassified().count()
    }

    /// Phase 1: move components that reach, or are reached from, the GSCC
    /// into IN or OUT.
    ///
    /// # Errors
    ///
    /// Propagates reachability failures.
    pub fn split_in_out(&mut self) -> Result<()> {
        let pending: Vec<usize> = self.unclassified().collect();
        let gscc_rep = self.gscc.representative();

        let votes = self.collect_votes(&pending, "in/out", |ctx, idx| {
            let rep = ctx.slots[idx].component.representative();
            if ctx.reach(rep, gscc_rep)? {
                Ok(Some(Label::In))
            } else if ctx.reach(gscc_rep, rep)? {
                Ok(Some(Label::Out))
            } else {
                Ok(None)
            }
        })?;

        for (idx, vote) in pending.into_iter().zip(votes) {
            if let Some(label) = vote {
                self.assign(idx, label);
            }
        }

        info!(
            in_components = self.in_subsets.len(),
            out_components = self.out_subsets.len(),
            remaining = self.unclassified_count(),
            "found the in & out sets"
        );
        Ok(())
    }

    /// Phase 2: classify what is left as TUBE, TENDRIL or DISCONNECTED.
    ///
    /// # Errors
    ///
    /// Propagates reachability failures.
    pub fn split_periphery(&mut self) -> Result<()> {
        let pending: Vec<usize> = self.unclassified().collect();
        let in_reps = self.representatives(&self.in_subsets);
        let out_reps = self.representatives(&self.out_subsets);

        let votes = self.collect_votes(&pending, "periphery", |ctx, idx| {
            let rep = ctx.slots[idx].component.representative();
            ctx.periphery_vote(rep, &in_reps, &out_reps).map(Some)
        })?;

        for (idx, vote) in pending.into_iter().zip(votes) {
            if let Some(label) = vote {
                self.assign(idx, label);
            }
        }

        info!("found the tendril, tube & disconnected sets");
        Ok(())
    }

    /// Record the final label of slot `idx`.
    ///
    /// Already classified slots are left untouched.
    pub fn assign(&mut self, idx: usize, label: Label) {
        let Some(slot) = self.slots.get_mut(idx) else {
            return;
        };
        if slot.state != SlotState::Unclassified {
            return;
        }
        slot.state = SlotState::Classified(label);
        match label {
            Label::In => self.in_subsets.push(idx),
            Label::Out => self.out_subsets.push(idx),
            _ => {}
        }
    }

    /// Build and verify the partition.
    ///
    /// # Errors
    ///
    /// Returns [`BowTieError::IncompletePartition`] if a node is unlabelled
    /// or labelled more than once.
    pub fn finish(self) -> Result<BowTie> {
        let node_count = self.graph.node_count();
        let mut seen = FixedBitSet::with_capacity(node_count);
        let mut duplicated = 0_usize;
        let mut assignment = BTreeMap::new();
        let mut components: BTreeMap<Label, usize> =
            Label::ALL.into_iter().map(|l| (l, 0)).collect();

        let labelled = std::iter::once((&self.gscc, Some(Label::Gscc))).chain(
            self.slots.iter().map(|s| {
                let label = match s.state {
                    SlotState::Classified(l) => Some(l),
                    SlotState::Unclassified => None,
                };
                (&s.component, label)
            }),
        );

        for (component, label) in labelled {
            let Some(label) = label else {
                continue;
            };
            *components.entry(label).or_default() += 1;
            for &node in component.members() {
                if node.index() >= node_count || seen.put(node.index()) {
                    duplicated += 1;
                    continue;
                }
                assignment.insert(self.graph.node_id(node).to_string(), label);
            }
        }

        let missing = node_count - seen.count_ones(..);
        if missing > 0 || duplicated > 0 {
            error!(missing, duplicated, "bow-tie partition invariant violated");
            return Err(BowTieError::IncompletePartition {
                missing,
                duplicated,
            });
        }

        let queries = self.queries.load(Ordering::Relaxed);
        debug!(queries, "classification complete");

        Ok(BowTie {
            partition: Partition::from_assignment(assignment),
            gscc_representative: self.graph.node_id(self.gscc.representative()).to_string(),
            components,
            queries,
        })
    }

    // -- internals ---------------------------------------------------------

    fn unclassified(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.state == SlotState::Unclassified)
            .map(|(i, _)| i)
    }

    fn representatives(&self, subset: &[usize]) -> Vec<NodeIndex> {
        subset
            .iter()
            .map(|&i| self.slots[i].component.representative())
            .collect()
    }

    fn reach(&self, from: NodeIndex, to: NodeIndex) -> Result<bool> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.oracle.can_reach(self.graph, from, to)
    }

    /// First-match decision for a component outside GSCC, IN and OUT.
    fn periphery_vote(
        &self,
        rep: NodeIndex,
        in_reps: &[NodeIndex],
        out_reps: &[NodeIndex],
    ) -> Result<Label> {
        for &in_rep in in_reps {
            if self.reach(in_rep, rep)? {
                for &out_rep in out_reps {
                    if self.reach(rep, out_rep)? {
                        return Ok(Label::Tube);
                    }
                }
                return Ok(Label::Tendril);
            }
        }
        for &out_rep in out_reps {
            if self.reach(rep, out_rep)? {
                return Ok(Label::Tendril);
            }
        }
        Ok(Label::Disconnected)
    }

    /// Evaluate `vote` for every slot in `pending`, keeping input order.
    fn collect_votes<F>(&self, pending: &[usize], phase: &str, vote: F) -> Result<Vec<Option<Label>>>
    where
        F: Fn(&Self, usize) -> Result<Option<Label>> + Sync,
    {
        let total = pending.len();
        let interval = self.options.progress_interval;
        let done = AtomicUsize::new(0);
        let tick = || {
            let n = done.fetch_add(1, Ordering::Relaxed);
            if interval > 0 && n % interval == 0 {
                debug!(phase, current = n, total, "classifying components");
            }
        };

        if self.options.parallel {
            pending
                .par_iter()
                .map(|&idx| {
                    tick();
                    vote(self, idx)
                })
                .collect()
        } else {
            pending
                .iter()
                .map(|&idx| {
                    tick();
                    vote(self, idx)
                })
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LinkGraph, LinkGraphBuilder};
    use crate::scc::{find_components, select_giant};

    fn run(graph: &LinkGraph, options: &ClassifyOptions) -> BowTie {
        let (gscc, rest) = select_giant(find_components(graph)).expect("giant");
        classify(graph, gscc, rest, options).expect("classify")
    }

    fn bowtie_example() -> LinkGraph {
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
    fn bowtie_example_regions() {
        let g = bowtie_example();
        let bt = run(&g, &ClassifyOptions::default());
        let p = &bt.partition;
        assert_eq!(p.members(Label::Gscc), ["A", "B", "C"]);
        assert_eq!(p.members(Label::In), ["X"]);
        assert_eq!(p.members(Label::Out), ["Y"]);
        assert_eq!(p.members(Label::Tube), ["Z"]);
        assert_eq!(p.members(Label::Tendril), ["W"]);
        assert!(p.members(Label::Disconnected).is_empty());
        assert_eq!(bt.gscc_representative, "A");
        assert!(bt.queries > 0);
    }

    #[test]
    fn isolated_node_is_disconnected() {
        let mut b = LinkGraphBuilder::new();
        b.add_edge("A", "B").add_edge("B", "C").add_edge("C", "A");
        b.add_node("D");
        let g = b.build();
        let bt = run(&g, &ClassifyOptions::default());
        assert_eq!(bt.partition.label_of("D"), Some(Label::Disconnected));
        assert_eq!(bt.partition.count(Label::Gscc), 3);
        assert_eq!(bt.components[&Label::Gscc], 1);
        assert_eq!(bt.components[&Label::Disconnected], 1);
    }

    #[test]
    fn tendril_reaching_out_without_in() {
        // T -> Y where Y is OUT; nothing from IN reaches T.
        let g = LinkGraph::from_edges([
            ("A", "B"),
            ("B", "A"),
            ("A", "Y"),
            ("T", "Y"),
        ]);
        let bt = run(&g, &ClassifyOptions::default());
        assert_eq!(bt.partition.label_of("Y"), Some(Label::Out));
        assert_eq!(bt.partition.label_of("T"), Some(Label::Tendril));
    }

    #[test]
    fn in_is_checked_before_out() {
        // Chain through the giant: P -> A -> B -> Q.
        let g = LinkGraph::from_edges([("A", "B"), ("B", "A"), ("P", "A"), ("B", "Q")]);
        let bt = run(&g, &ClassifyOptions::default());
        assert_eq!(bt.partition.label_of("P"), Some(Label::In));
        assert_eq!(bt.partition.label_of("Q"), Some(Label::Out));
    }

    #[test]
    fn first_matching_in_subset_decides() {
        // Two IN components, I1 and I2, both reach C. C reaches an OUT node,
        // so the first IN match already yields TUBE.
        let g = LinkGraph::from_edges([
            ("G1", "G2"),
            ("G2", "G1"),
            ("I1", "G1"),
            ("I2", "G1"),
            ("G1", "O"),
            ("I1", "C"),
            ("I2", "C"),
            ("C", "O"),
        ]);
        let bt = run(&g, &ClassifyOptions::default());
        assert_eq!(bt.partition.label_of("C"), Some(Label::Tube));
        assert_eq!(bt.partition.members(Label::In), ["I1", "I2"]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let g = bowtie_example();
        let seq = run(&g, &ClassifyOptions::default());
        let par = run(
            &g,
            &ClassifyOptions {
                parallel: true,
                ..ClassifyOptions::default()
            },
        );
        assert_eq!(seq.partition, par.partition);
        assert_eq!(seq.components, par.components);
    }

    #[test]
    fn classification_is_idempotent() {
        let g = bowtie_example();
        let a = run(&g, &ClassifyOptions::default());
        let b = run(&g, &ClassifyOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn undirected_traversal_pulls_everything_in() {
        let g = bowtie_example();
        let bt = run(
            &g,
            &ClassifyOptions {
                traversal: Traversal::Undirected,
                ..ClassifyOptions::default()
            },
        );
        // Every node touches the giant through some edge, so nothing is
        // left for Phase 2.
        assert_eq!(bt.partition.count(Label::Tendril), 0);
        assert_eq!(bt.partition.count(Label::Tube), 0);
        assert_eq!(bt.partition.count(Label::Disconnected), 0);
    }

    #[test]
    fn assign_is_one_shot() {
        let g = bowtie_example();
        let (gscc, rest) = select_giant(find_components(&g)).expect("giant");
        let n = rest.len();
        let mut ctx = ClassifierContext::new(&g, gscc, rest, &ClassifyOptions::default());
        ctx.assign(0, Label::In);
        ctx.assign(0, Label::Out);
        assert_eq!(ctx.unclassified_count(), n - 1);
        assert_eq!(ctx.in_subsets, vec![0]);
        assert!(ctx.out_subsets.is_empty());
    }

    #[test]
    fn unfinished_context_reports_incomplete_partition() {
        let g = bowtie_example();
        let (gscc, rest) = select_giant(find_components(&g)).expect("giant");
        let ctx = ClassifierContext::new(&g, gscc, rest, &ClassifyOptions::default());
        let err = ctx.finish().expect_err("nothing classified");
        assert_eq!(
            err,
            BowTieError::IncompletePartition {
                missing: 4,
                duplicated: 0
            }
        );
    }

    #[test]
    fn duplicated_component_reports_incomplete_partition() {
        let g = bowtie_example();
        let (gscc, mut rest) = select_giant(find_components(&g)).expect("giant");
        rest.push(gscc.clone());
        let err = classify(&g, gscc, rest, &ClassifyOptions::default()).expect_err("duplicate");
        assert!(matches!(
            err,
            BowTieError::IncompletePartition { duplicated: 3, .. }
        ));
    }

    #[test]
    fn label_round_trips_through_str() {
        for label in Label::ALL {
            assert_eq!(label.as_str().parse::<Label>().expect("parse"), label);
        }
        assert!("sideways".parse::<Label>().is_err());
    }
}
