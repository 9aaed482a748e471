#![forbid(unsafe_code)]
//! bowtie-core library.
//!
//! Bow-tie decomposition of large directed link graphs: every node lands in
//! exactly one of GSCC, IN, OUT, TENDRIL, TUBE or DISCONNECTED.
//!
//! ```rust,ignore
//! use bowtie_core::{analyze::decompose, classify::{ClassifyOptions, Label}, graph::LinkGraph};
//!
//! let graph = LinkGraph::from_edges([("a", "b"), ("b", "a"), ("c", "a")]);
//! let bowtie = decompose(&graph, &ClassifyOptions::default())?;
//! assert_eq!(bowtie.partition.label_of("c"), Some(Label::In));
//! ```
//!
//! # Conventions
//!
//! - **Errors**: Engine operations return [`error::Result`] with a
//!   [`error::BowTieError`]; configuration and I/O use `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod analyze;
pub mod classify;
pub mod config;
pub mod error;
pub mod graph;
pub mod rank;
pub mod reach;
pub mod report;
pub mod scc;

pub use analyze::{analyze, decompose};
pub use classify::{BowTie, ClassifyOptions, Label, Partition};
pub use error::{BowTieError, ErrorCode};
pub use graph::{LinkGraph, LinkGraphBuilder, LinkSource, Traversal};
pub use reach::{Reachability, can_reach};
pub use report::{BowTieReport, NodeLabels};
