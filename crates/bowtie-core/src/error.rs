//! Error types for the decomposition engine.
//!
//! Every variant of [`BowTieError`] is fatal to the current run. A partial
//! bow-tie classification is not a meaningful result, so nothing here is
//! retried or recovered from.

use std::fmt;

/// Result alias used throughout the engine.
pub type Result<T, E = BowTieError> = std::result::Result<T, E>;

/// Failures raised by the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BowTieError {
    /// Empty or malformed graph, empty component set, or an unknown node.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A node already finalized by the reachability search was reached again
    /// through a strictly shorter path, which only happens with negative
    /// edge weights.
    #[error("contradictory paths found at node {node}: negative edge weights?")]
    InconsistentWeights {
        /// Identifier of the node whose settled distance was contradicted.
        node: String,
    },

    /// The classifier finished without assigning every node exactly once.
    #[error(
        "incomplete partition: {missing} node(s) unlabelled, {duplicated} node(s) labelled twice"
    )]
    IncompletePartition {
        /// Nodes that never received a label.
        missing: usize,
        /// Nodes that received more than one label.
        duplicated: usize,
    },
}

impl BowTieError {
    /// Shorthand for [`BowTieError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::InconsistentWeights { .. } => ErrorCode::InconsistentWeights,
            Self::IncompletePartition { .. } => ErrorCode::IncompletePartition,
        }
    }
}

/// Machine-readable error codes for scripted consumers of the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    InconsistentWeights,
    IncompletePartition,
    GraphLoadFailed,
    ConfigParseError,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "E1001",
            Self::ConfigParseError => "E1002",
            Self::GraphLoadFailed => "E1003",
            Self::InconsistentWeights => "E2001",
            Self::IncompletePartition => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid graph input",
            Self::ConfigParseError => "Config file parse error",
            Self::GraphLoadFailed => "Graph file could not be loaded",
            Self::InconsistentWeights => "Inconsistent edge weights",
            Self::IncompletePartition => "Incomplete bow-tie partition",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidInput => Some("Check that the graph has at least one node and that node ids exist."),
            Self::ConfigParseError => Some("Fix syntax in the config file and retry."),
            Self::GraphLoadFailed => Some("Check the edge list path and line format."),
            Self::InconsistentWeights => Some("Remove negative edge weights from the input."),
            Self::IncompletePartition => Some("This is a bug. Report it with the input graph."),
        }
    }

    /// Short snake-case identifier used in JSON error payloads.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::ConfigParseError => "config_parse_error",
            Self::GraphLoadFailed => "graph_load_failed",
            Self::InconsistentWeights => "inconsistent_weights",
            Self::IncompletePartition => "incomplete_partition",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
