//! Analysis configuration.
//!
//! Read from a TOML file; every key is optional and falls back to its
//! default.
//!
//! ```toml
//! [rank]
//! damping = 0.9
//! top_n = 1000
//!
//! [classify]
//! parallel = true
//! traversal = "directed"
//!
//! [load]
//! node_limit = 50000
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classify::ClassifyOptions;
use crate::rank::PageRankConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub rank: RankSettings,
    pub classify: ClassifyOptions,
    pub load: LoadSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankSettings {
    pub damping: f64,
    pub tolerance: f64,
    pub max_iter: usize,
    /// Keep only the best `top_n` PageRank entries in the report.
    pub top_n: Option<usize>,
    /// Attach in-degree rank to every reported node.
    pub in_degree: bool,
}

impl Default for RankSettings {
    fn default() -> Self {
        let pr = PageRankConfig::default();
        Self {
            damping: pr.damping,
            tolerance: pr.tolerance,
            max_iter: pr.max_iter,
            top_n: None,
            in_degree: true,
        }
    }
}

impl RankSettings {
    #[must_use]
    pub const fn pagerank_config(&self) -> PageRankConfig {
        PageRankConfig {
            damping: self.damping,
            tolerance: self.tolerance,
            max_iter: self.max_iter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Stop loading edges once the graph holds at least this many nodes.
    pub node_limit: Option<usize>,
}

/// Parse a configuration from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or a value has the wrong
/// type.
pub fn parse_config(text: &str) -> Result<AnalysisConfig> {
    let config: AnalysisConfig = toml::from_str(text).context("Failed to parse analysis config")?;
    anyhow::ensure!(
        (0.0..=1.0).contains(&config.rank.damping),
        "rank.damping must be within [0, 1], got {}",
        config.rank.damping
    );
    Ok(config)
}

/// Load the configuration at `path`, or the defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    if !path.exists() {
        return Ok(AnalysisConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
