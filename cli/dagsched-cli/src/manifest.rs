//! `dagsched.toml` manifest parsing: concurrency and the per-operator weight
//! table a [`crate::model::ConfiguredModel`] is built from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The top-level manifest structure for a `dagsched` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleManifest {
    /// Scheduling parameters (required).
    pub schedule: ScheduleConfig,
    /// Per-operator-name weight overrides.
    #[serde(default)]
    pub weights: HashMap<String, u64>,
}

/// The `[schedule]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Number of concurrent execution streams to schedule onto.
    pub concurrency: usize,
    /// Weight assumed for any operator not named in `[weights]`.
    #[serde(default = "default_weight")]
    pub default_weight: u64,
}

fn default_weight() -> u64 {
    1
}

impl ScheduleManifest {
    /// Search upward from `start_dir` for a `dagsched.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("dagsched.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: ScheduleManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing dagsched.toml")
    }

    /// Weight of `op`, falling back to `default_weight` when unlisted.
    pub fn weight_of(&self, op: &str) -> u64 {
        self.weights.get(op).copied().unwrap_or(self.schedule.default_weight)
    }

    /// Generate the default template for a fresh manifest.
    pub fn template() -> String {
        r#"[schedule]
concurrency = 2
default_weight = 1

[weights]
# conv = 10
# relu = 1
"#
        .to_string()
    }
}
