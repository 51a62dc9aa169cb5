use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Tunables for the viewing pipeline. Every field falls back to its default
/// when missing from the YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub top_n: usize,                 // franchises kept after ranking
    pub max_sane_season: f64,         // raw season numbers above this are noise
    pub long_runner_threshold: usize, // distinct seasons above this drop the franchise
    pub neutral_epsilon: f64,         // |avg| below this is Neutral
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: 200,
            max_sane_season: 100.0,
            long_runner_threshold: 25,
            neutral_epsilon: 0.03,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = serde_yaml::from_str(s).context("parsing pipeline config")?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading pipeline config from: {}", path.display());
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Config file if given, defaults otherwise; CLI overrides win.
    pub fn resolve(path: Option<&Path>, top_n: Option<usize>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        if let Some(n) = top_n {
            cfg.top_n = n;
        }
        debug!(
            "Effective config - top_n={}, max_sane_season={}, long_runner_threshold={}, neutral_epsilon={}",
            cfg.top_n, cfg.max_sane_season, cfg.long_runner_threshold, cfg.neutral_epsilon
        );
        Ok(cfg)
    }
}
