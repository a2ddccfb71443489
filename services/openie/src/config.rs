use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::search::{SearchBudget, SearchDirection};
use crate::segment::RuleWeights;
use crate::triples::OutputFormat;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Worker threads for batch extraction; unset uses every core
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Layered on top of the standard deletion-weight table
    #[serde(default)]
    pub deletion_weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub rule_weights: RuleWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_states")]
    pub max_states: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    #[serde(default)]
    pub direction: SearchDirection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_false")]
    pub with_confidence: bool,
    #[serde(default)]
    pub min_confidence: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_states: default_max_states(),
            max_tokens: default_max_tokens(),
            time_limit_ms: None,
            direction: SearchDirection::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            with_confidence: default_false(),
            min_confidence: None,
        }
    }
}

impl SearchConfig {
    pub fn budget(&self) -> SearchBudget {
        SearchBudget {
            max_states: self.max_states,
            max_tokens: self.max_tokens,
            time_limit_ms: self.time_limit_ms,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content)
            .context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.max_states == 0 {
            anyhow::bail!("search.max_states must be at least 1");
        }
        if let Some(min) = self.output.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                anyhow::bail!("output.min_confidence must be in [0, 1], got {}", min);
            }
        }
        self.rule_weights
            .validate()
            .context("Invalid [rule_weights]")?;
        for (label, weight) in &self.deletion_weights {
            if !(*weight > 0.0 && *weight <= 1.0) {
                anyhow::bail!("deletion weight for '{}' must be in (0, 1], got {}", label, weight);
            }
        }
        Ok(())
    }
}

fn default_max_states() -> usize {
    10_000
}

fn default_max_tokens() -> usize {
    100
}

fn default_false() -> bool {
    false
}
