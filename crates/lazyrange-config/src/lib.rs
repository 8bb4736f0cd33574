//! Scenario configuration loading for lazyrange.
//!
//! A scenario names the array length, optional initial values, logging
//! settings and a list of update/query operations to run against a tree.

use anyhow::Context;
use lazyrange_logging::LoggingConfig;
use lazyrange_tree::{MAX_LEN, RangeOp};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Length of the reference scenario array.
pub const REFERENCE_LEN: usize = 100_000;

/// Configuration format types supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    #[default]
    Yaml,
}

impl ConfigFormat {
    /// Detect format from a file extension, defaulting to YAML.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// A scripted run against a single tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Number of elements in the backing array
    pub len: usize,

    /// Initial values; `len` zeros when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Vec<i64>>,

    /// Logging settings for the run
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Operations, executed in order
    #[serde(default)]
    pub ops: Vec<RangeOp>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl ScenarioConfig {
    /// The reference driver run: 100000 zeros, three sums over
    /// `[1000, 7500]` around two range additions.
    pub fn reference() -> Self {
        Self::reference_with_len(REFERENCE_LEN)
    }

    /// The reference run over an array of `len` zeros.
    pub fn reference_with_len(len: usize) -> Self {
        Self {
            len,
            initial: None,
            logging: LoggingConfig::default(),
            ops: vec![
                RangeOp::Query { start: 1000, end: 7500 },
                RangeOp::Update { start: 1000, end: 7500, delta: 100 },
                RangeOp::Query { start: 1000, end: 7500 },
                RangeOp::Update { start: 1000, end: 2000, delta: 1000 },
                RangeOp::Query { start: 1000, end: 7500 },
            ],
        }
    }

    /// Check the scenario can be built into a tree.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.len == 0 {
            anyhow::bail!("scenario length must be at least 1");
        }
        if self.len > MAX_LEN {
            anyhow::bail!("scenario length {} exceeds the maximum of {}", self.len, MAX_LEN);
        }
        if let Some(initial) = &self.initial
            && initial.len() != self.len
        {
            anyhow::bail!(
                "initial values have {} elements but len is {}",
                initial.len(),
                self.len
            );
        }
        Ok(())
    }

    /// Initial array contents.
    pub fn initial_values(&self) -> Vec<i64> {
        match &self.initial {
            Some(values) => values.clone(),
            None => vec![0; self.len],
        }
    }
}

/// Parse a scenario from text in the given format.
pub fn parse_config(contents: &str, format: ConfigFormat) -> anyhow::Result<ScenarioConfig> {
    match format {
        ConfigFormat::Json => serde_json::from_str(contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON config: {}", e)),
        ConfigFormat::Yaml => serde_yaml::from_str(contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse YAML config: {}", e)),
    }
}

/// Load and validate a scenario from a file
pub fn load_config<P: Into<PathBuf>>(path: P) -> anyhow::Result<ScenarioConfig> {
    let path = path.into();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;

    let config = parse_config(&contents, ConfigFormat::from_path(&path))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Save a scenario to a file
pub fn save_config<P: Into<PathBuf>>(config: &ScenarioConfig, path: P) -> anyhow::Result<()> {
    let path = path.into();
    let contents = match ConfigFormat::from_path(&path) {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON config: {}", e))?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize YAML config: {}", e))?,
    };

    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(())
}
