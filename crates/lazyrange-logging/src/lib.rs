//! Logging configuration and tracing subscriber setup for lazyrange.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Check if this level should log messages at the given level
    pub fn should_log(&self, level: LogLevel) -> bool {
        *self >= level
    }

    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => anyhow::bail!("unknown log level: {other}"),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => anyhow::bail!("unknown log format: {other}"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level to output
    #[serde(default)]
    pub level: LogLevel,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
    /// Enable timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Per-target log levels, keyed by tracing target (e.g. `lazyrange_tree`)
    #[serde(default)]
    pub target_levels: BTreeMap<String, LogLevel>,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Plain,
            timestamps: true,
            target_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Create a new logging config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set a target-specific log level
    pub fn with_target_level(mut self, target: impl Into<String>, level: LogLevel) -> Self {
        self.target_levels.insert(target.into(), level);
        self
    }

    /// Get the effective log level for a target
    pub fn effective_level(&self, target: Option<&str>) -> LogLevel {
        target
            .and_then(|t| self.target_levels.get(t).copied())
            .unwrap_or(self.level)
    }

    /// Check if a message at the given level should be logged
    pub fn should_log(&self, level: LogLevel, target: Option<&str>) -> bool {
        self.effective_level(target).should_log(level)
    }

    /// Render as an `EnvFilter` directive string, e.g. `info,lazyrange_tree=debug`.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.level.to_string()];
        directives.extend(
            self.target_levels
                .iter()
                .map(|(target, level)| format!("{target}={level}")),
        );
        directives.join(",")
    }
}

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG`, when set, takes precedence over the configured levels.
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::try_from_default_env().context("invalid RUST_LOG directives")?,
        Err(_) => EnvFilter::try_new(config.filter_directives())
            .context("invalid logging configuration")?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match (config.format, config.timestamps) {
        (LogFormat::Plain, true) => builder.try_init(),
        (LogFormat::Plain, false) => builder.without_time().try_init(),
        (LogFormat::Compact, true) => builder.compact().try_init(),
        (LogFormat::Compact, false) => builder.compact().without_time().try_init(),
        (LogFormat::Json, _) => builder.json().try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
