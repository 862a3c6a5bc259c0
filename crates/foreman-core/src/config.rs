//! Configuration loading for the fleet.
//!
//! The canonical configuration lives in `foreman-config.yaml`. Every
//! field has a default, so an empty file, a partial file, or no file at
//! all yields a working configuration. LLM credentials are not part of
//! this file; see `foreman_planner::PlannerConfig`.

use std::path::Path;
use std::time::Duration;

use foreman_agents::{DEFAULT_HISTORY_LIMIT, RuntimeConfig};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `foreman-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FleetConfig {
    /// Who gets spawned and where.
    #[serde(default)]
    pub fleet: FleetSection,

    /// Execution limits.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FleetConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) for a file that exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// A blank document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Runtime settings handed to every agent.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            task_timeout: self.timing.task_timeout(),
            history_limit: self.timing.history_limit,
        }
    }
}

/// Fleet composition and spawn formation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FleetSection {
    /// Agent display names, in formation order.
    #[serde(default = "default_names")]
    pub names: Vec<String>,

    /// Blocks in front of the player where the line is placed.
    #[serde(default = "default_spawn_distance")]
    pub spawn_distance: i32,

    /// Blocks between neighbouring agents in the line.
    #[serde(default = "default_spacing")]
    pub spacing: i32,
}

impl Default for FleetSection {
    fn default() -> Self {
        Self {
            names: default_names(),
            spawn_distance: default_spawn_distance(),
            spacing: default_spacing(),
        }
    }
}

/// Execution limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Upper bound on one world effect in milliseconds. `0` disables it.
    #[serde(default)]
    pub task_timeout_ms: u64,

    /// Finished tasks remembered per agent.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl TimingConfig {
    /// The task timeout, if enabled.
    pub const fn task_timeout(&self) -> Option<Duration> {
        if self.task_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.task_timeout_ms))
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            task_timeout_ms: 0,
            history_limit: default_history_limit(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_names() -> Vec<String> {
    ["Steve", "Alex", "Bob", "Charlie"]
        .into_iter()
        .map(ToOwned::to_owned)
        .collect()
}

const fn default_spawn_distance() -> i32 {
    5
}

const fn default_spacing() -> i32 {
    2
}

const fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_log_level() -> String {
    "info".to_owned()
}
