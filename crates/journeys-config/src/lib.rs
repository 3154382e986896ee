//! Journeys Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.journeys/config.toml`
//! - Local config: `.journeys/config.toml` (in the working directory)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for Journeys.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JourneysConfig {
    /// History query window
    pub window: WindowConfig,

    /// Forest building behaviour
    pub build: BuildConfig,

    /// Where edges and history are stored
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// History query window.
///
/// # Example TOML
///
/// ```toml
/// [window]
/// lookback_days = 7
/// max_results = 99
/// text = ""
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// How many days of history to consider
    pub lookback_days: u32,

    /// Maximum number of history entries per query
    pub max_results: usize,

    /// Default search text (empty matches everything)
    pub text: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            max_results: 99,
            text: String::new(),
        }
    }
}

/// Forest building configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Node identity scheme
    pub identity: IdentityMode,

    /// Ordering of the returned journeys
    pub root_order: RootOrdering,

    /// Upper bound on edge-resolution passes (1 = single pass)
    pub max_passes: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            identity: IdentityMode::default(),
            root_order: RootOrdering::default(),
            max_passes: 16,
        }
    }
}

/// Node identity scheme selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityMode {
    /// Pages keyed by URL, links from the recorded edge store (default)
    #[default]
    Url,
    /// Visits keyed by visit id, links from referring visits
    VisitChain,
}

impl std::fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url => write!(f, "url"),
            Self::VisitChain => write!(f, "visit-chain"),
        }
    }
}

impl std::str::FromStr for IdentityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "url" => Ok(Self::Url),
            "visit-chain" | "visit_chain" | "visitchain" | "visit" => Ok(Self::VisitChain),
            _ => Err(ConfigError::invalid_value(
                "build.identity",
                format!("unknown identity '{}'. Valid values: url, visit-chain", s),
            )),
        }
    }
}

/// Journey ordering selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RootOrdering {
    /// Catalog order (default)
    #[default]
    Catalog,
    /// Most recent visit first
    Recency,
}

impl std::fmt::Display for RootOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Recency => write!(f, "recency"),
        }
    }
}

impl std::str::FromStr for RootOrdering {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "catalog" => Ok(Self::Catalog),
            "recency" | "recent" => Ok(Self::Recency),
            _ => Err(ConfigError::invalid_value(
                "build.root_order",
                format!("unknown order '{}'. Valid values: catalog, recency", s),
            )),
        }
    }
}

/// Storage configuration for edges and history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for Journeys data (default: `.journeys`)
    pub data_dir: PathBuf,

    /// Edge store file name, relative to `data_dir`
    pub edges_file: PathBuf,

    /// History export file name, relative to `data_dir`
    pub history_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".journeys"),
            edges_file: PathBuf::from("edges.json"),
            history_file: PathBuf::from("history.json"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override data directory
    pub data_dir: Option<PathBuf>,

    /// Override identity scheme
    pub identity: Option<IdentityMode>,

    /// Override journey ordering
    pub root_order: Option<RootOrdering>,

    /// Override pass limit
    pub max_passes: Option<usize>,

    /// Override lookback window
    pub lookback_days: Option<u32>,

    /// Override result limit
    pub max_results: Option<usize>,

    /// Override log level
    pub log_level: Option<String>,
}

impl JourneysConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref dir) = overrides.data_dir {
            self.storage.data_dir = dir.clone();
        }

        if let Some(identity) = overrides.identity {
            self.build.identity = identity;
        }

        if let Some(order) = overrides.root_order {
            self.build.root_order = order;
        }

        if let Some(max_passes) = overrides.max_passes {
            self.build.max_passes = max_passes;
        }

        if let Some(days) = overrides.lookback_days {
            self.window.lookback_days = days;
        }

        if let Some(max_results) = overrides.max_results {
            self.window.max_results = max_results;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.max_passes == 0 {
            return Err(ConfigError::invalid_value(
                "build.max_passes",
                "must be at least 1",
            ));
        }
        if self.window.max_results == 0 {
            return Err(ConfigError::invalid_value(
                "window.max_results",
                "must be at least 1",
            ));
        }
        if self.window.lookback_days == 0 {
            return Err(ConfigError::invalid_value(
                "window.lookback_days",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Get the effective data directory relative to `base`.
    pub fn data_dir(&self, base: &Path) -> PathBuf {
        if self.storage.data_dir.is_absolute() {
            self.storage.data_dir.clone()
        } else {
            base.join(&self.storage.data_dir)
        }
    }

    /// Get the edge store file path.
    pub fn edges_path(&self, base: &Path) -> PathBuf {
        self.data_dir(base).join(&self.storage.edges_file)
    }

    /// Get the history export file path.
    pub fn history_path(&self, base: &Path) -> PathBuf {
        self.data_dir(base).join(&self.storage.history_file)
    }
}
