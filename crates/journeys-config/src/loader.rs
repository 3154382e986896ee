//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.journeys/config.toml`
//! 2. Local config: `.journeys/config.toml` (in the working directory)
//! 3. CLI overrides
//!
//! Later sources override earlier ones. Files are merged key by key before
//! they are typed, so a key set in a later file always wins, even when it
//! holds the default value, and a key it omits keeps the earlier value.

use crate::error::ConfigError;
use crate::{ConfigOverrides, JourneysConfig};
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".journeys";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".journeys";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.journeys`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config, as read from disk
    global_table: Option<Table>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.journeys`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_table: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_table: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path under `base`.
    pub fn local_config_path(&self, base: &Path) -> PathBuf {
        base.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides, then validates.
    pub fn load(
        &mut self,
        base: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<JourneysConfig, ConfigError> {
        let mut table = Table::new();
        let mut source = PathBuf::new();

        if let Some((path, global)) = self.read_global_table()? {
            merge_tables(&mut table, global);
            source = path;
        }

        let local_path = self.local_config_path(base);
        if let Some(local) = read_optional_table(&local_path)? {
            merge_tables(&mut table, local);
            source = local_path;
        }

        let mut config = config_from_table(&source, table)?;

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file instead of the global and local ones.
    ///
    /// Values missing from the file keep their defaults.
    pub fn load_file(
        &self,
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<JourneysConfig, ConfigError> {
        debug!("Loading config from {:?}", path);
        let mut config = load_config_file(path)?;

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<JourneysConfig>, ConfigError> {
        match self.read_global_table()? {
            Some((path, table)) => config_from_table(&path, table).map(Some),
            None => Ok(None),
        }
    }

    /// Load only the local configuration under `base`.
    pub fn load_local(&self, base: &Path) -> Result<Option<JourneysConfig>, ConfigError> {
        let local_path = self.local_config_path(base);
        match read_optional_table(&local_path)? {
            Some(table) => config_from_table(&local_path, table).map(Some),
            None => Ok(None),
        }
    }

    /// Raw global table with its path, read once and cached.
    fn read_global_table(&mut self) -> Result<Option<(PathBuf, Table)>, ConfigError> {
        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if let Some(ref table) = self.global_table {
            return Ok(Some((global_path, table.clone())));
        }

        let Some(table) = read_optional_table(&global_path)? else {
            return Ok(None);
        };
        self.global_table = Some(table.clone());

        Ok(Some((global_path, table)))
    }

    /// Save configuration to the global config file.
    pub fn save_global(&self, config: &JourneysConfig) -> Result<(), ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };

        save_config_file(&global_dir.join(CONFIG_FILE_NAME), config)
    }

    /// Save configuration to the local config file under `base`.
    pub fn save_local(&self, base: &Path, config: &JourneysConfig) -> Result<(), ConfigError> {
        save_config_file(&self.local_config_path(base), config)
    }

    /// Initialize the global configuration.
    ///
    /// Creates `~/.journeys/config.toml` with defaults unless it exists.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };

        init_config_dir(global_dir)
    }

    /// Initialize the local configuration under `base`.
    ///
    /// Creates `.journeys/config.toml` with defaults unless it exists.
    pub fn init_local(&self, base: &Path) -> Result<PathBuf, ConfigError> {
        init_config_dir(&base.join(LOCAL_CONFIG_DIR))
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_table = None;
    }
}

fn init_config_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        save_config_file(&config_path, &JourneysConfig::default())?;
    }

    Ok(config_path)
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<JourneysConfig, ConfigError> {
    config_from_table(path, read_config_table(path)?)
}

/// Read a config file as an untyped table, or `None` if it does not exist.
fn read_optional_table(path: &Path) -> Result<Option<Table>, ConfigError> {
    if !path.exists() {
        trace!("Config not found at {:?}", path);
        return Ok(None);
    }

    debug!("Loading config from {:?}", path);
    read_config_table(path).map(Some)
}

/// Read a config file as an untyped table.
///
/// The table is also type-checked here so errors name the file they came from.
fn read_config_table(path: &Path) -> Result<Table, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let table: Table = content
        .parse()
        .map_err(|e| ConfigError::parse_toml(path, e))?;

    config_from_table(path, table.clone())?;
    Ok(table)
}

/// Type a merged table, filling missing keys with defaults.
fn config_from_table(path: &Path, table: Table) -> Result<JourneysConfig, ConfigError> {
    Value::Table(table)
        .try_into()
        .map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &JourneysConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Deep-merge `overlay` into `base`.
///
/// Nested tables merge key by key; any other value in `overlay` replaces the
/// one in `base`.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let Value::Table(overlay_table) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(Value::Table(base_table)) = base.get_mut(&key) {
            merge_tables(base_table, overlay_table);
            continue;
        }
        base.insert(key, Value::Table(overlay_table));
    }
}
