//! CLI command implementations

pub mod config;
pub mod edges;
pub mod record;
pub mod show;

use std::path::PathBuf;

use anyhow::{Context, Result};
use journeys_config::{ConfigLoader, IdentityMode, JourneysConfig, RootOrdering};
use journeys_core::{BuilderConfig, IdentityScheme, RootOrder};
use journeys_store::JsonEdgeStore;

use crate::GlobalOptions;

/// Directory that local config and relative data paths resolve against.
pub fn base_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

/// Load configuration, honouring `--config` and the global overrides.
pub fn load_config(global: &GlobalOptions) -> Result<JourneysConfig> {
    load_config_with(global, journeys_config::ConfigOverrides::default())
}

/// Load configuration with command-specific overrides on top of the global ones.
pub fn load_config_with(
    global: &GlobalOptions,
    mut overrides: journeys_config::ConfigOverrides,
) -> Result<JourneysConfig> {
    if overrides.data_dir.is_none() {
        overrides.data_dir = global.to_config_overrides().data_dir;
    }

    let mut loader = ConfigLoader::new();
    if let Some(ref config_path) = global.config {
        return loader
            .load_file(config_path, Some(&overrides))
            .with_context(|| format!("Failed to load config file {}", config_path.display()));
    }

    loader
        .load(&base_dir()?, Some(&overrides))
        .context("Failed to load configuration")
}

/// Translate the file-level build settings into the builder's configuration.
pub fn builder_config(config: &JourneysConfig) -> BuilderConfig {
    BuilderConfig {
        identity: match config.build.identity {
            IdentityMode::Url => IdentityScheme::Url,
            IdentityMode::VisitChain => IdentityScheme::VisitChain,
        },
        root_order: match config.build.root_order {
            RootOrdering::Catalog => RootOrder::Catalog,
            RootOrdering::Recency => RootOrder::Recency,
        },
        max_passes: config.build.max_passes,
    }
}

/// Open the configured edge store. A missing file is an empty store.
pub async fn open_edges(config: &JourneysConfig) -> Result<JsonEdgeStore> {
    let path = config.edges_path(&base_dir()?);
    JsonEdgeStore::open(&path)
        .await
        .with_context(|| format!("Failed to open edge store {}", path.display()))
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
