//! Configuration loading facade.
//!
//! Precedence, lowest first: built-in defaults, global config file, workspace
//! `config/config.toml`, workspace `config/{FLOWMERGE_ENV}.toml`, `FLOWMERGE_*` environment
//! variables (`__` separates nested keys, e.g. `FLOWMERGE_MERGE__MIN_ENTRIES=3`).

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::{FlowmergeConfig, MergeConfig};
use crate::error::ConfigError;
use config::{Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`FlowmergeConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<FlowmergeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config: FlowmergeConfig = builder
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from one explicit file, still honoring environment overrides.
    pub fn load_from_file(path: &Path) -> Result<FlowmergeConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let config: FlowmergeConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Load and immediately snapshot, so invalid options fail here.
    pub fn load_validated(
        workspace_root: &Path,
        config_path: Option<&Path>,
    ) -> Result<(FlowmergeConfig, MergeConfig), ConfigError> {
        let config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load(workspace_root)?,
        };
        let snapshot = MergeConfig::from_settings(&config.merge)?;
        Ok((config, snapshot))
    }

    /// Global config file location, if a home directory can be determined.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn environment() -> Environment {
        Environment::with_prefix("FLOWMERGE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}
