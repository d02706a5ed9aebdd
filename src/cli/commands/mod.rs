//! CLI command implementations.

pub mod check;
pub mod libraries;
pub mod missing;
pub mod owned;
pub mod run;
pub mod servers;

use crate::core::JsonSnapshotStore;
use crate::models::config::{default_config_path, load_config, save_config, Config};
use crate::services::plex::PlexClient;
use crate::services::tmdb::{TmdbClient, TmdbClientConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config_path: PathBuf,
    pub config: Config,
}

impl Workspace {
    /// Load the config at `path`, or at the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let config = load_config(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
        Ok(Self { config_path, config })
    }

    pub fn save(&self) -> Result<()> {
        save_config(&self.config, &self.config_path)
            .with_context(|| format!("Failed to save config to {}", self.config_path.display()))
    }

    pub fn store(&self) -> JsonSnapshotStore {
        JsonSnapshotStore::new(&self.config.data_dir)
    }

    pub fn tmdb_client(&self) -> Result<TmdbClient> {
        let config = TmdbClientConfig {
            language: self.config.tmdb.language.clone(),
            timeout: self.config.timeout(),
            ..TmdbClientConfig::default()
        };
        Ok(TmdbClient::new(config)?)
    }

    pub fn plex_client(&self) -> Result<PlexClient> {
        Ok(PlexClient::new(self.config.timeout())?)
    }
}
