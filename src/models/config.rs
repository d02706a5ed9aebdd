//! Configuration model.

use crate::models::secret::Secret;
use crate::models::server::{Library, LibraryKind, Server, ServerRegistry};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding owned/missing snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// TMDB configuration.
    #[serde(default)]
    pub tmdb: TmdbConfig,
    /// HTTP client configuration.
    #[serde(default)]
    pub http: HttpConfig,
    /// Configured media servers.
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// API key (v3) or read access token (v4).
    pub api_key: Option<Secret>,
    /// Language for responses.
    #[serde(default = "default_language")]
    pub language: String,
}

/// HTTP configuration shared by the Plex and TMDB clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// How many servers or libraries are processed at once within a stage.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// A media server as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Friendly name.
    pub name: String,
    /// Plex machine identifier.
    pub machine_identifier: String,
    /// Host name, IP or URL.
    pub address: String,
    /// Port.
    #[serde(default = "default_plex_port")]
    pub port: u16,
    /// X-Plex-Token.
    pub token: Secret,
    /// Libraries found by the last refresh.
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

/// A library as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Section key.
    pub key: String,
    /// Display name.
    pub title: String,
    /// Content type.
    #[serde(default = "default_library_kind")]
    pub kind: LibraryKind,
    /// Included in the owned-movie index.
    #[serde(default)]
    pub selected: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tmdb: TmdbConfig::default(),
            http: HttpConfig::default(),
            servers: Vec::new(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: default_language(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    /// The TMDB key, with `TMDB_API_KEY` taking precedence over the file.
    pub fn tmdb_api_key(&self) -> Option<Secret> {
        std::env::var("TMDB_API_KEY")
            .ok()
            .map(Secret::new)
            .filter(|s| !s.is_empty())
            .or_else(|| self.tmdb.api_key.clone())
    }

    /// Build the server registry from the configured entries.
    pub fn registry(&self) -> ServerRegistry {
        ServerRegistry::from_servers(self.servers.iter().map(ServerEntry::to_server))
    }

    /// Replace the configured servers with the registry's current values.
    pub fn update_servers(&mut self, registry: &ServerRegistry) {
        self.servers = registry.servers().map(ServerEntry::from_server).collect();
    }

    /// Concurrency, never below one.
    pub fn concurrency(&self) -> usize {
        self.http.concurrency.max(1)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_secs.max(1))
    }
}

impl ServerEntry {
    pub fn to_server(&self) -> Server {
        let mut server = Server::new(
            &self.machine_identifier,
            &self.name,
            &self.address,
            self.port,
            self.token.clone(),
        );
        for entry in &self.libraries {
            let library = Library::new(&self.machine_identifier, &entry.key, &entry.title, entry.kind)
                .selected(entry.selected);
            if !server.add_library(library) {
                tracing::warn!(
                    "Duplicate library key '{}' on server '{}' ignored",
                    entry.key,
                    self.name
                );
            }
        }
        server
    }

    pub fn from_server(server: &Server) -> Self {
        Self {
            name: server.name.clone(),
            machine_identifier: server.id.clone(),
            address: server.address.clone(),
            port: server.port,
            token: server.token.clone(),
            libraries: server
                .libraries()
                .map(|l| LibraryEntry {
                    key: l.key.clone(),
                    title: l.title.clone(),
                    kind: l.kind,
                    selected: l.selected,
                })
                .collect(),
        }
    }
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

fn default_plex_port() -> u16 {
    32400
}

fn default_library_kind() -> LibraryKind {
    LibraryKind::Movie
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("collection_gaps")
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("collection_gaps")
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration from `path`, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
}

/// Save configuration to `path`.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    crate::utils::fs::write_atomic(path, content.as_bytes())?;
    tracing::info!("Config saved to: {}", path.display());
    Ok(())
}
