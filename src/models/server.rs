//! Media server and library models.

use crate::error::MediaServerError;
use crate::models::secret::Secret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use url::Url;

/// Library content type as reported by the media server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    Movie,
    Show,
    Artist,
    Photo,
    Other,
}

impl LibraryKind {
    /// Map a Plex section type string.
    pub fn from_plex(kind: &str) -> Self {
        match kind {
            "movie" => LibraryKind::Movie,
            "show" => LibraryKind::Show,
            "artist" => LibraryKind::Artist,
            "photo" => LibraryKind::Photo,
            _ => LibraryKind::Other,
        }
    }
}

impl std::fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryKind::Movie => write!(f, "movie"),
            LibraryKind::Show => write!(f, "show"),
            LibraryKind::Artist => write!(f, "artist"),
            LibraryKind::Photo => write!(f, "photo"),
            LibraryKind::Other => write!(f, "other"),
        }
    }
}

/// A library on a media server.
///
/// Identity is the (server identifier, library key) pair.
#[derive(Debug, Clone)]
pub struct Library {
    /// Machine identifier of the owning server.
    pub server_id: String,
    /// Section key on the server.
    pub key: String,
    /// Display name.
    pub title: String,
    /// Content type.
    pub kind: LibraryKind,
    /// Whether the user opted this library into the owned-movie index.
    pub selected: bool,
}

impl Library {
    pub fn new(server_id: &str, key: &str, title: &str, kind: LibraryKind) -> Self {
        Self {
            server_id: server_id.to_string(),
            key: key.to_string(),
            title: title.to_string(),
            kind,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn is_movie_library(&self) -> bool {
        self.kind == LibraryKind::Movie
    }

    /// Address of this library's movie listing on `server`.
    pub fn url(&self, server: &Server) -> Result<Url, MediaServerError> {
        server
            .base_url()?
            .join(&format!("library/sections/{}/all", self.key))
            .map_err(|e| MediaServerError::Address(e.to_string()))
    }
}

impl PartialEq for Library {
    fn eq(&self, other: &Self) -> bool {
        self.server_id == other.server_id && self.key == other.key
    }
}

impl Eq for Library {}

impl Hash for Library {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.server_id.hash(state);
        self.key.hash(state);
    }
}

/// A configured media server.
///
/// Identity is the machine identifier alone: the same server reached on a
/// new address is still the same server.
#[derive(Debug, Clone)]
pub struct Server {
    /// Machine identifier.
    pub id: String,
    /// Friendly name.
    pub name: String,
    /// Host name, IP or URL.
    pub address: String,
    /// Port.
    pub port: u16,
    /// Access token.
    pub token: Secret,
    libraries: BTreeMap<String, Library>,
}

impl Server {
    pub fn new(id: &str, name: &str, address: &str, port: u16, token: Secret) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            port,
            token,
            libraries: BTreeMap::new(),
        }
    }

    /// Libraries ordered by key.
    pub fn libraries(&self) -> impl Iterator<Item = &Library> {
        self.libraries.values()
    }

    pub fn library(&self, key: &str) -> Option<&Library> {
        self.libraries.get(key)
    }

    pub fn library_count(&self) -> usize {
        self.libraries.len()
    }

    /// Attach a library. Returns false (and changes nothing) when a library
    /// with the same key is already present.
    pub fn add_library(&mut self, mut library: Library) -> bool {
        if self.libraries.contains_key(&library.key) {
            return false;
        }
        library.server_id = self.id.clone();
        self.libraries.insert(library.key.clone(), library);
        true
    }

    /// Builder form of [`Server::add_library`].
    pub fn with_library(mut self, library: Library) -> Self {
        self.add_library(library);
        self
    }

    /// A copy of this server whose libraries are exactly `refreshed`.
    ///
    /// Libraries missing from `refreshed` are dropped; libraries matched by key
    /// keep their `selected` flag.
    pub fn with_libraries(&self, refreshed: Vec<Library>) -> Self {
        let mut next = Self {
            libraries: BTreeMap::new(),
            ..self.clone()
        };
        for mut library in refreshed {
            if let Some(existing) = self.libraries.get(&library.key) {
                library.selected = existing.selected;
            }
            next.add_library(library);
        }
        next
    }

    /// Copy with one library's selection changed.
    pub fn with_selection(&self, key: &str, selected: bool) -> Option<Self> {
        let mut next = self.clone();
        next.libraries.get_mut(key)?.selected = selected;
        Some(next)
    }

    /// Base URL of the server, always ending with a slash.
    pub fn base_url(&self) -> Result<Url, MediaServerError> {
        let address = self.address.trim().trim_end_matches('/');
        let raw = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };
        let mut url = Url::parse(&raw).map_err(|e| MediaServerError::Address(format!("{}: {}", raw, e)))?;
        url.set_port(Some(self.port))
            .map_err(|_| MediaServerError::Address(format!("{}: cannot carry a port", raw)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl PartialEq for Server {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Server {}

impl Hash for Server {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// All configured servers, ordered by machine identifier.
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    servers: BTreeMap<String, Server>,
}

impl ServerRegistry {
    /// Build a registry; the first occurrence of a duplicated identifier wins.
    pub fn from_servers<I: IntoIterator<Item = Server>>(servers: I) -> Self {
        let mut registry = Self::default();
        for server in servers {
            if registry.servers.contains_key(&server.id) {
                tracing::warn!("Ignoring duplicate server '{}' ({})", server.name, server.id);
                continue;
            }
            registry.servers.insert(server.id.clone(), server);
        }
        registry
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn get(&self, id: &str) -> Option<&Server> {
        self.servers.get(id)
    }

    /// Insert or replace a server value.
    pub fn upsert(&mut self, server: Server) {
        self.servers.insert(server.id.clone(), server);
    }

    pub fn remove(&mut self, id: &str) -> Option<Server> {
        self.servers.remove(id)
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.servers.values()
    }

    /// Every (server, library) pair, servers by id then libraries by key.
    pub fn libraries(&self) -> impl Iterator<Item = (&Server, &Library)> {
        self.servers
            .values()
            .flat_map(|server| server.libraries().map(move |library| (server, library)))
    }
}
