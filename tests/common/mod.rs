//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use collection_gaps::core::SnapshotStore;
use collection_gaps::error::MediaServerError;
use collection_gaps::models::notification::Notification;
use collection_gaps::models::snapshot::{LibrarySnapshot, MissingSnapshot};
use collection_gaps::models::{
    ApiKey, Collection, Library, LibraryKind, Movie, MovieKey, Secret, Server, ServerRegistry,
};
use collection_gaps::services::notify::NotificationSink;
use collection_gaps::services::{CredentialStatus, MediaServerClient, MetadataService, ProbeResult};
use collection_gaps::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use url::Url;

// ========== FIXTURES ==========

pub fn server(id: &str, name: &str) -> Server {
    Server::new(id, name, "127.0.0.1", 32400, Secret::new(format!("token-{}", id)))
}

pub fn movie_library(server_id: &str, key: &str, title: &str, selected: bool) -> Library {
    Library::new(server_id, key, title, LibraryKind::Movie).selected(selected)
}

pub fn api_key() -> Option<Secret> {
    Some(Secret::new("test-api-key"))
}

// ========== METADATA SERVICE ==========

/// TMDB stand-in: fixed credential answer, collections and lookups.
#[derive(Default)]
pub struct FakeMetadata {
    credential: Option<std::result::Result<CredentialStatus, String>>,
    collections: HashMap<u64, Collection>,
    lookups: HashMap<MovieKey, Movie>,
    gate: Option<Arc<Notify>>,
    pub credential_calls: AtomicUsize,
    pub collection_calls: AtomicUsize,
}

impl FakeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            credential: Some(Ok(CredentialStatus::Invalid {
                reason: reason.to_string(),
            })),
            ..Self::default()
        }
    }

    pub fn unreachable(reason: &str) -> Self {
        Self {
            credential: Some(Err(reason.to_string())),
            ..Self::default()
        }
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections.insert(collection.id, collection);
        self
    }

    /// Make `lookup_movie` resolve `movie`'s key to `movie`.
    pub fn with_lookup(mut self, movie: Movie) -> Self {
        self.lookups.insert(movie.key(), movie);
        self
    }

    /// Hold `test_credential` until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl MetadataService for FakeMetadata {
    async fn test_credential(&self, _key: &ApiKey) -> Result<CredentialStatus> {
        self.credential_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.credential {
            None => Ok(CredentialStatus::Valid),
            Some(Ok(status)) => Ok(status.clone()),
            Some(Err(reason)) => Err(Error::MetadataUnavailable(reason.clone())),
        }
    }

    async fn get_collection(&self, _key: &ApiKey, collection_id: u64) -> Result<Collection> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        self.collections
            .get(&collection_id)
            .cloned()
            .ok_or(Error::CollectionNotFound(collection_id))
    }

    async fn lookup_movie(&self, _key: &ApiKey, movie: &Movie) -> Result<Option<Movie>> {
        Ok(self.lookups.get(&movie.key()).cloned())
    }
}

// ========== MEDIA SERVER ==========

/// Plex stand-in: libraries and movies per server, some servers down.
#[derive(Default)]
pub struct FakeMediaServer {
    down: HashSet<String>,
    libraries: HashMap<String, Vec<Library>>,
    movies: HashMap<(String, String), Vec<Movie>>,
}

impl FakeMediaServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(mut self, library: Library, movies: Vec<Movie>) -> Self {
        self.movies
            .insert((library.server_id.clone(), library.key.clone()), movies);
        self.libraries
            .entry(library.server_id.clone())
            .or_default()
            .push(library);
        self
    }

    /// Register a library whose movie listing answers 404.
    pub fn with_unreadable_library(mut self, library: Library) -> Self {
        self.libraries
            .entry(library.server_id.clone())
            .or_default()
            .push(library);
        self
    }

    pub fn with_down(mut self, server_id: &str) -> Self {
        self.down.insert(server_id.to_string());
        self
    }

    fn check_up(&self, server: &Server) -> std::result::Result<(), MediaServerError> {
        if self.down.contains(&server.id) {
            Err(MediaServerError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MediaServerClient for FakeMediaServer {
    async fn probe(&self, server: &Server) -> ProbeResult {
        match self.check_up(server) {
            Ok(()) => ProbeResult::Ok,
            Err(e) => ProbeResult::failed(e.to_string()),
        }
    }

    async fn list_libraries(&self, server: &Server) -> std::result::Result<Vec<Library>, MediaServerError> {
        self.check_up(server)?;
        Ok(self.libraries.get(&server.id).cloned().unwrap_or_default())
    }

    async fn list_movies(
        &self,
        server: &Server,
        library_url: &Url,
    ) -> std::result::Result<Vec<Movie>, MediaServerError> {
        self.check_up(server)?;
        // .../library/sections/<key>/all
        let key = library_url
            .path_segments()
            .and_then(|segments| segments.rev().nth(1))
            .ok_or_else(|| MediaServerError::Address(library_url.to_string()))?;
        self.movies
            .get(&(server.id.clone(), key.to_string()))
            .cloned()
            .ok_or_else(|| MediaServerError::Http {
                status: 404,
                message: "Not Found".to_string(),
            })
    }
}

// ========== SNAPSHOT STORE ==========

/// Snapshot store kept in memory, counting reads and writes.
#[derive(Default)]
pub struct MemoryStore {
    owned: Mutex<BTreeMap<(String, String), LibrarySnapshot>>,
    missing: Mutex<BTreeMap<(String, String), MissingSnapshot>>,
    pub global_reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an owned snapshot without counting it as a write.
    pub fn seed(&self, server_id: &str, library_key: &str, movies: Vec<Movie>) {
        self.owned.lock().unwrap().insert(
            (server_id.to_string(), library_key.to_string()),
            LibrarySnapshot::new(server_id, library_key, movies),
        );
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn owned_titles(&self, server_id: &str, library_key: &str) -> Vec<String> {
        self.owned
            .lock()
            .unwrap()
            .get(&(server_id.to_string(), library_key.to_string()))
            .map(|s| s.movies.iter().map(|m| m.title.clone()).collect())
            .unwrap_or_default()
    }
}

impl SnapshotStore for MemoryStore {
    fn read_global_owned_movies(&self) -> Result<Vec<LibrarySnapshot>> {
        self.global_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.owned.lock().unwrap().values().cloned().collect())
    }

    fn read_library_movies(&self, server_id: &str, library_key: &str) -> Result<Option<LibrarySnapshot>> {
        Ok(self
            .owned
            .lock()
            .unwrap()
            .get(&(server_id.to_string(), library_key.to_string()))
            .cloned())
    }

    fn write_library_movies(&self, server_id: &str, library_key: &str, movies: &[Movie]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.seed(server_id, library_key, movies.to_vec());
        Ok(())
    }

    fn write_library_missing(&self, snapshot: &MissingSnapshot) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.missing.lock().unwrap().insert(
            (snapshot.server_id.clone(), snapshot.library_key.clone()),
            snapshot.clone(),
        );
        Ok(())
    }

    fn read_library_missing(&self, server_id: &str, library_key: &str) -> Result<Option<MissingSnapshot>> {
        Ok(self
            .missing
            .lock()
            .unwrap()
            .get(&(server_id.to_string(), library_key.to_string()))
            .cloned())
    }

    fn read_all_missing(&self) -> Result<Vec<MissingSnapshot>> {
        Ok(self.missing.lock().unwrap().values().cloned().collect())
    }
}

/// Store whose global read always fails, either as a snapshot read error
/// or as a raw I/O error.
pub enum BrokenStore {
    Snapshot,
    Io,
}

impl SnapshotStore for BrokenStore {
    fn read_global_owned_movies(&self) -> Result<Vec<LibrarySnapshot>> {
        match self {
            BrokenStore::Snapshot => Err(Error::SnapshotRead("disk on fire".to_string())),
            BrokenStore::Io => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "no access",
            ))),
        }
    }

    fn read_library_movies(&self, _: &str, _: &str) -> Result<Option<LibrarySnapshot>> {
        Ok(None)
    }

    fn write_library_movies(&self, _: &str, _: &str, _: &[Movie]) -> Result<()> {
        Ok(())
    }

    fn write_library_missing(&self, _: &MissingSnapshot) -> Result<()> {
        Ok(())
    }

    fn read_library_missing(&self, _: &str, _: &str) -> Result<Option<MissingSnapshot>> {
        Ok(None)
    }

    fn read_all_missing(&self) -> Result<Vec<MissingSnapshot>> {
        Ok(Vec::new())
    }
}

// ========== NOTIFICATIONS ==========

/// Sink that records every notification in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<Notification> {
        self.events().into_iter().filter(|n| n.is_failure()).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &Notification) {
        self.events.lock().unwrap().push(notification.clone());
    }
}

pub fn registry(servers: Vec<Server>) -> ServerRegistry {
    ServerRegistry::from_servers(servers)
}
