//! External collaborators: metadata service, media servers, notifications.
//!
//! The pipeline only talks to the traits defined here; `tmdb`, `plex` and
//! `notify` hold the concrete implementations.

pub mod notify;
pub mod plex;
pub mod tmdb;

use crate::error::MediaServerError;
use crate::models::{ApiKey, Collection, Library, Movie, Server};
use crate::Result;
use async_trait::async_trait;
use url::Url;

/// Outcome of a metadata-service credential test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    Valid,
    Invalid { reason: String },
}

/// Outcome of a media server connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Ok,
    Failed { reason: String },
}

impl ProbeResult {
    pub fn failed<S: Into<String>>(reason: S) -> Self {
        ProbeResult::Failed {
            reason: reason.into(),
        }
    }
}

/// The movie-metadata service (TMDB).
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Check a credential with a lightweight call.
    ///
    /// `Err` means the service could not be reached at all.
    async fn test_credential(&self, key: &ApiKey) -> Result<CredentialStatus>;

    /// Every member of a collection.
    async fn get_collection(&self, key: &ApiKey, collection_id: u64) -> Result<Collection>;

    /// Resolve a media-server movie to its metadata record (ids and collection).
    ///
    /// `Ok(None)` when the service does not know the movie.
    async fn lookup_movie(&self, key: &ApiKey, movie: &Movie) -> Result<Option<Movie>>;
}

/// A media server (Plex).
#[async_trait]
pub trait MediaServerClient: Send + Sync {
    /// Check the server answers and is the server we think it is.
    async fn probe(&self, server: &Server) -> ProbeResult;

    /// Current libraries of the server.
    async fn list_libraries(&self, server: &Server) -> std::result::Result<Vec<Library>, MediaServerError>;

    /// Movies of the library listed at `library_url`.
    async fn list_movies(
        &self,
        server: &Server,
        library_url: &Url,
    ) -> std::result::Result<Vec<Movie>, MediaServerError>;
}
