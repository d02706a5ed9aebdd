//! Error types for collection gaps.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for collection gaps.
#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY or tmdb.api_key in the config file")]
    TmdbApiKeyMissing,

    #[error("TMDB API key invalid: {0}")]
    TmdbApiKeyInvalid(String),

    #[error("TMDB unreachable: {0}")]
    MetadataUnavailable(String),

    // TMDB errors
    #[error("TMDB request failed: {0}")]
    TmdbRequest(String),

    #[error("Collection not found on TMDB: {0}")]
    CollectionNotFound(u64),

    // Pipeline errors
    #[error("A gap search is already running")]
    RunInProgress,

    // Snapshot errors
    #[error("Failed to read owned movie snapshots: {0}")]
    SnapshotRead(String),

    #[error("Failed to write snapshot: {0}")]
    SnapshotWrite(String),

    // Configuration errors
    #[error("Invalid config file: {0}")]
    InvalidConfig(String),

    #[error("Server not found: {0}")]
    ServerNotFound(String),

    #[error("Library not found: {0}")]
    LibraryNotFound(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by a media server call.
///
/// `Http` carries the status the server answered with; the other variants
/// never reached a usable response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaServerError {
    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("connection failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid address: {0}")]
    Address(String),
}

impl From<reqwest::Error> for MediaServerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MediaServerError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            MediaServerError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            MediaServerError::Transport(err.to_string())
        }
    }
}
