//! Persisted snapshots of owned and missing movies.

use crate::models::movie::Movie;
use serde::{Deserialize, Serialize};

/// Schema version written into every snapshot file.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Owned movies of one library, as of the last successful sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    /// Schema version
    pub version: String,
    /// Server machine identifier
    pub server_id: String,
    /// Library key
    pub library_key: String,
    /// Sync timestamp
    pub synced_at: String,
    /// Owned movies
    pub movies: Vec<Movie>,
}

impl LibrarySnapshot {
    pub fn new(server_id: &str, library_key: &str, movies: Vec<Movie>) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            server_id: server_id.to_string(),
            library_key: library_key.to_string(),
            synced_at: chrono::Utc::now().to_rfc3339(),
            movies,
        }
    }

    pub fn is_for(&self, server_id: &str, library_key: &str) -> bool {
        self.server_id == server_id && self.library_key == library_key
    }
}

/// A collection member the user does not own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// The missing movie
    pub movie: Movie,
    /// Collection it was found through
    pub collection_id: u64,
    /// Collection name
    pub collection_name: String,
}

/// Result of the last gap search for one library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingSnapshot {
    /// Schema version
    pub version: String,
    /// Server machine identifier
    pub server_id: String,
    /// Library key
    pub library_key: String,
    /// Search timestamp
    pub searched_at: String,
    /// Missing movies, one entry per title/year
    pub recommendations: Vec<Recommendation>,
}

impl MissingSnapshot {
    pub fn new(server_id: &str, library_key: &str, recommendations: Vec<Recommendation>) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            server_id: server_id.to_string(),
            library_key: library_key.to_string(),
            searched_at: chrono::Utc::now().to_rfc3339(),
            recommendations,
        }
    }

    pub fn is_for(&self, server_id: &str, library_key: &str) -> bool {
        self.server_id == server_id && self.library_key == library_key
    }
}
