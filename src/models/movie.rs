//! Movie identity and collection models.

use crate::utils::title::normalize_title;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Identity of a movie: normalized title plus release year.
///
/// Two different films sharing both are treated as the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MovieKey {
    pub title: String,
    pub year: Option<u16>,
}

impl MovieKey {
    pub fn new(title: &str, year: Option<u16>) -> Self {
        Self {
            title: normalize_title(title),
            year,
        }
    }
}

impl std::fmt::Display for MovieKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// A movie as seen by a media server or the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    /// Display title.
    pub title: String,
    /// Release year.
    pub year: Option<u16>,
    /// TMDB ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    /// IMDB ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// TMDB collection ID (for movie series).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,
}

impl Movie {
    pub fn new<S: Into<String>>(title: S, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
            tmdb_id: None,
            imdb_id: None,
            collection_id: None,
        }
    }

    pub fn with_tmdb_id(mut self, tmdb_id: u64) -> Self {
        self.tmdb_id = Some(tmdb_id);
        self
    }

    pub fn with_imdb_id<S: Into<String>>(mut self, imdb_id: S) -> Self {
        self.imdb_id = Some(imdb_id.into());
        self
    }

    pub fn with_collection(mut self, collection_id: u64) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    pub fn key(&self) -> MovieKey {
        MovieKey::new(&self.title, self.year)
    }

    /// Fill in identifiers this movie lacks from another record of the same film.
    ///
    /// Fields already set on `self` win.
    pub fn merge_ids_from(&mut self, other: &Movie) {
        if self.tmdb_id.is_none() {
            self.tmdb_id = other.tmdb_id;
        }
        if self.imdb_id.is_none() {
            self.imdb_id = other.imdb_id.clone();
        }
        if self.collection_id.is_none() {
            self.collection_id = other.collection_id;
        }
    }

    /// Whether the metadata service has already been consulted for this movie.
    pub fn is_resolved(&self) -> bool {
        self.tmdb_id.is_some()
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Movie {}

impl Hash for Movie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for Movie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// A film collection (e.g. "The Matrix Collection") with all of its parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// TMDB collection ID.
    pub id: u64,
    /// Collection name.
    pub name: String,
    /// Every movie in the collection.
    pub parts: Vec<Movie>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_movie_identity_ignores_ids() {
        let a = Movie::new("The Matrix", Some(1999)).with_tmdb_id(603);
        let b = Movie::new("the matrix", Some(1999)).with_imdb_id("tt0133093");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_movie_identity_uses_year() {
        let a = Movie::new("Dune", Some(1984));
        let b = Movie::new("Dune", Some(2021));
        assert_ne!(a, b);
        assert_ne!(Movie::new("Dune", None), b);
    }

    #[test]
    fn test_merge_ids_keeps_existing() {
        let mut owned = Movie::new("Alien", Some(1979)).with_tmdb_id(348);
        let indexed = Movie::new("Alien", Some(1979))
            .with_tmdb_id(1)
            .with_imdb_id("tt0078748")
            .with_collection(8091);
        owned.merge_ids_from(&indexed);
        assert_eq!(owned.tmdb_id, Some(348));
        assert_eq!(owned.imdb_id.as_deref(), Some("tt0078748"));
        assert_eq!(owned.collection_id, Some(8091));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(MovieKey::new("Alien: Resurrection", Some(1997)).to_string(), "alien resurrection (1997)");
    }
}
