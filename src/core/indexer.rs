//! Owned-movie index built from the previous run's snapshots.

use crate::core::store::SnapshotStore;
use crate::models::{Movie, MovieKey, ServerRegistry};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};

/// Deduplicated owned movies of every selected library, keyed by title/year.
#[derive(Debug, Clone, Default)]
pub struct OwnedIndex {
    movies: BTreeMap<MovieKey, Movie>,
}

impl OwnedIndex {
    /// Insert a movie, replacing any earlier entry with the same key.
    pub fn insert(&mut self, movie: Movie) {
        self.movies.insert(movie.key(), movie);
    }

    pub fn get(&self, key: &MovieKey) -> Option<&Movie> {
        self.movies.get(key)
    }

    pub fn contains(&self, key: &MovieKey) -> bool {
        self.movies.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&MovieKey, &Movie)> {
        self.movies.iter()
    }

    /// TMDB ids of all indexed movies that have one.
    pub fn tmdb_ids(&self) -> HashSet<u64> {
        self.movies.values().filter_map(|m| m.tmdb_id).collect()
    }
}

/// Build the owned-movie index.
///
/// Walks servers then libraries in registry order; for every selected
/// library, the whole persisted set is scanned for that library's movies and
/// each one is inserted, so later libraries overwrite earlier ones on equal
/// keys. Unselected libraries contribute nothing.
pub fn build_owned_index(registry: &ServerRegistry, store: &dyn SnapshotStore) -> Result<OwnedIndex> {
    let mut index = OwnedIndex::default();

    let selected: Vec<_> = registry.libraries().filter(|(_, library)| library.selected).collect();
    if selected.is_empty() {
        tracing::info!("No libraries selected, owned-movie index is empty");
        return Ok(index);
    }

    let snapshots = store.read_global_owned_movies().map_err(|e| match e {
        e @ Error::SnapshotRead(_) => e,
        other => Error::SnapshotRead(other.to_string()),
    })?;

    for (server, library) in selected {
        let mut inserted = 0;
        for snapshot in snapshots.iter().filter(|s| s.is_for(&server.id, &library.key)) {
            for movie in &snapshot.movies {
                index.insert(movie.clone());
                inserted += 1;
            }
        }
        tracing::debug!("Indexed {} movies from {} / {}", inserted, server.name, library.title);
    }

    tracing::info!("Owned-movie index holds {} movies", index.len());
    Ok(index)
}
