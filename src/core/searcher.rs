//! Collection gap search: collection members a library does not own.

use crate::core::indexer::OwnedIndex;
use crate::core::report::{Outcome, Stage, StageReport, Subject};
use crate::core::store::SnapshotStore;
use crate::models::snapshot::{MissingSnapshot, Recommendation};
use crate::models::{ApiKey, Collection, Library, Movie, MovieKey, Server, ServerRegistry};
use crate::services::MetadataService;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashSet};

/// Concurrent collection queries within one library.
const COLLECTION_CONCURRENCY: usize = 4;

/// Collaborators and shared read-only state for the search stage.
pub struct SearchContext<'a> {
    pub metadata: &'a dyn MetadataService,
    pub store: &'a dyn SnapshotStore,
    pub api_key: &'a ApiKey,
    pub index: &'a OwnedIndex,
}

/// Search every movie library of every server, selected or not.
///
/// Returns the stage report and the gap snapshots that were written.
pub async fn search_gaps(
    ctx: &SearchContext<'_>,
    registry: &ServerRegistry,
    concurrency: usize,
) -> (StageReport, Vec<MissingSnapshot>) {
    let results: Vec<(Outcome, Option<MissingSnapshot>)> =
        stream::iter(registry.libraries().filter(|(_, l)| l.is_movie_library()))
            .map(|(server, library)| async move { search_library(ctx, server, library).await })
            .buffered(concurrency.max(1))
            .collect()
            .await;

    let mut outcomes = Vec::with_capacity(results.len());
    let mut missing = Vec::new();
    for (outcome, snapshot) in results {
        outcomes.push(outcome);
        missing.extend(snapshot);
    }

    (
        StageReport {
            stage: Stage::SearchGaps,
            outcomes,
        },
        missing,
    )
}

/// Search one library and persist its recommendations.
pub async fn search_library(
    ctx: &SearchContext<'_>,
    server: &Server,
    library: &Library,
) -> (Outcome, Option<MissingSnapshot>) {
    let subject = Subject::library(server, library);

    let owned = match ctx.store.read_library_movies(&server.id, &library.key) {
        Ok(Some(snapshot)) => snapshot.movies,
        Ok(None) => {
            return (
                Outcome::failed(Stage::SearchGaps, subject, "library has not been scanned yet"),
                None,
            )
        }
        Err(e) => return (Outcome::failed(Stage::SearchGaps, subject, e.to_string()), None),
    };

    let collection_ids: BTreeSet<u64> = owned.iter().filter_map(|m| m.collection_id).collect();
    tracing::info!(
        "Searching {} collections for {} / {}",
        collection_ids.len(),
        server.name,
        library.title
    );

    let collections: Vec<Collection> = stream::iter(collection_ids)
        .map(|id| async move { (id, ctx.metadata.get_collection(ctx.api_key, id).await) })
        .buffered(COLLECTION_CONCURRENCY)
        .filter_map(|(id, result)| async move {
            match result {
                Ok(collection) => Some(collection),
                Err(e) => {
                    tracing::warn!("Skipping collection {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
        .await;

    let recommendations = compute_missing(&owned, ctx.index, &collections);
    let snapshot = MissingSnapshot::new(&server.id, &library.key, recommendations);

    if let Err(e) = ctx.store.write_library_missing(&snapshot) {
        tracing::error!("Could not save gaps of {} / {}: {}", server.name, library.title, e);
        return (Outcome::failed(Stage::SearchGaps, subject, e.to_string()), None);
    }

    let count = snapshot.recommendations.len();
    tracing::info!("{} / {}: {} missing movies", server.name, library.title, count);
    (Outcome::ok(Stage::SearchGaps, subject, count), Some(snapshot))
}

/// Collection members that are neither in `owned` nor in the owned index.
///
/// Collections are taken in the given order; a movie reachable through
/// several collections is recommended once, under the first one.
pub fn compute_missing(owned: &[Movie], index: &OwnedIndex, collections: &[Collection]) -> Vec<Recommendation> {
    let owned_keys: HashSet<MovieKey> = owned.iter().map(Movie::key).collect();
    let mut owned_tmdb: HashSet<u64> = owned.iter().filter_map(|m| m.tmdb_id).collect();
    owned_tmdb.extend(index.tmdb_ids());

    let mut seen: HashSet<MovieKey> = HashSet::new();
    let mut recommendations = Vec::new();

    for collection in collections {
        for part in &collection.parts {
            let key = part.key();
            let is_owned = owned_keys.contains(&key)
                || index.contains(&key)
                || part.tmdb_id.map_or(false, |id| owned_tmdb.contains(&id));
            if is_owned || !seen.insert(key) {
                continue;
            }
            recommendations.push(Recommendation {
                movie: part.clone(),
                collection_id: collection.id,
                collection_name: collection.name.clone(),
            });
        }
    }

    recommendations
}
