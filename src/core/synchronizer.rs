//! Library synchronizer: fetch owned movies from each library and persist them.

use crate::core::indexer::OwnedIndex;
use crate::core::report::{Outcome, Stage, StageReport, Subject};
use crate::core::store::SnapshotStore;
use crate::models::{ApiKey, Library, Movie, Server, ServerRegistry};
use crate::services::{MediaServerClient, MetadataService};
use futures::stream::{self, StreamExt};

/// Concurrent TMDB lookups within one library.
const LOOKUP_CONCURRENCY: usize = 8;

/// Collaborators and shared read-only state for the sync stage.
pub struct SyncContext<'a> {
    pub media: &'a dyn MediaServerClient,
    pub metadata: &'a dyn MetadataService,
    pub store: &'a dyn SnapshotStore,
    pub api_key: &'a ApiKey,
    pub index: &'a OwnedIndex,
}

/// Sync every movie library of every server, selected or not.
pub async fn sync_libraries(ctx: &SyncContext<'_>, registry: &ServerRegistry, concurrency: usize) -> StageReport {
    let outcomes: Vec<Outcome> = stream::iter(registry.libraries().filter(|(_, l)| l.is_movie_library()))
        .map(|(server, library)| async move { sync_library(ctx, server, library).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    StageReport {
        stage: Stage::SyncLibraries,
        outcomes,
    }
}

/// Fetch, enrich and persist the movies of one library.
pub async fn sync_library(ctx: &SyncContext<'_>, server: &Server, library: &Library) -> Outcome {
    let subject = Subject::library(server, library);

    let url = match library.url(server) {
        Ok(url) => url,
        Err(e) => return Outcome::failed(Stage::SyncLibraries, subject, e.to_string()),
    };

    let movies = match ctx.media.list_movies(server, &url).await {
        Ok(movies) => movies,
        Err(e) => {
            tracing::warn!("Scan of {} / {} failed: {}", server.name, library.title, e);
            return Outcome::failed(Stage::SyncLibraries, subject, e.to_string());
        }
    };

    let total = movies.len();
    let movies: Vec<Movie> = stream::iter(movies)
        .map(|movie| enrich(ctx, movie))
        .buffered(LOOKUP_CONCURRENCY)
        .collect()
        .await;

    if let Err(e) = ctx.store.write_library_movies(&server.id, &library.key, &movies) {
        tracing::error!("Could not save movies of {} / {}: {}", server.name, library.title, e);
        return Outcome::failed(Stage::SyncLibraries, subject, e.to_string());
    }

    tracing::info!("Scanned {} movies from {} / {}", total, server.name, library.title);
    Outcome::ok(Stage::SyncLibraries, subject, total)
}

/// Attach TMDB ids and collection to a movie.
///
/// Movies the owned index already knows reuse its record; the rest are
/// looked up. A failed lookup keeps the movie as the server reported it.
async fn enrich(ctx: &SyncContext<'_>, mut movie: Movie) -> Movie {
    if let Some(known) = ctx.index.get(&movie.key()) {
        if known.is_resolved() {
            movie.merge_ids_from(known);
            return movie;
        }
    }

    match ctx.metadata.lookup_movie(ctx.api_key, &movie).await {
        Ok(Some(found)) => movie.merge_ids_from(&found),
        Ok(None) => tracing::debug!("No TMDB record for {}", movie),
        Err(e) => tracing::warn!("TMDB lookup failed for {}: {}", movie, e),
    }
    movie
}
