//! Owned command implementation.

use super::Workspace;
use crate::core::SnapshotStore;
use anyhow::Result;
use colored::Colorize;

/// Print the owned movies of a library from its last scan.
pub fn show_owned(workspace: &Workspace, server: &str, library: &str) -> Result<()> {
    let store = workspace.store();
    let Some(snapshot) = store.read_library_movies(server, library)? else {
        println!("Library {}/{} has not been scanned yet.", server, library);
        return Ok(());
    };

    println!(
        "{} {} movies (scanned {})",
        "[OWNED]".bold().cyan(),
        snapshot.movies.len(),
        snapshot.synced_at
    );
    println!();

    let mut movies = snapshot.movies;
    movies.sort_by_key(|m| m.key());

    for movie in &movies {
        let tmdb = movie
            .tmdb_id
            .map(|id| format!("tmdb:{}", id))
            .unwrap_or_else(|| "unresolved".dimmed().to_string());
        let collection = movie
            .collection_id
            .map(|id| format!("collection:{}", id))
            .unwrap_or_default();
        println!("  {:<50} {:<14} {}", movie.to_string(), tmdb, collection);
    }

    Ok(())
}
