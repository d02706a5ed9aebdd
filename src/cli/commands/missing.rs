//! Missing command implementation.

use super::Workspace;
use crate::cli::args::OutputFormat;
use crate::core::SnapshotStore;
use crate::models::snapshot::MissingSnapshot;
use crate::models::ServerRegistry;
use anyhow::Result;
use colored::Colorize;

/// Print the recommendations computed by the last run.
pub fn show_missing(
    workspace: &Workspace,
    server: Option<&str>,
    library: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let store = workspace.store();
    let snapshots: Vec<MissingSnapshot> = match (server, library) {
        (Some(server), Some(library)) => store.read_library_missing(server, library)?.into_iter().collect(),
        (server, _) => store
            .read_all_missing()?
            .into_iter()
            .filter(|s| server.map_or(true, |id| s.server_id == id))
            .collect(),
    };

    let registry = workspace.config.registry();
    match format {
        OutputFormat::Json => print_json(&snapshots)?,
        OutputFormat::Simple => print_simple(&snapshots),
        OutputFormat::Table => print_table(&snapshots, &registry),
    }

    Ok(())
}

/// Print results as JSON.
fn print_json(snapshots: &[MissingSnapshot]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshots)?);
    Ok(())
}

/// Print results in simple format.
fn print_simple(snapshots: &[MissingSnapshot]) {
    for snapshot in snapshots {
        for rec in &snapshot.recommendations {
            println!(
                "{}\t{}\t{}\t{}",
                snapshot.server_id,
                snapshot.library_key,
                rec.movie,
                rec.collection_name
            );
        }
    }
}

/// Print results grouped by library, then collection.
fn print_table(snapshots: &[MissingSnapshot], registry: &ServerRegistry) {
    let total: usize = snapshots.iter().map(|s| s.recommendations.len()).sum();
    if total == 0 {
        println!("No missing movies found.");
        return;
    }

    println!("{}", format!("Found {} missing movies:", total).bold().cyan());

    for snapshot in snapshots {
        if snapshot.recommendations.is_empty() {
            continue;
        }

        let server = registry.get(&snapshot.server_id);
        let server_name = server.map_or(snapshot.server_id.as_str(), |s| s.name.as_str());
        let library_title = server
            .and_then(|s| s.library(&snapshot.library_key))
            .map_or(snapshot.library_key.as_str(), |l| l.title.as_str());

        println!();
        println!(
            "{}",
            format!(
                "{} / {} ({}, searched {}):",
                server_name,
                library_title,
                snapshot.recommendations.len(),
                snapshot.searched_at
            )
            .bold()
        );

        let mut current_collection = None;
        for rec in &snapshot.recommendations {
            if current_collection != Some(rec.collection_id) {
                println!("  {}", rec.collection_name.yellow());
                current_collection = Some(rec.collection_id);
            }
            let tmdb = rec.movie.tmdb_id.map(|id| format!("tmdb:{}", id)).unwrap_or_default();
            println!("    {:<50} {}", rec.movie.to_string(), tmdb.dimmed());
        }
    }
}
