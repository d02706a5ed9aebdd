//! Libraries command implementation.

use super::Workspace;
use crate::Error;
use anyhow::Result;
use colored::Colorize;

/// List libraries known from the last refresh.
pub fn list_libraries(workspace: &Workspace, server: Option<&str>) -> Result<()> {
    let registry = workspace.config.registry();
    if let Some(id) = server {
        if registry.get(id).is_none() {
            return Err(Error::ServerNotFound(id.to_string()).into());
        }
    }

    let libraries: Vec<_> = registry
        .libraries()
        .filter(|(s, _)| server.map_or(true, |id| s.id == id))
        .collect();

    if libraries.is_empty() {
        println!("No libraries known. Run `collection-gaps run` to refresh them.");
        return Ok(());
    }

    println!(
        "{:<20} {:<8} {:<30} {:<8} {}",
        "Server".bold(),
        "Key".bold(),
        "Title".bold(),
        "Type".bold(),
        "Owned".bold()
    );
    println!("{}", "-".repeat(80));

    for (server, library) in libraries {
        let selected = if library.selected {
            "yes".green()
        } else {
            "no".dimmed()
        };
        println!(
            "{:<20} {:<8} {:<30} {:<8} {}",
            server.name, library.key, library.title, library.kind.to_string(), selected
        );
    }

    Ok(())
}

/// Mark a library as part of the owned set, or remove it with `selected = false`.
pub fn select_library(workspace: &mut Workspace, server: &str, key: &str, selected: bool) -> Result<()> {
    let mut registry = workspace.config.registry();
    let current = registry
        .get(server)
        .ok_or_else(|| Error::ServerNotFound(server.to_string()))?;
    let updated = current
        .with_selection(key, selected)
        .ok_or_else(|| Error::LibraryNotFound(format!("{}/{}", server, key)))?;

    let title = updated.library(key).map(|l| l.title.clone()).unwrap_or_default();
    let is_movie = updated.library(key).map_or(false, |l| l.is_movie_library());

    registry.upsert(updated);
    workspace.config.update_servers(&registry);
    workspace.save()?;

    if selected {
        println!("{} '{}' now counts as owned", "[OK]".green(), title);
        if !is_movie {
            println!("  {}", "Not a movie library: it will not be scanned.".yellow());
        }
    } else {
        println!("{} '{}' no longer counts as owned", "[OK]".green(), title);
    }
    Ok(())
}
