//! Check command implementation.

use super::Workspace;
use crate::preflight;
use anyhow::Result;
use colored::Colorize;

/// Check TMDB and every configured server.
pub async fn check(workspace: &Workspace) -> Result<()> {
    println!("{}", "Running preflight checks...".bold());
    println!();

    let tmdb = workspace.tmdb_client()?;
    let plex = workspace.plex_client()?;
    let registry = workspace.config.registry();
    let api_key = workspace.config.tmdb_api_key();

    let results = preflight::run_preflight_checks(&tmdb, &plex, &registry, api_key.as_ref()).await;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    println!("{}", "All checks passed.".green());
    Ok(())
}
