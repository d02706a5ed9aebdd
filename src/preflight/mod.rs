//! Preflight checks module.

mod plex;
mod tmdb;

use crate::models::{Secret, ServerRegistry};
use crate::services::{MediaServerClient, MetadataService};
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Check the TMDB credential, then every configured server in order.
pub async fn run_preflight_checks(
    metadata: &dyn MetadataService,
    media: &dyn MediaServerClient,
    registry: &ServerRegistry,
    api_key: Option<&Secret>,
) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(registry.len() + 1);

    results.push(tmdb::check(metadata, api_key).await);

    if registry.is_empty() {
        results.push(CheckResult::fail(
            "Plex",
            "no servers configured",
            "Add one with `collection-gaps servers add`",
        ));
    }

    for server in registry.servers() {
        results.push(plex::check(media, server).await);
    }

    results
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}
