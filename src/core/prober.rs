//! Server connectivity probe and library refresh.

use crate::core::report::{Outcome, Stage, StageReport, Subject};
use crate::models::{Server, ServerRegistry};
use crate::services::{MediaServerClient, ProbeResult};
use futures::stream::{self, StreamExt};

/// Probe every server. A server that does not answer only fails its own item.
pub async fn probe_servers(
    client: &dyn MediaServerClient,
    registry: &ServerRegistry,
    concurrency: usize,
) -> StageReport {
    let outcomes: Vec<Outcome> = stream::iter(registry.servers())
        .map(|server| async move { probe_server(client, server).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    StageReport {
        stage: Stage::ProbeServers,
        outcomes,
    }
}

/// Probe one server.
pub async fn probe_server(client: &dyn MediaServerClient, server: &Server) -> Outcome {
    let subject = Subject::server(server);
    match client.probe(server).await {
        ProbeResult::Ok => {
            tracing::info!("Connected to {} ({})", server.name, server.id);
            Outcome::ok(Stage::ProbeServers, subject, 0)
        }
        ProbeResult::Failed { reason } => {
            tracing::warn!("Could not connect to {}: {}", server.name, reason);
            Outcome::failed(Stage::ProbeServers, subject, reason)
        }
    }
}

/// Refresh the library list of every server.
///
/// Returns the stage report and a registry in which every server that
/// answered carries exactly the libraries it reported; servers that failed
/// keep their previous libraries.
pub async fn refresh_libraries(
    client: &dyn MediaServerClient,
    registry: &ServerRegistry,
    concurrency: usize,
) -> (StageReport, ServerRegistry) {
    let results: Vec<(Outcome, Server)> = stream::iter(registry.servers())
        .map(|server| async move { refresh_server(client, server).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut refreshed = registry.clone();
    let mut outcomes = Vec::with_capacity(results.len());
    for (outcome, server) in results {
        refreshed.upsert(server);
        outcomes.push(outcome);
    }

    (
        StageReport {
            stage: Stage::RefreshLibraries,
            outcomes,
        },
        refreshed,
    )
}

async fn refresh_server(client: &dyn MediaServerClient, server: &Server) -> (Outcome, Server) {
    let subject = Subject::server(server);
    match client.list_libraries(server).await {
        Ok(libraries) => {
            let next = server.with_libraries(libraries);
            tracing::info!("Plex libraries found for {}: {}", server.name, next.library_count());
            let count = next.library_count();
            (Outcome::ok(Stage::RefreshLibraries, subject, count), next)
        }
        Err(e) => {
            tracing::warn!("Plex libraries not found for {}: {}", server.name, e);
            (
                Outcome::failed(Stage::RefreshLibraries, subject, e.to_string()),
                server.clone(),
            )
        }
    }
}
