//! Plex server preflight check.

use super::CheckResult;
use crate::models::Server;
use crate::services::{MediaServerClient, ProbeResult};

/// Check that `server` answers with its configured identity.
pub async fn check(media: &dyn MediaServerClient, server: &Server) -> CheckResult {
    let name = format!("Plex '{}'", server.name);
    match media.probe(server).await {
        ProbeResult::Ok => CheckResult::ok(&name, &format!("connected ({}:{})", server.address, server.port)),
        ProbeResult::Failed { reason } => CheckResult::fail(
            &name,
            &reason,
            "Check the address, port and token with `collection-gaps servers list`",
        ),
    }
}
