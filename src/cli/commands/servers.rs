//! Servers command implementation.

use super::Workspace;
use crate::models::{Secret, Server};
use anyhow::{Context, Result};
use colored::Colorize;

/// List configured servers.
pub fn list_servers(workspace: &Workspace) -> Result<()> {
    let registry = workspace.config.registry();
    if registry.is_empty() {
        println!("No servers configured.");
        return Ok(());
    }

    println!(
        "{:<42} {:<20} {:<30} {}",
        "Machine identifier".bold(),
        "Name".bold(),
        "Address".bold(),
        "Libraries".bold()
    );
    println!("{}", "-".repeat(100));

    for server in registry.servers() {
        println!(
            "{:<42} {:<20} {:<30} {}",
            server.id,
            server.name,
            format!("{}:{}", server.address, server.port),
            server.library_count()
        );
    }

    Ok(())
}

/// Add a server, replacing any server with the same identifier.
///
/// Without `id`, the machine identifier is read from the server itself.
pub async fn add_server(
    workspace: &mut Workspace,
    name: &str,
    id: Option<&str>,
    address: &str,
    port: u16,
    token: &str,
) -> Result<()> {
    let token = Secret::new(token);
    let id = match id {
        Some(id) => id.to_string(),
        None => {
            let probe = Server::new("", name, address, port, token.clone());
            let identity = workspace
                .plex_client()?
                .identity(&probe)
                .await
                .with_context(|| format!("Failed to reach Plex at {}:{}", address, port))?;
            println!(
                "  Found server '{}' ({})",
                identity.friendly_name.as_deref().unwrap_or(name),
                identity.machine_identifier
            );
            identity.machine_identifier
        }
    };

    let mut registry = workspace.config.registry();
    let replaced = registry.get(&id).is_some();
    registry.upsert(Server::new(&id, name, address, port, token));
    workspace.config.update_servers(&registry);
    workspace.save()?;

    if replaced {
        println!("{} Server '{}' updated ({})", "[OK]".green(), name, id);
    } else {
        println!("{} Server '{}' added ({})", "[OK]".green(), name, id);
    }
    println!("  Run `collection-gaps run` to discover its libraries.");
    Ok(())
}

/// Remove a server by identifier.
pub fn remove_server(workspace: &mut Workspace, id: &str) -> Result<()> {
    let mut registry = workspace.config.registry();
    let removed = registry
        .remove(id)
        .ok_or_else(|| crate::Error::ServerNotFound(id.to_string()))?;
    workspace.config.update_servers(&registry);
    workspace.save()?;

    println!("{} Server '{}' removed", "[OK]".green(), removed.name);
    println!("  Snapshots under {} are kept.", workspace.config.data_dir.display());
    Ok(())
}
