//! Collection Gaps CLI
//!
//! A command-line tool that lists the movies missing from the film
//! collections you partly own on your Plex servers.

use clap::Parser;
use collection_gaps::cli::{
    args::{Cli, Commands, LibrariesAction, ServersAction},
    commands::{check, libraries, missing, owned, run, servers, Workspace},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let mut workspace = Workspace::load(cli.config.as_deref())?;

    // Run the appropriate command
    match cli.command {
        Commands::Run { quiet } => {
            run::run(&mut workspace, quiet).await?;
        }

        Commands::Check => {
            check::check(&workspace).await?;
        }

        Commands::Servers { action } => match action {
            ServersAction::List => {
                servers::list_servers(&workspace)?;
            }
            ServersAction::Add {
                name,
                id,
                address,
                port,
                token,
            } => {
                servers::add_server(&mut workspace, &name, id.as_deref(), &address, port, &token).await?;
            }
            ServersAction::Remove { id } => {
                servers::remove_server(&mut workspace, &id)?;
            }
        },

        Commands::Libraries { action } => match action {
            LibrariesAction::List { server } => {
                libraries::list_libraries(&workspace, server.as_deref())?;
            }
            LibrariesAction::Select { server, library, off } => {
                libraries::select_library(&mut workspace, &server, &library, !off)?;
            }
        },

        Commands::Owned { server, library } => {
            owned::show_owned(&workspace, &server, &library)?;
        }

        Commands::Missing {
            server,
            library,
            format,
        } => {
            missing::show_missing(&workspace, server.as_deref(), library.as_deref(), format)?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("collection_gaps=debug")
    } else {
        EnvFilter::new("collection_gaps=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
