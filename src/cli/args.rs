//! Command line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Collection Gaps - Find the movies missing from your Plex collections
#[derive(Parser, Debug)]
#[command(name = "collection-gaps")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full gap search over every configured server
    Run {
        /// Log notifications instead of printing them
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check TMDB and every configured Plex server
    Check,

    /// Manage Plex servers
    Servers {
        #[command(subcommand)]
        action: ServersAction,
    },

    /// Inspect libraries and choose which ones count as owned
    Libraries {
        #[command(subcommand)]
        action: LibrariesAction,
    },

    /// Show the owned movies of a library from its last scan
    Owned {
        /// Server machine identifier
        #[arg(value_name = "SERVER")]
        server: String,

        /// Library section key
        #[arg(value_name = "LIBRARY")]
        library: String,
    },

    /// Show the missing movies found by the last run
    Missing {
        /// Only this server
        #[arg(short, long)]
        server: Option<String>,

        /// Only this library (requires --server)
        #[arg(short, long, requires = "server")]
        library: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServersAction {
    /// List configured servers
    List,

    /// Add (or replace) a server
    Add {
        /// Friendly name
        #[arg(long)]
        name: String,

        /// Machine identifier (asked from the server when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Host name, IP or URL
        #[arg(long)]
        address: String,

        /// Port
        #[arg(long, default_value_t = 32400)]
        port: u16,

        /// X-Plex-Token
        #[arg(long)]
        token: String,
    },

    /// Remove a server
    Remove {
        /// Server machine identifier
        #[arg(value_name = "SERVER")]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum LibrariesAction {
    /// List known libraries
    List {
        /// Only this server
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Include a library in (or, with --off, exclude it from) the owned set
    Select {
        /// Server machine identifier
        #[arg(value_name = "SERVER")]
        server: String,

        /// Library section key
        #[arg(value_name = "LIBRARY")]
        library: String,

        /// Deselect instead
        #[arg(long)]
        off: bool,
    },
}

/// Output format for listings.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Simple,
    Json,
}
