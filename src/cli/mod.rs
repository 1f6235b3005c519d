//! Command-line interface, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};

/// Showsync - TV show catalog service
/// Mirrors a TV listings catalog into a local database and serves it over HTTP
#[derive(Parser)]
#[command(name = "showsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C (default)
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Run one ingestion batch against the show source and exit
    #[command(alias = "run")]
    Ingest,

    /// List stored shows
    #[command(alias = "ls", alias = "l")]
    List,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
