//! # graphql-nodes CLI Module
//!
//! ## Available Commands
//!
//! - `run` - Execute the configured query and store every record
//! - `materialize` - Store records from a saved query result, no network
//! - `resolve` - Resolve a field path against a JSON file

mod commands;

use clap::{Args, Parser, Subcommand};
use graphql_nodes::AppError;
use graphql_nodes::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// graphql-nodes - source a GraphQL query into a content graph
///
/// Every item of every top-level query field becomes a content record with a
/// stable id and a content digest.
#[derive(Parser, Debug)]
#[command(name = "graphql-nodes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress the startup announcement
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where records are sent. Without `--out` or `--store-url` records are kept
/// in memory and listed.
#[derive(Args, Debug)]
pub struct SinkArgs {
    /// Write records as JSON files under this directory
    #[arg(short, long, conflicts_with = "store_url")]
    pub out: Option<PathBuf>,

    /// PUT records to this content graph API base URL
    #[arg(long)]
    pub store_url: Option<String>,

    /// Bearer token for --store-url (default: $GRAPHQL_NODES_STORE_TOKEN)
    #[arg(long, requires = "store_url")]
    pub store_token: Option<String>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute the configured query and store every record
    Run {
        #[command(flatten)]
        sink: SinkArgs,
    },

    /// Store records from a saved query result (full response or `data`)
    Materialize {
        /// Path to the JSON query result
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        sink: SinkArgs,
    },

    /// Resolve a dot-separated field path against a JSON file
    Resolve {
        /// Path to the JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Field path, e.g. `author.slug`
        #[arg(short, long)]
        path: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let json_mode = cli.json;

    match cli.command {
        Commands::Run { sink } => cmd_run(&cli.config, Sink::from(sink), json_mode).await,
        Commands::Materialize { input, sink } => {
            cmd_materialize(&cli.config, &input, Sink::from(sink), json_mode).await
        }
        Commands::Resolve { input, path } => cmd_resolve(&input, &path, json_mode),
    }
}
