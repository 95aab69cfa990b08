//! # graphql-nodes
//!
//! Sources the result of one GraphQL query into a content graph.
//!
//! ## Usage
//!
//! ```bash
//! # Query the endpoint from graphql-nodes.toml, write records to ./content
//! graphql-nodes run --out content
//!
//! # Same, but upsert into a content graph API
//! graphql-nodes run --store-url http://localhost:9000 --store-token "$TOKEN"
//!
//! # Materialize a saved response without touching the network
//! graphql-nodes materialize -i response.json --json
//!
//! # Check where an id field path points
//! graphql-nodes resolve -i post.json -p author.slug
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries command output.
    // GRAPHQL_NODES_LOG_FORMAT=json enables machine-parseable logs.
    let log_format =
        std::env::var("GRAPHQL_NODES_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "graphql_nodes=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet {
        tracing::info!(
            "Loaded {} v{}",
            graphql_nodes::SOURCE_PLUGIN_NAME,
            env!("CARGO_PKG_VERSION")
        );
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
