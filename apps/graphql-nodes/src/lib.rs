//! # graphql-nodes
//!
//! The async shell around `graphql-nodes-core`: loads configuration, runs the
//! GraphQL query, materializes every item and hands the records to a store.
//!
//! ```text
//! config.toml ──▶ GraphQlClient ──▶ QueryResult ──▶ Pipeline ──▶ RecordStore
//!                                                     │
//!                                                     ▼
//!                                             NodeMaterializer (core)
//! ```

pub mod config;
pub mod pipeline;
pub mod query;
pub mod store;

pub use config::{ConfigError, SourceConfig};
pub use pipeline::{ItemFailure, Pipeline, RunReport};
pub use query::{Collection, GraphQlClient, QueryError, QueryResult};
pub use store::{DirectoryStore, HttpStore, MemoryStore, RecordStore, StoreError};

use graphql_nodes_core::NodesError;
use thiserror::Error;

/// Name announced once at startup.
pub const SOURCE_PLUGIN_NAME: &str = "graphql-nodes";

/// Top-level error for commands.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Nodes(#[from] NodesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    Input(String),

    /// Some items were not stored; the run is reported but not successful.
    #[error("{failed} of {total} items failed")]
    ItemsFailed { failed: usize, total: usize },
}
