//! # CLI Command Implementations

use super::SinkArgs;
use graphql_nodes::{
    AppError, DirectoryStore, GraphQlClient, HttpStore, MemoryStore, Pipeline, QueryResult,
    RecordStore, RunReport, SourceConfig,
};
use graphql_nodes_core::{FieldPath, Resolution};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum size of a JSON input file (100 MB).
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Environment variable supplying the record store token.
pub const STORE_TOKEN_ENV_VAR: &str = "GRAPHQL_NODES_STORE_TOKEN";

// =============================================================================
// SINKS
// =============================================================================

/// Resolved record destination.
#[derive(Debug)]
pub enum Sink {
    /// Keep records in memory and list them.
    Memory,
    /// One JSON file per record under a directory.
    Directory(PathBuf),
    /// A content graph HTTP API.
    Http { url: String, token: Option<String> },
}

impl From<SinkArgs> for Sink {
    fn from(args: SinkArgs) -> Self {
        match (args.out, args.store_url) {
            (Some(dir), _) => Self::Directory(dir),
            (None, Some(url)) => Self::Http {
                url,
                token: args
                    .store_token
                    .or_else(|| std::env::var(STORE_TOKEN_ENV_VAR).ok()),
            },
            (None, None) => Self::Memory,
        }
    }
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Execute the configured query and store every record.
pub async fn cmd_run(config_path: &Path, sink: Sink, json_mode: bool) -> Result<(), AppError> {
    let config = SourceConfig::load(config_path)?;
    config.require_connection()?;

    let client = GraphQlClient::from_config(&config)?;
    tracing::info!(url = %client.url(), "executing query");
    let result = client.execute(&config.query).await?;

    let report = ingest_into(&config, sink, result, json_mode).await;
    finish(&report, json_mode)
}

// =============================================================================
// MATERIALIZE COMMAND
// =============================================================================

/// Store records from a saved query result.
pub async fn cmd_materialize(
    config_path: &Path,
    input: &Path,
    sink: Sink,
    json_mode: bool,
) -> Result<(), AppError> {
    let config = load_or_default(config_path)?;
    tracing::info!("Materializing from {:?}", input);

    let result = QueryResult::from_json(read_json(input)?)?;
    let report = ingest_into(&config, sink, result, json_mode).await;
    finish(&report, json_mode)
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// Resolve a field path against a JSON file and print the outcome.
pub fn cmd_resolve(input: &Path, path: &str, json_mode: bool) -> Result<(), AppError> {
    let value = read_json(input)?;
    let path = FieldPath::parse(path)?;
    let resolution = path.resolve(&value);

    if json_mode {
        let mut output = serde_json::json!({
            "path": path.to_string(),
            "resolved": resolution.is_resolved(),
        });
        if let Resolution::Resolved(found) = resolution {
            output["value"] = found.clone();
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    match resolution {
        Resolution::Resolved(found) => {
            println!("{}", serde_json::to_string_pretty(found).unwrap_or_default());
        }
        Resolution::Unresolved => println!("unresolved"),
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Run the pipeline into whichever store the sink names.
async fn ingest_into(
    config: &SourceConfig,
    sink: Sink,
    result: QueryResult,
    json_mode: bool,
) -> RunReport {
    match sink {
        Sink::Memory => {
            let store = Arc::new(MemoryStore::new());
            let report = ingest_with(config, Arc::clone(&store), result).await;
            if !json_mode {
                for record in store.records() {
                    println!("{}  {}", record.id, record.type_name());
                }
            }
            report
        }
        Sink::Directory(dir) => {
            tracing::info!("Writing records under {:?}", dir);
            ingest_with(config, Arc::new(DirectoryStore::new(dir)), result).await
        }
        Sink::Http { url, token } => {
            tracing::info!(store_url = %url, "Sending records");
            ingest_with(config, Arc::new(HttpStore::new(url, token)), result).await
        }
    }
}

async fn ingest_with<S: RecordStore + 'static>(
    config: &SourceConfig,
    store: Arc<S>,
    result: QueryResult,
) -> RunReport {
    Pipeline::from_config(config, store).ingest(result).await
}

/// Print the report and turn failures into an error exit.
fn finish(report: &RunReport, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    } else {
        println!();
        println!("Stored:  {}", report.stored);
        for (type_name, count) in &report.stored_by_type {
            println!("  {:<24} {}", type_name, count);
        }
        println!("Failed:  {}", report.failures.len());
        for failure in &report.failures {
            println!(
                "  {}[{}] {}: {}",
                failure.type_name,
                failure.index,
                failure.record_id.as_deref().unwrap_or("-"),
                failure.message
            );
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(AppError::ItemsFailed {
            failed: report.failures.len(),
            total: report.total(),
        })
    }
}

/// Load the configuration file, or the defaults when it does not exist.
fn load_or_default(config_path: &Path) -> Result<SourceConfig, AppError> {
    if config_path.exists() {
        return Ok(SourceConfig::load(config_path)?);
    }
    tracing::warn!("{:?} not found, using default type configuration", config_path);
    Ok(SourceConfig::parse_with_env("", Path::new("."), |_| None)?)
}

/// Read and parse a JSON file, refusing oversized input.
fn read_json(path: &Path) -> Result<Value, AppError> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(AppError::Input(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }
    let contents = std::fs::read(path)?;
    serde_json::from_slice(&contents)
        .map_err(|e| AppError::Input(format!("{}: {}", path.display(), e)))
}
