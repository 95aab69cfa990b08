//! # Source Configuration
//!
//! Loads the run-time configuration from a TOML file:
//!
//! ```toml
//! url = "https://api.example.com/graphql"
//! query = "{ Post { slug title } }"        # or: query_file = "posts.graphql"
//! source_name = "blog"                     # minting namespace, optional
//! concurrency = 16                         # in-flight store calls, optional
//!
//! [graphql_config.headers]
//! Authorization = "env:API_TOKEN"          # resolved from the environment
//!
//! [type_configuration.Post]
//! id_field = "slug"
//! type_name_override = "BlogPost"
//! ```
//!
//! camelCase keys (`graphqlConfig`, `typeConfiguration`, `idField`,
//! `typeNameOverride`, ...) are accepted as aliases.
//!
//! ## Environment
//!
//! - `GRAPHQL_NODES_URL` overrides `url`.
//! - Header values written as `env:NAME` are read from variable `NAME`.

use graphql_nodes_core::{DEFAULT_SOURCE_NAME, FieldPath, TypeConfigurations};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "graphql-nodes.toml";

/// Default bound on in-flight store calls.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Environment variable overriding the endpoint URL.
pub const URL_ENV_VAR: &str = "GRAPHQL_NODES_URL";

/// Prefix marking a header value as an environment variable reference.
const ENV_HEADER_PREFIX: &str = "env:";

/// Maximum size of a configuration or query file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("Invalid configuration: {0}")]
    Parse(String),

    /// The configuration parsed but its values are unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A header references an environment variable that is not set.
    #[error("Header '{header}' references unset environment variable '{var}'")]
    MissingEnv { header: String, var: String },
}

// =============================================================================
// FILE SCHEMA
// =============================================================================

/// Connection options passed to the GraphQL client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphQlConfig {
    /// Extra request headers, e.g. `Authorization`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default, alias = "queryFile")]
    query_file: Option<PathBuf>,
    #[serde(default, alias = "graphqlConfig")]
    graphql_config: GraphQlConfig,
    #[serde(default, alias = "typeConfiguration")]
    type_configuration: TypeConfigurations,
    #[serde(default, alias = "sourceName")]
    source_name: Option<String>,
    #[serde(default)]
    concurrency: Option<usize>,
}

// =============================================================================
// SOURCE CONFIG
// =============================================================================

/// Fully resolved configuration for one run.
///
/// `url` and `query` may be empty for offline use (materializing a saved
/// result); [`SourceConfig::require_connection`] checks them before a query
/// is sent.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// GraphQL endpoint.
    pub url: String,
    /// Request headers, with `env:` references already resolved.
    pub headers: BTreeMap<String, String>,
    /// Query document text.
    pub query: String,
    /// Per-type settings keyed by top-level query field.
    pub type_configuration: TypeConfigurations,
    /// Namespace record ids are minted under.
    pub source_name: String,
    /// Bound on in-flight store calls (at least 1).
    pub concurrency: usize,
}

impl SourceConfig {
    /// Load configuration from a TOML file, resolving environment references
    /// from the process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_bounded(path)?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::parse_with_env(&text, base_dir, |name| std::env::var(name).ok())
    }

    /// Parse configuration text.
    ///
    /// `base_dir` anchors a relative `query_file`; `env` looks up environment
    /// variables, so tests can supply their own.
    pub fn parse_with_env(
        text: &str,
        base_dir: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let query = match (file.query, file.query_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "set either 'query' or 'query_file', not both".to_string(),
                ));
            }
            (Some(query), None) => query,
            (None, Some(query_file)) => read_bounded(&base_dir.join(query_file))?,
            (None, None) => String::new(),
        };

        let url = env(URL_ENV_VAR).or(file.url).unwrap_or_default();

        let mut headers = BTreeMap::new();
        for (name, value) in file.graphql_config.headers {
            let value = match value.strip_prefix(ENV_HEADER_PREFIX) {
                Some(var) => env(var).ok_or_else(|| ConfigError::MissingEnv {
                    header: name.clone(),
                    var: var.to_string(),
                })?,
                None => value,
            };
            headers.insert(name, value);
        }

        let config = Self {
            url,
            headers,
            query,
            type_configuration: file.type_configuration,
            source_name: file
                .source_name
                .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string()),
            concurrency: file.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate values that every command depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_name.trim().is_empty() {
            return Err(ConfigError::Invalid("source_name must not be empty".into()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        for (type_name, config) in &self.type_configuration.0 {
            if let Some(id_field) = config.id_field.as_deref() {
                let path = FieldPath::parse(id_field)
                    .map_err(|e| ConfigError::Invalid(format!("{type_name}.id_field: {e}")))?;
                if path.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "{type_name}.id_field must not be empty"
                    )));
                }
            }
            if config
                .type_name_override
                .as_deref()
                .is_some_and(|name| name.trim().is_empty())
            {
                return Err(ConfigError::Invalid(format!(
                    "{type_name}.type_name_override must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Check that a query can be sent: an http(s) URL and a non-empty query.
    pub fn require_connection(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "url must be an http(s) URL, got '{}'",
                self.url
            )));
        }
        if self.query.trim().is_empty() {
            return Err(ConfigError::Invalid("query must not be empty".into()));
        }
        Ok(())
    }
}

/// Read a small text file, refusing anything over `MAX_CONFIG_FILE_SIZE`.
fn read_bounded(path: &Path) -> Result<String, ConfigError> {
    let read_error = |source: std::io::Error| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    };
    let metadata = std::fs::metadata(path).map_err(read_error)?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid(format!(
            "{} is {} bytes, maximum is {}",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path).map_err(read_error)
}

// =============================================================================
// TESTS
// =============================================================================
