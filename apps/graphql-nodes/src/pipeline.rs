//! # Source Pipeline
//!
//! Drives a query result through materialization into a record store.
//!
//! Every item becomes its own task on a `JoinSet`. The pipeline waits for the
//! whole set before it returns, and collects every per-item failure into the
//! [`RunReport`] instead of stopping at the first one. At most `concurrency`
//! store calls are in flight at once.

use crate::config::SourceConfig;
use crate::query::{GraphQlClient, QueryError, QueryResult};
use crate::store::{RecordStore, StoreError};
use graphql_nodes_core::{
    IdentitySource, NodeMaterializer, TypeConfiguration, TypeConfigurations,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::{Id, JoinError, JoinSet};

// =============================================================================
// REPORT
// =============================================================================

/// One item that did not make it into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Query field the item came from.
    pub type_name: String,
    /// Position of the item within its collection.
    pub index: usize,
    /// Record id, when materialization got far enough to mint one.
    pub record_id: Option<String>,
    /// What went wrong.
    pub message: String,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Records the store accepted.
    pub stored: usize,
    /// Stored records per effective type name.
    pub stored_by_type: BTreeMap<String, usize>,
    /// Items that failed, in completion order.
    pub failures: Vec<ItemFailure>,
}

impl RunReport {
    /// Items processed, successful or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.stored + self.failures.len()
    }

    /// Whether every item was stored.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Identifies the item behind a spawned store task.
struct PendingItem {
    type_name: String,
    record_type: String,
    index: usize,
    record_id: String,
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Materializes query results and hands the records to a store.
pub struct Pipeline<S> {
    materializer: NodeMaterializer,
    types: TypeConfigurations,
    store: Arc<S>,
    concurrency: usize,
}

impl<S: RecordStore + 'static> Pipeline<S> {
    /// Create a pipeline that keeps one store call in flight; raise it with
    /// [`Pipeline::with_concurrency`].
    pub fn new(materializer: NodeMaterializer, types: TypeConfigurations, store: Arc<S>) -> Self {
        Self {
            materializer,
            types,
            store,
            concurrency: 1,
        }
    }

    /// Create a pipeline from a loaded configuration.
    pub fn from_config(config: &SourceConfig, store: Arc<S>) -> Self {
        Self::new(
            NodeMaterializer::new(&config.source_name),
            config.type_configuration.clone(),
            store,
        )
        .with_concurrency(config.concurrency)
    }

    /// Set the bound on in-flight store calls. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Execute `query` with `client` and ingest the result.
    ///
    /// A query failure aborts the run before any item is touched.
    pub async fn run(&self, client: &GraphQlClient, query: &str) -> Result<RunReport, QueryError> {
        let result = client.execute(query).await?;
        Ok(self.ingest(result).await)
    }

    /// Materialize and store every item of `result`, then wait for all of
    /// them.
    pub async fn ingest(&self, result: QueryResult) -> RunReport {
        tracing::info!(
            collections = result.collections().len(),
            items = result.item_count(),
            "ingesting query result"
        );

        let mut report = RunReport::default();
        let mut tasks: JoinSet<Result<(), StoreError>> = JoinSet::new();
        let mut pending: HashMap<Id, PendingItem> = HashMap::new();
        let default_config = TypeConfiguration::default();

        for collection in result.into_collections() {
            let type_name = collection.type_name;
            let config = match self.types.get(&type_name) {
                Some(config) => config,
                None => {
                    tracing::warn!(type_name = %type_name, "no type configuration, using defaults");
                    &default_config
                }
            };
            tracing::info!(type_name = %type_name, items = collection.items.len(), "materializing collection");

            for (index, item) in collection.items.into_iter().enumerate() {
                let materialized = self
                    .materializer
                    .materialize_with_identity(item, config, &type_name);
                let record = match materialized {
                    Ok((record, source)) => {
                        if let (IdentitySource::Digest(_), Some(id_field)) =
                            (&source, config.id_field.as_deref())
                        {
                            tracing::debug!(
                                type_name = %type_name,
                                index,
                                id_field = %id_field,
                                "id field unusable, identity taken from content digest"
                            );
                        }
                        record
                    }
                    Err(e) => {
                        record_failure(&mut report, type_name.clone(), index, None, e.to_string());
                        continue;
                    }
                };
                tracing::debug!(id = %record.id, record_type = %record.type_name(), "materialized");

                while tasks.len() >= self.concurrency {
                    if let Some(outcome) = tasks.join_next_with_id().await {
                        settle(&mut report, &mut pending, outcome);
                    }
                }

                let item = PendingItem {
                    type_name: type_name.clone(),
                    record_type: record.type_name().to_string(),
                    index,
                    record_id: record.id.clone(),
                };
                let store = Arc::clone(&self.store);
                let handle = tasks.spawn(async move { store.store(record).await });
                pending.insert(handle.id(), item);
            }
        }

        while let Some(outcome) = tasks.join_next_with_id().await {
            settle(&mut report, &mut pending, outcome);
        }

        tracing::info!(
            stored = report.stored,
            failed = report.failures.len(),
            "ingest finished"
        );
        report
    }
}

/// Fold one finished store task into the report.
fn settle(
    report: &mut RunReport,
    pending: &mut HashMap<Id, PendingItem>,
    outcome: Result<(Id, Result<(), StoreError>), JoinError>,
) {
    let (id, result) = match outcome {
        Ok((id, result)) => (id, result.map_err(|e| e.to_string())),
        Err(join_error) => (join_error.id(), Err(format!("store task failed: {join_error}"))),
    };
    let Some(item) = pending.remove(&id) else {
        return;
    };

    match result {
        Ok(()) => {
            report.stored += 1;
            *report.stored_by_type.entry(item.record_type).or_default() += 1;
        }
        Err(message) => record_failure(
            report,
            item.type_name,
            item.index,
            Some(item.record_id),
            message,
        ),
    }
}

fn record_failure(
    report: &mut RunReport,
    type_name: String,
    index: usize,
    record_id: Option<String>,
    message: String,
) {
    tracing::warn!(
        type_name = %type_name,
        index,
        record_id = record_id.as_deref().unwrap_or("-"),
        error = %message,
        "item failed"
    );
    report.failures.push(ItemFailure {
        type_name,
        index,
        record_id,
        message,
    });
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn report_totals() {
        let mut report = RunReport::default();
        assert!(report.is_success());

        report.stored = 2;
        report.failures.push(ItemFailure {
            type_name: "Post".into(),
            index: 0,
            record_id: None,
            message: "boom".into(),
        });

        assert_eq!(report.total(), 3);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn unconfigured_types_use_defaults() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(
            NodeMaterializer::default(),
            TypeConfigurations::new(),
            Arc::clone(&store),
        );

        let result = QueryResult::from_data(json!({"Tag": [{"name": "rust"}]})).expect("result");
        let report = pipeline.ingest(result).await;

        assert!(report.is_success());
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].type_name(), "Tag");
        assert_eq!(
            records[0].id,
            NodeMaterializer::default()
                .materialize(json!({"name": "rust"}), &TypeConfiguration::new(), "Tag")
                .expect("materialize")
                .id
        );
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(
            NodeMaterializer::default(),
            TypeConfigurations::new(),
            Arc::clone(&store),
        )
        .with_concurrency(0);

        let result =
            QueryResult::from_data(json!({"Tag": [{"n": 1}, {"n": 2}, {"n": 3}]})).expect("result");
        let report = pipeline.ingest(result).await;

        assert_eq!(report.stored, 3);
        assert_eq!(store.len(), 3);
    }
}
