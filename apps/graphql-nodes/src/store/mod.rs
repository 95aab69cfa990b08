//! # Record Stores
//!
//! Where materialized records go. A store persists or upserts one record per
//! call; records with the same `id` replace each other.
//!
//! - [`MemoryStore`]: in-process map, for dry runs and tests
//! - [`DirectoryStore`]: one JSON file per record
//! - [`HttpStore`]: `PUT` to a content graph's HTTP API
//!
//! Stores are called concurrently from many tasks and must not assume any
//! ordering between calls.

mod fs;
mod http;

pub use fs::DirectoryStore;
pub use http::HttpStore;

use graphql_nodes_core::ContentRecord;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors from storing a single record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while writing the record.
    #[error("I/O error writing record {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded.
    #[error("Cannot encode record {id}: {message}")]
    Encode { id: String, message: String },

    /// Cannot reach the remote store.
    #[error("Cannot connect to record store at {url}: {message}")]
    Transport { url: String, message: String },

    /// The remote store answered with a non-success status.
    #[error("Record store rejected {id} with HTTP {status}: {body}")]
    Rejected { id: String, status: u16, body: String },
}

/// Persists completed records.
///
/// Implementations must tolerate concurrent calls. Failures are reported to
/// the caller as-is; stores do not retry.
pub trait RecordStore: Send + Sync {
    /// Persist or upsert `record`.
    fn store(&self, record: ContentRecord) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store keyed by record id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, ContentRecord>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of `store` calls received, upserts included.
    #[must_use]
    pub fn store_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A stored record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ContentRecord> {
        self.lock().get(id).cloned()
    }

    /// All stored records, ordered by id.
    #[must_use]
    pub fn records(&self) -> Vec<ContentRecord> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, ContentRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryStore {
    async fn store(&self, record: ContentRecord) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lock().insert(record.id.clone(), record);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
