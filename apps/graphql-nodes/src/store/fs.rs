//! Directory-backed record store.
//!
//! Layout: `<root>/<type>/<id>.json`. Writing goes through a temporary file
//! and a rename, so a reader never sees a half-written record.

use super::{RecordStore, StoreError};
use graphql_nodes_core::ContentRecord;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Writes each record as pretty-printed JSON under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File a record is written to.
    #[must_use]
    pub fn path_for(&self, record: &ContentRecord) -> PathBuf {
        self.root
            .join(path_component(record.type_name()))
            .join(format!("{}.json", path_component(&record.id)))
    }
}

/// Replace anything outside `[A-Za-z0-9_-]` so names never escape the root.
fn path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

impl RecordStore for DirectoryStore {
    async fn store(&self, record: ContentRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record);
        let io_error = |source: std::io::Error| StoreError::Io {
            id: record.id.clone(),
            source,
        };

        let body = serde_json::to_vec_pretty(&record).map_err(|e| StoreError::Encode {
            id: record.id.clone(),
            message: e.to_string(),
        })?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        }

        // unique per write: two records may share an id within one run
        let seq = TMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{seq}.tmp"));
        let written = match tokio::fs::write(&tmp, &body).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // best effort, the original error is what gets reported
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(e));
        }

        tracing::debug!(id = %record.id, path = %path.display(), "record written");
        Ok(())
    }
}
