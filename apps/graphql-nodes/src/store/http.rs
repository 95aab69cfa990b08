//! HTTP record store.
//!
//! Upserts each record with `PUT {base_url}/records/{id}` and the record JSON
//! as body. Any 2xx status is success.

use super::{RecordStore, StoreError};
use graphql_nodes_core::ContentRecord;

/// Record store that forwards records to a content graph's HTTP API.
#[derive(Clone)]
pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpStore {
    /// Create a store pointing at `base_url`, with an optional Bearer token.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// URL a record is sent to.
    #[must_use]
    pub fn record_url(&self, id: &str) -> String {
        format!("{}/records/{}", self.base_url, id)
    }

    /// Build a request with optional Bearer auth.
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.put(url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }
}

impl RecordStore for HttpStore {
    async fn store(&self, record: ContentRecord) -> Result<(), StoreError> {
        let url = self.record_url(&record.id);
        let resp = self
            .request(&url)
            .json(&record)
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                url: self.base_url.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                id: record.id,
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(id = %record.id, %url, "record sent");
        Ok(())
    }
}
