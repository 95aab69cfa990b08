//! # GraphQL Query Execution
//!
//! Sends the configured query to the endpoint and turns the response into
//! typed collections of raw items.
//!
//! ## Collection shapes
//!
//! Each top-level field of `data` is one collection, named after the field:
//! - array: its elements are the items
//! - object: a single item
//! - `null`: no items
//! - any other scalar: [`QueryError::Shape`]

use crate::config::SourceConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from the query execution layer. All of them are fatal to a run.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Cannot reach the GraphQL endpoint.
    #[error("Cannot connect to GraphQL endpoint {url}: {message}")]
    Transport { url: String, message: String },

    /// The endpoint answered with a non-success status and no GraphQL errors.
    #[error("GraphQL endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response carried GraphQL errors.
    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    /// The response body is not a GraphQL response.
    #[error("Malformed GraphQL response: {0}")]
    Parse(String),

    /// A top-level field is neither a list, an object, nor null.
    #[error("Collection '{type_name}' must be a list or an object, found {found}")]
    Shape {
        type_name: String,
        found: &'static str,
    },

    /// A configured header name or value is not valid HTTP.
    #[error("Invalid header '{0}'")]
    Header(String),
}

// =============================================================================
// QUERY RESULT
// =============================================================================

/// The raw items of one top-level query field.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    /// Top-level field name, used as the record type name.
    pub type_name: String,
    /// Raw items, in response order.
    pub items: Vec<Value>,
}

/// A query result as a list of collections, in response key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    collections: Vec<Collection>,
}

impl QueryResult {
    /// Build from the `data` object of a GraphQL response.
    pub fn from_data(data: Value) -> Result<Self, QueryError> {
        let fields = match data {
            Value::Object(fields) => fields,
            other => {
                return Err(QueryError::Parse(format!(
                    "'data' must be an object, found {}",
                    json_kind(&other)
                )));
            }
        };

        let mut collections = Vec::with_capacity(fields.len());
        for (type_name, value) in fields {
            let items = match value {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                object @ Value::Object(_) => vec![object],
                other => {
                    return Err(QueryError::Shape {
                        type_name,
                        found: json_kind(&other),
                    });
                }
            };
            collections.push(Collection { type_name, items });
        }
        Ok(Self { collections })
    }

    /// Build from a full GraphQL response body (`{ data, errors }`).
    ///
    /// Any entry in `errors` fails the whole result, even if `data` is
    /// partially present.
    pub fn from_response(response: Value) -> Result<Self, QueryError> {
        let Value::Object(mut body) = response else {
            return Err(QueryError::Parse("response must be a JSON object".into()));
        };

        if let Some(messages) = body.get("errors").and_then(error_messages) {
            return Err(QueryError::GraphQl(messages));
        }

        match body.remove("data") {
            Some(data) => Self::from_data(data),
            None => Err(QueryError::Parse("response has no 'data'".into())),
        }
    }

    /// Build from either a full response or a bare `data` object.
    ///
    /// An object is treated as a full response when it has a `data` or
    /// `errors` key and no keys other than `data`, `errors` and `extensions`.
    pub fn from_json(value: Value) -> Result<Self, QueryError> {
        let is_response = value.as_object().is_some_and(|fields| {
            (fields.contains_key("data") || fields.contains_key("errors"))
                && fields
                    .keys()
                    .all(|k| matches!(k.as_str(), "data" | "errors" | "extensions"))
        });
        if is_response {
            Self::from_response(value)
        } else {
            Self::from_data(value)
        }
    }

    /// The collections, in response order.
    #[must_use]
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Consume into the collections.
    #[must_use]
    pub fn into_collections(self) -> Vec<Collection> {
        self.collections
    }

    /// Total number of items across all collections.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.collections.iter().map(|c| c.items.len()).sum()
    }
}

/// Join the `message` of every error; `None` when there are no errors.
fn error_messages(errors: &Value) -> Option<String> {
    let errors = errors.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<String> = errors
        .iter()
        .map(|e| match e.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => e.to_string(),
        })
        .collect();
    Some(messages.join("; "))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client that posts a query document to a GraphQL endpoint.
#[derive(Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl GraphQlClient {
    /// Create a client for `url`, sending `headers` with every request.
    pub fn new(
        url: impl Into<String>,
        headers: &BTreeMap<String, String>,
    ) -> Result<Self, QueryError> {
        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| QueryError::Header(name.clone()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| QueryError::Header(name.clone()))?;
            header_map.insert(header_name, header_value);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            url: url.into(),
            headers: header_map,
        })
    }

    /// Create a client from a loaded configuration.
    pub fn from_config(config: &SourceConfig) -> Result<Self, QueryError> {
        Self::new(config.url.clone(), &config.headers)
    }

    /// The endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the query and parse the response.
    pub async fn execute(&self, query: &str) -> Result<QueryResult, QueryError> {
        tracing::debug!(url = %self.url, "sending GraphQL query");

        let resp = self
            .http
            .post(&self.url)
            .headers(self.headers.clone())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| QueryError::Transport {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| QueryError::Transport {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        let parsed = serde_json::from_str::<Value>(&body);

        if !status.is_success() {
            // GraphQL servers often report validation errors with a 4xx status
            if let Some(messages) = parsed
                .as_ref()
                .ok()
                .and_then(|v| v.get("errors"))
                .and_then(error_messages)
            {
                return Err(QueryError::GraphQl(messages));
            }
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response = parsed.map_err(|e| QueryError::Parse(e.to_string()))?;
        QueryResult::from_response(response)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collections_follow_response_order() {
        let result = QueryResult::from_data(json!({
            "Post": [{"slug": "a"}, {"slug": "b"}],
            "Author": [{"name": "Ada"}],
        }))
        .expect("parse");

        let names: Vec<&str> = result
            .collections()
            .iter()
            .map(|c| c.type_name.as_str())
            .collect();
        assert_eq!(names, ["Post", "Author"]);
        assert_eq!(result.item_count(), 3);
    }

    #[test]
    fn single_object_is_one_item_and_null_is_none() {
        let result = QueryResult::from_data(json!({
            "Settings": {"theme": "dark"},
            "Drafts": null,
        }))
        .expect("parse");

        assert_eq!(result.collections()[0].items, vec![json!({"theme": "dark"})]);
        assert!(result.collections()[1].items.is_empty());
    }

    #[test]
    fn scalar_collection_is_a_shape_error() {
        let result = QueryResult::from_data(json!({"count": 3}));
        assert!(matches!(result, Err(QueryError::Shape { ref type_name, .. }) if type_name == "count"));
    }

    #[test]
    fn graphql_errors_fail_the_result() {
        let result = QueryResult::from_response(json!({
            "data": {"Post": []},
            "errors": [{"message": "field 'x' not found"}, {"message": "denied"}],
        }));

        match result {
            Err(QueryError::GraphQl(messages)) => {
                assert_eq!(messages, "field 'x' not found; denied");
            }
            other => panic!("expected GraphQL error, got {other:?}"),
        }
    }

    #[test]
    fn empty_errors_array_is_ignored() {
        let result = QueryResult::from_response(json!({"data": {"Post": []}, "errors": []}))
            .expect("parse");
        assert_eq!(result.collections().len(), 1);
    }

    #[test]
    fn response_without_data_is_malformed() {
        let result = QueryResult::from_response(json!({"extensions": {}}));
        assert!(matches!(result, Err(QueryError::Parse(_))));
    }

    #[test]
    fn from_json_detects_full_responses() {
        let wrapped = QueryResult::from_json(json!({"data": {"Post": [{"slug": "a"}]}}))
            .expect("wrapped");
        let bare = QueryResult::from_json(json!({"Post": [{"slug": "a"}]})).expect("bare");

        assert_eq!(wrapped, bare);
    }

    #[test]
    fn invalid_header_is_rejected() {
        let mut headers = BTreeMap::new();
        headers.insert("Bad Header".to_string(), "x".to_string());

        let result = GraphQlClient::new("http://localhost:1", &headers);
        assert!(matches!(result, Err(QueryError::Header(_))));
    }
}
