//! # Core Type Definitions
//!
//! This module contains the data model shared by every stage of node
//! materialization:
//! - Per-type settings (`TypeConfiguration`, `TypeConfigurations`)
//! - The produced record (`ContentRecord`, `RecordInternal`)
//! - Error types (`NodesError`)
//!
//! ## Determinism Guarantees
//!
//! - Type configurations live in a `BTreeMap`, so iteration order never
//!   depends on hashing.
//! - A `ContentRecord` is never mutated after construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// TYPE CONFIGURATION
// =============================================================================

/// Settings for one top-level query collection.
///
/// Both fields are optional. An empty configuration keeps the query's type
/// name and derives identity from the content digest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeConfiguration {
    /// Rename the produced record's `internal.type`.
    #[serde(default, alias = "typeNameOverride", skip_serializing_if = "Option::is_none")]
    pub type_name_override: Option<String>,

    /// Field path (dot-separated) whose value identifies the item.
    #[serde(default, alias = "idField", skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
}

impl TypeConfiguration {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity field path.
    #[must_use]
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = Some(id_field.into());
        self
    }

    /// Set the type name override.
    #[must_use]
    pub fn with_type_name_override(mut self, type_name: impl Into<String>) -> Self {
        self.type_name_override = Some(type_name.into());
        self
    }

    /// The type name records of this collection are stored under.
    #[must_use]
    pub fn effective_type_name<'a>(&'a self, type_name: &'a str) -> &'a str {
        self.type_name_override.as_deref().unwrap_or(type_name)
    }
}

/// Type configurations keyed by the query's top-level field name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeConfigurations(pub BTreeMap<String, TypeConfiguration>);

impl TypeConfigurations {
    /// Create an empty set of configurations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the configuration for a type.
    pub fn insert(&mut self, type_name: impl Into<String>, config: TypeConfiguration) {
        self.0.insert(type_name.into(), config);
    }

    /// Configuration for a type, if one was supplied.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeConfiguration> {
        self.0.get(type_name)
    }

    /// Number of configured types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no type is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TypeConfiguration)> for TypeConfigurations {
    fn from_iter<I: IntoIterator<Item = (String, TypeConfiguration)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// CONTENT RECORD
// =============================================================================

/// Bookkeeping half of a [`ContentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInternal {
    /// Resolved type name (override or query field name).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Serialized raw item.
    pub content: String,
    /// Digest of `content`, used for change detection.
    #[serde(rename = "contentDigest")]
    pub content_digest: String,
}

/// A normalized, uniquely identified record ready for the content graph.
///
/// Serializes with the field names the content graph expects:
/// `{ id, data, children, internal: { type, content, contentDigest } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Namespaced identifier. Equal identity sources give equal ids.
    pub id: String,
    /// The raw item, unmodified.
    pub data: serde_json::Value,
    /// Child record ids. Always empty at creation.
    pub children: Vec<String>,
    /// Type, content and digest.
    pub internal: RecordInternal,
}

impl ContentRecord {
    /// Resolved type name of this record.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.internal.type_name
    }

    /// Content digest of this record.
    #[must_use]
    pub fn content_digest(&self) -> &str {
        &self.internal.content_digest
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while materializing records.
///
/// A missing identity field is not an error; the digest-derived identity is
/// used instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodesError {
    /// The raw item could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A field path contained an empty segment.
    #[error("Invalid field path: {0:?}")]
    InvalidFieldPath(String),
}

// =============================================================================
// TESTS
// =============================================================================
