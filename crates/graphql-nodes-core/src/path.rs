//! # Field Path Resolver
//!
//! Locates a value buried inside nested objects and arrays.
//!
//! A path is an ordered list of field names. Each object hop consumes one
//! name. Each array hop consumes nothing and steps into the array's first
//! element, so a path can be declared without knowing which hops are
//! list-wrapped:
//!
//! ```
//! use graphql_nodes_core::path::{FieldPath, Resolution};
//! use serde_json::json;
//!
//! let data = json!([{ "a": { "b": 1 } }, { "a": { "b": 2 } }]);
//! let path = FieldPath::parse("a.b").expect("valid path");
//!
//! assert_eq!(path.resolve(&data), Resolution::Resolved(&json!(1)));
//! ```

use crate::NodesError;
use serde_json::Value;
use std::fmt;

/// Outcome of resolving a field path.
///
/// `Unresolved` is distinct from `Resolved(&Value::Null)`: an empty path over
/// a present `null` resolves to it, while a missing hop never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The path led to this value.
    Resolved(&'a Value),
    /// A hop was missing, hit a scalar, or hit an empty array.
    Unresolved,
}

impl<'a> Resolution<'a> {
    /// Whether the path led to a value.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The resolved value, if any.
    #[must_use]
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved => None,
        }
    }
}

/// Resolve `path` against `value`.
///
/// `value` is `None` when the starting value is absent. Absent stays absent:
/// with an empty path the result is `Unresolved` too.
///
/// Walks `(remaining path, current value)` until either the path is consumed
/// or a hop fails. Arrays unwrap to their first element without consuming a
/// segment; JSON values are finite trees, so the walk always terminates.
pub fn resolve<'a, S: AsRef<str>>(value: Option<&'a Value>, path: &[S]) -> Resolution<'a> {
    let mut current = value;
    let mut remaining = path;

    loop {
        let Some(value) = current else {
            return Resolution::Unresolved;
        };
        let Some((field, rest)) = remaining.split_first() else {
            return Resolution::Resolved(value);
        };

        match value {
            Value::Array(items) => current = items.first(),
            Value::Object(fields) => {
                current = fields.get(field.as_ref());
                remaining = rest;
            }
            // null and scalars have no fields
            _ => return Resolution::Unresolved,
        }
    }
}

// =============================================================================
// FIELD PATH
// =============================================================================

/// A parsed, non-empty-segment field path such as `author.slug`.
///
/// GraphQL field names cannot contain `.`, so a plain field name parses to a
/// single segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse a dot-separated path.
    ///
    /// The empty string is the empty path. Any other string containing an
    /// empty segment (`"a..b"`, `".a"`, `"a."`) is rejected.
    pub fn parse(path: &str) -> Result<Self, NodesError> {
        if path.is_empty() {
            return Ok(Self(Vec::new()));
        }
        Self::from_segments(path.split('.')).map_err(|_| NodesError::InvalidFieldPath(path.into()))
    }

    /// Build a path from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, NodesError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.iter().any(String::is_empty) {
            return Err(NodesError::InvalidFieldPath(segments.join(".")));
        }
        Ok(Self(segments))
    }

    /// The path's segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve this path against a present value.
    #[must_use]
    pub fn resolve<'a>(&self, value: &'a Value) -> Resolution<'a> {
        resolve(Some(value), &self.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

// =============================================================================
// TESTS
// =============================================================================
