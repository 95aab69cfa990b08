//! # Identity Derivation
//!
//! Turns an identity source into a namespaced record id.
//!
//! Every record id is minted exactly once, from exactly one source:
//! - the value found at the type's `id_field`, when it is a usable identity;
//! - otherwise the content digest of the item.

use crate::primitives::{DEFAULT_SOURCE_NAME, MINTING_SEED};
use serde_json::Value;
use uuid::Uuid;

/// Turns an arbitrary string into a namespaced, stable identifier.
///
/// Must be deterministic for a given input within one configuration.
pub trait IdMinter: Send + Sync {
    /// Mint the id for `input`.
    fn mint(&self, input: &str) -> String;
}

/// UUIDv5 minter scoped to a source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacedMinter {
    namespace: Uuid,
}

impl NamespacedMinter {
    /// Create a minter for the given source name.
    #[must_use]
    pub fn new(source_name: &str) -> Self {
        Self {
            namespace: Uuid::new_v5(&MINTING_SEED, source_name.as_bytes()),
        }
    }

    /// The namespace UUID ids are minted under.
    #[must_use]
    pub fn namespace(&self) -> Uuid {
        self.namespace
    }
}

impl Default for NamespacedMinter {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_NAME)
    }
}

impl IdMinter for NamespacedMinter {
    fn mint(&self, input: &str) -> String {
        Uuid::new_v5(&self.namespace, input.as_bytes()).to_string()
    }
}

// =============================================================================
// IDENTITY SOURCE
// =============================================================================

/// Where a record's identity came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// The value found at the configured id field.
    Field(String),
    /// The item's content digest.
    Digest(String),
}

impl IdentitySource {
    /// The string that gets minted.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Field(value) | Self::Digest(value) => value,
        }
    }

    /// Mint the record id for this source.
    #[must_use]
    pub fn mint(&self, minter: &dyn IdMinter) -> String {
        minter.mint(self.as_str())
    }
}

/// Convert a resolved id field value into an identity string.
///
/// - `null`, `false` and `""` are not identities
/// - other strings are used verbatim
/// - everything else, `0` and `true` included, uses its JSON text, so equal
///   values (objects and lists too) give equal identities
#[must_use]
pub fn identity_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minted_ids_match_reference_uuids() {
        let minter = NamespacedMinter::default();
        assert_eq!(
            minter.namespace().to_string(),
            "4229a6ed-65ff-5ca0-aa9f-9c677ad0f358"
        );
        assert_eq!(minter.mint("a"), "dbc5716c-375d-552f-8d9e-a3e9111fbcd5");
    }

    #[test]
    fn minting_depends_on_source_name() {
        let minter = NamespacedMinter::new("@dfrnt/gatsby-source-graphql-nodes");
        assert_eq!(minter.mint("a"), "8128e360-6779-59cc-8784-28214564fadd");
        assert_ne!(minter.mint("a"), NamespacedMinter::default().mint("a"));
    }

    #[test]
    fn identity_value_accepts_strings_and_numbers() {
        assert_eq!(identity_value(&json!("slug-1")), Some("slug-1".to_string()));
        assert_eq!(identity_value(&json!(42)), Some("42".to_string()));
        assert_eq!(identity_value(&json!(0)), Some("0".to_string()));
        assert_eq!(identity_value(&json!(-3)), Some("-3".to_string()));
    }

    #[test]
    fn identity_value_uses_json_text_for_other_values() {
        assert_eq!(identity_value(&json!(true)), Some("true".to_string()));
        assert_eq!(identity_value(&json!({"k": 1})), Some(r#"{"k":1}"#.to_string()));
        assert_eq!(identity_value(&json!([1, "a"])), Some(r#"[1,"a"]"#.to_string()));
        assert_eq!(identity_value(&json!([])), Some("[]".to_string()));
        assert_eq!(identity_value(&json!({})), Some("{}".to_string()));
    }

    #[test]
    fn identity_value_rejects_null_false_and_empty_string() {
        for value in [json!(""), json!(null), json!(false)] {
            assert_eq!(identity_value(&value), None, "{value} is not an identity");
        }
    }

    #[test]
    fn identity_source_mints_once_from_its_value() {
        let minter = NamespacedMinter::default();
        let field = IdentitySource::Field("a".to_string());
        let digest = IdentitySource::Digest("a".to_string());

        assert_eq!(field.mint(&minter), minter.mint("a"));
        // same string, same id: the source kind never feeds the mint
        assert_eq!(field.mint(&minter), digest.mint(&minter));
    }
}
