//! # Node Materializer
//!
//! Builds a [`ContentRecord`] from one raw query item.
//!
//! Steps, in order:
//! 1. Serialize the item and digest the serialization.
//! 2. Pick the identity source: the configured id field if it resolves to a
//!    usable identity, the digest otherwise.
//! 3. Mint the record id from that source, once.
//! 4. Resolve the effective type name.
//! 5. Assemble the record.
//!
//! Handing the record to a store is left to the caller; this module does no
//! I/O.

use crate::digest::{Blake3Digester, ContentDigester};
use crate::identity::{IdMinter, IdentitySource, NamespacedMinter, identity_value};
use crate::path::FieldPath;
use crate::{ContentRecord, NodesError, RecordInternal, TypeConfiguration};
use serde_json::Value;

/// Serialize a raw item the way record content is stored.
///
/// Key order follows the item's own order, as received from the query.
pub fn serialize_item(item: &Value) -> Result<String, NodesError> {
    serde_json::to_string(item).map_err(|e| NodesError::Serialization(e.to_string()))
}

/// Materializes raw items into content records.
///
/// Holds only read-only collaborators, so one materializer can be shared by
/// any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct NodeMaterializer<M = NamespacedMinter, D = Blake3Digester> {
    minter: M,
    digester: D,
}

impl NodeMaterializer {
    /// Create a materializer minting ids under `source_name`, with BLAKE3
    /// digests.
    #[must_use]
    pub fn new(source_name: &str) -> Self {
        Self::with_collaborators(NamespacedMinter::new(source_name), Blake3Digester)
    }
}

impl Default for NodeMaterializer {
    fn default() -> Self {
        Self::with_collaborators(NamespacedMinter::default(), Blake3Digester)
    }
}

impl<M: IdMinter, D: ContentDigester> NodeMaterializer<M, D> {
    /// Create a materializer with explicit minting and digest collaborators.
    #[must_use]
    pub fn with_collaborators(minter: M, digester: D) -> Self {
        Self { minter, digester }
    }

    /// The minting collaborator.
    #[must_use]
    pub fn minter(&self) -> &M {
        &self.minter
    }

    /// Choose the identity source for an item.
    ///
    /// An id field that does not resolve, or resolves to something that is not
    /// an identity (see [`identity_value`]), falls back to `digest`. Only a
    /// malformed id field path is an error.
    pub fn identity(
        &self,
        item: &Value,
        config: &TypeConfiguration,
        digest: &str,
    ) -> Result<IdentitySource, NodesError> {
        if let Some(id_field) = config.id_field.as_deref() {
            let path = FieldPath::parse(id_field)?;
            if let Some(identity) = path.resolve(item).value().and_then(identity_value) {
                return Ok(IdentitySource::Field(identity));
            }
        }
        Ok(IdentitySource::Digest(digest.to_string()))
    }

    /// Materialize one item of the `type_name` collection.
    pub fn materialize(
        &self,
        item: Value,
        config: &TypeConfiguration,
        type_name: &str,
    ) -> Result<ContentRecord, NodesError> {
        self.materialize_with_identity(item, config, type_name)
            .map(|(record, _)| record)
    }

    /// Like [`materialize`](Self::materialize), also returning the source
    /// the id was minted from.
    pub fn materialize_with_identity(
        &self,
        item: Value,
        config: &TypeConfiguration,
        type_name: &str,
    ) -> Result<(ContentRecord, IdentitySource), NodesError> {
        let content = serialize_item(&item)?;
        let content_digest = self.digester.digest(&content);

        let source = self.identity(&item, config, &content_digest)?;
        let id = source.mint(&self.minter);

        let record = ContentRecord {
            id,
            data: item,
            children: Vec::new(),
            internal: RecordInternal {
                type_name: config.effective_type_name(type_name).to_string(),
                content,
                content_digest,
            },
        };
        Ok((record, source))
    }
}

// =============================================================================
// TESTS
// =============================================================================
