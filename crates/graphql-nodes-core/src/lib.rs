//! # graphql-nodes-core
//!
//! The deterministic node materialization engine - THE LOGIC.
//!
//! Takes one raw item from a GraphQL query result and turns it into a
//! normalized [`ContentRecord`]:
//! - a content digest of the item's serialization, for change detection
//! - a record id minted from the item's configured id field, or from the
//!   digest when the item has none
//! - the effective type name, after any configured override
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no storage. Records are handed back to the caller.
//! - No state between calls: a record is a pure function of the item, its
//!   type configuration and the collaborators' configuration.

// =============================================================================
// MODULES
// =============================================================================

pub mod digest;
pub mod identity;
pub mod materializer;
pub mod path;
pub mod primitives;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use types::{ContentRecord, NodesError, RecordInternal, TypeConfiguration, TypeConfigurations};

pub use digest::{Blake3Digester, ContentDigester};
pub use identity::{IdMinter, IdentitySource, NamespacedMinter, identity_value};
pub use materializer::{NodeMaterializer, serialize_item};
pub use path::{FieldPath, Resolution, resolve};
pub use primitives::{DEFAULT_SOURCE_NAME, MINTING_SEED};
