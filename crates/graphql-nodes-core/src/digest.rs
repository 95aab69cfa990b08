//! # Content Digest
//!
//! Change-detection tokens for serialized items.
//!
//! The digest only has to be deterministic for a given serialization routine;
//! it is not a canonical hash of the JSON value.

/// Turns serialized content into a stable hash string.
///
/// Implementations must be deterministic and collision-resistant enough to
/// serve as a change-detection token.
pub trait ContentDigester: Send + Sync {
    /// Digest the given content.
    fn digest(&self, content: &str) -> String;
}

/// BLAKE3 digester producing 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Digester;

impl ContentDigester for Blake3Digester {
    fn digest(&self, content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }
}
