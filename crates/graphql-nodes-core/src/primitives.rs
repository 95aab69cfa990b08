//! # Fixed Constants
//!
//! Values compiled into the binary that identity and digest derivation
//! depend on. Changing any of them changes every record id ever produced.

use uuid::Uuid;

/// Seed UUID from which every minting namespace is derived.
///
/// Namespaces are `uuidv5(SEED, source_name)`; record ids are
/// `uuidv5(namespace, identity)`. The same seed is used by the JavaScript
/// content-graph tooling, so ids line up across both.
pub const MINTING_SEED: Uuid = Uuid::from_u128(0x638f_7a53_c567_4eca_8fc1_b23e_fb1c_fb2b);

/// Source name used as the minting namespace when none is configured.
pub const DEFAULT_SOURCE_NAME: &str = "graphql-nodes";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minting_seed_matches_published_value() {
        assert_eq!(
            MINTING_SEED.to_string(),
            "638f7a53-c567-4eca-8fc1-b23efb1cfb2b"
        );
    }
}
