//! # Materialization Scenarios
//!
//! Record-level behaviour as seen by a store: what comes out for a given
//! item and type configuration.
//!
//! ## Groups
//! - resolution: field path lookups used for identity
//! - identity: which source an id is minted from
//! - envelope: type, content and digest fields

use graphql_nodes_core::{
    Blake3Digester, ContentDigester, IdMinter, NamespacedMinter, NodeMaterializer, Resolution,
    TypeConfiguration, TypeConfigurations, resolve,
};
use serde_json::json;

// =============================================================================
// RESOLUTION
// =============================================================================

mod resolution {
    use super::*;

    #[test]
    fn list_unwrap_uses_first_element() {
        let data = json!([{"a": {"b": 1}}, {"a": {"b": 2}}]);
        assert_eq!(resolve(Some(&data), &["a", "b"]), Resolution::Resolved(&json!(1)));
    }

    #[test]
    fn absent_path_is_unresolved() {
        let data = json!({"a": 1});
        assert_eq!(resolve(Some(&data), &["x", "y"]), Resolution::Unresolved);
    }

    #[test]
    fn empty_path_returns_input() {
        let data = json!({"a": 1});
        let no_path: [&str; 0] = [];
        assert_eq!(resolve(Some(&data), &no_path), Resolution::Resolved(&data));
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

mod identity {
    use super::*;

    #[test]
    fn same_item_same_record_across_runs() {
        let item = json!({"title": "Untitled", "body": "..."});
        let config = TypeConfiguration::new();

        let first = NodeMaterializer::default()
            .materialize(item.clone(), &config, "Page")
            .expect("first run");
        let second = NodeMaterializer::default()
            .materialize(item, &config, "Page")
            .expect("second run");

        assert_eq!(first, second);
    }

    #[test]
    fn distinct_content_distinct_ids() {
        let materializer = NodeMaterializer::default();
        let config = TypeConfiguration::new();

        let a = materializer
            .materialize(json!({"title": "A"}), &config, "Page")
            .expect("a");
        let b = materializer
            .materialize(json!({"title": "B"}), &config, "Page")
            .expect("b");

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn shared_id_field_value_shares_record_id() {
        let materializer = NodeMaterializer::default();
        let config = TypeConfiguration::new().with_id_field("slug");

        let before = materializer
            .materialize(json!({"slug": "hello", "title": "Draft"}), &config, "Post")
            .expect("before");
        let after = materializer
            .materialize(json!({"slug": "hello", "title": "Final"}), &config, "Post")
            .expect("after");

        assert_eq!(before.id, after.id);
        assert_ne!(before.content_digest(), after.content_digest());
    }

    #[test]
    fn object_valued_id_field_shares_record_id() {
        let materializer = NodeMaterializer::default();
        let config = TypeConfiguration::new().with_id_field("ref");

        let first = materializer
            .materialize(
                json!({"ref": {"repo": "site", "sha": "9f1c"}, "title": "A"}),
                &config,
                "Commit",
            )
            .expect("first");
        let second = materializer
            .materialize(
                json!({"ref": [{"repo": "site", "sha": "9f1c"}], "title": "B"}),
                &config,
                "Commit",
            )
            .expect("second");
        let third = materializer
            .materialize(
                json!({"ref": {"repo": "site", "sha": "9f1c"}, "title": "C"}),
                &config,
                "Commit",
            )
            .expect("third");

        assert_eq!(first.id, third.id);
        assert_eq!(
            first.id,
            materializer.minter().mint(r#"{"repo":"site","sha":"9f1c"}"#)
        );
        // a list is its own identity value, not its first element
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn true_id_field_shares_record_id() {
        let materializer = NodeMaterializer::default();
        let config = TypeConfiguration::new().with_id_field("ref");

        let a = materializer
            .materialize(json!({"ref": true, "title": "A"}), &config, "Flag")
            .expect("a");
        let b = materializer
            .materialize(json!({"ref": true, "title": "B"}), &config, "Flag")
            .expect("b");

        assert_eq!(a.id, b.id);
        assert_eq!(a.id, materializer.minter().mint("true"));
    }

    #[test]
    fn ids_are_namespaced_by_source() {
        let config = TypeConfiguration::new().with_id_field("slug");
        let item = json!({"slug": "a"});

        let ours = NodeMaterializer::new("blog")
            .materialize(item.clone(), &config, "Post")
            .expect("ours");
        let theirs = NodeMaterializer::new("docs")
            .materialize(item, &config, "Post")
            .expect("theirs");

        assert_ne!(ours.id, theirs.id);
    }

    #[test]
    fn end_to_end_post_scenario() {
        let mut configs = TypeConfigurations::new();
        configs.insert("Post", TypeConfiguration::new().with_id_field("slug"));
        let config = configs.get("Post").expect("configured");

        let materializer = NodeMaterializer::default();
        let record = materializer
            .materialize(json!({"slug": "a", "title": "T1"}), config, "Post")
            .expect("materialize");

        assert_eq!(record.data["slug"], "a");
        assert_eq!(record.type_name(), "Post");
        assert_eq!(record.id, NamespacedMinter::default().mint("a"));
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

mod envelope {
    use super::*;

    #[test]
    fn type_override_renames_records() {
        let mut configs = TypeConfigurations::new();
        configs.insert("Foo", TypeConfiguration::new().with_type_name_override("Bar"));

        let record = NodeMaterializer::default()
            .materialize(json!({"a": 1}), configs.get("Foo").expect("Foo"), "Foo")
            .expect("materialize");

        assert_eq!(record.internal.type_name, "Bar");
    }

    #[test]
    fn digest_covers_stored_content() {
        let record = NodeMaterializer::default()
            .materialize(json!({"nested": {"list": [1, 2, 3]}}), &TypeConfiguration::new(), "Blob")
            .expect("materialize");

        assert_eq!(record.internal.content, r#"{"nested":{"list":[1,2,3]}}"#);
        assert_eq!(
            record.internal.content_digest,
            Blake3Digester.digest(&record.internal.content)
        );
    }

    #[test]
    fn record_json_shape() {
        let record = NodeMaterializer::default()
            .materialize(json!({"slug": "a"}), &TypeConfiguration::new(), "Post")
            .expect("materialize");

        let json = serde_json::to_value(&record).expect("serialize");
        let keys: Vec<&str> = json
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["id", "data", "children", "internal"]);

        let internal_keys: Vec<&str> = json["internal"]
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(internal_keys, ["type", "content", "contentDigest"]);
    }
}
