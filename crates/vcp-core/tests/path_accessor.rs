// crates/vcp-core/tests/path_accessor.rs
// ============================================================================
// Module: Path Accessor Tests
// Description: Laws for dotted-path reads and writes over JSON values.
// ============================================================================
//! ## Overview
//! Property tests confirm that a written value is read back and that missing
//! segments never error.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;
use vcp_core::path::flatten;
use vcp_core::path::get;
use vcp_core::path::remove;
use vcp_core::path::set;

// ============================================================================
// SECTION: Examples
// ============================================================================

/// Tests missing segments read as absent.
#[test]
fn test_get_missing_is_absent() {
    assert_eq!(get(&json!({}), "a.b.c"), None);
    assert_eq!(get(&json!({"a": 1}), "a.b"), None);
    assert_eq!(get(&json!({"a": [1, 2]}), "a.0"), None);
    assert_eq!(get(&json!({"a": {"b": null}}), "a.b"), Some(&Value::Null));
}

/// Tests set creates intermediates and replaces non-map parents.
#[test]
fn test_set_creates_and_replaces_intermediates() {
    let mut value = json!({"a": 5});
    set(&mut value, "a.b.c", json!("x"));
    assert_eq!(value, json!({"a": {"b": {"c": "x"}}}));

    set(&mut value, "a.b", json!(1));
    assert_eq!(value, json!({"a": {"b": 1}}));

    let mut scalar = json!("scalar");
    set(&mut scalar, "k", json!(true));
    assert_eq!(scalar, json!({"k": true}));
}

/// Tests flatten joins nested keys and keeps arrays as leaves.
#[test]
fn test_flatten_joins_nested_keys() {
    let flat = flatten(&json!({
        "lead": {"score": 5, "contact": {"email": "a@b.c"}},
        "tags": ["x"],
        "empty": {}
    }));
    let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["empty", "lead.contact.email", "lead.score", "tags"]);
    assert_eq!(flat["tags"], json!(["x"]));
    assert!(flatten(&json!("scalar")).is_empty());
}

/// Tests remove detaches only the leaf.
#[test]
fn test_remove_detaches_leaf() {
    let mut value = json!({"a": {"b": 1, "c": 2}});
    assert_eq!(remove(&mut value, "a.b"), Some(json!(1)));
    assert_eq!(value, json!({"a": {"c": 2}}));
    assert_eq!(remove(&mut value, "x.y"), None);
}

// ============================================================================
// SECTION: Properties
// ============================================================================

fn segment() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| segments.join("."))
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

proptest! {
    #[test]
    fn set_then_get_returns_value(path in path(), value in leaf(), seed in path(), other in leaf()) {
        let mut container = json!({});
        set(&mut container, &seed, other);
        set(&mut container, &path, value.clone());
        prop_assert_eq!(get(&container, &path), Some(&value));
    }

    #[test]
    fn get_on_empty_map_is_absent(path in path()) {
        let empty = json!({});
        prop_assert_eq!(get(&empty, &path), None);
    }
}
