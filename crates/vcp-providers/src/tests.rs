// crates/vcp-providers/src/tests.rs
// ============================================================================
// Module: Providers Unit Tests
// Description: Unit tests for crate-private transform helpers.
// Purpose: Allow panic-based assertions and cover key lookup rules.
// Dependencies: vcp-providers, serde_json
// ============================================================================

//! ## Overview
//! Provides test-only lint relaxations and unit tests for helpers that are
//! not part of the public API.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

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

use serde_json::json;
use vcp_core::path;

use crate::transforms::lookup;
use crate::transforms::text;

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Tests that an exact flattened key wins over a suffix match.
#[test]
fn test_lookup_prefers_exact_key() {
    let flat = path::flatten(&json!({"budget_range": "a", "lead": {"budget_range": "b"}}));
    assert_eq!(lookup(&flat, "budget_range"), Some(&json!("a")));
}

/// Tests that a nested key is found by its leaf segment.
#[test]
fn test_lookup_matches_nested_leaf() {
    let flat = path::flatten(&json!({"lead": {"decision_maker": true}}));
    assert_eq!(lookup(&flat, "decision_maker"), Some(&json!(true)));
    assert_eq!(lookup(&flat, "maker"), None);
}

/// Tests that scalars render as text without JSON quoting for strings.
#[test]
fn test_text_renders_scalars() {
    assert_eq!(text(&json!("10k-50k")), "10k-50k");
    assert_eq!(text(&json!(42)), "42");
    assert_eq!(text(&json!(true)), "true");
}
