// crates/vcp-config/src/tests.rs
// ============================================================================
// Module: Config Unit Tests
// Description: Unit tests for crate-private validation helpers.
// Purpose: Allow panic-based assertions and cover path and id limits.
// Dependencies: vcp-config
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

use std::path::PathBuf;

use crate::config::MAX_PATH_COMPONENT_LENGTH;
use crate::config::MAX_PROVIDER_ID_LENGTH;
use crate::config::MAX_TOTAL_PATH_LENGTH;
use crate::config::validate_path;
use crate::config::validate_path_string;
use crate::config::validate_provider_id;

/// Tests that a component exactly at the length limit passes.
#[test]
fn validate_path_accepts_component_at_limit() {
    let path = PathBuf::from("cfg").join("a".repeat(MAX_PATH_COMPONENT_LENGTH));
    assert!(validate_path(&path).is_ok());
}

/// Tests that overall path length is capped.
#[test]
fn validate_path_rejects_total_length_overflow() {
    let path = PathBuf::from("b/".repeat(MAX_TOTAL_PATH_LENGTH / 2 + 1));
    let error = validate_path(&path).unwrap_err();
    assert!(error.to_string().contains("exceeds max length"));
}

/// Tests that surrounding whitespace is ignored.
#[test]
fn validate_path_string_trims_before_checking() {
    assert!(validate_path_string("audit.path", "  logs/audit.jsonl  ").is_ok());
    assert!(validate_path_string("audit.path", "\t").is_err());
}

/// Tests that registry-style identifiers pass.
#[test]
fn validate_provider_id_accepts_registry_alphabet() {
    assert!(validate_provider_id("field", "openai_realtime").is_ok());
    assert!(validate_provider_id("field", "provider2").is_ok());
    assert!(validate_provider_id("field", &"p".repeat(MAX_PROVIDER_ID_LENGTH)).is_ok());
}

/// Tests that uppercase, punctuation, and non-ASCII identifiers fail.
#[test]
fn validate_provider_id_rejects_other_bytes() {
    for id in ["Vapi", "open-ai", "white space", "é"] {
        assert!(validate_provider_id("field", id).is_err(), "{id} should be rejected");
    }
    assert!(validate_provider_id("field", &"p".repeat(MAX_PROVIDER_ID_LENGTH + 1)).is_err());
}
