// crates/vcp-config/tests/wiring.rs
// ============================================================================
// Module: Engine Wiring Tests
// Description: Audit sinks and mappers built from configuration.
// ============================================================================
//! ## Overview
//! Builds the production mapper from config and checks that policy, options,
//! and the audit sink reach the engine.

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

mod common;

use std::fs;
use std::path::Path;

use serde_json::Value;
use vcp_config::NormalizerConfig;
use vcp_core::VersionedMessage;
use vcp_core::validate;

use crate::common::TestResult;
use crate::common::example_payload;

/// Returns a config whose audit events go to `path`.
fn file_sink_config(path: &Path, extra: &str) -> Result<NormalizerConfig, String> {
    let toml_str = format!("[audit]\nsink = \"file\"\npath = '{}'\n{extra}", path.display());
    NormalizerConfig::from_toml_str(&toml_str).map_err(|err| err.to_string())
}

/// Reads JSON lines written by the file sink.
fn read_events(path: &Path) -> Result<Vec<Value>, String> {
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    contents
        .lines()
        .map(|line| serde_json::from_str(line).map_err(|err| err.to_string()))
        .collect()
}

// ============================================================================
// SECTION: Mapper
// ============================================================================

/// Tests that the default config builds a mapper producing valid documents.
#[test]
fn test_default_config_builds_valid_mapper() -> TestResult {
    let mapper = NormalizerConfig::default().build_mapper().map_err(|err| err.to_string())?;
    let message = mapper.map("retell", &example_payload("retell")?);
    assert!(message.audit.checksum.is_some());
    let report = validate(&VersionedMessage::V05(message));
    assert!(report.is_valid(), "errors: {:?}", report.error_messages());
    Ok(())
}

/// Tests that disabling checksums reaches the mapper.
#[test]
fn test_checksum_switch_reaches_mapper() -> TestResult {
    let config = NormalizerConfig::from_toml_str("[mapper]\ncompute_checksum = false\n")
        .map_err(|err| err.to_string())?;
    let mapper = config.build_mapper().map_err(|err| err.to_string())?;
    assert!(!mapper.options().compute_checksum);
    let message = mapper.map("vapi", &example_payload("vapi")?);
    assert!(message.audit.checksum.is_none());
    Ok(())
}

/// Tests that denied providers do not resolve in the built registry.
#[test]
fn test_denylist_reaches_registry() -> TestResult {
    let config = NormalizerConfig::from_toml_str("[providers]\ndenylist = [\"retell\"]\n")
        .map_err(|err| err.to_string())?;
    let mapper = config.build_mapper().map_err(|err| err.to_string())?;
    assert!(mapper.registry().get("retell").is_none());
    assert!(mapper.registry().get("bland").is_some());
    let message = mapper.map("retell", &example_payload("retell")?);
    assert!(message.vcp_payload.call.call_id.is_empty());
    Ok(())
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Tests that normalization and signature events reach the file sink.
#[test]
fn test_file_sink_receives_engine_events() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log_path = dir.path().join("audit.jsonl");
    let mapper = file_sink_config(&log_path, "")?.build_mapper().map_err(|err| err.to_string())?;
    let _ = mapper.map("bland", &example_payload("bland")?);
    assert!(!mapper.registry().validate_signature("retell", b"{}", "sig", "secret"));

    let events = read_events(&log_path)?;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "vcp_normalization");
    assert_eq!(events[0]["provider_id"], "bland");
    assert_eq!(events[1]["event"], "vcp_signature_check");
    assert_eq!(events[1]["accepted"], false);
    Ok(())
}

/// Tests that an unopenable audit file is an I/O error.
#[test]
fn test_unopenable_audit_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log_path = dir.path().join("missing").join("audit.jsonl");
    let config = file_sink_config(&log_path, "")?;
    match config.build_audit_sink() {
        Err(vcp_config::ConfigError::Io(_)) => Ok(()),
        Err(other) => Err(format!("expected io error, got {other}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

/// Tests that the file sink appends across mapper instances.
#[test]
fn test_file_sink_appends() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log_path = dir.path().join("audit.jsonl");
    let config = file_sink_config(&log_path, "[mapper]\ncompute_checksum = false\n")?;
    for _ in 0 .. 2 {
        let mapper = config.build_mapper().map_err(|err| err.to_string())?;
        let _ = mapper.map("elevenlabs", &example_payload("elevenlabs")?);
    }
    let events = read_events(&log_path)?;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event["checksum"].is_null()));
    Ok(())
}
