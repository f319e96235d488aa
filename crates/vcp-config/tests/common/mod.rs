// crates/vcp-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config loading and wiring tests.
// Purpose: Reduce duplication across integration tests for vcp-config.
// ============================================================================

//! ## Overview
//! Writes config files into temporary directories and asserts on error
//! messages.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;
use vcp_config::ConfigError;
use vcp_config::NormalizerConfig;
use vcp_providers::catalog::builtin_descriptors;

/// Result type used by fallible tests.
pub type TestResult = Result<(), String>;

/// Writes `contents` to `vcp.toml` inside a fresh temporary directory.
pub fn write_config(contents: &[u8]) -> Result<(TempDir, PathBuf), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("vcp.toml");
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok((dir, path))
}

/// Parses TOML text without validation.
pub fn config_from_toml(toml_str: &str) -> Result<NormalizerConfig, String> {
    toml::from_str(toml_str).map_err(|err| err.to_string())
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Returns the first catalogue example payload for a provider.
pub fn example_payload(provider_id: &str) -> Result<Value, String> {
    builtin_descriptors()
        .into_iter()
        .find(|descriptor| descriptor.id == provider_id)
        .and_then(|descriptor| descriptor.schemas.into_iter().next())
        .map(|schema| schema.example_payload)
        .ok_or_else(|| format!("no example payload for {provider_id}"))
}
