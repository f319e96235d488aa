// crates/vcp-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `vcp.toml`. The example parses and validates with the
//! current model; defaults are spelled out so operators can see them.

/// Returns a canonical example `vcp.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[mapper]
compute_checksum = true

[audit]
sink = "file"
path = "vcp-audit.jsonl"

[providers]
# allowlist = ["retell", "vapi"]
denylist = []

[versioning]
default_retention_days = 30
default_data_quality_score = 0.8
"#,
    )
}
