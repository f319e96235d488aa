// crates/vcp-config/src/lib.rs
// ============================================================================
// Module: VCP Config Library
// Description: Normalizer configuration model, validation, and wiring.
// Purpose: Single source of truth for vcp.toml semantics.
// Dependencies: vcp-core, vcp-providers, serde, toml
// ============================================================================

//! ## Overview
//! `vcp-config` defines the configuration model for the normalization engine.
//! It loads `vcp.toml` with strict, fail-closed limits and builds the
//! provider access policy, versioning policy, audit sink, and mapper.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;

#[cfg(test)]
mod tests;
