// crates/vcp-core/src/core/mod.rs
// ============================================================================
// Module: VCP Core Primitives
// Description: Leaf utilities shared by schema, runtime, and provider crates.
// Purpose: Group path access, time, hashing, and version primitives.
// Dependencies: crate::core::{hashing, path, timestamp, version}
// ============================================================================

//! ## Overview
//! Core primitives have no knowledge of providers or schema sections. They
//! are pure and deterministic given their inputs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod hashing;
pub mod path;
pub mod timestamp;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use timestamp::TimeError;
pub use timestamp::Timestamp;
pub use version::SchemaVersion;
