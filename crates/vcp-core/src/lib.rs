// crates/vcp-core/src/lib.rs
// ============================================================================
// Module: VCP Core Library
// Description: Public API surface for the Voice Context Protocol core.
// Purpose: Expose schema types, versioning, validation, and injection seams.
// Dependencies: crate::{core, interfaces, runtime, schema}
// ============================================================================

//! ## Overview
//! VCP core defines the canonical, versioned protocol document that voice-AI
//! webhook payloads are normalized into. It provides dotted-path access over
//! JSON, strict UTC timestamps, canonical checksums, typed schema
//! generations 0.3 through 0.5, adjacent-version transitions and semantic
//! validation. Provider knowledge lives in `vcp-providers`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::Clock;
pub use interfaces::FixedClock;
pub use interfaces::FixedIdSource;
pub use interfaces::IdSource;
pub use interfaces::KnownProviders;
pub use interfaces::RandomIdSource;
pub use interfaces::SystemClock;
pub use runtime::ValidationContext;
pub use runtime::ValidationIssue;
pub use runtime::ValidationReport;
pub use runtime::VersionError;
pub use runtime::VersioningPolicy;
pub use runtime::validate;
pub use runtime::validate_document;
pub use runtime::validate_with;
pub use schema::DocumentError;
pub use schema::VersionedMessage;
pub use schema::v05::MessageV05;
