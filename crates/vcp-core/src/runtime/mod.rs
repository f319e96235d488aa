// crates/vcp-core/src/runtime/mod.rs
// ============================================================================
// Module: VCP Runtime
// Description: Version transitions and semantic validation.
// Purpose: Operate on decoded protocol documents of any generation.
// Dependencies: crate::{core, interfaces, schema}
// ============================================================================

//! ## Overview
//! Runtime modules transform and check documents after decoding. Both are
//! pure: they read no clock and perform no I/O.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod validation;
pub mod versioning;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use validation::ValidationContext;
pub use validation::ValidationIssue;
pub use validation::ValidationReport;
pub use validation::validate;
pub use validation::validate_document;
pub use validation::validate_with;
pub use versioning::VersionError;
pub use versioning::VersioningPolicy;
pub use versioning::downgrade_v04_to_v03;
pub use versioning::downgrade_v05_to_v04;
pub use versioning::upgrade_v03_to_v04;
pub use versioning::upgrade_v04_to_v05;
