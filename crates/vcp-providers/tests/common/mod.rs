// crates/vcp-providers/tests/common/mod.rs
// ============================================================================
// Module: Common Provider Test Helpers
// Description: Deterministic mapper wiring and catalogue payload access.
// Purpose: Share fixed clock and id sources across provider suites.
// Dependencies: vcp-core, vcp-providers, serde_json
// ============================================================================

//! ## Overview
//! Every mapper built here uses a fixed clock and a fixed identifier source
//! so outputs can be compared byte for byte.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use vcp_core::FixedClock;
use vcp_core::FixedIdSource;
use vcp_core::Timestamp;
use vcp_providers::Mapper;
use vcp_providers::ProviderAccessPolicy;
use vcp_providers::ProviderRegistry;
use vcp_providers::TransformTable;
use vcp_providers::catalog::builtin_descriptors;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Instant returned by the fixed clock.
pub const FIXED_NOW: &str = "2025-01-15T10:00:00Z";

/// Identifier returned by the fixed id source.
pub const FIXED_ID: &str = "00000000-0000-4000-8000-000000000000";

/// Returns the fixed clock instant.
#[must_use]
pub fn fixed_now() -> Timestamp {
    Timestamp::parse(FIXED_NOW).unwrap()
}

/// Builds a registry with the built-in providers and the given policy.
#[must_use]
pub fn registry_with(policy: ProviderAccessPolicy) -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::with_builtin_providers(policy).unwrap())
}

/// Builds a deterministic mapper over the given registry.
#[must_use]
pub fn mapper_with(registry: Arc<ProviderRegistry>) -> Mapper {
    Mapper::new(registry, Arc::new(TransformTable::builtin()))
        .with_clock(Arc::new(FixedClock(fixed_now())))
        .with_id_source(Arc::new(FixedIdSource(FIXED_ID.to_string())))
}

/// Builds a deterministic mapper over the built-in providers.
#[must_use]
pub fn fixed_mapper() -> Mapper {
    mapper_with(registry_with(ProviderAccessPolicy::allow_all()))
}

/// Returns the first catalogue example payload for a provider.
#[must_use]
pub fn example_payload(provider_id: &str) -> Value {
    builtin_descriptors()
        .into_iter()
        .find(|descriptor| descriptor.id == provider_id)
        .and_then(|descriptor| descriptor.schemas.into_iter().next())
        .map(|schema| schema.example_payload)
        .unwrap()
}
