// crates/vcp-core/src/interfaces/mod.rs
// ============================================================================
// Module: VCP Interfaces
// Description: Injection seams for time, identifiers, and provider lookup.
// Purpose: Keep mapping and validation pure by passing collaborators explicitly.
// Dependencies: crate::core, time, uuid
// ============================================================================

//! ## Overview
//! The engine never reads ambient state. Wall-clock time comes from a
//! [`Clock`], fresh call identifiers from an [`IdSource`], and provider
//! membership checks from [`KnownProviders`]. Production hosts use
//! [`SystemClock`] and [`RandomIdSource`]; tests pin them with
//! [`FixedClock`] and [`FixedIdSource`].
//!
//! Invariants:
//! - Implementations are `Send + Sync` and safe to share across callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::Timestamp;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock implementation truncated to millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let millis = i64::try_from(millis).unwrap_or_default();
        Timestamp::from_unix_millis(millis).unwrap_or(Timestamp::UNIX_EPOCH)
    }
}

/// Clock that always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

// ============================================================================
// SECTION: Identifier Source
// ============================================================================

/// Source of fresh call identifiers.
pub trait IdSource: Send + Sync {
    /// Returns a new identifier.
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Identifier source that always returns the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIdSource(pub String);

impl IdSource for FixedIdSource {
    fn next_id(&self) -> String {
        self.0.clone()
    }
}

// ============================================================================
// SECTION: Provider Lookup
// ============================================================================

/// Membership check for provider identifiers.
pub trait KnownProviders {
    /// Returns true when the provider identifier is registered and allowed.
    fn is_known(&self, provider_id: &str) -> bool;
}
