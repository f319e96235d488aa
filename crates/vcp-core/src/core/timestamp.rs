// crates/vcp-core/src/core/timestamp.rs
// ============================================================================
// Module: VCP Time Model
// Description: Canonical UTC timestamps for protocol documents.
// Purpose: Enforce RFC 3339 `Z` timestamps and convert provider epoch values.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Every timestamp in a VCP document is RFC 3339 UTC with an explicit `Z`
//! suffix. [`Timestamp`] enforces that on deserialization and always
//! serializes in that form. The core never reads wall-clock time directly;
//! hosts inject a [`crate::Clock`].
//!
//! Invariants:
//! - Stored values are UTC with a year in `0..=9999`.
//! - Deserialization rejects strings without a trailing `Z`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Epoch values at or above this magnitude are interpreted as milliseconds.
pub const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Largest supported calendar year.
const MAX_YEAR: i32 = 9999;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when constructing timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// Timestamp string lacks the mandatory `Z` suffix.
    #[error("timestamp must be UTC with a trailing 'Z': {0}")]
    MissingUtcSuffix(String),
    /// Timestamp string is not valid RFC 3339.
    #[error("invalid rfc3339 timestamp: {0}")]
    Parse(String),
    /// Timestamp falls outside the supported range.
    #[error("timestamp out of range")]
    OutOfRange,
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC timestamp serialized as RFC 3339 with a `Z` suffix.
///
/// # Invariants
/// - Always normalized to UTC.
/// - Year is within `0..=9999` so formatting cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// The unix epoch (`1970-01-01T00:00:00Z`).
    pub const UNIX_EPOCH: Self = Self(OffsetDateTime::UNIX_EPOCH);

    /// Wraps a date-time, converting it to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the value cannot be represented.
    pub fn from_datetime(value: OffsetDateTime) -> Result<Self, TimeError> {
        let utc = value.checked_to_offset(UtcOffset::UTC).ok_or(TimeError::OutOfRange)?;
        if !(0..=MAX_YEAR).contains(&utc.year()) {
            return Err(TimeError::OutOfRange);
        }
        Ok(Self(utc))
    }

    /// Parses a strict RFC 3339 UTC timestamp ending in `Z`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the suffix is missing or parsing fails.
    pub fn parse(text: &str) -> Result<Self, TimeError> {
        if !text.ends_with('Z') {
            return Err(TimeError::MissingUtcSuffix(text.to_string()));
        }
        Self::parse_any_offset(text)
    }

    /// Parses an RFC 3339 timestamp with any offset and converts it to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when parsing fails or the value is out of range.
    pub fn parse_any_offset(text: &str) -> Result<Self, TimeError> {
        let parsed = OffsetDateTime::parse(text.trim(), &Rfc3339)
            .map_err(|err| TimeError::Parse(err.to_string()))?;
        Self::from_datetime(parsed)
    }

    /// Builds a timestamp from unix seconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the value is not representable.
    pub fn from_unix_seconds(seconds: i64) -> Result<Self, TimeError> {
        let value =
            OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| TimeError::OutOfRange)?;
        Self::from_datetime(value)
    }

    /// Builds a timestamp from unix milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the value is not representable.
    pub fn from_unix_millis(millis: i64) -> Result<Self, TimeError> {
        let nanos = i128::from(millis) * 1_000_000;
        let value =
            OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|_| TimeError::OutOfRange)?;
        Self::from_datetime(value)
    }

    /// Builds a timestamp from an epoch value, treating large magnitudes as
    /// milliseconds (see [`EPOCH_MILLIS_THRESHOLD`]).
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the value is not representable.
    pub fn from_epoch(value: i64) -> Result<Self, TimeError> {
        if value.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
            Self::from_unix_millis(value)
        } else {
            Self::from_unix_seconds(value)
        }
    }

    /// Builds a timestamp from a fractional epoch value.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the value is not finite or not
    /// representable.
    #[allow(clippy::cast_precision_loss, reason = "Threshold comparison tolerates rounding.")]
    pub fn from_epoch_f64(value: f64) -> Result<Self, TimeError> {
        let seconds = if value.abs() >= EPOCH_MILLIS_THRESHOLD as f64 { value / 1000.0 } else { value };
        let offset = Duration::checked_seconds_f64(seconds).ok_or(TimeError::OutOfRange)?;
        let value = OffsetDateTime::UNIX_EPOCH.checked_add(offset).ok_or(TimeError::OutOfRange)?;
        Self::from_datetime(value)
    }

    /// Returns the underlying UTC date-time.
    #[must_use]
    pub const fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }

    /// Returns whole unix seconds.
    #[must_use]
    pub const fn unix_seconds(&self) -> i64 {
        self.0.unix_timestamp()
    }

    /// Returns the timestamp shifted by fractional seconds, if representable.
    #[must_use]
    pub fn checked_add_seconds(&self, seconds: f64) -> Option<Self> {
        let offset = Duration::checked_seconds_f64(seconds)?;
        let shifted = self.0.checked_add(offset)?;
        Self::from_datetime(shifted).ok()
    }

    /// Returns fractional seconds elapsed since `earlier` (negative if later).
    #[must_use]
    pub fn seconds_since(&self, earlier: &Self) -> f64 {
        (self.0 - earlier.0).as_seconds_f64()
    }

    /// Formats the timestamp as RFC 3339 with a `Z` suffix.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.format(&Rfc3339).unwrap_or_default()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
