// crates/vcp-core/src/core/version.rs
// ============================================================================
// Module: VCP Schema Versions
// Description: Ordered enumeration of protocol schema generations.
// Purpose: Drive adjacency-only upgrade and downgrade transitions.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Three schema generations exist, ordered `0.3 < 0.4 < 0.5`. Transitions are
//! defined only between adjacent generations; multi-step moves walk
//! [`SchemaVersion::next`] or [`SchemaVersion::previous`] repeatedly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Schema Version
// ============================================================================

/// Protocol schema generation, serialized as `"0.3"`, `"0.4"` or `"0.5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// First published generation (no consent or provenance).
    #[serde(rename = "0.3")]
    V0_3,
    /// Adds consent and provenance sections.
    #[serde(rename = "0.4")]
    V0_4,
    /// Structured capabilities, model attribution, integrations.
    #[serde(rename = "0.5")]
    V0_5,
}

impl SchemaVersion {
    /// Newest schema generation.
    pub const LATEST: Self = Self::V0_5;

    /// All generations in ascending order.
    pub const ALL: [Self; 3] = [Self::V0_3, Self::V0_4, Self::V0_5];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V0_3 => "0.3",
            Self::V0_4 => "0.4",
            Self::V0_5 => "0.5",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|version| version.as_str() == label)
    }

    /// Returns the adjacent newer generation.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::V0_3 => Some(Self::V0_4),
            Self::V0_4 => Some(Self::V0_5),
            Self::V0_5 => None,
        }
    }

    /// Returns the adjacent older generation.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::V0_3 => None,
            Self::V0_4 => Some(Self::V0_3),
            Self::V0_5 => Some(Self::V0_4),
        }
    }

    /// Returns true when the generation carries consent and provenance.
    #[must_use]
    pub const fn requires_consent_and_provenance(self) -> bool {
        !matches!(self, Self::V0_3)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
