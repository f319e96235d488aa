// crates/vcp-core/src/schema/v04.rs
// ============================================================================
// Module: VCP Schema v0.4
// Description: Second protocol generation adding consent and provenance.
// Purpose: Model documents with recording consent and capture provenance.
// Dependencies: crate::schema::{common, v03}, serde
// ============================================================================

//! ## Overview
//! Generation 0.4 adds a consent section, a provenance section, call
//! direction and parties, extracted outcome data and an artifact summary.
//! Consent and provenance are required by validation; they are modeled as
//! optional so that incomplete documents can still be parsed and reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::SchemaVersion;
use crate::core::Timestamp;
use crate::schema::common::CallDirection;
use crate::schema::common::ConsentMethod;
use crate::schema::common::Hcr;
use crate::schema::common::ModelSelection;
use crate::schema::common::ObjectiveOutcome;
use crate::schema::common::PerceivedOutcome;
use crate::schema::common::PerceptionGap;
use crate::schema::common::PurposeContract;
use crate::schema::v03::AuditLegacy;
use crate::schema::v03::CustomLegacy;

// ============================================================================
// SECTION: Call
// ============================================================================

/// Call section for generation 0.4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallV04 {
    /// Provider call identifier.
    pub call_id: String,
    /// Optional session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Provider identifier.
    pub provider: String,
    /// Call start.
    pub start_time: Timestamp,
    /// Call end.
    pub end_time: Timestamp,
    /// Call duration in seconds.
    pub duration_sec: f64,
    /// Call direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<CallDirection>,
    /// Destination number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Origin number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Capability identifiers invoked during the call.
    #[serde(default)]
    pub capabilities_invoked: Vec<String>,
    /// Declared purpose of the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_contract: Option<PurposeContract>,
}

// ============================================================================
// SECTION: Outcomes and Artifacts
// ============================================================================

/// Outcome section for generation 0.4.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutcomesV04 {
    /// Perceived outcomes.
    #[serde(default)]
    pub perceived: Vec<PerceivedOutcome>,
    /// Objective outcome.
    #[serde(default)]
    pub objective: ObjectiveOutcome,
    /// Structured data extracted from the conversation.
    #[serde(default)]
    pub extractions: BTreeMap<String, Value>,
    /// Perception gap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perception_gap: Option<PerceptionGap>,
}

/// Artifact section for generation 0.4.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtifactsV04 {
    /// Recording URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
    /// Transcript URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_url: Option<String>,
    /// Call summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Reference to the stored raw provider payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_raw_payload_ref: Option<String>,
}

// ============================================================================
// SECTION: Consent and Provenance
// ============================================================================

/// Recording consent for generation 0.4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentV04 {
    /// Whether recording consent was given.
    pub recording_consent: bool,
    /// When consent was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_timestamp: Option<Timestamp>,
    /// How consent was obtained.
    pub consent_method: ConsentMethod,
    /// Retention period in days (must be positive).
    pub data_retention_days: u32,
    /// Whether data may be shared with third parties.
    pub sharing_allowed: bool,
    /// Whether anonymization is required before analysis.
    pub anonymization_required: bool,
}

/// Capture provenance for generation 0.4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceV04 {
    /// When the data was captured.
    pub captured_at: Timestamp,
    /// Capturing component.
    pub captured_by: String,
    /// Upstream source system.
    pub source_system: String,
    /// Processing steps applied so far.
    #[serde(default)]
    pub processing_chain: Vec<String>,
    /// Data quality in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality_score: Option<f64>,
}

// ============================================================================
// SECTION: Message
// ============================================================================

/// Payload for generation 0.4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadV04 {
    /// Call section.
    pub call: CallV04,
    /// Optional model selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_selection: Option<ModelSelection>,
    /// Outcome section.
    #[serde(default)]
    pub outcomes: OutcomesV04,
    /// Optional human-readable report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hcr: Option<Hcr>,
    /// Artifact section.
    #[serde(default)]
    pub artifacts: ArtifactsV04,
    /// Provider-specific bag.
    #[serde(default)]
    pub custom: CustomLegacy,
    /// Recording consent (required by validation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentV04>,
    /// Capture provenance (required by validation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ProvenanceV04>,
}

/// Protocol document for generation 0.4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageV04 {
    /// Generation tag (`"0.4"`).
    pub vcp_version: SchemaVersion,
    /// Payload sections.
    pub vcp_payload: PayloadV04,
    /// Audit section.
    pub audit: AuditLegacy,
}
