// crates/vcp-core/src/schema/v03.rs
// ============================================================================
// Module: VCP Schema v0.3
// Description: First published protocol generation.
// Purpose: Model legacy documents without consent or provenance sections.
// Dependencies: crate::schema::common, serde
// ============================================================================

//! ## Overview
//! Generation 0.3 carries call timing, outcomes, artifact URLs and a
//! provider-specific bag. It has no consent or provenance sections; a 0.3
//! document carrying either is rejected by document validation.
//!
//! Invariants:
//! - `session_id`, `end_time` and `duration_sec` are required.
//! - Capabilities are plain identifier strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::SchemaVersion;
use crate::core::Timestamp;
use crate::schema::common::Hcr;
use crate::schema::common::ModelSelection;
use crate::schema::common::ObjectiveOutcome;
use crate::schema::common::PerceivedOutcome;
use crate::schema::common::PerceptionGap;
use crate::schema::common::PurposeContract;

// ============================================================================
// SECTION: Shared Legacy Sections
// ============================================================================

/// Provider-specific bag used by generations 0.3 and 0.4.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomLegacy {
    /// Provider-keyed free-form data.
    #[serde(default)]
    pub provider_specific: BTreeMap<String, Value>,
    /// Optional outcome hint used by synthetic generators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_hint: Option<String>,
    /// Whether the document was synthesized.
    #[serde(default)]
    pub synthetic: bool,
    /// Recipe used to synthesize the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic_recipe: Option<Value>,
}

/// Audit section used by generations 0.3 and 0.4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLegacy {
    /// When the webhook was received.
    pub received_at: Timestamp,
    /// When normalization completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_at: Option<Timestamp>,
    /// Schema generation tag.
    pub schema_version: SchemaVersion,
}

// ============================================================================
// SECTION: Call
// ============================================================================

/// Call section for generation 0.3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallV03 {
    /// Provider call identifier.
    pub call_id: String,
    /// Session identifier.
    pub session_id: String,
    /// Provider identifier.
    pub provider: String,
    /// Call start.
    pub start_time: Timestamp,
    /// Call end.
    pub end_time: Timestamp,
    /// Call duration in seconds.
    pub duration_sec: f64,
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

/// Outcome section for generation 0.3.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutcomesV03 {
    /// Perceived outcomes.
    #[serde(default)]
    pub perceived: Vec<PerceivedOutcome>,
    /// Objective outcome.
    #[serde(default)]
    pub objective: ObjectiveOutcome,
    /// Perception gap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perception_gap: Option<PerceptionGap>,
}

/// Artifact section for generation 0.3.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtifactsV03 {
    /// Recording URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
    /// Transcript URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_url: Option<String>,
    /// Reference to the stored raw provider payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_raw_payload_ref: Option<String>,
}

// ============================================================================
// SECTION: Message
// ============================================================================

/// Payload for generation 0.3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadV03 {
    /// Call section.
    pub call: CallV03,
    /// Optional model selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_selection: Option<ModelSelection>,
    /// Outcome section.
    #[serde(default)]
    pub outcomes: OutcomesV03,
    /// Optional human-readable report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hcr: Option<Hcr>,
    /// Artifact section.
    #[serde(default)]
    pub artifacts: ArtifactsV03,
    /// Provider-specific bag.
    #[serde(default)]
    pub custom: CustomLegacy,
}

/// Protocol document for generation 0.3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageV03 {
    /// Generation tag (`"0.3"`).
    pub vcp_version: SchemaVersion,
    /// Payload sections.
    pub vcp_payload: PayloadV03,
    /// Audit section.
    pub audit: AuditLegacy,
}
