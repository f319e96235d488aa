// crates/vcp-core/src/schema/v05.rs
// ============================================================================
// Module: VCP Schema v0.5
// Description: Newest protocol generation produced by the mapper.
// Purpose: Model structured capabilities, consent records, and provenance history.
// Dependencies: crate::{core, schema::common}, serde, serde_json
// ============================================================================

//! ## Overview
//! Generation 0.5 is the mapper's output format. It adds structured
//! capability invocations, model outcome attribution, derived integrations,
//! a consent record with status and scope, and a provenance record with a
//! transformation history. `model_selection`, `hcr` and `perception_gap` are
//! required; consent and provenance are required by validation.
//!
//! Invariants:
//! - `audit.checksum`, when present, hashes the document without itself.
//! - `channel` values `inbound`/`outbound` are accepted for legacy input but
//!   flagged by validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::HashError;
use crate::core::SchemaVersion;
use crate::core::Timestamp;
use crate::core::hashing::message_checksum;
use crate::schema::common::CallDirection;
use crate::schema::common::ConsentMethod;
use crate::schema::common::Hcr;
use crate::schema::common::ModelSelection;
use crate::schema::common::ObjectiveOutcome;
use crate::schema::common::PerceivedOutcome;
use crate::schema::common::PerceptionGap;
use crate::schema::common::PurposeContract;

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Channel a call was carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// Telephone network.
    #[default]
    Phone,
    /// Browser session.
    Web,
    /// Mobile application.
    Mobile,
    /// Embedded widget.
    Embed,
    /// Direct API integration.
    Api,
    /// Raw websocket stream.
    Websocket,
    /// Legacy direction label used as a channel.
    Inbound,
    /// Legacy direction label used as a channel.
    Outbound,
}

impl ChannelType {
    /// All channels in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Phone,
        Self::Web,
        Self::Mobile,
        Self::Embed,
        Self::Api,
        Self::Websocket,
        Self::Inbound,
        Self::Outbound,
    ];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Embed => "embed",
            Self::Api => "api",
            Self::Websocket => "websocket",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    /// Parses a wire label (case-insensitive).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|channel| channel.as_str() == label)
    }

    /// Returns true for the legacy direction labels.
    #[must_use]
    pub const fn is_legacy_direction(self) -> bool {
        matches!(self, Self::Inbound | Self::Outbound)
    }
}

/// Kind of capability invoked during a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityType {
    /// Agent tool call.
    ToolCall,
    /// LLM function call.
    FunctionCall,
    /// Outbound API call.
    ApiCall,
    /// Outbound webhook.
    Webhook,
    /// Third-party integration.
    Integration,
}

/// Consent lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    /// Consent given.
    Granted,
    /// Consent refused or not obtained.
    Denied,
    /// Consent requested but unanswered.
    Pending,
    /// Consent lapsed.
    Expired,
    /// Consent withdrawn.
    Revoked,
}

// ============================================================================
// SECTION: Call
// ============================================================================

/// Structured record of one capability invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityInvocation {
    /// Capability identifier.
    pub capability_id: String,
    /// Capability kind.
    pub capability_type: CapabilityType,
    /// When the capability was invoked.
    pub invoked_at: Timestamp,
    /// Invocation latency in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Whether the invocation succeeded.
    pub success: bool,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

/// Capability entry: structured invocation or bare legacy identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capability {
    /// Structured invocation record.
    Invocation(CapabilityInvocation),
    /// Bare capability identifier.
    Name(String),
}

impl Capability {
    /// Returns the capability identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Invocation(invocation) => &invocation.capability_id,
            Self::Name(name) => name,
        }
    }
}

/// Call section for generation 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallV05 {
    /// Provider call identifier.
    pub call_id: String,
    /// Session identifier.
    pub session_id: String,
    /// Provider identifier.
    pub provider: String,
    /// Call start.
    pub start_time: Timestamp,
    /// Call end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
    /// Call duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,
    /// Parent session for transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_session_id: Option<String>,
    /// Cross-system correlation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Carrier channel.
    #[serde(default)]
    pub channel: ChannelType,
    /// Call direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<CallDirection>,
    /// Origin number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Destination number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Caller or contact identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<String>,
    /// Provider agent identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Model reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Geographic region label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_region: Option<String>,
    /// Capabilities invoked during the call.
    #[serde(default)]
    pub capabilities_invoked: Vec<Capability>,
    /// Declared purpose of the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_contract: Option<PurposeContract>,
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Usage and cost attributed to one model role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAttribution {
    /// Model identifier.
    pub model_id: String,
    /// Minutes of usage.
    #[serde(default)]
    pub minutes: f64,
    /// Error count.
    #[serde(default)]
    pub errors: u32,
    /// Tokens processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_processed: Option<u64>,
    /// Cost in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

/// Attribution of outcomes and cost to models.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelOutcomeAttribution {
    /// Per-role attribution.
    #[serde(default)]
    pub roles: BTreeMap<String, RoleAttribution>,
    /// Free-form KPIs.
    #[serde(default)]
    pub kpis: BTreeMap<String, Value>,
    /// Total cost in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    /// Efficiency score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_score: Option<f64>,
}

/// Outcome section for generation 0.5.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutcomesV05 {
    /// Perceived outcomes.
    #[serde(default)]
    pub perceived: Vec<PerceivedOutcome>,
    /// Objective outcome.
    #[serde(default)]
    pub objective: ObjectiveOutcome,
    /// Perception gap.
    pub perception_gap: PerceptionGap,
    /// Model attribution.
    #[serde(default)]
    pub model_outcome_attribution: ModelOutcomeAttribution,
    /// User satisfaction in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_satisfaction_score: Option<f64>,
    /// Business impact metrics.
    #[serde(default)]
    pub business_impact: BTreeMap<String, Value>,
    /// Structured data extracted from the conversation.
    #[serde(default)]
    pub extractions: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Artifacts and Custom Data
// ============================================================================

/// Artifact section for generation 0.5.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtifactsV05 {
    /// Reference to the stored raw provider payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_raw_payload_ref: Option<String>,
    /// Recording reference (URL or storage key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_recording_ref: Option<String>,
    /// Transcript reference (URL or storage key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_ref: Option<String>,
    /// Inline transcript (text or provider turn list).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Value>,
    /// Call summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// System log reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_logs_ref: Option<String>,
    /// Debug artifact references.
    #[serde(default)]
    pub debug_artifacts: Vec<String>,
    /// Compliance record references.
    #[serde(default)]
    pub compliance_records: Vec<String>,
}

/// Custom section for generation 0.5.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Custom {
    /// Provider-keyed free-form data.
    #[serde(default)]
    pub provider_specific: BTreeMap<String, Value>,
    /// Derived integration projections (CRM, calendar, sales).
    #[serde(default)]
    pub integrations: BTreeMap<String, Value>,
    /// Experimental fields.
    #[serde(default)]
    pub experimental: BTreeMap<String, Value>,
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

// ============================================================================
// SECTION: Consent and Provenance
// ============================================================================

/// Consent record for generation 0.5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Consent record identifier.
    pub consent_id: String,
    /// Consent status.
    pub status: ConsentStatus,
    /// When consent was granted or recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_at: Option<Timestamp>,
    /// When consent expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    /// Consented purposes.
    #[serde(default)]
    pub scope: Vec<String>,
    /// Consent text version.
    pub version: String,
    /// How consent was obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<ConsentMethod>,
    /// Retention period in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_retention_days: Option<u32>,
    /// Whether data may be shared with third parties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharing_allowed: Option<bool>,
    /// Whether anonymization is required before analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymization_required: Option<bool>,
    /// Client user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Hash of the client IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address_hash: Option<String>,
}

/// Provenance record for generation 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Upstream source system.
    pub source_system: String,
    /// When the record was created.
    pub created_at: Timestamp,
    /// Creating component.
    pub created_by: String,
    /// Ordered transformation steps.
    #[serde(default)]
    pub transformation_history: Vec<String>,
    /// Retention policy label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_retention_policy: Option<String>,
    /// Compliance flags.
    #[serde(default)]
    pub compliance_flags: Vec<String>,
    /// Data quality in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality_score: Option<f64>,
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit section for generation 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditV05 {
    /// When the webhook was received.
    pub received_at: Timestamp,
    /// Schema generation tag.
    pub schema_version: SchemaVersion,
    /// When processing completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<Timestamp>,
    /// Processing latency in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_duration_ms: Option<f64>,
    /// Validation errors recorded at processing time.
    #[serde(default)]
    pub validation_errors: Vec<String>,
    /// Integrity checksum (hex SHA-256 of the canonical document).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Provider event type label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

// ============================================================================
// SECTION: Message
// ============================================================================

/// Payload for generation 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadV05 {
    /// Call section.
    pub call: CallV05,
    /// Model selection.
    pub model_selection: ModelSelection,
    /// Outcome section.
    pub outcomes: OutcomesV05,
    /// Human-readable report.
    pub hcr: Hcr,
    /// Artifact section.
    #[serde(default)]
    pub artifacts: ArtifactsV05,
    /// Custom section.
    #[serde(default)]
    pub custom: Custom,
    /// Consent record (required by validation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentRecord>,
    /// Provenance record (required by validation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

/// Protocol document for generation 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageV05 {
    /// Generation tag (`"0.5"`).
    pub vcp_version: SchemaVersion,
    /// Payload sections.
    pub vcp_payload: PayloadV05,
    /// Audit section.
    pub audit: AuditV05,
}

impl MessageV05 {
    /// Computes the integrity checksum, ignoring any stored checksum.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn compute_checksum(&self) -> Result<String, HashError> {
        message_checksum(self)
    }

    /// Returns a copy with `audit.checksum` set to the computed value.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn with_checksum(mut self) -> Result<Self, HashError> {
        self.audit.checksum = None;
        self.audit.checksum = Some(self.compute_checksum()?);
        Ok(self)
    }
}
