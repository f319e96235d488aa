// crates/vcp-core/src/runtime/versioning.rs
// ============================================================================
// Module: VCP Version Transitions
// Description: Adjacent-generation upgrade and downgrade of protocol documents.
// Purpose: Move documents between schema generations without aliasing inputs.
// Dependencies: crate::{core, schema}, thiserror
// ============================================================================

//! ## Overview
//! Transitions exist only between adjacent generations. Each step borrows
//! its input and returns a new document; multi-step moves repeat single steps.
//!
//! Invariants:
//! - Upgrades never remove data; missing sections get conservative defaults
//!   (consent not granted, 30-day retention, provenance naming the step).
//! - Downgrades never emit sections forbidden by the target generation.
//! - `downgrade(upgrade(m))` contains every field of `m`.
//! - Transitions read no clock: defaults derive from timestamps already in the
//!   document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::SchemaVersion;
use crate::core::Timestamp;
use crate::schema::VersionedMessage;
use crate::schema::common::CallDirection;
use crate::schema::common::ConsentMethod;
use crate::schema::common::Hcr;
use crate::schema::common::ModelSelection;
use crate::schema::common::synthesize_session_id;
use crate::schema::v03::ArtifactsV03;
use crate::schema::v03::AuditLegacy;
use crate::schema::v03::CallV03;
use crate::schema::v03::CustomLegacy;
use crate::schema::v03::MessageV03;
use crate::schema::v03::OutcomesV03;
use crate::schema::v03::PayloadV03;
use crate::schema::v04::ArtifactsV04;
use crate::schema::v04::CallV04;
use crate::schema::v04::ConsentV04;
use crate::schema::v04::MessageV04;
use crate::schema::v04::OutcomesV04;
use crate::schema::v04::PayloadV04;
use crate::schema::v04::ProvenanceV04;
use crate::schema::v05::ArtifactsV05;
use crate::schema::v05::AuditV05;
use crate::schema::v05::CallV05;
use crate::schema::v05::Capability;
use crate::schema::v05::CapabilityInvocation;
use crate::schema::v05::CapabilityType;
use crate::schema::v05::ChannelType;
use crate::schema::v05::ConsentRecord;
use crate::schema::v05::ConsentStatus;
use crate::schema::v05::Custom;
use crate::schema::v05::MessageV05;
use crate::schema::v05::ModelOutcomeAttribution;
use crate::schema::v05::OutcomesV05;
use crate::schema::v05::PayloadV05;
use crate::schema::v05::Provenance;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Provenance entry recorded by the 0.3 to 0.4 upgrade.
pub const UPGRADED_FROM_V03: &str = "upgraded_from_v0.3";
/// Provenance entry recorded by the 0.4 to 0.5 upgrade.
pub const UPGRADED_FROM_V04: &str = "upgraded_from_v0.4";
/// Component name recorded as the capturer of upgraded documents.
pub const UPGRADE_ACTOR: &str = "vcp_upgrade_utility";
/// Default retention for inferred consent.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;
/// Default quality score for upgraded provenance.
pub const DEFAULT_DATA_QUALITY_SCORE: f64 = 0.8;
/// Consent text version recorded for upgraded consent records.
const UPGRADED_CONSENT_VERSION: &str = "1.0";
/// Scope recorded when upgraded consent was granted.
const RECORDING_SCOPE: &str = "recording";

// ============================================================================
// SECTION: Policy and Errors
// ============================================================================

/// Defaults applied when an upgrade must invent a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersioningPolicy {
    /// Retention days for inferred consent.
    pub default_retention_days: u32,
    /// Data quality score for inferred provenance.
    pub default_data_quality_score: f64,
}

impl Default for VersioningPolicy {
    fn default() -> Self {
        Self {
            default_retention_days: DEFAULT_RETENTION_DAYS,
            default_data_quality_score: DEFAULT_DATA_QUALITY_SCORE,
        }
    }
}

/// Errors raised for invalid version transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VersionError {
    /// Upgrade target is older than the document.
    #[error("cannot upgrade from {from} to older version {to}")]
    UpgradeToOlder {
        /// Current generation.
        from: SchemaVersion,
        /// Requested generation.
        to: SchemaVersion,
    },
    /// Downgrade target is newer than the document.
    #[error("cannot downgrade from {from} to newer version {to}")]
    DowngradeToNewer {
        /// Current generation.
        from: SchemaVersion,
        /// Requested generation.
        to: SchemaVersion,
    },
    /// Document is already at the newest generation.
    #[error("no schema version newer than {0}")]
    NoNewerVersion(SchemaVersion),
    /// Document is already at the oldest generation.
    #[error("no schema version older than {0}")]
    NoOlderVersion(SchemaVersion),
}

// ============================================================================
// SECTION: Versioned Dispatch
// ============================================================================

impl VersionedMessage {
    /// Upgrades by exactly one generation.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::NoNewerVersion`] at the newest generation.
    pub fn upgrade(&self, policy: &VersioningPolicy) -> Result<Self, VersionError> {
        match self {
            Self::V03(message) => Ok(Self::V04(upgrade_v03_to_v04(message, policy))),
            Self::V04(message) => Ok(Self::V05(upgrade_v04_to_v05(message, policy))),
            Self::V05(_) => Err(VersionError::NoNewerVersion(SchemaVersion::V0_5)),
        }
    }

    /// Downgrades by exactly one generation.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::NoOlderVersion`] at the oldest generation.
    pub fn downgrade(&self) -> Result<Self, VersionError> {
        match self {
            Self::V03(_) => Err(VersionError::NoOlderVersion(SchemaVersion::V0_3)),
            Self::V04(message) => Ok(Self::V03(downgrade_v04_to_v03(message))),
            Self::V05(message) => Ok(Self::V04(downgrade_v05_to_v04(message))),
        }
    }

    /// Upgrades step by step until `target` is reached.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::UpgradeToOlder`] when `target` is older.
    pub fn upgrade_to(
        &self,
        target: SchemaVersion,
        policy: &VersioningPolicy,
    ) -> Result<Self, VersionError> {
        let from = self.version();
        if target < from {
            return Err(VersionError::UpgradeToOlder { from, to: target });
        }
        let mut message = self.clone();
        while message.version() < target {
            message = message.upgrade(policy)?;
        }
        Ok(message)
    }

    /// Downgrades step by step until `target` is reached.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::DowngradeToNewer`] when `target` is newer.
    pub fn downgrade_to(&self, target: SchemaVersion) -> Result<Self, VersionError> {
        let from = self.version();
        if target > from {
            return Err(VersionError::DowngradeToNewer { from, to: target });
        }
        let mut message = self.clone();
        while message.version() > target {
            message = message.downgrade()?;
        }
        Ok(message)
    }
}

// ============================================================================
// SECTION: Upgrades
// ============================================================================

/// Upgrades a 0.3 document to 0.4, adding inferred consent and provenance.
#[must_use]
pub fn upgrade_v03_to_v04(message: &MessageV03, policy: &VersioningPolicy) -> MessageV04 {
    let payload = &message.vcp_payload;
    let call = &payload.call;
    MessageV04 {
        vcp_version: SchemaVersion::V0_4,
        vcp_payload: PayloadV04 {
            call: CallV04 {
                call_id: call.call_id.clone(),
                session_id: Some(call.session_id.clone()),
                provider: call.provider.clone(),
                start_time: call.start_time,
                end_time: call.end_time,
                duration_sec: call.duration_sec,
                channel: None,
                to: None,
                from: None,
                capabilities_invoked: call.capabilities_invoked.clone(),
                purpose_contract: call.purpose_contract.clone(),
            },
            model_selection: payload.model_selection.clone(),
            outcomes: OutcomesV04 {
                perceived: payload.outcomes.perceived.clone(),
                objective: payload.outcomes.objective.clone(),
                extractions: BTreeMap::new(),
                perception_gap: payload.outcomes.perception_gap.clone(),
            },
            hcr: payload.hcr.clone(),
            artifacts: ArtifactsV04 {
                recording_url: payload.artifacts.recording_url.clone(),
                transcript_url: payload.artifacts.transcript_url.clone(),
                summary: None,
                provider_raw_payload_ref: payload.artifacts.provider_raw_payload_ref.clone(),
            },
            custom: payload.custom.clone(),
            consent: Some(inferred_consent(call.start_time, policy)),
            provenance: Some(inferred_provenance(&call.provider, message.audit.received_at, policy)),
        },
        audit: AuditLegacy {
            received_at: message.audit.received_at,
            normalized_at: message.audit.normalized_at,
            schema_version: SchemaVersion::V0_4,
        },
    }
}

/// Upgrades a 0.4 document to 0.5.
///
/// Missing consent or provenance receive the 0.3 to 0.4 defaults first, so
/// the result always carries both sections.
#[must_use]
pub fn upgrade_v04_to_v05(message: &MessageV04, policy: &VersioningPolicy) -> MessageV05 {
    let payload = &message.vcp_payload;
    let call = &payload.call;
    let received_at = message.audit.received_at;
    let consent =
        payload.consent.clone().unwrap_or_else(|| inferred_consent(call.start_time, policy));
    let provenance = payload
        .provenance
        .clone()
        .unwrap_or_else(|| inferred_provenance(&call.provider, received_at, policy));
    let session_id = call
        .session_id
        .clone()
        .unwrap_or_else(|| synthesize_session_id(&call.provider, &call.call_id));
    let capabilities = call
        .capabilities_invoked
        .iter()
        .map(|capability_id| {
            Capability::Invocation(CapabilityInvocation {
                capability_id: capability_id.clone(),
                capability_type: CapabilityType::ToolCall,
                invoked_at: call.start_time,
                duration_ms: None,
                success: true,
                error_message: None,
                metadata: BTreeMap::new(),
            })
        })
        .collect();
    let objective = payload.outcomes.objective.clone();
    let hcr = payload
        .hcr
        .clone()
        .unwrap_or_else(|| Hcr::provider_default(&call.provider, objective.status));
    MessageV05 {
        vcp_version: SchemaVersion::V0_5,
        vcp_payload: PayloadV05 {
            call: CallV05 {
                call_id: call.call_id.clone(),
                session_id,
                provider: call.provider.clone(),
                start_time: call.start_time,
                end_time: Some(call.end_time),
                duration_sec: Some(call.duration_sec),
                parent_session_id: None,
                correlation_id: None,
                channel: ChannelType::Phone,
                direction: call.channel,
                from: call.from.clone(),
                to: call.to.clone(),
                caller_id: None,
                agent_id: None,
                model_used: None,
                geographic_region: None,
                capabilities_invoked: capabilities,
                purpose_contract: call.purpose_contract.clone(),
            },
            model_selection: payload
                .model_selection
                .clone()
                .unwrap_or_else(|| ModelSelection::provider_default(&call.provider, received_at)),
            outcomes: OutcomesV05 {
                perceived: payload.outcomes.perceived.clone(),
                objective,
                perception_gap: payload.outcomes.perception_gap.clone().unwrap_or_default(),
                model_outcome_attribution: ModelOutcomeAttribution::default(),
                user_satisfaction_score: None,
                business_impact: BTreeMap::new(),
                extractions: payload.outcomes.extractions.clone(),
            },
            hcr,
            artifacts: ArtifactsV05 {
                provider_raw_payload_ref: payload.artifacts.provider_raw_payload_ref.clone(),
                audio_recording_ref: payload.artifacts.recording_url.clone(),
                transcript_ref: payload.artifacts.transcript_url.clone(),
                summary: payload.artifacts.summary.clone(),
                ..ArtifactsV05::default()
            },
            custom: Custom {
                provider_specific: payload.custom.provider_specific.clone(),
                integrations: BTreeMap::new(),
                experimental: BTreeMap::new(),
                outcome_hint: payload.custom.outcome_hint.clone(),
                synthetic: payload.custom.synthetic,
                synthetic_recipe: payload.custom.synthetic_recipe.clone(),
            },
            consent: Some(consent_record_from_v04(&consent, &call.call_id)),
            provenance: Some(provenance_from_v04(&provenance)),
        },
        audit: AuditV05 {
            received_at,
            schema_version: SchemaVersion::V0_5,
            processed_at: message.audit.normalized_at,
            processing_duration_ms: None,
            validation_errors: Vec::new(),
            checksum: None,
            event_type: None,
        },
    }
}

// ============================================================================
// SECTION: Downgrades
// ============================================================================

/// Downgrades a 0.5 document to 0.4, dropping 0.5-only fields.
#[must_use]
pub fn downgrade_v05_to_v04(message: &MessageV05) -> MessageV04 {
    let payload = &message.vcp_payload;
    let call = &payload.call;
    let (end_time, duration_sec) = resolve_timing(call.start_time, call.end_time, call.duration_sec);
    let direction = call.direction.or(match call.channel {
        ChannelType::Inbound => Some(CallDirection::Inbound),
        ChannelType::Outbound => Some(CallDirection::Outbound),
        _ => None,
    });
    MessageV04 {
        vcp_version: SchemaVersion::V0_4,
        vcp_payload: PayloadV04 {
            call: CallV04 {
                call_id: call.call_id.clone(),
                session_id: Some(call.session_id.clone()),
                provider: call.provider.clone(),
                start_time: call.start_time,
                end_time,
                duration_sec,
                channel: direction,
                to: call.to.clone(),
                from: call.from.clone(),
                capabilities_invoked: call
                    .capabilities_invoked
                    .iter()
                    .map(|capability| capability.id().to_string())
                    .collect(),
                purpose_contract: call.purpose_contract.clone(),
            },
            model_selection: Some(payload.model_selection.clone()),
            outcomes: OutcomesV04 {
                perceived: payload.outcomes.perceived.clone(),
                objective: payload.outcomes.objective.clone(),
                extractions: payload.outcomes.extractions.clone(),
                perception_gap: Some(payload.outcomes.perception_gap.clone()),
            },
            hcr: Some(payload.hcr.clone()),
            artifacts: ArtifactsV04 {
                recording_url: payload.artifacts.audio_recording_ref.clone(),
                transcript_url: payload.artifacts.transcript_ref.clone(),
                summary: payload.artifacts.summary.clone(),
                provider_raw_payload_ref: payload.artifacts.provider_raw_payload_ref.clone(),
            },
            custom: CustomLegacy {
                provider_specific: payload.custom.provider_specific.clone(),
                outcome_hint: payload.custom.outcome_hint.clone(),
                synthetic: payload.custom.synthetic,
                synthetic_recipe: payload.custom.synthetic_recipe.clone(),
            },
            consent: payload.consent.as_ref().map(consent_v04_from_record),
            provenance: payload.provenance.as_ref().map(provenance_v04_from_record),
        },
        audit: AuditLegacy {
            received_at: message.audit.received_at,
            normalized_at: message.audit.processed_at,
            schema_version: SchemaVersion::V0_4,
        },
    }
}

/// Downgrades a 0.4 document to 0.3, removing consent and provenance.
#[must_use]
pub fn downgrade_v04_to_v03(message: &MessageV04) -> MessageV03 {
    let payload = &message.vcp_payload;
    let call = &payload.call;
    MessageV03 {
        vcp_version: SchemaVersion::V0_3,
        vcp_payload: PayloadV03 {
            call: CallV03 {
                call_id: call.call_id.clone(),
                session_id: call
                    .session_id
                    .clone()
                    .unwrap_or_else(|| synthesize_session_id(&call.provider, &call.call_id)),
                provider: call.provider.clone(),
                start_time: call.start_time,
                end_time: call.end_time,
                duration_sec: call.duration_sec,
                capabilities_invoked: call.capabilities_invoked.clone(),
                purpose_contract: call.purpose_contract.clone(),
            },
            model_selection: payload.model_selection.clone(),
            outcomes: OutcomesV03 {
                perceived: payload.outcomes.perceived.clone(),
                objective: payload.outcomes.objective.clone(),
                perception_gap: payload.outcomes.perception_gap.clone(),
            },
            hcr: payload.hcr.clone(),
            artifacts: ArtifactsV03 {
                recording_url: payload.artifacts.recording_url.clone(),
                transcript_url: payload.artifacts.transcript_url.clone(),
                provider_raw_payload_ref: payload.artifacts.provider_raw_payload_ref.clone(),
            },
            custom: payload.custom.clone(),
        },
        audit: AuditLegacy {
            received_at: message.audit.received_at,
            normalized_at: message.audit.normalized_at,
            schema_version: SchemaVersion::V0_3,
        },
    }
}

// ============================================================================
// SECTION: Section Conversions
// ============================================================================

/// Conservative consent for documents that never recorded one.
fn inferred_consent(start_time: Timestamp, policy: &VersioningPolicy) -> ConsentV04 {
    ConsentV04 {
        recording_consent: false,
        consent_timestamp: Some(start_time),
        consent_method: ConsentMethod::Inferred,
        data_retention_days: policy.default_retention_days,
        sharing_allowed: false,
        anonymization_required: true,
    }
}

/// Provenance naming the upgrade step for documents that never recorded one.
fn inferred_provenance(
    provider: &str,
    captured_at: Timestamp,
    policy: &VersioningPolicy,
) -> ProvenanceV04 {
    ProvenanceV04 {
        captured_at,
        captured_by: UPGRADE_ACTOR.to_string(),
        source_system: provider.to_string(),
        processing_chain: vec![UPGRADED_FROM_V03.to_string()],
        data_quality_score: Some(policy.default_data_quality_score),
    }
}

/// Converts 0.4 consent into a 0.5 consent record.
fn consent_record_from_v04(consent: &ConsentV04, call_id: &str) -> ConsentRecord {
    let (status, scope) = if consent.recording_consent {
        (ConsentStatus::Granted, vec![RECORDING_SCOPE.to_string()])
    } else {
        (ConsentStatus::Denied, Vec::new())
    };
    ConsentRecord {
        consent_id: format!("consent_{call_id}"),
        status,
        granted_at: consent.consent_timestamp,
        expires_at: None,
        scope,
        version: UPGRADED_CONSENT_VERSION.to_string(),
        method: Some(consent.consent_method),
        data_retention_days: Some(consent.data_retention_days),
        sharing_allowed: Some(consent.sharing_allowed),
        anonymization_required: Some(consent.anonymization_required),
        user_agent: None,
        ip_address_hash: None,
    }
}

/// Converts a 0.5 consent record back into 0.4 consent.
fn consent_v04_from_record(record: &ConsentRecord) -> ConsentV04 {
    ConsentV04 {
        recording_consent: record.status == ConsentStatus::Granted,
        consent_timestamp: record.granted_at,
        consent_method: record.method.unwrap_or(ConsentMethod::Inferred),
        data_retention_days: record.data_retention_days.unwrap_or(DEFAULT_RETENTION_DAYS),
        sharing_allowed: record.sharing_allowed.unwrap_or(false),
        anonymization_required: record.anonymization_required.unwrap_or(true),
    }
}

/// Converts 0.4 provenance into a 0.5 provenance record.
fn provenance_from_v04(provenance: &ProvenanceV04) -> Provenance {
    let mut history = provenance.processing_chain.clone();
    history.push(UPGRADED_FROM_V04.to_string());
    Provenance {
        source_system: provenance.source_system.clone(),
        created_at: provenance.captured_at,
        created_by: provenance.captured_by.clone(),
        transformation_history: history,
        data_retention_policy: None,
        compliance_flags: Vec::new(),
        data_quality_score: provenance.data_quality_score,
    }
}

/// Converts a 0.5 provenance record back into 0.4 provenance.
fn provenance_v04_from_record(record: &Provenance) -> ProvenanceV04 {
    let mut chain = record.transformation_history.clone();
    if chain.last().is_some_and(|step| step == UPGRADED_FROM_V04) {
        chain.pop();
    }
    ProvenanceV04 {
        captured_at: record.created_at,
        captured_by: record.created_by.clone(),
        source_system: record.source_system.clone(),
        processing_chain: chain,
        data_quality_score: record.data_quality_score,
    }
}

/// Fills the end time and duration required by older generations.
fn resolve_timing(
    start: Timestamp,
    end: Option<Timestamp>,
    duration: Option<f64>,
) -> (Timestamp, f64) {
    match (end, duration) {
        (Some(end), Some(duration)) => (end, duration),
        (Some(end), None) => (end, end.seconds_since(&start).max(0.0)),
        (None, Some(duration)) => (start.checked_add_seconds(duration).unwrap_or(start), duration),
        (None, None) => (start, 0.0),
    }
}
