// crates/vcp-core/src/schema/common.rs
// ============================================================================
// Module: VCP Shared Schema Types
// Description: Enumerations and records shared across schema generations.
// Purpose: Keep outcome, selection, and report shapes identical between versions.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! These types appear unchanged in two or more schema generations. Optional
//! fields are omitted from serialized output when absent, and collection
//! fields default to empty on input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::Timestamp;

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Objective outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Call achieved its objective.
    Success,
    /// Call did not achieve its objective.
    Failure,
    /// Objective partially achieved.
    Partial,
    /// Call timed out, was busy, or went unanswered.
    Timeout,
    /// Technical error terminated the call.
    Error,
    /// Outcome not yet assessed.
    #[default]
    Unknown,
}

impl OutcomeStatus {
    /// All statuses in declaration order.
    pub const ALL: [Self; 6] =
        [Self::Success, Self::Failure, Self::Partial, Self::Timeout, Self::Error, Self::Unknown];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Partial => "partial",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a wire label (case-insensitive).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|status| status.as_str() == label)
    }
}

/// Perception gap classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapClass {
    /// Perceived and objective outcomes agree.
    #[default]
    Aligned,
    /// Small divergence.
    MinorDeviation,
    /// Large divergence.
    MajorDeviation,
    /// Perceived and objective outcomes conflict.
    Contradictory,
}

/// Direction of a call relative to the deploying business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    /// Caller reached the agent.
    Inbound,
    /// Agent placed the call.
    Outbound,
}

impl CallDirection {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    /// Parses a wire label (case-insensitive).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

/// Alert level attached to a human-readable call report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Informational.
    #[default]
    Info,
    /// Requires attention.
    Warning,
    /// Requires immediate action.
    Critical,
}

/// How recording consent was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentMethod {
    /// Caller explicitly agreed.
    Explicit,
    /// Consent implied by context (e.g. disclosure message).
    Implicit,
    /// Consent inferred without a record.
    Inferred,
}

// ============================================================================
// SECTION: Purpose Contract
// ============================================================================

/// Declared intent of a call and the criteria that define success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurposeContract {
    /// Free-form declared intent.
    pub declared_intent: String,
    /// Measurable success criteria.
    #[serde(default)]
    pub success_criteria: Vec<SuccessCriterion>,
}

/// One measurable success criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriterion {
    /// Criterion identifier.
    pub id: String,
    /// Metric name.
    pub metric: String,
    /// Comparison operator label.
    pub operator: String,
    /// Threshold value.
    pub value: Value,
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Scored success criterion with an evidence reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCriterion {
    /// Criterion identifier.
    pub id: String,
    /// Whether the criterion was met.
    pub met: bool,
    /// Reference to the evidence backing the verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_ref: Option<String>,
    /// Optional numeric score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Optional weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Objective assessment of a call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectiveOutcome {
    /// Outcome classification.
    #[serde(default)]
    pub status: OutcomeStatus,
    /// Confidence in the assessment, in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Provider-reported disconnect reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnect_reason: Option<String>,
    /// Scored criteria.
    #[serde(default)]
    pub scored_criteria: Vec<ScoredCriterion>,
    /// Free-form metrics.
    #[serde(default)]
    pub metrics: BTreeMap<String, Value>,
    /// Time spent assessing, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_time_ms: Option<f64>,
}

/// Sentiment reading attached to a perceived outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    /// Model that produced the reading.
    pub model: String,
    /// Sentiment score.
    pub score: f64,
}

/// Structured perceived-outcome assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceivedAssessment {
    /// Who perceived the outcome (e.g. `caller`).
    pub by: String,
    /// When the perception was recorded.
    pub at: Timestamp,
    /// Optional sentiment reading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentReading>,
    /// Optional confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Perceived outcome: a free label or a structured assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerceivedOutcome {
    /// Free-form label.
    Label(String),
    /// Structured assessment.
    Assessment(PerceivedAssessment),
}

/// Divergence between perceived and objective outcomes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerceptionGap {
    /// Gap magnitude in `[0, 1]`.
    pub gap_score: f64,
    /// Gap classification.
    pub gap_class: GapClass,
    /// Contributing factors.
    #[serde(default)]
    pub factors: Vec<String>,
    /// Optional narrative analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

// ============================================================================
// SECTION: Model Selection
// ============================================================================

/// Model choice for one role (STT, LLM, TTS, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRoleInfo {
    /// Chosen model identifier.
    pub chosen: String,
    /// Alternatives considered.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Selection rationale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Prior telemetry used during selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry_prior: Option<Value>,
    /// Whether a fallback model was used.
    #[serde(default)]
    pub fallback_used: bool,
    /// Selection latency in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_time_ms: Option<f64>,
}

/// Model selection policy resolution for a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Policy identifier.
    pub policy_id: String,
    /// When the policy was resolved.
    pub resolved_at: Timestamp,
    /// Per-role model choices.
    #[serde(default)]
    pub roles: BTreeMap<String, ModelRoleInfo>,
    /// Optional strategy label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_strategy: Option<String>,
    /// Total selection latency in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_selection_time_ms: Option<f64>,
}

impl ModelSelection {
    /// Default selection record for a provider with no selection data.
    #[must_use]
    pub fn provider_default(provider: &str, resolved_at: Timestamp) -> Self {
        Self {
            policy_id: format!("{provider}_default"),
            resolved_at,
            roles: BTreeMap::new(),
            selection_strategy: None,
            total_selection_time_ms: None,
        }
    }
}

// ============================================================================
// SECTION: Human-Readable Call Report
// ============================================================================

/// Human-readable call report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hcr {
    /// Intended audience.
    pub audience: String,
    /// One-line headline.
    pub headline: String,
    /// Outcome status echoed for readers.
    #[serde(default)]
    pub outcome_status: OutcomeStatus,
    /// Key points.
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Impact metrics.
    #[serde(default)]
    pub impact_metrics: BTreeMap<String, Value>,
    /// Narrative summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Recommendations.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Alert level.
    #[serde(default)]
    pub alert_level: AlertLevel,
}

impl Hcr {
    /// Default system report for a provider.
    #[must_use]
    pub fn provider_default(provider: &str, outcome_status: OutcomeStatus) -> Self {
        Self {
            audience: "system".to_string(),
            headline: format!("{provider} call processed"),
            outcome_status,
            key_points: Vec::new(),
            impact_metrics: BTreeMap::new(),
            summary: None,
            recommendations: Vec::new(),
            alert_level: AlertLevel::Info,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Synthesizes a session identifier from provider and call identifiers.
///
/// Uses the first eight characters of the call identifier.
#[must_use]
pub fn synthesize_session_id(provider: &str, call_id: &str) -> String {
    let prefix: String = call_id.chars().take(8).collect();
    format!("sess_{provider}_{prefix}")
}
