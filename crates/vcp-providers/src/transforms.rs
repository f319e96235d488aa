// crates/vcp-providers/src/transforms.rs
// ============================================================================
// Module: Value Transform Table
// Description: Provider-specific value conversions keyed by canonical path.
// Purpose: Keep provider branching out of the mapper's rule loop.
// Dependencies: crate::projections, serde_json, vcp-core
// ============================================================================

//! ## Overview
//! Transforms are pure, total functions `Value -> Value`. The
//! [`TransformTable`] keys them by `(provider id, canonical path)` so the
//! mapper has a single dispatch point. Whole-payload projections are keyed
//! the same way.
//!
//! Invariants:
//! - Transforms never panic and always return a value in their documented
//!   range; unrecognized input maps to the documented default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Number;
use serde_json::Value;
use vcp_core::path;
use vcp_core::schema::common::OutcomeStatus;
use vcp_core::schema::v05::ChannelType;

use crate::projections::Projection;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentiment buckets from most negative to most positive.
const SENTIMENT_SCORES: [(&str, f64); 7] = [
    ("very_negative", 0.0),
    ("negative", 0.2),
    ("slightly_negative", 0.4),
    ("neutral", 0.5),
    ("slightly_positive", 0.6),
    ("positive", 0.8),
    ("very_positive", 1.0),
];

/// Score for unknown sentiment input.
pub const NEUTRAL_SENTIMENT: f64 = 0.5;

/// Disconnect keywords in priority order.
const DISCONNECT_RULES: [(&[&str], OutcomeStatus); 4] = [
    (&["completed", "success", "finished"], OutcomeStatus::Success),
    (&["timeout", "no_answer", "no answer", "no-answer", "busy"], OutcomeStatus::Timeout),
    (&["error", "failed", "connection"], OutcomeStatus::Error),
    (&["partial", "incomplete"], OutcomeStatus::Partial),
];

/// Qualification base points, in hundredths.
const QUALIFICATION_BASE: u32 = 50;
/// Decision maker identified.
const QUALIFICATION_DECISION_MAKER: u32 = 20;
/// Budget confirmed.
const QUALIFICATION_BUDGET: u32 = 15;
/// Immediate timeline.
const QUALIFICATION_URGENT_TIMELINE: u32 = 15;
/// Near-term timeline.
const QUALIFICATION_NEAR_TIMELINE: u32 = 10;
/// Score ceiling.
const QUALIFICATION_MAX: u32 = 100;

// ============================================================================
// SECTION: Value Transforms
// ============================================================================

/// Named value transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTransform {
    /// Sentiment label to score in `[0, 1]`.
    SentimentScore,
    /// Direction label to [`ChannelType`].
    DirectionChannel,
    /// Disconnect reason to [`OutcomeStatus`].
    DisconnectStatus,
    /// Sales extraction map to qualification score in `[0.5, 1]`.
    QualificationScore,
}

impl ValueTransform {
    /// Applies the transform.
    #[must_use]
    pub fn apply(self, value: &Value) -> Value {
        match self {
            Self::SentimentScore => number(sentiment_score(value)),
            Self::DirectionChannel => Value::String(direction_channel(value).as_str().to_string()),
            Self::DisconnectStatus => Value::String(disconnect_status(value).as_str().to_string()),
            Self::QualificationScore => number(qualification_score(value)),
        }
    }

    /// Returns the stable transform identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::SentimentScore => "sentiment_score",
            Self::DirectionChannel => "direction_channel",
            Self::DisconnectStatus => "disconnect_status",
            Self::QualificationScore => "qualification_score",
        }
    }
}

/// Wraps a finite float as JSON, or null.
fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Converts a sentiment label to a score.
///
/// Labels are matched case-insensitively with `-` and spaces read as `_`.
/// Numbers already in `[0, 1]` pass through; anything else scores 0.5.
#[must_use]
pub fn sentiment_score(value: &Value) -> f64 {
    match value {
        Value::String(label) => {
            let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
            SENTIMENT_SCORES
                .iter()
                .find(|(name, _)| *name == normalized)
                .map_or(NEUTRAL_SENTIMENT, |(_, score)| *score)
        }
        Value::Number(number) => number
            .as_f64()
            .filter(|score| (0.0..=1.0).contains(score))
            .unwrap_or(NEUTRAL_SENTIMENT),
        _ => NEUTRAL_SENTIMENT,
    }
}

/// Converts a direction label to a channel; unknown input is `phone`.
#[must_use]
pub fn direction_channel(value: &Value) -> ChannelType {
    let label = value.as_str().map(|label| label.trim().to_lowercase()).unwrap_or_default();
    match label.as_str() {
        "web" => ChannelType::Web,
        "api" => ChannelType::Api,
        "websocket" => ChannelType::Websocket,
        _ => ChannelType::Phone,
    }
}

/// Classifies a disconnect reason by keyword priority; unknown is `failure`.
#[must_use]
pub fn disconnect_status(value: &Value) -> OutcomeStatus {
    let Some(reason) = value.as_str() else {
        return OutcomeStatus::Failure;
    };
    let reason = reason.to_lowercase();
    DISCONNECT_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| reason.contains(keyword)))
        .map_or(OutcomeStatus::Failure, |(_, status)| *status)
}

/// Scores sales readiness from an extraction map.
///
/// Keys match exactly or as the last segment of a nested key. Non-map input
/// scores the base 0.5.
#[must_use]
pub fn qualification_score(value: &Value) -> f64 {
    let flat = path::flatten(value);
    let mut points = QUALIFICATION_BASE;
    if lookup(&flat, "decision_maker") == Some(&Value::Bool(true)) {
        points += QUALIFICATION_DECISION_MAKER;
    }
    if let Some(budget) = lookup(&flat, "budget_range").map(text) {
        let budget = budget.to_lowercase();
        if budget.contains('$') || budget.contains("budget") {
            points += QUALIFICATION_BUDGET;
        }
    }
    if let Some(timeline) = lookup(&flat, "purchase_timeline").map(text) {
        let timeline = timeline.to_lowercase().replace(['_', '-'], " ");
        if ["30 days", "immediate", "urgent"].iter().any(|term| timeline.contains(term)) {
            points += QUALIFICATION_URGENT_TIMELINE;
        } else if ["90 days", "quarter"].iter().any(|term| timeline.contains(term)) {
            points += QUALIFICATION_NEAR_TIMELINE;
        }
    }
    f64::from(points.min(QUALIFICATION_MAX)) / 100.0
}

/// Finds a flattened entry by exact key or trailing segment.
pub(crate) fn lookup<'a>(flat: &'a BTreeMap<String, Value>, key: &str) -> Option<&'a Value> {
    flat.get(key).or_else(|| {
        let suffix = format!(".{key}");
        flat.iter().find(|(candidate, _)| candidate.ends_with(&suffix)).map(|(_, value)| value)
    })
}

/// Renders a scalar as text; strings are used verbatim.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Transform Table
// ============================================================================

/// Transforms and projections keyed by provider and canonical path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformTable {
    /// Value transforms: provider -> canonical path -> transform.
    values: BTreeMap<String, BTreeMap<String, ValueTransform>>,
    /// Projections: provider -> canonical path -> projection.
    projections: BTreeMap<String, BTreeMap<String, Projection>>,
}

impl TransformTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table used for the built-in providers.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert_value("assistable", "call.channel", ValueTransform::DirectionChannel);
        table.insert_value(
            "assistable",
            "outcomes.user_satisfaction_score",
            ValueTransform::SentimentScore,
        );
        table.insert_value("assistable", "outcomes.objective.status", ValueTransform::DisconnectStatus);
        table.insert_projection(
            "assistable",
            "custom.provider_specific.assistable",
            Projection::AssistableDigest,
        );
        table.insert_projection("assistable", "custom.integrations", Projection::SalesIntegrations);
        table
    }

    /// Registers a value transform, replacing any existing entry.
    pub fn insert_value(
        &mut self,
        provider_id: impl Into<String>,
        canonical_path: impl Into<String>,
        transform: ValueTransform,
    ) {
        self.values
            .entry(provider_id.into())
            .or_default()
            .insert(canonical_path.into(), transform);
    }

    /// Registers a projection, replacing any existing entry.
    pub fn insert_projection(
        &mut self,
        provider_id: impl Into<String>,
        canonical_path: impl Into<String>,
        projection: Projection,
    ) {
        self.projections
            .entry(provider_id.into())
            .or_default()
            .insert(canonical_path.into(), projection);
    }

    /// Returns the value transform for a rule target, if any.
    #[must_use]
    pub fn value_transform(&self, provider_id: &str, canonical_path: &str) -> Option<ValueTransform> {
        self.values.get(provider_id)?.get(canonical_path).copied()
    }

    /// Returns the projections registered for a provider, ordered by path.
    #[must_use]
    pub fn projections(&self, provider_id: &str) -> Vec<(&str, Projection)> {
        self.projections.get(provider_id).map_or_else(Vec::new, |entries| {
            entries.iter().map(|(path, projection)| (path.as_str(), *projection)).collect()
        })
    }
}
