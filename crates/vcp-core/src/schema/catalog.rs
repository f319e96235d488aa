// crates/vcp-core/src/schema/catalog.rs
// ============================================================================
// Module: VCP Canonical Field Catalogue
// Description: Writable v0.5 field paths and their value kinds.
// Purpose: Validate mapping-rule targets and coerce provider values to schema types.
// Dependencies: crate::{core, schema}, serde_json
// ============================================================================

//! ## Overview
//! Mapping rules name canonical fields with section-relative paths such as
//! `call.start_time` or `audit.event_type`. This catalogue lists every path a
//! rule may target together with its [`FieldKind`]. Paths ending in `.*`
//! admit any key below the prefix (open maps). Coercion converts a provider
//! value into the exact JSON shape the v0.5 schema deserializes, or drops it.
//!
//! Invariants:
//! - Every catalogue path deserializes into [`crate::schema::v05::MessageV05`]
//!   when written with a coerced value.
//! - `audit.*` paths live at the document root; all others under
//!   `vcp_payload`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Number;
use serde_json::Value;

use crate::core::Timestamp;
use crate::schema::common::CallDirection;
use crate::schema::common::OutcomeStatus;
use crate::schema::v05::ChannelType;

// ============================================================================
// SECTION: Field Kinds
// ============================================================================

/// Value kind of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 string; numbers and booleans are stringified.
    Text,
    /// Finite number; numeric strings are parsed.
    Number,
    /// Boolean; `"true"`/`"false"` strings are accepted.
    Boolean,
    /// RFC 3339 `Z` timestamp; epoch numbers and offset strings are converted.
    Timestamp,
    /// [`ChannelType`] label.
    Channel,
    /// [`CallDirection`] label.
    Direction,
    /// [`OutcomeStatus`] label.
    OutcomeStatus,
    /// Any JSON value.
    Json,
    /// Any JSON object.
    Object,
}

/// Section prefix whose fields live at the document root.
const ROOT_SECTION: &str = "audit";
/// Document key holding payload sections.
const PAYLOAD_KEY: &str = "vcp_payload";
/// Wildcard suffix marking an open map.
const WILDCARD_SUFFIX: &str = ".*";

/// Writable canonical fields.
const CANONICAL_FIELDS: &[(&str, FieldKind)] = &[
    ("call.call_id", FieldKind::Text),
    ("call.session_id", FieldKind::Text),
    ("call.start_time", FieldKind::Timestamp),
    ("call.end_time", FieldKind::Timestamp),
    ("call.duration_sec", FieldKind::Number),
    ("call.parent_session_id", FieldKind::Text),
    ("call.correlation_id", FieldKind::Text),
    ("call.channel", FieldKind::Channel),
    ("call.direction", FieldKind::Direction),
    ("call.from", FieldKind::Text),
    ("call.to", FieldKind::Text),
    ("call.caller_id", FieldKind::Text),
    ("call.agent_id", FieldKind::Text),
    ("call.model_used", FieldKind::Text),
    ("call.geographic_region", FieldKind::Text),
    ("model_selection.selection_strategy", FieldKind::Text),
    ("outcomes.objective.status", FieldKind::OutcomeStatus),
    ("outcomes.objective.confidence", FieldKind::Number),
    ("outcomes.objective.disconnect_reason", FieldKind::Text),
    ("outcomes.objective.metrics.*", FieldKind::Json),
    ("outcomes.user_satisfaction_score", FieldKind::Number),
    ("outcomes.business_impact.*", FieldKind::Json),
    ("outcomes.extractions", FieldKind::Object),
    ("outcomes.extractions.*", FieldKind::Json),
    ("outcomes.model_outcome_attribution.kpis.*", FieldKind::Json),
    ("outcomes.model_outcome_attribution.total_cost_usd", FieldKind::Number),
    ("hcr.headline", FieldKind::Text),
    ("hcr.summary", FieldKind::Text),
    ("artifacts.provider_raw_payload_ref", FieldKind::Text),
    ("artifacts.audio_recording_ref", FieldKind::Text),
    ("artifacts.transcript_ref", FieldKind::Text),
    ("artifacts.transcript", FieldKind::Json),
    ("artifacts.summary", FieldKind::Text),
    ("artifacts.system_logs_ref", FieldKind::Text),
    ("custom.provider_specific.*", FieldKind::Json),
    ("custom.integrations", FieldKind::Object),
    ("custom.integrations.*", FieldKind::Json),
    ("custom.experimental.*", FieldKind::Json),
    ("audit.event_type", FieldKind::Text),
];

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Returns the kind of a canonical field, or `None` if not writable.
#[must_use]
pub fn field_kind(canonical_path: &str) -> Option<FieldKind> {
    if canonical_path.is_empty() || canonical_path.split('.').any(str::is_empty) {
        return None;
    }
    for (path, kind) in CANONICAL_FIELDS {
        if let Some(prefix) = path.strip_suffix(WILDCARD_SUFFIX) {
            let matches_prefix = canonical_path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.') && rest.len() > 1);
            if matches_prefix {
                return Some(*kind);
            }
        } else if *path == canonical_path {
            return Some(*kind);
        }
    }
    None
}

/// Returns the document path for a section-relative canonical path.
#[must_use]
pub fn document_path(canonical_path: &str) -> String {
    let section = canonical_path.split('.').next().unwrap_or_default();
    if section == ROOT_SECTION {
        canonical_path.to_string()
    } else {
        format!("{PAYLOAD_KEY}.{canonical_path}")
    }
}

/// Iterates catalogue entries (wildcards included as `prefix.*`).
pub fn fields() -> impl Iterator<Item = (&'static str, FieldKind)> {
    CANONICAL_FIELDS.iter().copied()
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Coerces a provider value to the JSON shape expected by `kind`.
///
/// Returns `None` when the value cannot be represented; callers drop it.
#[must_use]
pub fn coerce(kind: FieldKind, value: Value) -> Option<Value> {
    match kind {
        FieldKind::Json => Some(value),
        FieldKind::Object => value.is_object().then_some(value),
        FieldKind::Text => coerce_text(value).map(Value::String),
        FieldKind::Number => coerce_number(&value).and_then(Number::from_f64).map(Value::Number),
        FieldKind::Boolean => coerce_boolean(&value).map(Value::Bool),
        FieldKind::Timestamp => {
            coerce_timestamp(&value).map(|timestamp| Value::String(timestamp.to_rfc3339()))
        }
        FieldKind::Channel => value
            .as_str()
            .and_then(ChannelType::parse)
            .map(|channel| Value::String(channel.as_str().to_string())),
        FieldKind::Direction => value
            .as_str()
            .and_then(CallDirection::parse)
            .map(|direction| Value::String(direction.as_str().to_string())),
        FieldKind::OutcomeStatus => value
            .as_str()
            .and_then(OutcomeStatus::parse)
            .map(|status| Value::String(status.as_str().to_string())),
    }
}

/// Coerces scalars to text.
fn coerce_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerces numbers and numeric strings to a finite `f64`.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Coerces booleans and boolean strings.
fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Coerces epoch numbers and RFC 3339 strings to a UTC timestamp.
///
/// Epoch magnitudes at or above [`crate::core::timestamp::EPOCH_MILLIS_THRESHOLD`]
/// are treated as milliseconds.
#[must_use]
pub fn coerce_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::Number(number) => number.as_i64().map_or_else(
            || number.as_f64().and_then(|float| Timestamp::from_epoch_f64(float).ok()),
            |integer| Timestamp::from_epoch(integer).ok(),
        ),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed.parse::<i64>().map_or_else(
                |_| Timestamp::parse_any_offset(trimmed).ok(),
                |integer| Timestamp::from_epoch(integer).ok(),
            )
        }
        _ => None,
    }
}
