// crates/vcp-providers/src/projections.rs
// ============================================================================
// Module: Payload Projections
// Description: Derived objects computed from an entire provider payload.
// Purpose: Build provider digests and CRM, calendar, and sales integrations.
// Dependencies: crate::transforms, serde_json, vcp-core
// ============================================================================

//! ## Overview
//! A projection reads the whole raw payload and returns one JSON object that
//! the mapper merges at the projection's canonical path. Integration signals
//! are derived from the flattened `extractions` map.
//!
//! Invariants:
//! - Projections are pure and always return a JSON object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use vcp_core::path;

use crate::transforms::lookup;
use crate::transforms::qualification_score;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Extraction keys that signal CRM data.
const CRM_TRIGGERS: [&str; 2] = ["customer_interest_level", "lead_score"];
/// Key prefixes copied into CRM contact data.
const CONTACT_PREFIXES: [&str; 3] = ["contact_", "customer_", "lead_"];
/// Key fragments copied into scheduling data.
const SCHEDULING_TERMS: [&str; 4] = ["appointment", "schedule", "meeting", "followup"];
/// Marker that signals scheduling data in keys or values.
const APPOINTMENT_MARKER: &str = "appointment_";
/// Key fragments that signal sales data.
const SALES_INDICATORS: [&str; 5] =
    ["budget", "purchase", "product_interest", "decision_maker", "timeline"];

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Named whole-payload projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Assistable task digest: extractions, call args, completion, analytics.
    AssistableDigest,
    /// CRM, calendar, and sales integration signals from extractions.
    SalesIntegrations,
}

impl Projection {
    /// Applies the projection to a raw payload.
    #[must_use]
    pub fn apply(self, payload: &Value) -> Value {
        match self {
            Self::AssistableDigest => assistable_digest(payload),
            Self::SalesIntegrations => Value::Object(derive_integrations(payload)),
        }
    }

    /// Returns the stable projection identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::AssistableDigest => "assistable_digest",
            Self::SalesIntegrations => "sales_integrations",
        }
    }
}

// ============================================================================
// SECTION: Assistable Digest
// ============================================================================

/// Returns a top-level payload field or `default`.
fn field_or(payload: &Value, key: &str, default: Value) -> Value {
    payload.get(key).cloned().unwrap_or(default)
}

/// Builds the Assistable task digest.
#[must_use]
pub fn assistable_digest(payload: &Value) -> Value {
    json!({
        "extractions": field_or(payload, "extractions", json!({})),
        "call_args": field_or(payload, "args", json!({})),
        "metadata": field_or(payload, "metadata", json!({})),
        "call_type": field_or(payload, "call_type", Value::Null),
        "task_completion": {
            "call_completed": field_or(payload, "call_completion", Value::Bool(false)),
            "assistant_completed": field_or(payload, "assistant_task_completion", Value::Bool(false)),
            "completion_reason": field_or(payload, "call_completion_reason", Value::Null)
        },
        "analytics": {
            "added_to_wallet": field_or(payload, "added_to_wallet", Value::Bool(false)),
            "user_sentiment_raw": field_or(payload, "user_sentiment", Value::Null),
            "disconnection_reason": field_or(payload, "disconnection_reason", Value::Null)
        }
    })
}

// ============================================================================
// SECTION: Integrations
// ============================================================================

/// Returns the last segment of a flattened key.
fn leaf_key(key: &str) -> &str {
    key.rsplit_once(path::PATH_SEPARATOR).map_or(key, |(_, leaf)| leaf)
}

/// Selects flattened entries whose leaf key passes `keep`.
fn select(flat: &BTreeMap<String, Value>, keep: impl Fn(&str) -> bool) -> Map<String, Value> {
    flat.iter().filter(|(key, _)| keep(key)).map(|(key, value)| (key.clone(), value.clone())).collect()
}

/// Derives integration signals from the payload's `extractions` map.
///
/// Returns an empty map when no signal is present.
#[must_use]
pub fn derive_integrations(payload: &Value) -> Map<String, Value> {
    let mut integrations = Map::new();
    let flat = payload.get("extractions").map(path::flatten).unwrap_or_default();
    if flat.is_empty() {
        return integrations;
    }

    if CRM_TRIGGERS.iter().any(|key| lookup(&flat, key).is_some()) {
        let lead_score = lookup(&flat, "customer_interest_level")
            .or_else(|| lookup(&flat, "lead_score"))
            .cloned()
            .unwrap_or_else(|| Value::String("unknown".to_string()));
        let contact_data = select(&flat, |key| {
            let leaf = leaf_key(key);
            CONTACT_PREFIXES.iter().any(|prefix| leaf.starts_with(prefix))
        });
        integrations.insert(
            "crm_system".to_string(),
            json!({
                "provider": "assistable_extractions",
                "lead_score": lead_score,
                "contact_data": contact_data
            }),
        );
    }

    let appointment_marked = flat.iter().any(|(key, value)| {
        key.contains(APPOINTMENT_MARKER)
            || value.as_str().is_some_and(|text| text.contains(APPOINTMENT_MARKER))
    });
    let next_followup = lookup(&flat, "next_followup_date");
    if next_followup.is_some() || appointment_marked {
        let scheduling_data = select(&flat, |key| {
            let key = key.to_lowercase();
            SCHEDULING_TERMS.iter().any(|term| key.contains(term))
        });
        integrations.insert(
            "calendar_system".to_string(),
            json!({
                "provider": "assistable_scheduling",
                "next_action": next_followup.cloned().unwrap_or(Value::Null),
                "scheduling_data": scheduling_data
            }),
        );
    }

    let sales_data = select(&flat, |key| {
        let key = key.to_lowercase();
        SALES_INDICATORS.iter().any(|indicator| key.contains(indicator))
    });
    if !sales_data.is_empty() {
        let score = qualification_score(&Value::Object(sales_data.clone()));
        integrations.insert(
            "sales_system".to_string(),
            json!({
                "provider": "assistable_sales_intelligence",
                "opportunity_data": sales_data,
                "qualification_score": score
            }),
        );
    }
    integrations
}
