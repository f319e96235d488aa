// crates/vcp-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared protocol documents and JSON helpers for core tests.
// Purpose: Provide deterministic fixtures across test suites.
// Dependencies: vcp-core, serde_json
// ============================================================================

//! ## Overview
//! Fixtures are built from JSON literals so each suite exercises the same
//! decoding path consumers use.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use vcp_core::VersionedMessage;
use vcp_core::schema::v03::MessageV03;
use vcp_core::schema::v04::MessageV04;
use vcp_core::schema::v05::MessageV05;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Raw generation 0.3 document with every optional section populated.
#[must_use]
pub fn sample_v03_document() -> Value {
    json!({
        "vcp_version": "0.3",
        "vcp_payload": {
            "call": {
                "call_id": "call_0123456789",
                "session_id": "sess_legacy_0001",
                "provider": "retell",
                "start_time": "2025-01-15T10:00:00Z",
                "end_time": "2025-01-15T10:05:00Z",
                "duration_sec": 300.0,
                "capabilities_invoked": ["calendar_lookup", "crm_update"],
                "purpose_contract": {
                    "declared_intent": "book appointment",
                    "success_criteria": [
                        {"id": "booked", "metric": "appointment_booked", "operator": "eq", "value": true}
                    ]
                }
            },
            "outcomes": {
                "perceived": ["satisfied"],
                "objective": {
                    "status": "success",
                    "confidence": 0.9,
                    "scored_criteria": [
                        {"id": "booked", "met": true, "evidence_ref": "transcript#42"}
                    ],
                    "metrics": {"turns": 12}
                },
                "perception_gap": {"gap_score": 0.1, "gap_class": "aligned", "factors": []}
            },
            "artifacts": {
                "recording_url": "https://example.com/rec.wav",
                "transcript_url": "https://example.com/transcript.txt"
            },
            "custom": {
                "provider_specific": {"retell": {"agent": "a1"}}
            }
        },
        "audit": {
            "received_at": "2025-01-15T10:05:01Z",
            "normalized_at": "2025-01-15T10:05:02Z",
            "schema_version": "0.3"
        }
    })
}

/// Typed generation 0.3 fixture.
#[must_use]
pub fn sample_v03() -> MessageV03 {
    serde_json::from_value(sample_v03_document()).expect("fixture decodes")
}

/// Raw generation 0.4 document with consent and provenance.
#[must_use]
pub fn sample_v04_document() -> Value {
    let mut document = sample_v03_document();
    document["vcp_version"] = json!("0.4");
    document["audit"]["schema_version"] = json!("0.4");
    let payload = &mut document["vcp_payload"];
    payload["call"]["channel"] = json!("inbound");
    payload["call"]["from"] = json!("+15550001111");
    payload["call"]["to"] = json!("+15550002222");
    payload["outcomes"]["extractions"] = json!({"customer_name": "Ada"});
    payload["artifacts"]["summary"] = json!("Booked a follow-up.");
    payload["consent"] = json!({
        "recording_consent": true,
        "consent_timestamp": "2025-01-15T10:00:00Z",
        "consent_method": "explicit",
        "data_retention_days": 90,
        "sharing_allowed": false,
        "anonymization_required": false
    });
    payload["provenance"] = json!({
        "captured_at": "2025-01-15T10:05:01Z",
        "captured_by": "retell_ingest",
        "source_system": "retell",
        "processing_chain": ["received"],
        "data_quality_score": 0.95
    });
    document
}

/// Typed generation 0.4 fixture.
#[must_use]
pub fn sample_v04() -> MessageV04 {
    serde_json::from_value(sample_v04_document()).expect("fixture decodes")
}

/// Typed generation 0.5 fixture produced by upgrading [`sample_v04`].
#[must_use]
pub fn sample_v05() -> MessageV05 {
    let upgraded = VersionedMessage::V04(sample_v04())
        .upgrade(&vcp_core::VersioningPolicy::default())
        .expect("upgrade succeeds");
    match upgraded {
        VersionedMessage::V05(message) => message,
        other => panic!("unexpected generation {}", other.version()),
    }
}

// ============================================================================
// SECTION: JSON Helpers
// ============================================================================

/// Returns true when every field of `subset` appears in `superset` with the
/// same value. Arrays must match element-wise.
#[must_use]
pub fn json_contains(superset: &Value, subset: &Value) -> bool {
    match (superset, subset) {
        (Value::Object(outer), Value::Object(inner)) => inner.iter().all(|(key, value)| {
            outer.get(key).is_some_and(|candidate| json_contains(candidate, value))
        }),
        (Value::Array(outer), Value::Array(inner)) => {
            outer.len() == inner.len()
                && outer.iter().zip(inner).all(|(left, right)| json_contains(left, right))
        }
        _ => superset == subset,
    }
}
