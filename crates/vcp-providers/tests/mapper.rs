// crates/vcp-providers/tests/mapper.rs
// ============================================================================
// Module: Mapper Tests
// Description: Normalization of catalogue payloads into v0.5 documents.
// ============================================================================
//! ## Overview
//! Covers determinism, validation-clean output for every catalogue example,
//! timestamp conversion, synthesized fields, projections, and auditing.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use serde_json::Value;
use serde_json::json;
use vcp_core::VersionedMessage;
use vcp_core::hashing::verify_message_checksum;
use vcp_core::schema::common::CallDirection;
use vcp_core::schema::common::OutcomeStatus;
use vcp_core::schema::v05::ChannelType;
use vcp_core::schema::v05::ConsentStatus;
use vcp_core::validate;
use vcp_providers::FileAuditSink;
use vcp_providers::MapperOptions;
use vcp_providers::MemoryAuditSink;
use vcp_providers::ProviderAccessPolicy;
use vcp_providers::catalog::builtin_descriptors;

use crate::common::FIXED_ID;
use crate::common::FIXED_NOW;
use crate::common::example_payload;
use crate::common::fixed_mapper;
use crate::common::mapper_with;
use crate::common::registry_with;

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Tests identical inputs produce byte-identical documents.
#[test]
fn test_map_is_deterministic() {
    let mapper = fixed_mapper();
    for descriptor in builtin_descriptors() {
        for schema in &descriptor.schemas {
            let first = serde_json::to_string(&mapper.map(&descriptor.id, &schema.example_payload)).unwrap();
            let second = serde_json::to_string(&mapper.map(&descriptor.id, &schema.example_payload)).unwrap();
            assert_eq!(first, second, "provider {}", descriptor.id);
        }
    }
}

/// Tests every catalogue example maps to a document with no validation errors.
#[test]
fn test_catalogue_examples_validate_cleanly() {
    let mapper = fixed_mapper();
    for descriptor in builtin_descriptors() {
        for schema in &descriptor.schemas {
            let message = mapper.map(&descriptor.id, &schema.example_payload);
            let report = validate(&VersionedMessage::V05(message.clone()));
            assert!(report.is_valid(), "provider {}: {:?}", descriptor.id, report.error_messages());

            let document = serde_json::to_value(&message).unwrap();
            assert_eq!(document["vcp_version"], "0.5");
            let decoded = VersionedMessage::from_value(document).unwrap();
            assert_eq!(decoded, VersionedMessage::V05(message));
        }
    }
}

/// Tests the checksum covers the document and excludes itself.
#[test]
fn test_checksum_verifies_and_can_be_disabled() {
    let message = fixed_mapper().map("retell", &example_payload("retell"));
    let checksum = message.audit.checksum.clone().unwrap();
    assert_eq!(checksum.len(), 64);
    let document = serde_json::to_value(&message).unwrap();
    assert!(verify_message_checksum(&document, &checksum).unwrap());

    let mut tampered = document;
    tampered["vcp_payload"]["call"]["to"] = json!("+10000000000");
    assert!(!verify_message_checksum(&tampered, &checksum).unwrap());

    let mapper = fixed_mapper().with_options(MapperOptions { compute_checksum: false });
    assert!(mapper.map("retell", &example_payload("retell")).audit.checksum.is_none());
}

// ============================================================================
// SECTION: Provider Scenarios
// ============================================================================

/// Tests Retell millisecond timestamps and call fields convert correctly.
#[test]
fn test_retell_millisecond_timestamps() {
    let payload = example_payload("retell");
    let message = fixed_mapper().map("retell", &payload);
    let call = &message.vcp_payload.call;

    assert_eq!(call.call_id, "Jabr9TXYYJHfvl6Syypi88rdAHYHmcq6");
    assert_eq!(call.session_id, "sess_retell_Jabr9TXY");
    assert_eq!(call.start_time.to_rfc3339(), "2024-05-02T00:07:55.945Z");
    assert_eq!(call.end_time.unwrap().to_rfc3339(), "2024-05-02T00:08:11.736Z");
    assert!((call.duration_sec.unwrap() - 15.791).abs() < 1e-6);
    assert_eq!(call.direction, Some(CallDirection::Inbound));
    assert_eq!(call.channel, ChannelType::Phone);
    assert_eq!(call.from.as_deref(), Some("+12137771234"));
    assert_eq!(
        message.vcp_payload.outcomes.objective.disconnect_reason.as_deref(),
        Some("user_hangup")
    );
    assert_eq!(message.vcp_payload.outcomes.objective.status, OutcomeStatus::Unknown);
    assert_eq!(message.audit.event_type.as_deref(), Some("call_ended"));
    assert_eq!(message.vcp_payload.custom.provider_specific["retell"], json!({"data": payload}));
}

/// Tests offset timestamps normalize to UTC.
#[test]
fn test_offset_timestamps_normalize_to_utc() {
    let mut payload = example_payload("retell");
    payload["call"]["start_timestamp"] = json!("2024-05-02T02:07:55+02:00");
    payload["call"]["end_timestamp"] = json!("2024-05-02T00:08:55Z");
    let call = fixed_mapper().map("retell", &payload).vcp_payload.call;
    assert_eq!(call.start_time.to_rfc3339(), "2024-05-02T00:07:55Z");
    assert!((call.duration_sec.unwrap() - 60.0).abs() < 1e-9);
}

/// Tests Assistable transforms and projections land in the document.
#[test]
fn test_assistable_transforms_and_integrations() {
    let message = fixed_mapper().map("assistable", &example_payload("assistable"));
    let payload = &message.vcp_payload;

    assert_eq!(payload.call.channel, ChannelType::Phone);
    assert_eq!(payload.call.caller_id.as_deref(), Some("contact_12345"));
    assert_eq!(payload.call.start_time.to_rfc3339(), "2023-12-19T16:00:00Z");
    assert_eq!(payload.outcomes.objective.status, OutcomeStatus::Success);
    assert_eq!(payload.hcr.outcome_status, OutcomeStatus::Success);
    assert!((payload.outcomes.user_satisfaction_score.unwrap() - 0.8).abs() < f64::EPSILON);
    assert_eq!(payload.outcomes.objective.metrics["task_completion"], json!(true));
    assert!(payload.hcr.summary.as_deref().unwrap().starts_with("Customer showed interest"));

    let sales = &payload.custom.integrations["sales_system"];
    assert!((sales["qualification_score"].as_f64().unwrap() - 1.0).abs() < f64::EPSILON);
    assert_eq!(payload.custom.integrations["crm_system"]["lead_score"], "high");

    let specific = &payload.custom.provider_specific["assistable"];
    assert_eq!(specific["data"]["call_id"], "assistable_call_abc123");
    assert_eq!(specific["call_type"], "outbound_sales");
    assert_eq!(specific["extractions"]["decision_maker"], true);
    assert_eq!(specific["task_completion"]["completion_reason"], "task_completed");
}

/// Tests ElevenLabs derives the end time from start and duration.
#[test]
fn test_elevenlabs_end_time_derived_from_duration() {
    let call = fixed_mapper().map("elevenlabs", &example_payload("elevenlabs")).vcp_payload.call;
    assert_eq!(call.call_id, "abc");
    assert_eq!(call.start_time.to_rfc3339(), "2025-02-14T12:48:17Z");
    assert_eq!(call.end_time.unwrap().to_rfc3339(), "2025-02-14T12:48:39Z");
    assert_eq!(call.agent_id.as_deref(), Some("xyz"));
}

/// Tests missing identifiers and times are synthesized from injected sources.
#[test]
fn test_missing_fields_synthesized() {
    let message = fixed_mapper().map("openai_realtime", &example_payload("openai_realtime"));
    let call = &message.vcp_payload.call;
    assert_eq!(call.call_id, FIXED_ID);
    assert_eq!(call.session_id, "sess_001");
    assert_eq!(call.start_time.to_rfc3339(), FIXED_NOW);
    assert_eq!(call.model_used.as_deref(), Some("gpt-realtime"));
    assert_eq!(call.correlation_id.as_deref(), Some("event_1920"));

    let vapi = fixed_mapper().map("vapi", &json!({"message": {"type": "status-update"}}));
    assert_eq!(vapi.vcp_payload.call.call_id, FIXED_ID);
    assert_eq!(vapi.vcp_payload.call.session_id, "sess_vapi_00000000");
}

/// Tests section defaults follow the provider naming conventions.
#[test]
fn test_section_defaults() {
    let message = fixed_mapper().map("bland", &example_payload("bland"));
    let payload = &message.vcp_payload;
    assert_eq!(payload.model_selection.policy_id, "bland_default");
    assert_eq!(payload.hcr.headline, "bland call processed");
    assert_eq!(payload.hcr.audience, "system");

    let consent = payload.consent.as_ref().unwrap();
    assert_eq!(consent.consent_id, "consent_c47c3e15-acad-4f8b-99e7-81d529dd5dc6");
    assert_eq!(consent.status, ConsentStatus::Granted);
    assert_eq!(consent.scope, vec!["recording".to_string(), "analytics".to_string()]);

    let provenance = payload.provenance.as_ref().unwrap();
    assert_eq!(provenance.source_system, "bland_webhook_api");
    assert_eq!(provenance.created_by, "bland_webhook_processor");
    assert_eq!(
        provenance.transformation_history,
        vec!["received_from_bland_webhook".to_string(), "mapped_to_vcp_v0.5".to_string()]
    );
    assert_eq!(provenance.data_retention_policy.as_deref(), Some("standard_30_days"));
    assert_eq!(message.audit.received_at.to_rfc3339(), FIXED_NOW);
}

/// Tests numeric ids become text and uncoercible values are dropped.
#[test]
fn test_coercion_and_dropped_values() {
    let sink = Arc::new(MemoryAuditSink::new());
    let mapper = fixed_mapper().with_audit_sink(sink.clone());
    let message = mapper.map("bland", &json!({"call_id": 12345, "call_length": "abc", "to": null}));

    assert_eq!(message.vcp_payload.call.call_id, "12345");
    assert!(message.vcp_payload.call.duration_sec.is_none());
    assert!(message.vcp_payload.call.to.is_none());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "vcp_normalization");
    assert_eq!(events[0]["rules_applied"], 1);
    assert_eq!(events[0]["values_dropped"], 1);
    assert_eq!(events[0]["rules_skipped"], 4);
    assert_eq!(events[0]["call_id"], "12345");
}

// ============================================================================
// SECTION: Unknown Providers
// ============================================================================

/// Tests unknown providers yield a default document with empty identifiers.
#[test]
fn test_unknown_provider_yields_default_document() {
    let sink = Arc::new(MemoryAuditSink::new());
    let mapper = fixed_mapper().with_audit_sink(sink.clone());
    let message = mapper.map("Twilio", &json!({"CallSid": "CA123"}));

    assert_eq!(message.vcp_payload.call.call_id, "");
    assert_eq!(message.vcp_payload.call.session_id, "");
    assert_eq!(message.vcp_payload.call.provider, "twilio");
    assert!(message.vcp_payload.custom.provider_specific.is_empty());
    let report = validate(&VersionedMessage::V05(message));
    assert!(report.has_error_at("vcp_payload.call.call_id"));

    let events = sink.events();
    assert_eq!(events[0]["known_provider"], false);
    assert_eq!(events[0]["rules_applied"], 0);
}

/// Tests denied providers behave like unknown ones.
#[test]
fn test_denied_provider_yields_default_document() {
    let mut policy = ProviderAccessPolicy::allow_all();
    policy.denylist.insert("retell".to_string());
    let message = mapper_with(registry_with(policy)).map("retell", &example_payload("retell"));
    assert_eq!(message.vcp_payload.call.call_id, "");
    assert!(message.vcp_payload.call.direction.is_none());
}

// ============================================================================
// SECTION: Audit Sinks
// ============================================================================

/// Tests normalization events never carry payload content.
#[test]
fn test_audit_events_omit_payload_content() {
    let sink = Arc::new(MemoryAuditSink::new());
    let mapper = fixed_mapper().with_audit_sink(sink.clone());
    let message = mapper.map("retell", &example_payload("retell"));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event["provider_id"], "retell");
    assert_eq!(event["known_provider"], true);
    assert_eq!(event["rules_applied"], 9);
    assert_eq!(event["rules_skipped"], 1);
    assert_eq!(event["values_dropped"], 0);
    assert_eq!(event["checksum"], json!(message.audit.checksum));
    let serialized = serde_json::to_string(event).unwrap();
    assert!(!serialized.contains("+12137771234"));
    assert!(!serialized.contains("transcript"));
}

/// Tests the file sink appends one JSON line per event.
#[test]
fn test_file_audit_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("audit.jsonl");
    let sink = Arc::new(FileAuditSink::new(&log_path).unwrap());
    let mapper = fixed_mapper().with_audit_sink(sink);
    let _ = mapper.map("bland", &example_payload("bland"));
    let _ = mapper.map("vapi", &example_payload("vapi"));

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<Value> =
        contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["provider_id"], "bland");
    assert_eq!(lines[1]["provider_id"], "vapi");
    assert!(lines.iter().all(|line| line["event"] == "vcp_normalization"));
}
