// crates/vcp-providers/src/catalog.rs
// ============================================================================
// Module: Built-in Provider Catalogue
// Description: Descriptors for the voice-AI providers shipped with VCP.
// Purpose: Supply auth schemes, event schemas, and mapping rules per provider.
// Dependencies: crate::descriptor, serde_json
// ============================================================================

//! ## Overview
//! Each function returns one immutable [`ProviderDescriptor`]. Rules target
//! v0.5 canonical paths; provider-specific value conversion lives in the
//! transform table rather than on the rules.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::json;

use crate::descriptor::AuthScheme;
use crate::descriptor::EventSchema;
use crate::descriptor::EventType;
use crate::descriptor::MappingRule;
use crate::descriptor::ProviderDescriptor;

// ============================================================================
// SECTION: Catalogue
// ============================================================================

/// Identifiers of the built-in providers, in registration order.
pub const BUILTIN_PROVIDER_IDS: [&str; 6] =
    ["retell", "bland", "vapi", "elevenlabs", "openai_realtime", "assistable"];

/// Returns all built-in descriptors in registration order.
#[must_use]
pub fn builtin_descriptors() -> Vec<ProviderDescriptor> {
    vec![retell(), bland(), vapi(), elevenlabs(), openai_realtime(), assistable()]
}

/// Converts string literals to owned strings.
fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Builds mapping rules from `(provider, canonical)` pairs.
fn rules(pairs: &[(&str, &str)]) -> Vec<MappingRule> {
    pairs.iter().map(|(provider, canonical)| MappingRule::new(*provider, *canonical)).collect()
}

/// Builds a nested-object field listing.
fn nested(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries.iter().map(|(key, fields)| ((*key).to_string(), strings(fields))).collect()
}

// ============================================================================
// SECTION: Providers
// ============================================================================

/// Retell AI.
#[must_use]
pub fn retell() -> ProviderDescriptor {
    ProviderDescriptor {
        id: "retell".to_string(),
        name: "Retell AI".to_string(),
        company: "Retell AI".to_string(),
        website: "https://www.retellai.com".to_string(),
        docs_url: "https://docs.retellai.com".to_string(),
        api_base_url: "https://api.retellai.com".to_string(),
        status_page: Some("https://status.retellai.com".to_string()),
        changelog_url: Some("https://www.retellai.com/changelog".to_string()),
        rss_feed: None,
        auth: AuthScheme::SignatureHeader {
            header: "x-retell-signature".to_string(),
            trusted_sources: strings(&["100.20.5.228"]),
        },
        supported_events: BTreeSet::from([
            EventType::CallStarted,
            EventType::CallEnded,
            EventType::CallAnalyzed,
        ]),
        schemas: vec![EventSchema {
            event_type: EventType::CallEnded,
            required_fields: strings(&[
                "event",
                "call.call_id",
                "call.from_number",
                "call.to_number",
                "call.direction",
                "call.start_timestamp",
                "call.end_timestamp",
                "call.disconnection_reason",
            ]),
            optional_fields: strings(&[
                "call.transcript",
                "call.transcript_object",
                "call.metadata",
                "call.call_analysis",
            ]),
            nested_objects: nested(&[
                ("call", &["call_id", "agent_id", "call_status", "transcript", "metadata"]),
                ("transcript_object", &["role", "content", "timestamp"]),
            ]),
            example_payload: json!({
                "event": "call_ended",
                "call": {
                    "call_id": "Jabr9TXYYJHfvl6Syypi88rdAHYHmcq6",
                    "from_number": "+12137771234",
                    "to_number": "+12137771235",
                    "direction": "inbound",
                    "start_timestamp": 1_714_608_475_945_i64,
                    "end_timestamp": 1_714_608_491_736_i64,
                    "disconnection_reason": "user_hangup",
                    "transcript": "Full conversation transcript...",
                    "metadata": {}
                }
            }),
        }],
        mapping_rules: rules(&[
            ("call.call_id", "call.call_id"),
            ("call.from_number", "call.from"),
            ("call.to_number", "call.to"),
            ("call.direction", "call.direction"),
            ("call.start_timestamp", "call.start_time"),
            ("call.end_timestamp", "call.end_time"),
            ("call.agent_id", "call.agent_id"),
            ("call.transcript", "artifacts.transcript"),
            ("call.disconnection_reason", "outcomes.objective.disconnect_reason"),
            ("event", "audit.event_type"),
        ]),
    }
}

/// Bland AI.
#[must_use]
pub fn bland() -> ProviderDescriptor {
    ProviderDescriptor {
        id: "bland".to_string(),
        name: "Bland AI".to_string(),
        company: "Bland AI".to_string(),
        website: "https://www.bland.ai".to_string(),
        docs_url: "https://docs.bland.ai".to_string(),
        api_base_url: "https://api.bland.ai".to_string(),
        status_page: None,
        changelog_url: None,
        rss_feed: None,
        auth: AuthScheme::Bearer { header: "Authorization".to_string() },
        supported_events: BTreeSet::from([EventType::CallEnded, EventType::PostCallTranscription]),
        schemas: vec![EventSchema {
            event_type: EventType::CallEnded,
            required_fields: strings(&["call_id", "from", "to", "call_length", "answered", "completed"]),
            optional_fields: strings(&[
                "transcript",
                "recording_url",
                "pathway_logs",
                "analysis",
                "concatenated_transcript",
            ]),
            nested_objects: BTreeMap::new(),
            example_payload: json!({
                "call_id": "c47c3e15-acad-4f8b-99e7-81d529dd5dc6",
                "from": "+12345678901",
                "to": "+10987654321",
                "call_length": 120,
                "answered": true,
                "completed": true,
                "transcript": "AI: Hello! How can I help? User: Hi there!",
                "recording_url": "https://storage.googleapis.com/...",
                "analysis": {}
            }),
        }],
        mapping_rules: rules(&[
            ("call_id", "call.call_id"),
            ("from", "call.from"),
            ("to", "call.to"),
            ("call_length", "call.duration_sec"),
            ("transcript", "artifacts.transcript"),
            ("recording_url", "artifacts.audio_recording_ref"),
        ]),
    }
}

/// Vapi.
#[must_use]
pub fn vapi() -> ProviderDescriptor {
    ProviderDescriptor {
        id: "vapi".to_string(),
        name: "Vapi".to_string(),
        company: "Vapi".to_string(),
        website: "https://vapi.ai".to_string(),
        docs_url: "https://docs.vapi.ai".to_string(),
        api_base_url: "https://api.vapi.ai".to_string(),
        status_page: Some("https://status.vapi.ai".to_string()),
        changelog_url: None,
        rss_feed: None,
        auth: AuthScheme::None,
        supported_events: BTreeSet::from([
            EventType::EndOfCallReport,
            EventType::StatusUpdate,
            EventType::ConversationUpdate,
        ]),
        schemas: vec![EventSchema {
            event_type: EventType::EndOfCallReport,
            required_fields: strings(&[
                "message.type",
                "message.call.id",
                "message.endedReason",
                "message.artifact",
            ]),
            optional_fields: strings(&[
                "message.artifact.transcript",
                "message.artifact.recording",
                "message.artifact.messages",
            ]),
            nested_objects: nested(&[
                ("message", &["type", "call", "endedReason", "artifact"]),
                ("call", &["id", "phoneNumber", "status"]),
                ("artifact", &["transcript", "recording", "messages"]),
            ]),
            example_payload: json!({
                "message": {
                    "type": "end-of-call-report",
                    "endedReason": "hangup",
                    "call": {"id": "call_123", "phoneNumber": "+1234567890"},
                    "artifact": {
                        "transcript": "AI: How can I help? User: What's the weather?",
                        "messages": [
                            {"role": "assistant", "message": "How can I help?"},
                            {"role": "user", "message": "What's the weather?"}
                        ]
                    }
                }
            }),
        }],
        mapping_rules: rules(&[
            ("message.call.id", "call.call_id"),
            ("message.endedReason", "outcomes.objective.disconnect_reason"),
            ("message.artifact.transcript", "artifacts.transcript"),
            ("message.artifact.recording", "artifacts.audio_recording_ref"),
            ("message.type", "audit.event_type"),
        ]),
    }
}

/// ElevenLabs conversational agents.
#[must_use]
pub fn elevenlabs() -> ProviderDescriptor {
    ProviderDescriptor {
        id: "elevenlabs".to_string(),
        name: "ElevenLabs".to_string(),
        company: "ElevenLabs".to_string(),
        website: "https://elevenlabs.io".to_string(),
        docs_url: "https://elevenlabs.io/docs".to_string(),
        api_base_url: "https://api.elevenlabs.io".to_string(),
        status_page: Some("https://status.elevenlabs.io".to_string()),
        changelog_url: None,
        rss_feed: Some("https://status.elevenlabs.io/feed.rss".to_string()),
        auth: AuthScheme::HmacSha256 {
            header: "elevenlabs-signature".to_string(),
            // US, EU, and Asia egress addresses.
            trusted_sources: strings(&[
                "34.67.146.145",
                "34.59.11.47",
                "35.204.38.71",
                "34.147.113.54",
                "35.185.187.110",
                "35.247.157.189",
            ]),
        },
        supported_events: BTreeSet::from([EventType::PostCallTranscription, EventType::PostCallAudio]),
        schemas: vec![EventSchema {
            event_type: EventType::PostCallTranscription,
            required_fields: strings(&[
                "type",
                "event_timestamp",
                "data.agent_id",
                "data.conversation_id",
                "data.transcript",
            ]),
            optional_fields: strings(&[
                "data.analysis",
                "data.metadata",
                "data.conversation_initiation_client_data",
            ]),
            nested_objects: nested(&[
                ("data", &["agent_id", "conversation_id", "transcript", "metadata", "analysis"]),
                ("transcript", &["role", "message", "time_in_call_secs"]),
                ("metadata", &["start_time_unix_secs", "call_duration_secs", "cost"]),
            ]),
            example_payload: json!({
                "type": "post_call_transcription",
                "event_timestamp": 1_739_537_297,
                "data": {
                    "agent_id": "xyz",
                    "conversation_id": "abc",
                    "transcript": [
                        {"role": "agent", "message": "Hello! How can I help?", "time_in_call_secs": 0}
                    ],
                    "metadata": {
                        "start_time_unix_secs": 1_739_537_297,
                        "call_duration_secs": 22,
                        "cost": 296
                    }
                }
            }),
        }],
        mapping_rules: rules(&[
            ("data.conversation_id", "call.call_id"),
            ("data.agent_id", "call.agent_id"),
            ("data.transcript", "artifacts.transcript"),
            ("data.metadata.start_time_unix_secs", "call.start_time"),
            ("data.metadata.call_duration_secs", "call.duration_sec"),
            ("type", "audit.event_type"),
        ]),
    }
}

/// OpenAI Realtime API.
#[must_use]
pub fn openai_realtime() -> ProviderDescriptor {
    ProviderDescriptor {
        id: "openai_realtime".to_string(),
        name: "OpenAI Realtime API".to_string(),
        company: "OpenAI".to_string(),
        website: "https://platform.openai.com".to_string(),
        docs_url: "https://platform.openai.com/docs/guides/realtime".to_string(),
        api_base_url: "https://api.openai.com/v1/realtime".to_string(),
        status_page: Some("https://status.openai.com".to_string()),
        changelog_url: None,
        rss_feed: None,
        auth: AuthScheme::None,
        supported_events: BTreeSet::from([
            EventType::StatusUpdate,
            EventType::ConversationUpdate,
            EventType::TranscriptUpdate,
        ]),
        schemas: vec![EventSchema {
            event_type: EventType::StatusUpdate,
            required_fields: strings(&["type", "event_id", "session"]),
            optional_fields: strings(&["previous_item_id", "item", "response"]),
            nested_objects: nested(&[
                ("session", &["id", "model", "instructions", "voice"]),
                ("item", &["id", "type", "status", "content"]),
            ]),
            example_payload: json!({
                "event_id": "event_1920",
                "type": "session.updated",
                "session": {
                    "id": "sess_001",
                    "model": "gpt-realtime",
                    "instructions": "You are a helpful assistant."
                }
            }),
        }],
        mapping_rules: rules(&[
            ("session.id", "call.session_id"),
            ("session.model", "call.model_used"),
            ("item.content.transcript", "artifacts.transcript"),
            ("event_id", "call.correlation_id"),
            ("type", "audit.event_type"),
        ]),
    }
}

/// Assistable AI.
#[must_use]
pub fn assistable() -> ProviderDescriptor {
    ProviderDescriptor {
        id: "assistable".to_string(),
        name: "Assistable AI".to_string(),
        company: "Assistable AI".to_string(),
        website: "https://assistable.ai".to_string(),
        docs_url: "https://docs.assistable.ai".to_string(),
        api_base_url: "https://api.assistable.ai".to_string(),
        status_page: Some("https://status.assistable.ai".to_string()),
        changelog_url: None,
        rss_feed: None,
        auth: AuthScheme::ApiKeyHeader { header: "Authorization".to_string() },
        supported_events: BTreeSet::from([
            EventType::CallEnded,
            EventType::PostCallTranscription,
            EventType::CallAnalyzed,
        ]),
        schemas: vec![EventSchema {
            event_type: EventType::CallEnded,
            required_fields: strings(&[
                "call_id",
                "call_type",
                "direction",
                "to",
                "from",
                "disconnection_reason",
                "call_completion",
                "assistant_task_completion",
                "call_time_ms",
                "call_time_seconds",
                "start_timestamp",
                "end_timestamp",
            ]),
            optional_fields: strings(&[
                "args",
                "metadata",
                "contact_id",
                "user_sentiment",
                "call_summary",
                "call_completion_reason",
                "recording_url",
                "full_transcript",
                "added_to_wallet",
                "extractions",
            ]),
            // args, metadata and extractions are configured per assistant.
            nested_objects: nested(&[
                ("args", &["contact_address_zip_code"]),
                ("metadata", &["contact_id", "location_id"]),
                ("extractions", &[]),
            ]),
            example_payload: json!({
                "args": {"contact_address_zip_code": "90210"},
                "metadata": {"contact_id": "contact_12345", "location_id": "loc_67890"},
                "call_id": "assistable_call_abc123",
                "call_type": "outbound_sales",
                "direction": "outbound",
                "to": "+1234567890",
                "from": "+1987654321",
                "contact_id": "contact_12345",
                "disconnection_reason": "completed",
                "user_sentiment": "positive",
                "call_summary": "Customer showed interest in premium package and requested more information",
                "call_completion": true,
                "call_completion_reason": "task_completed",
                "assistant_task_completion": true,
                "recording_url": "https://storage.assistable.ai/recordings/call_abc123.mp3",
                "call_time_ms": 185_000,
                "call_time_seconds": 185,
                "full_transcript": "Assistant: Hello! This is Sarah from Assistable AI. How are you today?\nCustomer: Hi Sarah, I'm doing well thanks.\nAssistant: Great! I'm calling about our premium AI assistant package...",
                "start_timestamp": 1_703_001_600,
                "end_timestamp": 1_703_001_785,
                "added_to_wallet": false,
                "extractions": {
                    "contact_zip_code": "90210",
                    "customer_interest_level": "high",
                    "next_followup_date": "2025-10-21",
                    "product_interest": "premium_package",
                    "budget_range": "$500-1000",
                    "decision_maker": true,
                    "purchase_timeline": "within_30_days"
                }
            }),
        }],
        mapping_rules: rules(&[
            ("call_id", "call.call_id"),
            ("direction", "call.channel"),
            ("to", "call.to"),
            ("from", "call.from"),
            ("start_timestamp", "call.start_time"),
            ("end_timestamp", "call.end_time"),
            ("call_time_seconds", "call.duration_sec"),
            ("full_transcript", "artifacts.transcript"),
            ("recording_url", "artifacts.audio_recording_ref"),
            ("call_summary", "hcr.summary"),
            ("user_sentiment", "outcomes.user_satisfaction_score"),
            ("call_completion", "outcomes.objective.metrics.task_completion"),
            ("assistant_task_completion", "outcomes.objective.metrics.assistant_success"),
            ("disconnection_reason", "outcomes.objective.status"),
            ("extractions", "custom.provider_specific.assistable.extractions"),
            ("args", "custom.provider_specific.assistable.call_args"),
            ("metadata", "custom.provider_specific.assistable.metadata"),
            ("contact_id", "call.caller_id"),
            ("call_type", "custom.provider_specific.assistable.call_type"),
        ]),
    }
}
