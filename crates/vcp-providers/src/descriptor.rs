// crates/vcp-providers/src/descriptor.rs
// ============================================================================
// Module: Provider Descriptors
// Description: Static metadata, webhook auth, schemas, and mapping rules.
// Purpose: Describe one voice-AI provider's webhook contract.
// Dependencies: serde, serde_json, vcp-core
// ============================================================================

//! ## Overview
//! A [`ProviderDescriptor`] is immutable data: documentation links, the
//! webhook authentication scheme, supported events with example payloads,
//! and the ordered [`MappingRule`] list the mapper applies.
//!
//! Invariants:
//! - Provider paths are unique within a descriptor.
//! - Canonical paths name fields in the v0.5 catalogue.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use vcp_core::path;

// ============================================================================
// SECTION: Authentication
// ============================================================================

/// Webhook authentication scheme declared by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthScheme {
    /// Provider does not authenticate webhooks.
    None,
    /// `Authorization: Bearer <secret>`.
    #[serde(rename = "bearer_token")]
    Bearer {
        /// Header carrying the token.
        header: String,
    },
    /// Raw API key in a header.
    ApiKeyHeader {
        /// Header carrying the key.
        header: String,
    },
    /// `t=<ts>,v0=<hex>` HMAC-SHA256 over `<ts>.<body>`.
    HmacSha256 {
        /// Header carrying the signature.
        header: String,
        /// Source addresses published by the provider.
        #[serde(default)]
        trusted_sources: Vec<String>,
    },
    /// Vendor SDK signature scheme; never verified locally.
    SignatureHeader {
        /// Header carrying the signature.
        header: String,
        /// Source addresses published by the provider.
        #[serde(default)]
        trusted_sources: Vec<String>,
    },
}

impl AuthScheme {
    /// Returns the scheme label used in reports and audit events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer { .. } => "bearer_token",
            Self::ApiKeyHeader { .. } => "api_key_header",
            Self::HmacSha256 { .. } => "hmac_sha256",
            Self::SignatureHeader { .. } => "signature_header",
        }
    }

    /// Returns the header name carrying the credential, if any.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Bearer { header }
            | Self::ApiKeyHeader { header }
            | Self::HmacSha256 { header, .. }
            | Self::SignatureHeader { header, .. } => Some(header),
        }
    }
}

// ============================================================================
// SECTION: Events and Schemas
// ============================================================================

/// Webhook event types observed across providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Call started.
    CallStarted,
    /// Call ended.
    CallEnded,
    /// Post-call analysis available.
    CallAnalyzed,
    /// Post-call transcript available.
    PostCallTranscription,
    /// Post-call audio available.
    PostCallAudio,
    /// End-of-call report.
    EndOfCallReport,
    /// Status change.
    StatusUpdate,
    /// Conversation turn update.
    ConversationUpdate,
    /// Transcript fragment update.
    TranscriptUpdate,
}

impl EventType {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CallStarted => "call_started",
            Self::CallEnded => "call_ended",
            Self::CallAnalyzed => "call_analyzed",
            Self::PostCallTranscription => "post_call_transcription",
            Self::PostCallAudio => "post_call_audio",
            Self::EndOfCallReport => "end_of_call_report",
            Self::StatusUpdate => "status_update",
            Self::ConversationUpdate => "conversation_update",
            Self::TranscriptUpdate => "transcript_update",
        }
    }
}

/// Documented payload shape for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSchema {
    /// Event this schema describes.
    pub event_type: EventType,
    /// Dotted paths that must be present.
    pub required_fields: Vec<String>,
    /// Dotted paths that may be present.
    #[serde(default)]
    pub optional_fields: Vec<String>,
    /// Known keys of nested objects.
    #[serde(default)]
    pub nested_objects: BTreeMap<String, Vec<String>>,
    /// Representative payload.
    pub example_payload: Value,
}

impl EventSchema {
    /// Returns required fields absent from `payload`, in declaration order.
    #[must_use]
    pub fn missing_required<'a>(&'a self, payload: &Value) -> Vec<&'a str> {
        self.required_fields
            .iter()
            .map(String::as_str)
            .filter(|field| path::get(payload, field).is_none())
            .collect()
    }
}

// ============================================================================
// SECTION: Mapping Rules
// ============================================================================

/// Association of a provider payload path with a canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Dotted path into the provider payload.
    pub provider_path: String,
    /// Section-relative canonical path (e.g. `call.start_time`).
    pub canonical_path: String,
}

impl MappingRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(provider_path: impl Into<String>, canonical_path: impl Into<String>) -> Self {
        Self { provider_path: provider_path.into(), canonical_path: canonical_path.into() }
    }
}

// ============================================================================
// SECTION: Descriptor
// ============================================================================

/// Complete description of one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Lowercase provider identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Operating company.
    pub company: String,
    /// Marketing site.
    pub website: String,
    /// Documentation root.
    pub docs_url: String,
    /// API base URL.
    pub api_base_url: String,
    /// Status page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_page: Option<String>,
    /// Changelog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_url: Option<String>,
    /// Status RSS feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_feed: Option<String>,
    /// Webhook authentication scheme.
    pub auth: AuthScheme,
    /// Supported webhook events.
    pub supported_events: BTreeSet<EventType>,
    /// Documented event payloads.
    #[serde(default)]
    pub schemas: Vec<EventSchema>,
    /// Ordered mapping rules.
    #[serde(default)]
    pub mapping_rules: Vec<MappingRule>,
}

impl ProviderDescriptor {
    /// Returns true when the provider emits `event`.
    #[must_use]
    pub fn supports(&self, event: EventType) -> bool {
        self.supported_events.contains(&event)
    }

    /// Returns the documented schema for `event`, if any.
    #[must_use]
    pub fn schema_for(&self, event: EventType) -> Option<&EventSchema> {
        self.schemas.iter().find(|schema| schema.event_type == event)
    }
}
