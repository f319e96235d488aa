// crates/vcp-providers/src/mapper.rs
// ============================================================================
// Module: Webhook Mapper
// Description: Normalizes provider webhook payloads into v0.5 documents.
// Purpose: Apply mapping rules, transforms, and deterministic defaults.
// Dependencies: serde_json, vcp-core
// ============================================================================

//! ## Overview
//! [`Mapper::map`] turns one raw provider payload into a structurally
//! complete [`MessageV05`]. Missing data never fails the call: absent fields
//! are skipped, values that cannot be coerced are dropped, and required
//! fields are synthesized from the injected [`Clock`] and [`IdSource`].
//!
//! Invariants:
//! - With a fixed clock and id source, output is byte-identical across calls.
//! - Unknown or denied providers yield a default document with an empty
//!   `call_id`.
//! - Rule writes are last-writer-wins per canonical path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use serde_json::json;
use vcp_core::Clock;
use vcp_core::IdSource;
use vcp_core::MessageV05;
use vcp_core::RandomIdSource;
use vcp_core::SchemaVersion;
use vcp_core::SystemClock;
use vcp_core::Timestamp;
use vcp_core::path;
use vcp_core::schema::catalog;
use vcp_core::schema::common::Hcr;
use vcp_core::schema::common::ModelSelection;
use vcp_core::schema::common::OutcomeStatus;
use vcp_core::schema::common::synthesize_session_id;
use vcp_core::schema::v05::ArtifactsV05;
use vcp_core::schema::v05::AuditV05;
use vcp_core::schema::v05::CallV05;
use vcp_core::schema::v05::ChannelType;
use vcp_core::schema::v05::ConsentRecord;
use vcp_core::schema::v05::ConsentStatus;
use vcp_core::schema::v05::Custom;
use vcp_core::schema::v05::OutcomesV05;
use vcp_core::schema::v05::PayloadV05;
use vcp_core::schema::v05::Provenance;

use crate::audit::NoopAuditSink;
use crate::audit::NormalizationAuditEvent;
use crate::audit::NormalizationAuditEventParams;
use crate::audit::VcpAuditSink;
use crate::descriptor::ProviderDescriptor;
use crate::registry::ProviderRegistry;
use crate::transforms::TransformTable;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Canonical call identifier path.
const CALL_ID_PATH: &str = "call.call_id";
/// Canonical session identifier path.
const SESSION_ID_PATH: &str = "call.session_id";
/// Canonical start time path.
const START_TIME_PATH: &str = "call.start_time";
/// Canonical end time path.
const END_TIME_PATH: &str = "call.end_time";
/// Canonical duration path.
const DURATION_PATH: &str = "call.duration_sec";
/// Paths resolved before assembly; their writes are already in the skeleton.
const RESOLVED_PATHS: [&str; 5] =
    [CALL_ID_PATH, SESSION_ID_PATH, START_TIME_PATH, END_TIME_PATH, DURATION_PATH];
/// Consent purposes assumed for webhook-delivered calls.
const DEFAULT_CONSENT_SCOPE: [&str; 2] = ["recording", "analytics"];
/// Consent text version.
const DEFAULT_CONSENT_VERSION: &str = "1.0";
/// Retention policy label for webhook-delivered calls.
const DEFAULT_RETENTION_POLICY: &str = "standard_30_days";

// ============================================================================
// SECTION: Options
// ============================================================================

/// Mapper behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperOptions {
    /// Whether `audit.checksum` is computed for each document.
    pub compute_checksum: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self { compute_checksum: true }
    }
}

// ============================================================================
// SECTION: Mapper
// ============================================================================

/// Coerced value destined for one canonical field.
struct RuleWrite {
    /// Section-relative canonical path.
    canonical_path: String,
    /// Coerced value.
    value: Value,
}

/// Rule outcome counters for auditing.
#[derive(Debug, Clone, Copy, Default)]
struct RuleStats {
    /// Values written.
    applied: usize,
    /// Provider paths absent or null.
    skipped: usize,
    /// Values dropped by coercion or assembly.
    dropped: usize,
}

/// Resolved identity and timing of one call.
struct CallFrame {
    /// Call identifier.
    call_id: String,
    /// Session identifier.
    session_id: String,
    /// Call start.
    start: Timestamp,
    /// Call end.
    end: Option<Timestamp>,
    /// Duration in seconds.
    duration: Option<f64>,
}

/// Provider payload normalizer.
///
/// # Invariants
/// - The registry and transform table are immutable once shared.
/// - Collaborators are `Send + Sync`; a mapper may serve concurrent callers.
pub struct Mapper {
    /// Provider descriptors and access policy.
    registry: Arc<ProviderRegistry>,
    /// Value transforms and projections.
    transforms: Arc<TransformTable>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Identifier source for missing call ids.
    ids: Arc<dyn IdSource>,
    /// Normalization audit sink.
    audit: Arc<dyn VcpAuditSink>,
    /// Behavior switches.
    options: MapperOptions,
}

impl Mapper {
    /// Creates a mapper with the system clock, random ids, and no auditing.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, transforms: Arc<TransformTable>) -> Self {
        Self {
            registry,
            transforms,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIdSource),
            audit: Arc::new(NoopAuditSink),
            options: MapperOptions::default(),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the identifier source.
    #[must_use]
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn VcpAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the behavior switches.
    #[must_use]
    pub const fn with_options(mut self, options: MapperOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the provider registry.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Returns the behavior switches.
    #[must_use]
    pub const fn options(&self) -> MapperOptions {
        self.options
    }

    /// Normalizes one raw provider payload.
    #[must_use]
    pub fn map(&self, provider_id: &str, raw_payload: &Value) -> MessageV05 {
        let now = self.clock.now();
        let Some(descriptor) = self.registry.get(provider_id) else {
            let frame = CallFrame {
                call_id: String::new(),
                session_id: String::new(),
                start: now,
                end: None,
                duration: None,
            };
            let message = self.finish(skeleton(&provider_id.to_lowercase(), &frame, now));
            self.record(provider_id, false, RuleStats::default(), &message);
            return message;
        };
        let provider = descriptor.id.as_str();
        let (writes, mut stats) = self.collect_writes(descriptor, raw_payload);
        let frame = self.resolve_frame(provider, &writes, now);

        let mut base = skeleton(provider, &frame, now);
        base.vcp_payload
            .custom
            .provider_specific
            .insert(provider.to_string(), json!({ "data": raw_payload }));
        let (message, rejected) = self.assemble(base, provider, raw_payload, &writes);
        stats.applied = writes.len().saturating_sub(rejected);
        stats.dropped += rejected;

        let message = self.finish(message);
        self.record(provider_id, true, stats, &message);
        message
    }

    /// Reads, transforms, and coerces every rule value.
    fn collect_writes(
        &self,
        descriptor: &ProviderDescriptor,
        payload: &Value,
    ) -> (Vec<RuleWrite>, RuleStats) {
        let mut writes = Vec::new();
        let mut stats = RuleStats::default();
        for rule in &descriptor.mapping_rules {
            let Some(value) = path::get(payload, &rule.provider_path).filter(|value| !value.is_null())
            else {
                stats.skipped += 1;
                continue;
            };
            let value = self
                .transforms
                .value_transform(&descriptor.id, &rule.canonical_path)
                .map_or_else(|| value.clone(), |transform| transform.apply(value));
            let coerced = catalog::field_kind(&rule.canonical_path)
                .and_then(|kind| catalog::coerce(kind, value));
            match coerced {
                Some(value) => {
                    writes.push(RuleWrite { canonical_path: rule.canonical_path.clone(), value });
                }
                None => stats.dropped += 1,
            }
        }
        (writes, stats)
    }

    /// Resolves identifiers and timing, synthesizing what is missing.
    fn resolve_frame(&self, provider: &str, writes: &[RuleWrite], now: Timestamp) -> CallFrame {
        let call_id = written_text(writes, CALL_ID_PATH).map_or_else(|| self.ids.next_id(), str::to_string);
        let session_id = written_text(writes, SESSION_ID_PATH)
            .map_or_else(|| synthesize_session_id(provider, &call_id), str::to_string);
        let start = written_timestamp(writes, START_TIME_PATH).unwrap_or(now);
        let written_end = written_timestamp(writes, END_TIME_PATH);
        let written_duration = written(writes, DURATION_PATH).and_then(Value::as_f64);
        let end = written_end
            .or_else(|| written_duration.and_then(|duration| start.checked_add_seconds(duration)));
        let duration = written_duration.or_else(|| {
            written_end.map(|end| end.seconds_since(&start)).filter(|duration| *duration >= 0.0)
        });
        CallFrame { call_id, session_id, start, end, duration }
    }

    /// Layers projections and rule writes over the skeleton.
    ///
    /// Returns the message and the number of writes it could not absorb.
    fn assemble(
        &self,
        base: MessageV05,
        provider: &str,
        payload: &Value,
        writes: &[RuleWrite],
    ) -> (MessageV05, usize) {
        let Ok(mut document) = serde_json::to_value(&base) else {
            return (base, writes.len());
        };
        for (canonical_path, projection) in self.transforms.projections(provider) {
            merge_at(&mut document, &catalog::document_path(canonical_path), projection.apply(payload));
        }
        let pending: Vec<&RuleWrite> = writes
            .iter()
            .filter(|write| !RESOLVED_PATHS.contains(&write.canonical_path.as_str()))
            .collect();

        let mut candidate = document.clone();
        for write in &pending {
            path::set(&mut candidate, &catalog::document_path(&write.canonical_path), write.value.clone());
        }
        if let Ok(message) = serde_json::from_value::<MessageV05>(candidate) {
            return (message, 0);
        }

        let mut rejected = 0;
        for write in pending {
            let mut trial = document.clone();
            path::set(&mut trial, &catalog::document_path(&write.canonical_path), write.value.clone());
            if serde_json::from_value::<MessageV05>(trial.clone()).is_ok() {
                document = trial;
            } else {
                rejected += 1;
            }
        }
        let message = serde_json::from_value(document).unwrap_or(base);
        (message, rejected)
    }

    /// Applies cross-section consistency and the optional checksum.
    fn finish(&self, mut message: MessageV05) -> MessageV05 {
        message.vcp_payload.hcr.outcome_status = message.vcp_payload.outcomes.objective.status;
        if self.options.compute_checksum {
            message.audit.checksum = message.compute_checksum().ok();
        }
        message
    }

    /// Emits the normalization audit event.
    fn record(&self, provider_id: &str, known_provider: bool, stats: RuleStats, message: &MessageV05) {
        self.audit.record_normalization(&NormalizationAuditEvent::new(
            NormalizationAuditEventParams {
                provider_id: provider_id.to_string(),
                known_provider,
                rules_applied: stats.applied,
                rules_skipped: stats.skipped,
                values_dropped: stats.dropped,
                call_id: message.vcp_payload.call.call_id.clone(),
                checksum: message.audit.checksum.clone(),
            },
        ));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the last value written to a canonical path.
fn written<'a>(writes: &'a [RuleWrite], canonical_path: &str) -> Option<&'a Value> {
    writes.iter().rev().find(|write| write.canonical_path == canonical_path).map(|write| &write.value)
}

/// Returns a non-empty text value written to a canonical path.
fn written_text<'a>(writes: &'a [RuleWrite], canonical_path: &str) -> Option<&'a str> {
    written(writes, canonical_path).and_then(Value::as_str).filter(|text| !text.is_empty())
}

/// Returns a timestamp written to a canonical path.
fn written_timestamp(writes: &[RuleWrite], canonical_path: &str) -> Option<Timestamp> {
    written(writes, canonical_path).and_then(Value::as_str).and_then(|text| Timestamp::parse(text).ok())
}

/// Object-merges `value` into the document at `document_path`.
fn merge_at(document: &mut Value, document_path: &str, value: Value) {
    let merged = match (path::get(document, document_path), value) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            let mut merged = existing.clone();
            merged.extend(incoming);
            Value::Object(merged)
        }
        (_, value) => value,
    };
    path::set(document, document_path, merged);
}

/// Builds the default document for a provider and resolved call frame.
fn skeleton(provider: &str, frame: &CallFrame, now: Timestamp) -> MessageV05 {
    let call = CallV05 {
        call_id: frame.call_id.clone(),
        session_id: frame.session_id.clone(),
        provider: provider.to_string(),
        start_time: frame.start,
        end_time: frame.end,
        duration_sec: frame.duration,
        parent_session_id: None,
        correlation_id: None,
        channel: ChannelType::default(),
        direction: None,
        from: None,
        to: None,
        caller_id: None,
        agent_id: None,
        model_used: None,
        geographic_region: None,
        capabilities_invoked: Vec::new(),
        purpose_contract: None,
    };
    let consent = ConsentRecord {
        consent_id: format!("consent_{}", frame.call_id),
        status: ConsentStatus::Granted,
        granted_at: None,
        expires_at: None,
        scope: DEFAULT_CONSENT_SCOPE.iter().map(ToString::to_string).collect(),
        version: DEFAULT_CONSENT_VERSION.to_string(),
        method: None,
        data_retention_days: None,
        sharing_allowed: None,
        anonymization_required: None,
        user_agent: None,
        ip_address_hash: None,
    };
    let provenance = Provenance {
        source_system: format!("{provider}_webhook_api"),
        created_at: now,
        created_by: format!("{provider}_webhook_processor"),
        transformation_history: vec![
            format!("received_from_{provider}_webhook"),
            "mapped_to_vcp_v0.5".to_string(),
        ],
        data_retention_policy: Some(DEFAULT_RETENTION_POLICY.to_string()),
        compliance_flags: Vec::new(),
        data_quality_score: None,
    };
    MessageV05 {
        vcp_version: SchemaVersion::V0_5,
        vcp_payload: PayloadV05 {
            call,
            model_selection: ModelSelection::provider_default(provider, now),
            outcomes: OutcomesV05::default(),
            hcr: Hcr::provider_default(provider, OutcomeStatus::default()),
            artifacts: ArtifactsV05::default(),
            custom: Custom::default(),
            consent: Some(consent),
            provenance: Some(provenance),
        },
        audit: AuditV05 {
            received_at: now,
            schema_version: SchemaVersion::V0_5,
            processed_at: None,
            processing_duration_ms: None,
            validation_errors: Vec::new(),
            checksum: None,
            event_type: None,
        },
    }
}
