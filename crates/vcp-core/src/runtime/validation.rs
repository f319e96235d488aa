// crates/vcp-core/src/runtime/validation.rs
// ============================================================================
// Module: VCP Validation
// Description: Semantic validation of protocol documents of any generation.
// Purpose: Report errors and advisory warnings without mutating documents.
// Dependencies: crate::{core, interfaces, schema}, serde, serde_json
// ============================================================================

//! ## Overview
//! Validation runs after structural decoding and reports problems as data.
//! Errors mark documents that must not be trusted; warnings are advisory.
//! [`validate_document`] additionally checks raw JSON before decoding.
//!
//! Invariants:
//! - Validation never mutates its input.
//! - Score fields must lie in `[0, 1]`; NaN is out of range.
//! - Consent expiry is judged against `audit.received_at`, never a clock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::core::SchemaVersion;
use crate::core::Timestamp;
use crate::core::path;
use crate::interfaces::KnownProviders;
use crate::schema::VersionedMessage;
use crate::schema::common::ObjectiveOutcome;
use crate::schema::common::PerceivedOutcome;
use crate::schema::common::PerceptionGap;
use crate::schema::v03::MessageV03;
use crate::schema::v04::MessageV04;
use crate::schema::v05::Capability;
use crate::schema::v05::ConsentStatus;
use crate::schema::v05::MessageV05;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Allowed gap between `duration_sec` and `end_time - start_time`.
pub const DURATION_TOLERANCE_SECONDS: f64 = 1.0;

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Document path of the offending field.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

/// Result of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Errors; any error makes the document invalid.
    pub errors: Vec<ValidationIssue>,
    /// Advisory warnings.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when no errors were reported.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if any error is reported at `path`.
    #[must_use]
    pub fn has_error_at(&self, path: &str) -> bool {
        self.errors.iter().any(|issue| issue.path == path)
    }

    /// Returns true if any warning is reported at `path`.
    #[must_use]
    pub fn has_warning_at(&self, path: &str) -> bool {
        self.warnings.iter().any(|issue| issue.path == path)
    }

    /// Error messages in report order.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|issue| format!("{}: {}", issue.path, issue.message)).collect()
    }

    /// Records an error.
    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue { path: path.into(), message: message.into() });
    }

    /// Records a warning.
    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue { path: path.into(), message: message.into() });
    }

    /// Appends another report's findings.
    fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Optional collaborators consulted during validation.
#[derive(Clone, Copy, Default)]
pub struct ValidationContext<'a> {
    /// Provider catalogue used to flag unknown providers.
    pub providers: Option<&'a dyn KnownProviders>,
}

impl<'a> ValidationContext<'a> {
    /// Context that checks providers against `providers`.
    #[must_use]
    pub const fn with_providers(providers: &'a dyn KnownProviders) -> Self {
        Self { providers: Some(providers) }
    }
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Validates a typed document without optional collaborators.
#[must_use]
pub fn validate(message: &VersionedMessage) -> ValidationReport {
    validate_with(message, &ValidationContext::default())
}

/// Validates a typed document.
#[must_use]
pub fn validate_with(message: &VersionedMessage, context: &ValidationContext<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();
    if message.declared_version() != message.version() {
        report.error(
            "vcp_version",
            format!(
                "declared version {} does not match document shape {}",
                message.declared_version(),
                message.version()
            ),
        );
    }
    match message {
        VersionedMessage::V03(inner) => validate_v03(inner, &mut report),
        VersionedMessage::V04(inner) => validate_v04(inner, &mut report),
        VersionedMessage::V05(inner) => validate_v05(inner, &mut report),
    }
    if let Some(providers) = context.providers {
        let provider = provider_id(message);
        if !providers.is_known(provider) {
            report.warning("vcp_payload.call.provider", format!("unknown provider: {provider}"));
        }
    }
    report
}

/// Validates a raw JSON document, then its typed form.
#[must_use]
pub fn validate_document(document: &Value, context: &ValidationContext<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();
    let version = match VersionedMessage::peek_version(document) {
        Ok(version) => version,
        Err(err) => {
            report.error("vcp_version", err.to_string());
            return report;
        }
    };
    if !version.requires_consent_and_provenance() {
        for section in ["consent", "provenance"] {
            let section_path = format!("vcp_payload.{section}");
            if path::get(document, &section_path).is_some() {
                report.error(section_path, format!("section not allowed in schema {version}"));
            }
        }
    }
    match VersionedMessage::from_value(document.clone()) {
        Ok(message) => report.merge(validate_with(&message, context)),
        Err(err) => report.error("vcp_payload", err.to_string()),
    }
    report
}

// ============================================================================
// SECTION: Generation Checks
// ============================================================================

/// Checks a v0.3 document.
fn validate_v03(message: &MessageV03, report: &mut ValidationReport) {
    let call = &message.vcp_payload.call;
    check_audit_version(message.audit.schema_version, SchemaVersion::V0_3, report);
    check_identifier("vcp_payload.call.call_id", &call.call_id, report);
    check_identifier("vcp_payload.call.session_id", &call.session_id, report);
    check_timing(call.start_time, Some(call.end_time), Some(call.duration_sec), report);
    check_capability_names(call.capabilities_invoked.iter().map(String::as_str), report);
    let outcomes = &message.vcp_payload.outcomes;
    check_perceived(&outcomes.perceived, report);
    check_objective(&outcomes.objective, report);
    if let Some(gap) = &outcomes.perception_gap {
        check_gap(gap, report);
    }
}

/// Checks a v0.4 document.
fn validate_v04(message: &MessageV04, report: &mut ValidationReport) {
    let payload = &message.vcp_payload;
    let call = &payload.call;
    check_audit_version(message.audit.schema_version, SchemaVersion::V0_4, report);
    check_identifier("vcp_payload.call.call_id", &call.call_id, report);
    if let Some(session_id) = &call.session_id {
        check_identifier("vcp_payload.call.session_id", session_id, report);
    }
    check_timing(call.start_time, Some(call.end_time), Some(call.duration_sec), report);
    check_capability_names(call.capabilities_invoked.iter().map(String::as_str), report);
    check_perceived(&payload.outcomes.perceived, report);
    check_objective(&payload.outcomes.objective, report);
    if let Some(gap) = &payload.outcomes.perception_gap {
        check_gap(gap, report);
    }
    match &payload.consent {
        None => report.error("vcp_payload.consent", "consent section is required"),
        Some(consent) => {
            if consent.data_retention_days == 0 {
                report.error(
                    "vcp_payload.consent.data_retention_days",
                    "retention must be a positive number of days",
                );
            }
        }
    }
    match &payload.provenance {
        None => report.error("vcp_payload.provenance", "provenance section is required"),
        Some(provenance) => {
            check_source_system(&provenance.source_system, report);
            if let Some(score) = provenance.data_quality_score {
                check_unit("vcp_payload.provenance.data_quality_score", score, report);
            }
        }
    }
}

/// Checks a v0.5 document.
fn validate_v05(message: &MessageV05, report: &mut ValidationReport) {
    let payload = &message.vcp_payload;
    let call = &payload.call;
    check_audit_version(message.audit.schema_version, SchemaVersion::V0_5, report);
    check_identifier("vcp_payload.call.call_id", &call.call_id, report);
    check_identifier("vcp_payload.call.session_id", &call.session_id, report);
    check_timing(call.start_time, call.end_time, call.duration_sec, report);
    check_capability_names(call.capabilities_invoked.iter().map(Capability::id), report);
    for (index, capability) in call.capabilities_invoked.iter().enumerate() {
        if let Capability::Invocation(invocation) = capability
            && invocation.invoked_at < call.start_time
        {
            report.warning(
                format!("vcp_payload.call.capabilities_invoked.{index}.invoked_at"),
                "capability invoked before call start",
            );
        }
    }
    if call.channel.is_legacy_direction() {
        report.warning(
            "vcp_payload.call.channel",
            format!("legacy channel label {}; use direction", call.channel.as_str()),
        );
    }

    let outcomes = &payload.outcomes;
    check_perceived(&outcomes.perceived, report);
    check_objective(&outcomes.objective, report);
    check_gap(&outcomes.perception_gap, report);
    if let Some(score) = outcomes.user_satisfaction_score {
        check_unit("vcp_payload.outcomes.user_satisfaction_score", score, report);
    }

    match &payload.consent {
        None => report.error("vcp_payload.consent", "consent section is required"),
        Some(consent) => {
            match consent.status {
                ConsentStatus::Revoked => {
                    report.error("vcp_payload.consent.status", "consent has been revoked");
                }
                ConsentStatus::Expired => {
                    report.warning("vcp_payload.consent.status", "consent has expired");
                }
                ConsentStatus::Granted | ConsentStatus::Denied | ConsentStatus::Pending => {}
            }
            if consent.expires_at.is_some_and(|expires_at| expires_at < message.audit.received_at) {
                report.warning("vcp_payload.consent.expires_at", "consent expired before receipt");
            }
        }
    }
    match &payload.provenance {
        None => report.error("vcp_payload.provenance", "provenance section is required"),
        Some(provenance) => {
            check_source_system(&provenance.source_system, report);
            if let Some(score) = provenance.data_quality_score {
                check_unit("vcp_payload.provenance.data_quality_score", score, report);
            }
        }
    }

    if let Some(stored) = &message.audit.checksum {
        match message.compute_checksum() {
            Ok(computed) if computed == *stored => {}
            Ok(_) => report.error("audit.checksum", "checksum does not match document contents"),
            Err(err) => report.error("audit.checksum", err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Field Checks
// ============================================================================

/// Returns the provider id of any generation.
fn provider_id(message: &VersionedMessage) -> &str {
    match message {
        VersionedMessage::V03(inner) => &inner.vcp_payload.call.provider,
        VersionedMessage::V04(inner) => &inner.vcp_payload.call.provider,
        VersionedMessage::V05(inner) => &inner.vcp_payload.call.provider,
    }
}

/// Checks that `audit.schema_version` matches the document generation.
fn check_audit_version(declared: SchemaVersion, expected: SchemaVersion, report: &mut ValidationReport) {
    if declared != expected {
        report.error(
            "audit.schema_version",
            format!("audit declares {declared} but document is {expected}"),
        );
    }
}

/// Requires a non-empty identifier.
fn check_identifier(path: &str, value: &str, report: &mut ValidationReport) {
    if value.trim().is_empty() {
        report.error(path, "identifier must not be empty");
    }
}

/// Checks end ordering and duration consistency.
fn check_timing(
    start: Timestamp,
    end: Option<Timestamp>,
    duration: Option<f64>,
    report: &mut ValidationReport,
) {
    if let Some(end) = end
        && end < start
    {
        report.error("vcp_payload.call.end_time", "call ends before it starts");
    }
    if let Some(duration) = duration {
        if duration < 0.0 || duration.is_nan() {
            report.error("vcp_payload.call.duration_sec", "duration must not be negative");
        } else if let Some(end) = end
            && end >= start
            && (end.seconds_since(&start) - duration).abs() > DURATION_TOLERANCE_SECONDS
        {
            report.warning(
                "vcp_payload.call.duration_sec",
                "duration is inconsistent with start and end times",
            );
        }
    }
}

/// Requires non-empty capability ids.
fn check_capability_names<'a>(ids: impl Iterator<Item = &'a str>, report: &mut ValidationReport) {
    for (index, id) in ids.enumerate() {
        if id.trim().is_empty() {
            report.error(
                format!("vcp_payload.call.capabilities_invoked.{index}"),
                "capability identifier must not be empty",
            );
        }
    }
}

/// Checks perceived-outcome confidences.
fn check_perceived(perceived: &[PerceivedOutcome], report: &mut ValidationReport) {
    for (index, outcome) in perceived.iter().enumerate() {
        if let PerceivedOutcome::Assessment(assessment) = outcome
            && let Some(confidence) = assessment.confidence
        {
            check_unit(
                &format!("vcp_payload.outcomes.perceived.{index}.confidence"),
                confidence,
                report,
            );
        }
    }
}

/// Checks objective confidence and evidence references.
fn check_objective(objective: &ObjectiveOutcome, report: &mut ValidationReport) {
    if let Some(confidence) = objective.confidence {
        check_unit("vcp_payload.outcomes.objective.confidence", confidence, report);
    }
    for (index, criterion) in objective.scored_criteria.iter().enumerate() {
        let blank = criterion.evidence_ref.as_deref().is_none_or(|evidence| evidence.trim().is_empty());
        if blank {
            report.error(
                format!("vcp_payload.outcomes.objective.scored_criteria.{index}.evidence_ref"),
                "scored criterion requires an evidence reference",
            );
        }
    }
}

/// Checks the perception gap score.
fn check_gap(gap: &PerceptionGap, report: &mut ValidationReport) {
    check_unit("vcp_payload.outcomes.perception_gap.gap_score", gap.gap_score, report);
}

/// Requires a non-empty provenance source system.
fn check_source_system(source_system: &str, report: &mut ValidationReport) {
    if source_system.trim().is_empty() {
        report.error("vcp_payload.provenance.source_system", "source system must not be empty");
    }
}

/// Requires a value within `[0, 1]`.
fn check_unit(path: &str, value: f64, report: &mut ValidationReport) {
    if !(0.0..=1.0).contains(&value) {
        report.error(path, format!("score {value} is outside [0, 1]"));
    }
}
