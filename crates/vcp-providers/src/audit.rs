// crates/vcp-providers/src/audit.rs
// ============================================================================
// Module: Normalization Audit Logging
// Description: Structured audit events for mapping and signature checks.
// Purpose: Emit redacted JSON-lines audit records without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events describe what the engine did, never what it saw: identifiers,
//! counts, verdict labels and checksums only. Secrets, request bodies and raw
//! payloads are not recorded. Sinks are injected so hosts can route events to
//! their own logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event emitted after mapping one payload.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Requested provider identifier.
    pub provider_id: String,
    /// Whether the provider resolved to a descriptor.
    pub known_provider: bool,
    /// Rules whose value was written.
    pub rules_applied: usize,
    /// Rules whose provider path was absent or null.
    pub rules_skipped: usize,
    /// Rules whose value could not be coerced.
    pub values_dropped: usize,
    /// Resulting call identifier.
    pub call_id: String,
    /// Document checksum when computed.
    pub checksum: Option<String>,
}

/// Audit event emitted after a webhook signature check.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Requested provider identifier.
    pub provider_id: String,
    /// Auth scheme label when the provider resolved.
    pub scheme: Option<&'static str>,
    /// Verification verdict.
    pub accepted: bool,
    /// Rejection reason label when rejected.
    pub reason: Option<&'static str>,
}

/// Inputs for constructing a normalization audit event.
pub struct NormalizationAuditEventParams {
    /// Requested provider identifier.
    pub provider_id: String,
    /// Whether the provider resolved.
    pub known_provider: bool,
    /// Rules whose value was written.
    pub rules_applied: usize,
    /// Rules skipped for absent values.
    pub rules_skipped: usize,
    /// Values dropped by coercion.
    pub values_dropped: usize,
    /// Resulting call identifier.
    pub call_id: String,
    /// Document checksum.
    pub checksum: Option<String>,
}

/// Inputs for constructing a signature audit event.
pub struct SignatureAuditEventParams {
    /// Requested provider identifier.
    pub provider_id: String,
    /// Auth scheme label.
    pub scheme: Option<&'static str>,
    /// Verification verdict.
    pub accepted: bool,
    /// Rejection reason label.
    pub reason: Option<&'static str>,
}

/// Returns the current wall-clock time in epoch milliseconds.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl NormalizationAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: NormalizationAuditEventParams) -> Self {
        Self {
            event: "vcp_normalization",
            timestamp_ms: now_ms(),
            provider_id: params.provider_id,
            known_provider: params.known_provider,
            rules_applied: params.rules_applied,
            rules_skipped: params.rules_skipped,
            values_dropped: params.values_dropped,
            call_id: params.call_id,
            checksum: params.checksum,
        }
    }
}

impl SignatureAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: SignatureAuditEventParams) -> Self {
        Self {
            event: "vcp_signature_check",
            timestamp_ms: now_ms(),
            provider_id: params.provider_id,
            scheme: params.scheme,
            accepted: params.accepted,
            reason: params.reason,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for normalization events.
pub trait VcpAuditSink: Send + Sync {
    /// Record a normalization event.
    fn record_normalization(&self, event: &NormalizationAuditEvent);

    /// Record a signature check event.
    fn record_signature(&self, _event: &SignatureAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl VcpAuditSink for StderrAuditSink {
    fn record_normalization(&self, event: &NormalizationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_signature(&self, event: &SignatureAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }

    /// Appends one serialized event line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl VcpAuditSink for FileAuditSink {
    fn record_normalization(&self, event: &NormalizationAuditEvent) {
        self.append(event);
    }

    fn record_signature(&self, event: &SignatureAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl VcpAuditSink for NoopAuditSink {
    fn record_normalization(&self, _event: &NormalizationAuditEvent) {}

    fn record_signature(&self, _event: &SignatureAuditEvent) {}
}

/// Audit sink that keeps serialized events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<Value>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Stores one serialized event.
    fn push<T: Serialize>(&self, event: &T) {
        if let Ok(value) = serde_json::to_value(event)
            && let Ok(mut events) = self.events.lock()
        {
            events.push(value);
        }
    }
}

impl VcpAuditSink for MemoryAuditSink {
    fn record_normalization(&self, event: &NormalizationAuditEvent) {
        self.push(event);
    }

    fn record_signature(&self, event: &SignatureAuditEvent) {
        self.push(event);
    }
}
