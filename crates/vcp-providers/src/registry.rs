// crates/vcp-providers/src/registry.rs
// ============================================================================
// Module: Provider Registry
// Description: Registry of provider descriptors with access policy checks.
// Purpose: Resolve providers by identifier, verify webhook credentials.
// Dependencies: serde, thiserror, vcp-core
// ============================================================================

//! ## Overview
//! The registry owns the provider descriptors known to one engine instance.
//! It is built once, then shared immutably (typically behind `Arc`). Lookups
//! are case-insensitive and filtered by a [`ProviderAccessPolicy`]; a denied
//! provider behaves exactly like an unknown one.
//!
//! Invariants:
//! - Provider identifiers are unique and match `[a-z0-9_]+`.
//! - Every mapping rule targets a writable v0.5 catalogue field.
//! - Insertion order is preserved for listings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use vcp_core::KnownProviders;
use vcp_core::Timestamp;
use vcp_core::schema::catalog;

use crate::audit::SignatureAuditEvent;
use crate::audit::SignatureAuditEventParams;
use crate::audit::VcpAuditSink;
use crate::catalog::builtin_descriptors;
use crate::descriptor::EventType;
use crate::descriptor::ProviderDescriptor;
use crate::signature::SignatureRejection;
use crate::signature::verify_signature;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when registering a provider descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Identifier already registered.
    #[error("provider already registered: {0}")]
    DuplicateProvider(String),
    /// Identifier is not lowercase alphanumeric with underscores.
    #[error("invalid provider id: {0:?}")]
    InvalidProviderId(String),
    /// Provider path is empty or has an empty segment.
    #[error("provider {provider}: invalid provider path {path:?}")]
    InvalidProviderPath {
        /// Provider identifier.
        provider: String,
        /// Offending path.
        path: String,
    },
    /// Provider path appears in more than one rule.
    #[error("provider {provider}: duplicate provider path {path}")]
    DuplicateProviderPath {
        /// Provider identifier.
        provider: String,
        /// Offending path.
        path: String,
    },
    /// Canonical path is not a writable catalogue field.
    #[error("provider {provider}: unknown canonical path {path}")]
    UnknownCanonicalPath {
        /// Provider identifier.
        provider: String,
        /// Offending path.
        path: String,
    },
}

// ============================================================================
// SECTION: Access Policy
// ============================================================================

/// Access policy controlling which providers resolve.
///
/// # Invariants
/// - `denylist` overrides `allowlist` when both are present.
/// - If `allowlist` is `None`, all providers are allowed unless denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAccessPolicy {
    /// Optional allowlist of provider identifiers.
    pub allowlist: Option<BTreeSet<String>>,
    /// Explicit denylist of provider identifiers.
    pub denylist: BTreeSet<String>,
}

impl ProviderAccessPolicy {
    /// Returns a policy that permits all providers.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self { allowlist: None, denylist: BTreeSet::new() }
    }

    /// Returns true when the provider is allowed by policy.
    #[must_use]
    pub fn is_allowed(&self, provider_id: &str) -> bool {
        if self.denylist.contains(provider_id) {
            return false;
        }
        self.allowlist.as_ref().is_none_or(|allowlist| allowlist.contains(provider_id))
    }
}

impl Default for ProviderAccessPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

// ============================================================================
// SECTION: Comparison Matrix
// ============================================================================

/// Feature summary of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    /// Display name.
    pub name: String,
    /// Operating company.
    pub company: String,
    /// Marketing site.
    pub website: String,
    /// Webhook documentation.
    pub docs_url: String,
    /// Whether a status page is published.
    pub has_status_page: bool,
    /// Whether a changelog is published.
    pub has_changelog: bool,
    /// Auth scheme label.
    pub webhook_auth_method: &'static str,
    /// Supported event labels.
    pub supported_events: Vec<&'static str>,
    /// Number of supported events.
    pub total_events: usize,
    /// Whether any mapping rule exists.
    pub has_vcp_mapping: bool,
    /// Number of mapping rules.
    pub mapping_fields: usize,
}

/// Provider groupings by feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureMatrix {
    /// Provider ids grouped by auth scheme label.
    pub auth_methods: BTreeMap<&'static str, Vec<String>>,
    /// Provider ids grouped by event label.
    pub events: BTreeMap<&'static str, Vec<String>>,
}

/// Cross-provider comparison report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonMatrix {
    /// Generation time.
    pub last_updated: Timestamp,
    /// Number of visible providers.
    pub total_providers: usize,
    /// Summaries keyed by provider id.
    pub providers: BTreeMap<String, ProviderSummary>,
    /// Feature groupings.
    pub feature_matrix: FeatureMatrix,
}

// ============================================================================
// SECTION: Provider Registry
// ============================================================================

/// Provider descriptor registry with policy enforcement.
///
/// # Invariants
/// - Provider identifiers are unique within the registry.
/// - Access policy is enforced on every lookup.
pub struct ProviderRegistry {
    /// Descriptors in registration order.
    providers: Vec<ProviderDescriptor>,
    /// Position of each descriptor by identifier.
    index: BTreeMap<String, usize>,
    /// Access control policy for provider usage.
    policy: ProviderAccessPolicy,
    /// Optional sink for signature check events.
    audit: Option<Arc<dyn VcpAuditSink>>,
}

impl ProviderRegistry {
    /// Creates an empty registry with the provided policy.
    #[must_use]
    pub const fn new(policy: ProviderAccessPolicy) -> Self {
        Self { providers: Vec::new(), index: BTreeMap::new(), policy, audit: None }
    }

    /// Creates a registry with the built-in providers registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a built-in descriptor is invalid.
    pub fn with_builtin_providers(policy: ProviderAccessPolicy) -> Result<Self, RegistryError> {
        let mut registry = Self::new(policy);
        for descriptor in builtin_descriptors() {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Attaches an audit sink for signature checks.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn VcpAuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Registers a provider descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the identifier is taken or invalid, or a
    /// mapping rule is malformed.
    pub fn register(&mut self, descriptor: ProviderDescriptor) -> Result<(), RegistryError> {
        validate_descriptor(&descriptor)?;
        if self.index.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateProvider(descriptor.id));
        }
        self.index.insert(descriptor.id.clone(), self.providers.len());
        self.providers.push(descriptor);
        Ok(())
    }

    /// Returns the descriptor for a provider, case-insensitively.
    ///
    /// Providers denied by policy are absent.
    #[must_use]
    pub fn get(&self, provider_id: &str) -> Option<&ProviderDescriptor> {
        let provider_id = provider_id.to_lowercase();
        if !self.policy.is_allowed(&provider_id) {
            return None;
        }
        self.index.get(&provider_id).and_then(|position| self.providers.get(*position))
    }

    /// Returns the visible providers supporting `event`, in registration order.
    #[must_use]
    pub fn list_by_event(&self, event: EventType) -> Vec<&ProviderDescriptor> {
        self.providers().filter(|descriptor| descriptor.supports(event)).collect()
    }

    /// Iterates the visible providers in registration order.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter().filter(|descriptor| self.policy.is_allowed(&descriptor.id))
    }

    /// Returns the configured policy.
    #[must_use]
    pub const fn policy(&self) -> &ProviderAccessPolicy {
        &self.policy
    }

    /// Verifies a webhook credential for a provider.
    ///
    /// Returns `false` for unknown or denied providers, empty secrets,
    /// malformed headers, and schemes without a local verifier.
    #[must_use]
    pub fn validate_signature(
        &self,
        provider_id: &str,
        raw_body: &[u8],
        signature_header: &str,
        secret: &str,
    ) -> bool {
        let descriptor = self.get(provider_id);
        let outcome = descriptor.map_or(Err(SignatureRejection::UnknownProvider), |descriptor| {
            verify_signature(&descriptor.auth, raw_body, signature_header, secret)
        });
        if let Some(audit) = &self.audit {
            audit.record_signature(&SignatureAuditEvent::new(SignatureAuditEventParams {
                provider_id: provider_id.to_string(),
                scheme: descriptor.map(|descriptor| descriptor.auth.label()),
                accepted: outcome.is_ok(),
                reason: outcome.err().map(SignatureRejection::as_str),
            }));
        }
        outcome.is_ok()
    }

    /// Builds the cross-provider comparison report.
    #[must_use]
    pub fn comparison_matrix(&self, generated_at: Timestamp) -> ComparisonMatrix {
        let mut providers = BTreeMap::new();
        let mut auth_methods: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        let mut events: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for descriptor in self.providers() {
            let supported_events: Vec<&'static str> =
                descriptor.supported_events.iter().map(|event| event.as_str()).collect();
            auth_methods.entry(descriptor.auth.label()).or_default().push(descriptor.id.clone());
            for event in &supported_events {
                events.entry(*event).or_default().push(descriptor.id.clone());
            }
            providers.insert(
                descriptor.id.clone(),
                ProviderSummary {
                    name: descriptor.name.clone(),
                    company: descriptor.company.clone(),
                    website: descriptor.website.clone(),
                    docs_url: descriptor.docs_url.clone(),
                    has_status_page: descriptor.status_page.is_some(),
                    has_changelog: descriptor.changelog_url.is_some(),
                    webhook_auth_method: descriptor.auth.label(),
                    total_events: supported_events.len(),
                    supported_events,
                    has_vcp_mapping: !descriptor.mapping_rules.is_empty(),
                    mapping_fields: descriptor.mapping_rules.len(),
                },
            );
        }
        ComparisonMatrix {
            last_updated: generated_at,
            total_providers: providers.len(),
            providers,
            feature_matrix: FeatureMatrix { auth_methods, events },
        }
    }
}

impl KnownProviders for ProviderRegistry {
    fn is_known(&self, provider_id: &str) -> bool {
        self.get(provider_id).is_some()
    }
}

// ============================================================================
// SECTION: Descriptor Validation
// ============================================================================

/// Checks identifier syntax and mapping-rule targets.
fn validate_descriptor(descriptor: &ProviderDescriptor) -> Result<(), RegistryError> {
    let id = &descriptor.id;
    let valid_id = !id.is_empty()
        && id.bytes().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_');
    if !valid_id {
        return Err(RegistryError::InvalidProviderId(id.clone()));
    }
    let mut seen = BTreeSet::new();
    for rule in &descriptor.mapping_rules {
        let path = &rule.provider_path;
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(RegistryError::InvalidProviderPath { provider: id.clone(), path: path.clone() });
        }
        if !seen.insert(path.as_str()) {
            return Err(RegistryError::DuplicateProviderPath {
                provider: id.clone(),
                path: path.clone(),
            });
        }
        if catalog::field_kind(&rule.canonical_path).is_none() {
            return Err(RegistryError::UnknownCanonicalPath {
                provider: id.clone(),
                path: rule.canonical_path.clone(),
            });
        }
    }
    Ok(())
}
