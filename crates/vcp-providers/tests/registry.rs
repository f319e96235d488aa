// crates/vcp-providers/tests/registry.rs
// ============================================================================
// Module: Provider Registry Tests
// Description: Lookup, policy, registration, and comparison reporting.
// ============================================================================
//! ## Overview
//! Validates case-insensitive lookup, allowlist and denylist precedence,
//! descriptor validation on registration, and the comparison matrix.

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

use std::collections::BTreeSet;

use serde_json::json;
use vcp_core::KnownProviders;
use vcp_core::ValidationContext;
use vcp_core::validate_with;
use vcp_providers::BUILTIN_PROVIDER_IDS;
use vcp_providers::EventType;
use vcp_providers::MappingRule;
use vcp_providers::ProviderAccessPolicy;
use vcp_providers::ProviderRegistry;
use vcp_providers::RegistryError;
use vcp_providers::catalog::bland;
use vcp_providers::catalog::vapi;

use crate::common::example_payload;
use crate::common::fixed_mapper;
use crate::common::fixed_now;
use crate::common::registry_with;

// ============================================================================
// SECTION: Lookup and Policy
// ============================================================================

/// Tests built-in providers register in catalogue order.
#[test]
fn test_builtin_providers_registered_in_order() {
    let registry = registry_with(ProviderAccessPolicy::allow_all());
    let ids: Vec<&str> = registry.providers().map(|descriptor| descriptor.id.as_str()).collect();
    assert_eq!(ids, BUILTIN_PROVIDER_IDS.to_vec());
}

/// Tests lookup lowercases the requested identifier.
#[test]
fn test_lookup_is_case_insensitive() {
    let registry = registry_with(ProviderAccessPolicy::allow_all());
    assert_eq!(registry.get("RETELL").unwrap().id, "retell");
    assert_eq!(registry.get("OpenAI_Realtime").unwrap().id, "openai_realtime");
    assert!(registry.get("twilio").is_none());
}

/// Tests the denylist overrides the allowlist.
#[test]
fn test_denylist_overrides_allowlist() {
    let policy = ProviderAccessPolicy {
        allowlist: Some(BTreeSet::from(["retell".to_string(), "vapi".to_string()])),
        denylist: BTreeSet::from(["vapi".to_string()]),
    };
    assert!(policy.is_allowed("retell"));
    assert!(!policy.is_allowed("vapi"));
    assert!(!policy.is_allowed("bland"));

    let registry = registry_with(policy);
    assert!(registry.get("retell").is_some());
    assert!(registry.get("vapi").is_none());
    assert!(registry.get("bland").is_none());
    assert!(registry.is_known("retell"));
    assert!(!registry.is_known("vapi"));
}

/// Tests event listings follow insertion order and policy.
#[test]
fn test_list_by_event() {
    let registry = registry_with(ProviderAccessPolicy::allow_all());
    let ids: Vec<&str> = registry
        .list_by_event(EventType::CallEnded)
        .into_iter()
        .map(|descriptor| descriptor.id.as_str())
        .collect();
    assert_eq!(ids, vec!["retell", "bland", "assistable"]);

    let mut policy = ProviderAccessPolicy::allow_all();
    policy.denylist.insert("bland".to_string());
    let registry = registry_with(policy);
    let ids: Vec<&str> = registry
        .list_by_event(EventType::PostCallTranscription)
        .into_iter()
        .map(|descriptor| descriptor.id.as_str())
        .collect();
    assert_eq!(ids, vec!["elevenlabs", "assistable"]);
}

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Tests duplicate identifiers are rejected.
#[test]
fn test_register_rejects_duplicate_id() {
    let mut registry = ProviderRegistry::new(ProviderAccessPolicy::allow_all());
    registry.register(bland()).unwrap();
    assert_eq!(registry.register(bland()), Err(RegistryError::DuplicateProvider("bland".to_string())));
}

/// Tests identifiers must be lowercase alphanumeric with underscores.
#[test]
fn test_register_rejects_invalid_id() {
    let mut registry = ProviderRegistry::new(ProviderAccessPolicy::allow_all());
    for id in ["", "Bland", "bland-ai", "bland ai"] {
        let mut descriptor = bland();
        descriptor.id = id.to_string();
        assert_eq!(registry.register(descriptor), Err(RegistryError::InvalidProviderId(id.to_string())));
    }
}

/// Tests malformed and duplicate provider paths are rejected.
#[test]
fn test_register_rejects_bad_provider_paths() {
    let mut registry = ProviderRegistry::new(ProviderAccessPolicy::allow_all());

    let mut descriptor = vapi();
    descriptor.mapping_rules.push(MappingRule::new("message..id", "call.agent_id"));
    assert!(matches!(registry.register(descriptor), Err(RegistryError::InvalidProviderPath { .. })));

    let mut descriptor = vapi();
    descriptor.mapping_rules.push(MappingRule::new("message.call.id", "call.correlation_id"));
    assert_eq!(
        registry.register(descriptor),
        Err(RegistryError::DuplicateProviderPath {
            provider: "vapi".to_string(),
            path: "message.call.id".to_string(),
        })
    );
}

/// Tests canonical paths must name writable catalogue fields.
#[test]
fn test_register_rejects_unknown_canonical_path() {
    let mut registry = ProviderRegistry::new(ProviderAccessPolicy::allow_all());
    let mut descriptor = vapi();
    descriptor.mapping_rules.push(MappingRule::new("message.cost", "call.cost_usd"));
    assert_eq!(
        registry.register(descriptor),
        Err(RegistryError::UnknownCanonicalPath {
            provider: "vapi".to_string(),
            path: "call.cost_usd".to_string(),
        })
    );
    assert!(registry.get("vapi").is_none());
}

// ============================================================================
// SECTION: Schemas and Reports
// ============================================================================

/// Tests required fields are reported when absent from a payload.
#[test]
fn test_event_schema_missing_required() {
    let registry = registry_with(ProviderAccessPolicy::allow_all());
    let retell = registry.get("retell").unwrap();
    let schema = retell.schema_for(EventType::CallEnded).unwrap();
    assert!(schema.missing_required(&example_payload("retell")).is_empty());
    assert_eq!(
        schema.missing_required(&json!({"event": "call_ended", "call": {"call_id": "x"}})),
        vec![
            "call.from_number",
            "call.to_number",
            "call.direction",
            "call.start_timestamp",
            "call.end_timestamp",
            "call.disconnection_reason",
        ]
    );
    assert!(retell.schema_for(EventType::PostCallAudio).is_none());
}

/// Tests the comparison matrix summarizes visible providers.
#[test]
fn test_comparison_matrix() {
    let mut policy = ProviderAccessPolicy::allow_all();
    policy.denylist.insert("openai_realtime".to_string());
    let registry = registry_with(policy);
    let matrix = registry.comparison_matrix(fixed_now());

    assert_eq!(matrix.total_providers, 5);
    assert!(!matrix.providers.contains_key("openai_realtime"));
    let retell = &matrix.providers["retell"];
    assert_eq!(retell.webhook_auth_method, "signature_header");
    assert!(retell.has_status_page);
    assert!(retell.has_changelog);
    assert_eq!(retell.total_events, 3);
    assert_eq!(retell.mapping_fields, 10);
    assert!(retell.has_vcp_mapping);
    assert!(!matrix.providers["bland"].has_status_page);

    assert_eq!(matrix.feature_matrix.auth_methods["none"], vec!["vapi".to_string()]);
    assert_eq!(
        matrix.feature_matrix.events["call_ended"],
        vec!["retell".to_string(), "bland".to_string(), "assistable".to_string()]
    );

    let serialized = serde_json::to_value(&matrix).unwrap();
    assert_eq!(serialized["last_updated"], "2025-01-15T10:00:00Z");
    assert_eq!(serialized["providers"]["elevenlabs"]["webhook_auth_method"], "hmac_sha256");
}

/// Tests validation flags providers the registry does not know.
#[test]
fn test_registry_flags_unknown_provider_in_validation() {
    let registry = registry_with(ProviderAccessPolicy::allow_all());
    let mut message = fixed_mapper().map("bland", &example_payload("bland"));
    let context = ValidationContext::with_providers(&*registry);
    assert!(!validate_with(&message.clone().into(), &context).has_warning_at("vcp_payload.call.provider"));

    message.vcp_payload.call.provider = "twilio".to_string();
    let report = validate_with(&message.into(), &context);
    assert!(report.has_warning_at("vcp_payload.call.provider"));
}
