// crates/vcp-providers/src/lib.rs
// ============================================================================
// Module: VCP Providers
// Description: Provider descriptors, registry, transforms, and the mapper.
// Purpose: Normalize voice-AI webhook payloads into VCP documents.
// Dependencies: vcp-core, serde, serde_json, hmac, sha2, subtle, thiserror
// ============================================================================

//! ## Overview
//! This crate ships the built-in provider catalogue (Retell, Bland, Vapi,
//! ElevenLabs, OpenAI Realtime, Assistable), a policy-filtered
//! [`ProviderRegistry`], the provider-keyed [`TransformTable`], and the
//! [`Mapper`] that turns one raw webhook payload into a v0.5 document.
//! Invariants:
//! - Provider branching happens only through [`TransformTable`] lookups.
//! - Webhook credentials are compared in constant time; unsupported schemes
//!   never accept.
//!
//! Security posture: webhook payloads and headers are untrusted; audit events
//! carry identifiers and counts only.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod descriptor;
pub mod mapper;
pub mod projections;
pub mod registry;
pub mod signature;
pub mod transforms;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::NormalizationAuditEvent;
pub use audit::SignatureAuditEvent;
pub use audit::StderrAuditSink;
pub use audit::VcpAuditSink;
pub use catalog::BUILTIN_PROVIDER_IDS;
pub use descriptor::AuthScheme;
pub use descriptor::EventSchema;
pub use descriptor::EventType;
pub use descriptor::MappingRule;
pub use descriptor::ProviderDescriptor;
pub use mapper::Mapper;
pub use mapper::MapperOptions;
pub use projections::Projection;
pub use registry::ComparisonMatrix;
pub use registry::ProviderAccessPolicy;
pub use registry::ProviderRegistry;
pub use registry::RegistryError;
pub use signature::SignatureRejection;
pub use signature::verify_signature;
pub use transforms::TransformTable;
pub use transforms::ValueTransform;

#[cfg(test)]
mod tests;
