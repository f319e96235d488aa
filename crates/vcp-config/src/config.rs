// crates/vcp-config/src/config.rs
// ============================================================================
// Module: VCP Normalizer Configuration
// Description: Configuration loading, validation, and engine wiring.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: vcp-core, vcp-providers, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to the engine defaults. Invalid
//! values fail closed: the engine is never built from a config that did not
//! pass [`NormalizerConfig::validate`].
//!
//! Invariants:
//! - Provider identifiers in allow and deny lists use the registry id
//!   alphabet (`[a-z0-9_]`).
//! - A `file` audit sink always carries a path; other sinks never do.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use vcp_core::VersioningPolicy;
use vcp_core::runtime::versioning::DEFAULT_DATA_QUALITY_SCORE;
use vcp_core::runtime::versioning::DEFAULT_RETENTION_DAYS;
use vcp_providers::FileAuditSink;
use vcp_providers::Mapper;
use vcp_providers::MapperOptions;
use vcp_providers::NoopAuditSink;
use vcp_providers::ProviderAccessPolicy;
use vcp_providers::ProviderRegistry;
use vcp_providers::StderrAuditSink;
use vcp_providers::TransformTable;
use vcp_providers::VcpAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "vcp.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "VCP_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of entries in a provider allow or deny list.
pub(crate) const MAX_PROVIDER_LIST_ENTRIES: usize = 256;
/// Maximum length of a provider identifier.
pub(crate) const MAX_PROVIDER_ID_LENGTH: usize = 64;
/// Smallest accepted retention for inferred consent.
pub(crate) const MIN_RETENTION_DAYS: u32 = 1;
/// Largest accepted retention for inferred consent.
pub(crate) const MAX_RETENTION_DAYS: u32 = 3650;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Normalization engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NormalizerConfig {
    /// Mapper behavior.
    #[serde(default)]
    pub mapper: MapperConfig,
    /// Audit event destination.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Provider access lists.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Defaults used when upgrades invent sections.
    #[serde(default)]
    pub versioning: VersioningConfig,
}

impl NormalizerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is `path` when given, else `$VCP_CONFIG`, else `vcp.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audit.validate()?;
        self.providers.validate()?;
        self.versioning.validate()?;
        Ok(())
    }

    /// Returns the provider access policy described by `[providers]`.
    #[must_use]
    pub fn access_policy(&self) -> ProviderAccessPolicy {
        self.providers.access_policy()
    }

    /// Returns the versioning defaults described by `[versioning]`.
    #[must_use]
    pub const fn versioning_policy(&self) -> VersioningPolicy {
        VersioningPolicy {
            default_retention_days: self.versioning.default_retention_days,
            default_data_quality_score: self.versioning.default_data_quality_score,
        }
    }

    /// Returns the mapper switches described by `[mapper]`.
    #[must_use]
    pub const fn mapper_options(&self) -> MapperOptions {
        MapperOptions { compute_checksum: self.mapper.compute_checksum }
    }

    /// Opens the audit sink described by `[audit]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened, or
    /// [`ConfigError::Invalid`] when a file sink has no path.
    pub fn build_audit_sink(&self) -> Result<Arc<dyn VcpAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for file sink".to_string())
                })?;
                let sink = FileAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }

    /// Builds a production mapper from this configuration.
    ///
    /// The mapper uses the built-in providers filtered by the access policy,
    /// the built-in transform table, the system clock, random identifiers,
    /// and the configured audit sink for both normalization and signature
    /// events.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit sink cannot be opened or the
    /// built-in catalogue fails registration.
    pub fn build_mapper(&self) -> Result<Mapper, ConfigError> {
        let sink = self.build_audit_sink()?;
        let registry = ProviderRegistry::with_builtin_providers(self.access_policy())
            .map_err(|err| ConfigError::Invalid(err.to_string()))?
            .with_audit_sink(Arc::clone(&sink));
        let mapper = Mapper::new(Arc::new(registry), Arc::new(TransformTable::builtin()))
            .with_audit_sink(sink)
            .with_options(self.mapper_options());
        Ok(mapper)
    }
}

/// Mapper configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MapperConfig {
    /// Whether documents carry `audit.checksum`.
    #[serde(default = "default_compute_checksum")]
    pub compute_checksum: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self { compute_checksum: default_compute_checksum() }
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// Append-only JSON lines file.
    File,
}

/// Audit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates sink and path pairing.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

/// Provider access configuration.
///
/// # Invariants
/// - `denylist` overrides `allowlist` when both name a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProvidersConfig {
    /// Optional allowlist; absent allows every provider not denied.
    #[serde(default)]
    pub allowlist: Option<Vec<String>>,
    /// Providers that never resolve.
    #[serde(default)]
    pub denylist: Vec<String>,
}

impl ProvidersConfig {
    /// Validates list sizes and identifier syntax.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(allowlist) = &self.allowlist {
            validate_provider_list("providers.allowlist", allowlist)?;
        }
        validate_provider_list("providers.denylist", &self.denylist)
    }

    /// Converts the lists into a registry access policy.
    #[must_use]
    pub fn access_policy(&self) -> ProviderAccessPolicy {
        ProviderAccessPolicy {
            allowlist: self
                .allowlist
                .as_ref()
                .map(|allowlist| allowlist.iter().cloned().collect::<BTreeSet<_>>()),
            denylist: self.denylist.iter().cloned().collect(),
        }
    }
}

/// Versioning defaults configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VersioningConfig {
    /// Retention days for consent inferred during upgrade.
    #[serde(default = "default_retention_days")]
    pub default_retention_days: u32,
    /// Data quality score for provenance inferred during upgrade.
    #[serde(default = "default_data_quality_score")]
    pub default_data_quality_score: f64,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            default_retention_days: default_retention_days(),
            default_data_quality_score: default_data_quality_score(),
        }
    }
}

impl VersioningConfig {
    /// Validates retention and quality ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RETENTION_DAYS ..= MAX_RETENTION_DAYS).contains(&self.default_retention_days) {
            return Err(ConfigError::Invalid(format!(
                "versioning.default_retention_days must be between {MIN_RETENTION_DAYS} and \
                 {MAX_RETENTION_DAYS}"
            )));
        }
        let score = self.default_data_quality_score;
        if !score.is_finite() || !(0.0 ..= 1.0).contains(&score) {
            return Err(ConfigError::Invalid(
                "versioning.default_data_quality_score must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening the audit file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default for `mapper.compute_checksum`.
const fn default_compute_checksum() -> bool {
    true
}

/// Default for `versioning.default_retention_days`.
const fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

/// Default for `versioning.default_data_quality_score`.
const fn default_data_quality_score() -> f64 {
    DEFAULT_DATA_QUALITY_SCORE
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument, environment, or default.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
pub(crate) fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
pub(crate) fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a provider allow or deny list.
fn validate_provider_list(field: &str, entries: &[String]) -> Result<(), ConfigError> {
    if entries.len() > MAX_PROVIDER_LIST_ENTRIES {
        return Err(ConfigError::Invalid(format!("{field} has too many entries")));
    }
    let mut seen = BTreeSet::new();
    for entry in entries {
        validate_provider_id(field, entry)?;
        if !seen.insert(entry.as_str()) {
            return Err(ConfigError::Invalid(format!("{field} contains duplicate {entry}")));
        }
    }
    Ok(())
}

/// Validates a provider identifier against the registry id alphabet.
pub(crate) fn validate_provider_id(field: &str, provider_id: &str) -> Result<(), ConfigError> {
    if provider_id.is_empty() || provider_id.len() > MAX_PROVIDER_ID_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} entries must be 1 to {MAX_PROVIDER_ID_LENGTH} characters"
        )));
    }
    let valid = provider_id
        .bytes()
        .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_');
    if !valid {
        return Err(ConfigError::Invalid(format!(
            "{field} entry {provider_id} must use lowercase letters, digits, or underscores"
        )));
    }
    Ok(())
}
