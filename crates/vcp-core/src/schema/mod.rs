// crates/vcp-core/src/schema/mod.rs
// ============================================================================
// Module: VCP Canonical Schema
// Description: Typed protocol documents for every schema generation.
// Purpose: Parse, dispatch, and serialize versioned VCP documents.
// Dependencies: crate::schema::{catalog, common, v03, v04, v05}, serde_json
// ============================================================================

//! ## Overview
//! A VCP document is `{ vcp_version, vcp_payload, audit }`. Consumers must
//! read `vcp_version` before interpreting section shape;
//! [`VersionedMessage::from_value`] performs that dispatch and returns the
//! typed generation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod common;
pub mod v03;
pub mod v04;
pub mod v05;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::SchemaVersion;
use crate::schema::v03::MessageV03;
use crate::schema::v04::MessageV04;
use crate::schema::v05::MessageV05;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when decoding a versioned document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Document has no string `vcp_version` field.
    #[error("document is missing vcp_version")]
    MissingVersion,
    /// Document declares an unknown generation.
    #[error("unsupported vcp_version: {0}")]
    UnsupportedVersion(String),
    /// Document does not match its declared generation.
    #[error("document does not match schema {version}: {message}")]
    Structure {
        /// Declared generation.
        version: SchemaVersion,
        /// Decoder message.
        message: String,
    },
    /// Document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialization(String),
}

// ============================================================================
// SECTION: Versioned Message
// ============================================================================

/// A protocol document of any supported generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VersionedMessage {
    /// Generation 0.3.
    V03(MessageV03),
    /// Generation 0.4.
    V04(MessageV04),
    /// Generation 0.5.
    V05(MessageV05),
}

impl VersionedMessage {
    /// Returns the generation of the wrapped document.
    #[must_use]
    pub const fn version(&self) -> SchemaVersion {
        match self {
            Self::V03(_) => SchemaVersion::V0_3,
            Self::V04(_) => SchemaVersion::V0_4,
            Self::V05(_) => SchemaVersion::V0_5,
        }
    }

    /// Returns the generation tag declared inside the document.
    #[must_use]
    pub const fn declared_version(&self) -> SchemaVersion {
        match self {
            Self::V03(message) => message.vcp_version,
            Self::V04(message) => message.vcp_version,
            Self::V05(message) => message.vcp_version,
        }
    }

    /// Reads the declared generation of a raw document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the tag is missing or unknown.
    pub fn peek_version(document: &Value) -> Result<SchemaVersion, DocumentError> {
        let label = document
            .get("vcp_version")
            .and_then(Value::as_str)
            .ok_or(DocumentError::MissingVersion)?;
        SchemaVersion::parse(label).ok_or_else(|| DocumentError::UnsupportedVersion(label.to_string()))
    }

    /// Decodes a raw document into its declared generation.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the tag is missing or unknown, or the
    /// document does not match the declared generation.
    pub fn from_value(document: Value) -> Result<Self, DocumentError> {
        let version = Self::peek_version(&document)?;
        let structure = |err: serde_json::Error| DocumentError::Structure {
            version,
            message: err.to_string(),
        };
        match version {
            SchemaVersion::V0_3 => serde_json::from_value(document).map(Self::V03).map_err(structure),
            SchemaVersion::V0_4 => serde_json::from_value(document).map(Self::V04).map_err(structure),
            SchemaVersion::V0_5 => serde_json::from_value(document).map(Self::V05).map_err(structure),
        }
    }

    /// Serializes the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialization`] when serialization fails.
    pub fn to_value(&self) -> Result<Value, DocumentError> {
        serde_json::to_value(self).map_err(|err| DocumentError::Serialization(err.to_string()))
    }
}

impl From<MessageV03> for VersionedMessage {
    fn from(message: MessageV03) -> Self {
        Self::V03(message)
    }
}

impl From<MessageV04> for VersionedMessage {
    fn from(message: MessageV04) -> Self {
        Self::V04(message)
    }
}

impl From<MessageV05> for VersionedMessage {
    fn from(message: MessageV05) -> Self {
        Self::V05(message)
    }
}
