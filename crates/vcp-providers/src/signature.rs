// crates/vcp-providers/src/signature.rs
// ============================================================================
// Module: Webhook Signature Verification
// Description: Verifies provider webhook credentials per auth scheme.
// Purpose: Reject unauthenticated webhook deliveries before normalization.
// Dependencies: hmac, sha2, subtle, vcp-core
// ============================================================================

//! ## Overview
//! Verification is a boolean decision with a typed rejection reason for
//! auditing. Every credential comparison runs in constant time.
//!
//! Invariants:
//! - Schemes without a local verifier never accept.
//! - Empty secrets never accept.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use vcp_core::hashing::hex_encode;

use crate::descriptor::AuthScheme;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix of bearer credentials.
const BEARER_PREFIX: &str = "Bearer ";
/// Timestamp component key in HMAC signature headers.
const TIMESTAMP_KEY: &str = "t";
/// Digest component key in HMAC signature headers.
const DIGEST_KEY: &str = "v0";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Reason a webhook credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRejection {
    /// Provider is unknown or denied by policy.
    UnknownProvider,
    /// Scheme has no local verifier.
    UnsupportedScheme,
    /// Shared secret is empty.
    MissingSecret,
    /// Header does not have the scheme's shape.
    MalformedHeader,
    /// Credential does not match.
    Mismatch,
}

impl SignatureRejection {
    /// Returns the stable label used in audit events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownProvider => "unknown_provider",
            Self::UnsupportedScheme => "unsupported_scheme",
            Self::MissingSecret => "missing_secret",
            Self::MalformedHeader => "malformed_header",
            Self::Mismatch => "mismatch",
        }
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies a webhook credential against the provider's auth scheme.
///
/// # Errors
///
/// Returns [`SignatureRejection`] describing why the credential was refused.
pub fn verify_signature(
    scheme: &AuthScheme,
    body: &[u8],
    header_value: &str,
    secret: &str,
) -> Result<(), SignatureRejection> {
    match scheme {
        AuthScheme::None | AuthScheme::SignatureHeader { .. } => Err(SignatureRejection::UnsupportedScheme),
        _ if secret.is_empty() => Err(SignatureRejection::MissingSecret),
        AuthScheme::HmacSha256 { .. } => verify_hmac(body, header_value, secret),
        AuthScheme::Bearer { .. } => {
            let token = header_value.strip_prefix(BEARER_PREFIX).ok_or(SignatureRejection::MalformedHeader)?;
            matches(token, secret)
        }
        AuthScheme::ApiKeyHeader { .. } => matches(header_value, secret),
    }
}

/// Computes the lowercase hex HMAC-SHA256 digest over `<timestamp>.<body>`.
///
/// # Errors
///
/// Returns [`SignatureRejection::MissingSecret`] when the key is rejected.
pub fn hmac_digest(secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureRejection> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureRejection::MissingSecret)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(hex_encode(&mac.finalize().into_bytes()))
}

/// Verifies a `t=<ts>,v0=<hex>` header.
fn verify_hmac(body: &[u8], header_value: &str, secret: &str) -> Result<(), SignatureRejection> {
    let (timestamp, digest) = parse_hmac_header(header_value)?;
    let expected = hmac_digest(secret, timestamp, body)?;
    matches(&digest.to_ascii_lowercase(), &expected)
}

/// Splits an HMAC header into its timestamp and digest components.
fn parse_hmac_header(header_value: &str) -> Result<(&str, &str), SignatureRejection> {
    let mut timestamp = None;
    let mut digest = None;
    for part in header_value.split(',') {
        let (key, value) = part.trim().split_once('=').ok_or(SignatureRejection::MalformedHeader)?;
        match key {
            TIMESTAMP_KEY => timestamp = Some(value),
            DIGEST_KEY => digest = Some(value),
            _ => {}
        }
    }
    match (timestamp, digest) {
        (Some(timestamp), Some(digest)) if !timestamp.is_empty() && !digest.is_empty() => {
            Ok((timestamp, digest))
        }
        _ => Err(SignatureRejection::MalformedHeader),
    }
}

/// Compares two credentials in constant time.
fn matches(provided: &str, expected: &str) -> Result<(), SignatureRejection> {
    if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(SignatureRejection::Mismatch)
    }
}

/// Constant-time byte comparison. Length mismatches compare unequal.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.ct_eq(right).into()
}
