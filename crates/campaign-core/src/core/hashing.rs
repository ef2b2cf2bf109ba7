// crates/campaign-core/src/core/hashing.rs
// ============================================================================
// Module: Campaign Source Hashing
// Description: RFC 8785 JSON canonicalization and content digests for campaigns.
// Purpose: Give every compiled configuration a stable fingerprint of its source.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! A compiled configuration records the digest of its canonicalized source
//! document. Two documents that differ only in key order or whitespace hash
//! identically, so the digest identifies what was authored rather than how it
//! was formatted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported digest algorithms for campaign sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing.
    Sha256,
}

/// Default digest algorithm for campaign sources.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Content digest of a campaign source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Digest algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while fingerprinting a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// The document could not be canonicalized.
    #[error("failed to canonicalize campaign document: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Source Digest
// ============================================================================

/// Digests the RFC 8785 canonical JSON form of a campaign source.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let canonical =
        serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))?;
    let digest = match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(&canonical),
    };
    Ok(HashDigest {
        algorithm,
        value: lowercase_hex(&digest),
    })
}

/// Renders digest bytes as lowercase hex.
fn lowercase_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        out.push_str(&format!("{byte:02x}"));
        out
    })
}
