// crates/campaign-core/src/core/identifiers.rs
// ============================================================================
// Module: Campaign Identifiers
// Description: Strongly typed identifiers for campaigns, surveys, and items.
// Purpose: Keep survey ids, item ids, and campaign URNs from being mixed up.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Survey and item identifiers are opaque strings that share one flat
//! namespace inside a campaign document. Campaign URNs carry a format rule
//! checked by [`CampaignUrn::parse`]; the other identifiers are validated at
//! document boundaries rather than inside these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum number of colon-separated segments in a campaign URN.
const MIN_URN_SEGMENTS: usize = 3;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Survey identifier, unique within a campaign.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(String);

impl SurveyId {
    /// Creates a new survey identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for SurveyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SurveyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SurveyId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Survey item identifier (prompt, message, or repeatable set).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Campaign URN such as `urn:campaign:study_2012`.
///
/// # Invariants
/// - Starts with `urn:` ignoring case.
/// - Has at least three colon-separated segments.
/// - Every segment after `urn` matches `[a-z0-9_]+` once lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CampaignUrn(String);

impl CampaignUrn {
    /// Parses and validates a campaign URN.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrn`] when the text is not a well-formed URN.
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidUrn> {
        let value = value.into();
        if is_valid_urn(&value) { Ok(Self(value)) } else { Err(InvalidUrn(value)) }
    }

    /// Returns the URN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for CampaignUrn {
    type Error = InvalidUrn;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CampaignUrn> for String {
    fn from(value: CampaignUrn) -> Self {
        value.0
    }
}

/// Rejected campaign URN text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a valid campaign urn")]
pub struct InvalidUrn(pub String);

// ============================================================================
// SECTION: URN Rule
// ============================================================================

/// Returns true when `value` satisfies the campaign URN format.
#[must_use]
pub fn is_valid_urn(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    if lowered.len() != value.len() || !lowered.starts_with("urn:") {
        return false;
    }
    let segments: Vec<&str> = lowered.split(':').collect();
    segments.len() >= MIN_URN_SEGMENTS
        && segments[1 ..].iter().all(|segment| {
            !segment.is_empty()
                && segment.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
        })
}
