// crates/campaign-core/src/core/prompt_type.rs
// ============================================================================
// Module: Prompt Type Tags
// Description: Prompt types, display types, and no-response sentinels.
// Purpose: Give the string tags used by campaign documents a closed type.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Campaign documents name prompt and display types with lowercase tags.
//! These enums are the closed set of accepted tags. `NoResponse` models the
//! two sentinels a prompt records when no substantive answer exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Prompt Types
// ============================================================================

/// Supported prompt types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    /// Whole number within bounds.
    Number,
    /// Non-negative whole number of hours before now.
    HoursBeforeNow,
    /// One key from a fixed choice list.
    SingleChoice,
    /// Several keys from a fixed choice list.
    MultiChoice,
    /// One key or a participant-supplied label.
    SingleChoiceCustom,
    /// Several keys or participant-supplied labels.
    MultiChoiceCustom,
    /// Free text within a length range.
    Text,
    /// Photo reference.
    Photo,
    /// Local date-time.
    Timestamp,
    /// Result of launching an external activity.
    RemoteActivity,
}

impl PromptType {
    /// Every prompt type in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Number,
        Self::HoursBeforeNow,
        Self::SingleChoice,
        Self::MultiChoice,
        Self::SingleChoiceCustom,
        Self::MultiChoiceCustom,
        Self::Text,
        Self::Photo,
        Self::Timestamp,
        Self::RemoteActivity,
    ];

    /// Returns the document tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::HoursBeforeNow => "hours_before_now",
            Self::SingleChoice => "single_choice",
            Self::MultiChoice => "multi_choice",
            Self::SingleChoiceCustom => "single_choice_custom",
            Self::MultiChoiceCustom => "multi_choice_custom",
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Timestamp => "timestamp",
            Self::RemoteActivity => "remote_activity",
        }
    }

    /// Parses a document tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Display Types
// ============================================================================

/// How a prompt's answers are presented in visualizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    /// A measured quantity.
    Measurement,
    /// An occurrence.
    Event,
    /// A count of things.
    Count,
    /// A categorical answer.
    Category,
    /// Bookkeeping data about the response itself.
    Metadata,
}

impl DisplayType {
    /// Every display type in declaration order.
    pub const ALL: [Self; 5] =
        [Self::Measurement, Self::Event, Self::Count, Self::Category, Self::Metadata];

    /// Returns the document tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::Event => "event",
            Self::Count => "count",
            Self::Category => "category",
            Self::Metadata => "metadata",
        }
    }

    /// Parses a document tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: No-Response Sentinels
// ============================================================================

/// Sentinel recorded when a prompt has no substantive answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoResponse {
    /// The participant skipped the prompt.
    Skipped,
    /// The prompt's condition hid it.
    NotDisplayed,
}

impl NoResponse {
    /// Returns the sentinel text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "SKIPPED",
            Self::NotDisplayed => "NOT_DISPLAYED",
        }
    }

    /// Matches condition literals, ignoring case.
    #[must_use]
    pub fn from_literal(text: &str) -> Option<Self> {
        [Self::Skipped, Self::NotDisplayed]
            .into_iter()
            .find(|sentinel| sentinel.as_str().eq_ignore_ascii_case(text))
    }

    /// Matches submitted response values exactly.
    #[must_use]
    pub fn from_response(text: &str) -> Option<Self> {
        [Self::Skipped, Self::NotDisplayed].into_iter().find(|sentinel| sentinel.as_str() == text)
    }
}

impl fmt::Display for NoResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
