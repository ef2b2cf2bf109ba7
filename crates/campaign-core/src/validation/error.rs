// crates/campaign-core/src/validation/error.rs
// ============================================================================
// Module: Structural Validation Errors
// Description: Pass identifiers and the error raised by a failed pass.
// Purpose: Report which validation pass rejected a document and where.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every structural failure names the pass that raised it and, where one
//! exists, the offending survey or item id. Passes run in the order listed
//! by [`ValidationPass::ORDER`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ItemId;

// ============================================================================
// SECTION: Validation Passes
// ============================================================================

/// Document validation passes in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPass {
    /// JSON Schema check and typed decode.
    Schema,
    /// Campaign URN format.
    CampaignUrn,
    /// Document-wide id uniqueness.
    UniqueIds,
    /// Prompt type tags are known.
    PromptTypes,
    /// Per-type property bundles.
    PromptProperties,
    /// Condition syntax, ordering, and literal values.
    Conditions,
    /// Default answer literals.
    Defaults,
    /// Survey summary authoring rules.
    SurveyRules,
    /// Repeatable set authoring rules.
    RepeatableSetRules,
    /// Prompt authoring rules.
    PromptRules,
    /// Display type tags.
    DisplayTypes,
}

impl ValidationPass {
    /// Passes in the order they run.
    pub const ORDER: [Self; 11] = [
        Self::Schema,
        Self::CampaignUrn,
        Self::UniqueIds,
        Self::PromptTypes,
        Self::PromptProperties,
        Self::Conditions,
        Self::Defaults,
        Self::SurveyRules,
        Self::RepeatableSetRules,
        Self::PromptRules,
        Self::DisplayTypes,
    ];

    /// Returns the snake-case pass name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::CampaignUrn => "campaign_urn",
            Self::UniqueIds => "unique_ids",
            Self::PromptTypes => "prompt_types",
            Self::PromptProperties => "prompt_properties",
            Self::Conditions => "conditions",
            Self::Defaults => "defaults",
            Self::SurveyRules => "survey_rules",
            Self::RepeatableSetRules => "repeatable_set_rules",
            Self::PromptRules => "prompt_rules",
            Self::DisplayTypes => "display_types",
        }
    }
}

impl fmt::Display for ValidationPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Structural Error
// ============================================================================

/// A campaign document failed a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{pass} validation failed{}: {message}", describe_item(.item.as_ref()))]
pub struct StructuralError {
    /// Pass that rejected the document.
    pub pass: ValidationPass,
    /// Offending survey or item id, when one applies.
    pub item: Option<ItemId>,
    /// Human-readable reason.
    pub message: String,
}

impl StructuralError {
    /// Creates an error that is not tied to a specific item.
    #[must_use]
    pub fn new(pass: ValidationPass, message: impl Into<String>) -> Self {
        Self {
            pass,
            item: None,
            message: message.into(),
        }
    }

    /// Creates an error for a specific survey or item id.
    #[must_use]
    pub fn for_item(
        pass: ValidationPass,
        item: impl Into<ItemId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            pass,
            item: Some(item.into()),
            message: message.into(),
        }
    }
}

/// Formats the optional item suffix of an error message.
fn describe_item(item: Option<&ItemId>) -> String {
    item.map(|id| format!(" for `{id}`")).unwrap_or_default()
}
