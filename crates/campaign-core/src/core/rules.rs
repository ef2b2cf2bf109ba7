// crates/campaign-core/src/core/rules.rs
// ============================================================================
// Module: Prompt Response Rules
// Description: Validated per-type bounds carried by compiled prompts.
// Purpose: Hand authoring-time bounds to response-time checks unchanged.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ResponseRule`] is what remains of a prompt's property bundle once it
//! has been validated: integer ranges, choice sets, length bounds, and
//! remote activity settings. Compiled prompts own their rule, and the
//! response engine checks submitted values against it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::PromptType;

// ============================================================================
// SECTION: Bounds
// ============================================================================

/// Inclusive whole-number range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegerRange {
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
}

impl IntegerRange {
    /// Returns true when `value` lies within the range.
    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Inclusive character-count range for text answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthRange {
    /// Fewest accepted characters.
    pub min: u64,
    /// Most accepted characters.
    pub max: u64,
}

impl LengthRange {
    /// Returns true when `length` lies within the range.
    #[must_use]
    pub const fn contains(&self, length: u64) -> bool {
        self.min <= length && length <= self.max
    }
}

// ============================================================================
// SECTION: Choices
// ============================================================================

/// One configured choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    /// Non-negative key.
    pub key: u64,
    /// Display label.
    pub label: String,
    /// Optional associated value.
    pub value: Option<String>,
}

/// Configured choices in document order with unique keys and labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChoiceSet(Vec<ChoiceOption>);

impl ChoiceSet {
    /// Wraps already-validated options.
    #[must_use]
    pub const fn new(options: Vec<ChoiceOption>) -> Self {
        Self(options)
    }

    /// Returns the option for a key.
    #[must_use]
    pub fn option(&self, key: u64) -> Option<&ChoiceOption> {
        self.0.iter().find(|option| option.key == key)
    }

    /// Returns true when a key is configured.
    #[must_use]
    pub fn contains_key(&self, key: u64) -> bool {
        self.option(key).is_some()
    }

    /// Returns true when a label is configured.
    #[must_use]
    pub fn contains_label(&self, label: &str) -> bool {
        self.0.iter().any(|option| option.label == label)
    }

    /// Returns true when every option carries a value.
    #[must_use]
    pub fn has_values(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|option| option.value.is_some())
    }

    /// Iterates options in document order.
    pub fn iter(&self) -> impl Iterator<Item = &ChoiceOption> {
        self.0.iter()
    }

    /// Returns the number of options.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no options are configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// SECTION: Remote Activity
// ============================================================================

/// Launch settings of a remote activity prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteActivitySettings {
    /// Package containing the activity.
    pub package: String,
    /// Fully qualified activity name.
    pub activity: String,
    /// Intent action.
    pub action: String,
    /// Whether the activity launches without user action.
    pub autolaunch: bool,
    /// Number of retries allowed.
    pub retries: u64,
    /// Minimum number of runs before the prompt may be answered.
    pub min_runs: u64,
    /// Optional input passed to the activity.
    pub input: Option<String>,
}

// ============================================================================
// SECTION: Response Rules
// ============================================================================

/// Validated bounds for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ResponseRule {
    /// Whole number within a range.
    Number {
        /// Accepted range.
        range: IntegerRange,
    },
    /// Choice from a configured set.
    Choice {
        /// Configured choices.
        choices: ChoiceSet,
        /// Whether several keys may be selected.
        multiple: bool,
        /// Whether participant-supplied labels are accepted.
        custom: bool,
    },
    /// Free text within a length range.
    Text {
        /// Accepted character counts.
        length: LengthRange,
    },
    /// Photo at a maximum resolution.
    Photo {
        /// Maximum dimension in pixels.
        resolution: u64,
    },
    /// Local date-time.
    Timestamp,
    /// External activity result.
    RemoteActivity(RemoteActivitySettings),
}

impl ResponseRule {
    /// Returns the configured choices for choice prompts.
    #[must_use]
    pub const fn choices(&self) -> Option<&ChoiceSet> {
        match self {
            Self::Choice {
                choices, ..
            } => Some(choices),
            Self::Number {
                ..
            }
            | Self::Text {
                ..
            }
            | Self::Photo {
                ..
            }
            | Self::Timestamp
            | Self::RemoteActivity(_) => None,
        }
    }

    /// Returns true when the rule is compatible with a prompt type.
    #[must_use]
    pub const fn matches(&self, prompt_type: PromptType) -> bool {
        match self {
            Self::Number {
                ..
            } => matches!(prompt_type, PromptType::Number | PromptType::HoursBeforeNow),
            Self::Choice {
                multiple,
                custom,
                ..
            } => matches!(
                (prompt_type, *multiple, *custom),
                (PromptType::SingleChoice, false, false)
                    | (PromptType::MultiChoice, true, false)
                    | (PromptType::SingleChoiceCustom, false, true)
                    | (PromptType::MultiChoiceCustom, true, true)
            ),
            Self::Text {
                ..
            } => matches!(prompt_type, PromptType::Text),
            Self::Photo {
                ..
            } => matches!(prompt_type, PromptType::Photo),
            Self::Timestamp => matches!(prompt_type, PromptType::Timestamp),
            Self::RemoteActivity(_) => matches!(prompt_type, PromptType::RemoteActivity),
        }
    }
}
