// crates/campaign-core/src/core/document.rs
// ============================================================================
// Module: Campaign Document Model
// Description: Serde model of an authored campaign document.
// Purpose: Decode schema-checked campaign JSON into typed, borrowable nodes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The document model mirrors the authored JSON one-to-one and carries no
//! validation of its own beyond shape. Content items are externally tagged
//! (`{"prompt": {...}}`, `{"message": {...}}`, `{"repeatableSet": {...}}`)
//! so document order is preserved across item kinds. Repeatable sets hold
//! prompts and messages only; a nested set fails to decode.
//!
//! Type and display tags stay as raw strings here. The structural validator
//! decides whether they are known so that an unknown tag is reported by the
//! pass responsible for it rather than as a decode failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Campaign
// ============================================================================

/// Authored campaign document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDocument {
    /// Campaign URN.
    pub campaign_urn: String,
    /// Human-readable campaign name.
    pub campaign_name: String,
    /// Optional campaign description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional server URL advertised to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Optional icon URL advertised to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Surveys in document order.
    pub surveys: Vec<SurveyDocument>,
}

impl CampaignDocument {
    /// Iterates every prompt in the document with its enclosing survey.
    pub fn prompts(&self) -> impl Iterator<Item = (&SurveyDocument, &PromptDocument)> {
        self.surveys
            .iter()
            .flat_map(|survey| survey.prompts().map(move |prompt| (survey, prompt)))
    }
}

// ============================================================================
// SECTION: Survey
// ============================================================================

/// Authored survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDocument {
    /// Survey identifier.
    pub id: String,
    /// Survey title.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional introduction text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_text: Option<String>,
    /// Text shown on the submit screen.
    pub submit_text: String,
    /// Whether a summary screen is shown before submission.
    pub show_summary: bool,
    /// Whether answers may be edited from the summary screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_summary: Option<bool>,
    /// Summary screen text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<String>,
    /// Whether the survey may be taken at any time.
    pub anytime: bool,
    /// Items in document order.
    pub content_list: Vec<ContentItemDocument>,
}

impl SurveyDocument {
    /// Iterates the survey's prompts, descending into repeatable sets.
    pub fn prompts(&self) -> impl Iterator<Item = &PromptDocument> {
        self.flattened().filter_map(|entry| match entry.node {
            ItemNode::Prompt(prompt) => Some(prompt),
            ItemNode::Message(_) | ItemNode::RepeatableSet(_) => None,
        })
    }

    /// Iterates every item in encounter order.
    ///
    /// A repeatable set is yielded before its own contents, and contained
    /// items report the set they belong to.
    pub fn flattened(&self) -> impl Iterator<Item = FlatItem<'_>> {
        self.content_list.iter().enumerate().flat_map(|(position, item)| {
            let head = FlatItem {
                position,
                node: item.node(),
                parent: None,
            };
            let nested: Vec<FlatItem<'_>> = match item {
                ContentItemDocument::RepeatableSet(set) => set
                    .prompts
                    .iter()
                    .enumerate()
                    .map(|(index, child)| FlatItem {
                        position: index,
                        node: child.node(),
                        parent: Some(set),
                    })
                    .collect(),
                ContentItemDocument::Message(_) | ContentItemDocument::Prompt(_) => Vec::new(),
            };
            std::iter::once(head).chain(nested)
        })
    }
}

/// Borrowed view of one item in a survey's encounter order.
#[derive(Debug, Clone, Copy)]
pub struct FlatItem<'a> {
    /// Position within the enclosing container.
    pub position: usize,
    /// The item itself.
    pub node: ItemNode<'a>,
    /// Enclosing repeatable set, if any.
    pub parent: Option<&'a RepeatableSetDocument>,
}

/// Borrowed item of any kind.
#[derive(Debug, Clone, Copy)]
pub enum ItemNode<'a> {
    /// Informational message.
    Message(&'a MessageDocument),
    /// Respondable prompt.
    Prompt(&'a PromptDocument),
    /// Repeatable group of prompts.
    RepeatableSet(&'a RepeatableSetDocument),
}

impl<'a> ItemNode<'a> {
    /// Returns the item identifier.
    #[must_use]
    pub fn id(self) -> &'a str {
        match self {
            Self::Message(message) => &message.id,
            Self::Prompt(prompt) => &prompt.id,
            Self::RepeatableSet(set) => &set.id,
        }
    }

    /// Returns the raw condition text when present and non-blank.
    #[must_use]
    pub fn condition(self) -> Option<&'a str> {
        let raw = match self {
            Self::Message(message) => message.condition.as_deref(),
            Self::Prompt(prompt) => prompt.condition.as_deref(),
            Self::RepeatableSet(set) => set.condition.as_deref(),
        };
        raw.filter(|text| !text.trim().is_empty())
    }
}

// ============================================================================
// SECTION: Content Items
// ============================================================================

/// Top-level survey content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentItemDocument {
    /// Informational message.
    Message(MessageDocument),
    /// Respondable prompt.
    Prompt(PromptDocument),
    /// Repeatable group of prompts.
    RepeatableSet(RepeatableSetDocument),
}

impl ContentItemDocument {
    /// Returns a borrowed view of the item.
    #[must_use]
    pub const fn node(&self) -> ItemNode<'_> {
        match self {
            Self::Message(message) => ItemNode::Message(message),
            Self::Prompt(prompt) => ItemNode::Prompt(prompt),
            Self::RepeatableSet(set) => ItemNode::RepeatableSet(set),
        }
    }
}

/// Item allowed inside a repeatable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetItemDocument {
    /// Informational message.
    Message(MessageDocument),
    /// Respondable prompt.
    Prompt(PromptDocument),
}

impl SetItemDocument {
    /// Returns a borrowed view of the item.
    #[must_use]
    pub const fn node(&self) -> ItemNode<'_> {
        match self {
            Self::Message(message) => ItemNode::Message(message),
            Self::Prompt(prompt) => ItemNode::Prompt(prompt),
        }
    }
}

/// Authored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDocument {
    /// Item identifier.
    pub id: String,
    /// Optional display condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Message body.
    pub message_text: String,
}

/// Authored repeatable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatableSetDocument {
    /// Item identifier.
    pub id: String,
    /// Optional display condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Question asked after each iteration.
    pub termination_question: String,
    /// Label for repeating again.
    pub termination_true_label: String,
    /// Label for stopping.
    pub termination_false_label: String,
    /// Whether the whole set may be skipped.
    pub termination_skip_enabled: bool,
    /// Label for skipping the set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_skip_label: Option<String>,
    /// Contained items in document order.
    pub prompts: Vec<SetItemDocument>,
}

/// Authored prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDocument {
    /// Item identifier.
    pub id: String,
    /// Optional display condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Optional unit of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Prompt text shown to the participant.
    pub prompt_text: String,
    /// Short text used on summary screens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviated_text: Option<String>,
    /// Optional explanation text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_text: Option<String>,
    /// Prompt type tag.
    pub prompt_type: String,
    /// Display type tag.
    pub display_type: String,
    /// Label used when displaying answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    /// Whether the prompt may be skipped.
    pub skippable: bool,
    /// Label for the skip action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_label: Option<String>,
    /// Optional default answer literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Type-specific properties in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDocument>,
}

/// Authored prompt property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDocument {
    /// Property key.
    pub key: String,
    /// Property label; integer-valued properties carry their value here.
    pub label: String,
    /// Optional associated value (numeric choice values).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
