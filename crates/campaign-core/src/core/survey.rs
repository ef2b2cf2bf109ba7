// crates/campaign-core/src/core/survey.rs
// ============================================================================
// Module: Compiled Survey Graph
// Description: Survey, item, prompt, message, and repeatable set types.
// Purpose: Represent a validated survey as an immutable, lookup-friendly graph.
// Dependencies: survey-condition, crate::core
// ============================================================================

//! ## Overview
//! A compiled [`Survey`] keeps its items in document order and indexes
//! every item id, including those inside repeatable sets, for direct
//! lookup. Containment is expressed with a parent-set id on each nested item
//! rather than a back-reference.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use survey_condition::Condition;

use crate::core::DisplayType;
use crate::core::ItemId;
use crate::core::PromptType;
use crate::core::ResponseRule;
use crate::core::SurveyId;

// ============================================================================
// SECTION: Prompts and Messages
// ============================================================================

/// Ordered prompt property as authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptProperty {
    /// Property key.
    pub key: String,
    /// Property label.
    pub label: String,
    /// Optional associated value.
    pub value: Option<String>,
}

/// Compiled prompt.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Item id.
    pub id: ItemId,
    /// Position within its container.
    pub index: usize,
    /// Display condition.
    pub condition: Option<Condition>,
    /// Enclosing repeatable set, if any.
    pub parent: Option<ItemId>,
    /// Prompt type.
    pub prompt_type: PromptType,
    /// Unit of the answer.
    pub unit: Option<String>,
    /// Prompt text.
    pub text: String,
    /// Summary text.
    pub abbreviated_text: Option<String>,
    /// Explanation text.
    pub explanation_text: Option<String>,
    /// Whether the prompt may be skipped.
    pub skippable: bool,
    /// Label of the skip action.
    pub skip_label: Option<String>,
    /// Display type.
    pub display_type: DisplayType,
    /// Display label.
    pub display_label: Option<String>,
    /// Default answer literal.
    pub default_value: Option<String>,
    /// Properties in document order.
    pub properties: Vec<PromptProperty>,
    /// Validated response bounds.
    pub rule: ResponseRule,
}

/// Compiled message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Item id.
    pub id: ItemId,
    /// Position within its container.
    pub index: usize,
    /// Display condition.
    pub condition: Option<Condition>,
    /// Enclosing repeatable set, if any.
    pub parent: Option<ItemId>,
    /// Message body.
    pub text: String,
}

// ============================================================================
// SECTION: Repeatable Sets
// ============================================================================

/// Compiled repeatable set.
#[derive(Debug, Clone)]
pub struct RepeatableSet {
    /// Item id.
    pub id: ItemId,
    /// Position within the survey.
    pub index: usize,
    /// Display condition.
    pub condition: Option<Condition>,
    /// Question asked after each iteration.
    pub termination_question: String,
    /// Label for repeating again.
    pub termination_true_label: String,
    /// Label for stopping.
    pub termination_false_label: String,
    /// Whether the whole set may be skipped.
    pub termination_skip_enabled: bool,
    /// Label for skipping the set.
    pub termination_skip_label: Option<String>,
    /// Contained prompts and messages in document order.
    pub items: Vec<SetItem>,
}

impl RepeatableSet {
    /// Returns a contained prompt by id.
    #[must_use]
    pub fn prompt(&self, id: &str) -> Option<&Prompt> {
        self.prompts().find(|prompt| prompt.id.as_str() == id)
    }

    /// Iterates contained prompts in document order.
    pub fn prompts(&self) -> impl Iterator<Item = &Prompt> {
        self.items.iter().filter_map(SetItem::as_prompt)
    }
}

/// Item inside a repeatable set.
#[derive(Debug, Clone)]
pub enum SetItem {
    /// Informational message.
    Message(Message),
    /// Respondable prompt.
    Prompt(Prompt),
}

impl SetItem {
    /// Returns the item id.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        match self {
            Self::Message(message) => &message.id,
            Self::Prompt(prompt) => &prompt.id,
        }
    }

    /// Returns the prompt when this item is one.
    #[must_use]
    pub const fn as_prompt(&self) -> Option<&Prompt> {
        match self {
            Self::Prompt(prompt) => Some(prompt),
            Self::Message(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Survey Items
// ============================================================================

/// Top-level survey item.
#[derive(Debug, Clone)]
pub enum SurveyItem {
    /// Informational message.
    Message(Message),
    /// Respondable prompt.
    Prompt(Prompt),
    /// Repeatable group of prompts.
    RepeatableSet(RepeatableSet),
}

impl SurveyItem {
    /// Returns the item id.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        match self {
            Self::Message(message) => &message.id,
            Self::Prompt(prompt) => &prompt.id,
            Self::RepeatableSet(set) => &set.id,
        }
    }

    /// Returns the display condition.
    #[must_use]
    pub const fn condition(&self) -> Option<&Condition> {
        match self {
            Self::Message(message) => message.condition.as_ref(),
            Self::Prompt(prompt) => prompt.condition.as_ref(),
            Self::RepeatableSet(set) => set.condition.as_ref(),
        }
    }

    /// Returns the position within the survey.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Message(message) => message.index,
            Self::Prompt(prompt) => prompt.index,
            Self::RepeatableSet(set) => set.index,
        }
    }
}

/// Where a prompt lives within its survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptLocation {
    /// Directly in the survey's content list.
    Direct,
    /// Inside the named repeatable set.
    InRepeatableSet(ItemId),
}

/// Position of an item within a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemPosition {
    /// Index of the top-level item.
    top: usize,
    /// Index within the repeatable set, for nested items.
    nested: Option<usize>,
}

// ============================================================================
// SECTION: Survey
// ============================================================================

/// Descriptive fields of a survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyText {
    /// Survey title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional introduction text.
    pub intro_text: Option<String>,
    /// Submit screen text.
    pub submit_text: String,
    /// Summary screen text.
    pub summary_text: Option<String>,
}

/// Compiled survey.
#[derive(Debug, Clone)]
pub struct Survey {
    /// Survey id.
    id: SurveyId,
    /// Descriptive text.
    text: SurveyText,
    /// Whether a summary screen is shown.
    show_summary: bool,
    /// Whether answers may be edited from the summary.
    edit_summary: Option<bool>,
    /// Whether the survey may be taken at any time.
    anytime: bool,
    /// Items in document order.
    items: Vec<SurveyItem>,
    /// Position of every item id.
    positions: BTreeMap<ItemId, ItemPosition>,
}

impl Survey {
    /// Assembles a survey and indexes its items.
    #[must_use]
    pub fn new(
        id: SurveyId,
        text: SurveyText,
        show_summary: bool,
        edit_summary: Option<bool>,
        anytime: bool,
        items: Vec<SurveyItem>,
    ) -> Self {
        let mut positions = BTreeMap::new();
        for (top, item) in items.iter().enumerate() {
            positions.insert(item.id().clone(), ItemPosition {
                top,
                nested: None,
            });
            if let SurveyItem::RepeatableSet(set) = item {
                for (nested, child) in set.items.iter().enumerate() {
                    positions.insert(child.id().clone(), ItemPosition {
                        top,
                        nested: Some(nested),
                    });
                }
            }
        }
        Self {
            id,
            text,
            show_summary,
            edit_summary,
            anytime,
            items,
            positions,
        }
    }

    /// Returns the survey id.
    #[must_use]
    pub const fn id(&self) -> &SurveyId {
        &self.id
    }

    /// Returns the descriptive text.
    #[must_use]
    pub const fn text(&self) -> &SurveyText {
        &self.text
    }

    /// Returns the survey title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.text.title
    }

    /// Returns the survey description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.text.description.as_deref()
    }

    /// Returns whether a summary screen is shown.
    #[must_use]
    pub const fn show_summary(&self) -> bool {
        self.show_summary
    }

    /// Returns whether answers may be edited from the summary.
    #[must_use]
    pub const fn edit_summary(&self) -> Option<bool> {
        self.edit_summary
    }

    /// Returns whether the survey may be taken at any time.
    #[must_use]
    pub const fn anytime(&self) -> bool {
        self.anytime
    }

    /// Returns the items in document order.
    #[must_use]
    pub fn items(&self) -> &[SurveyItem] {
        &self.items
    }

    /// Returns true when any item, at any depth, has this id.
    #[must_use]
    pub fn contains_item(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Returns a prompt by id, looking inside repeatable sets.
    #[must_use]
    pub fn prompt(&self, id: &str) -> Option<&Prompt> {
        let position = self.positions.get(id)?;
        match (self.items.get(position.top)?, position.nested) {
            (SurveyItem::Prompt(prompt), None) => Some(prompt),
            (SurveyItem::RepeatableSet(set), Some(nested)) => set.items.get(nested)?.as_prompt(),
            _ => None,
        }
    }

    /// Returns a top-level repeatable set by id.
    #[must_use]
    pub fn repeatable_set(&self, id: &str) -> Option<&RepeatableSet> {
        let position = self.positions.get(id)?;
        match (self.items.get(position.top)?, position.nested) {
            (SurveyItem::RepeatableSet(set), None) => Some(set),
            _ => None,
        }
    }

    /// Resolves whether a prompt lives directly in the survey or in a set.
    #[must_use]
    pub fn prompt_location(&self, id: &str) -> Option<PromptLocation> {
        let prompt = self.prompt(id)?;
        Some(prompt.parent.clone().map_or(PromptLocation::Direct, PromptLocation::InRepeatableSet))
    }

    /// Iterates every prompt in document order, including nested prompts.
    pub fn prompts(&self) -> impl Iterator<Item = &Prompt> {
        self.items.iter().flat_map(|item| {
            let prompts: Vec<&Prompt> = match item {
                SurveyItem::Prompt(prompt) => vec![prompt],
                SurveyItem::RepeatableSet(set) => set.prompts().collect(),
                SurveyItem::Message(_) => Vec::new(),
            };
            prompts
        })
    }

    /// Returns the number of prompts, including nested prompts.
    #[must_use]
    pub fn number_of_prompts(&self) -> usize {
        self.prompts().count()
    }

    /// Returns the number of top-level items.
    #[must_use]
    pub const fn number_of_items(&self) -> usize {
        self.items.len()
    }
}
