// crates/campaign-core/src/compile/schema_builder.rs
// ============================================================================
// Module: Campaign Schema Builder
// Description: Pure transform from a validated document to a Configuration.
// Purpose: Build the compiled survey graph without repeating validation.
// Dependencies: crate::{core, validation}
// ============================================================================

//! ## Overview
//! The builder consumes a [`ValidatedCampaign`]. Every prompt's configured
//! validator becomes its [`crate::core::ResponseRule`] and every parsed
//! condition moves onto its item. Any gap between what validation promised
//! and what the builder finds is a [`ConfigurationError`], an internal
//! consistency fault rather than a user error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use survey_condition::Condition;
use thiserror::Error;

use crate::core::CampaignIdentity;
use crate::core::CampaignState;
use crate::core::CampaignUrn;
use crate::core::Configuration;
use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::DisplayType;
use crate::core::HashError;
use crate::core::InvalidUrn;
use crate::core::ItemId;
use crate::core::Message;
use crate::core::Prompt;
use crate::core::PromptProperty;
use crate::core::RepeatableSet;
use crate::core::SetItem;
use crate::core::Survey;
use crate::core::SurveyId;
use crate::core::SurveyItem;
use crate::core::SurveyText;
use crate::core::document::ContentItemDocument;
use crate::core::document::MessageDocument;
use crate::core::document::PromptDocument;
use crate::core::document::RepeatableSetDocument;
use crate::core::document::SetItemDocument;
use crate::core::document::SurveyDocument;
use crate::core::hashing::hash_canonical_json;
use crate::validation::PromptTypeValidator;
use crate::validation::ValidatedCampaign;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A validated document broke an invariant validation guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A prompt has no configured validator.
    #[error("prompt `{0}` has no configured validator")]
    MissingValidator(ItemId),
    /// The document has no surveys.
    #[error("campaign has no surveys")]
    MissingSurveys,
    /// A validator's type disagrees with the prompt's declared type.
    #[error("prompt `{item}` declares type `{declared}` but was validated as another type")]
    UnknownPromptType {
        /// Prompt id.
        item: ItemId,
        /// Declared type tag.
        declared: String,
    },
    /// A prompt's display type tag is unknown.
    #[error("prompt `{item}` has unknown display type `{display_type}`")]
    UnknownDisplayType {
        /// Prompt id.
        item: ItemId,
        /// Declared display type tag.
        display_type: String,
    },
    /// A declared condition was not parsed during validation.
    #[error("condition of `{item}` is inconsistent: {message}")]
    InvalidCondition {
        /// Item id.
        item: ItemId,
        /// Detail.
        message: String,
    },
    /// The campaign URN is malformed.
    #[error(transparent)]
    InvalidUrn(#[from] InvalidUrn),
    /// The document could not be fingerprinted.
    #[error(transparent)]
    Hash(#[from] HashError),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds configurations from validated documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Builds the immutable configuration for a validated campaign.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the validated campaign is missing
    /// state that validation should have produced.
    pub fn build(
        campaign: ValidatedCampaign,
        state: CampaignState,
    ) -> Result<Configuration, ConfigurationError> {
        let ValidatedCampaign {
            document,
            source,
            mut validators,
            mut conditions,
            ..
        } = campaign;
        if document.surveys.is_empty() {
            return Err(ConfigurationError::MissingSurveys);
        }
        let digest = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &document)?;
        let urn = CampaignUrn::parse(document.campaign_urn.as_str())?;

        let mut parts = GraphParts {
            validators: &mut validators,
            conditions: &mut conditions,
        };
        let surveys = document
            .surveys
            .iter()
            .map(|survey| parts.survey(survey))
            .collect::<Result<Vec<_>, _>>()?;

        let identity = CampaignIdentity {
            urn,
            name: document.campaign_name.clone(),
            description: document.description.clone(),
        };
        Ok(Configuration::new(identity, state, surveys, source, digest))
    }
}

// ============================================================================
// SECTION: Graph Assembly
// ============================================================================

/// Validation products consumed while assembling the graph.
struct GraphParts<'a> {
    /// Configured validators keyed by prompt id.
    validators: &'a mut BTreeMap<ItemId, PromptTypeValidator>,
    /// Parsed conditions keyed by item id.
    conditions: &'a mut BTreeMap<ItemId, Condition>,
}

impl GraphParts<'_> {
    /// Builds one survey.
    fn survey(&mut self, survey: &SurveyDocument) -> Result<Survey, ConfigurationError> {
        let items = survey
            .content_list
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                ContentItemDocument::Message(message) => {
                    Ok(SurveyItem::Message(self.message(message, index, None)?))
                }
                ContentItemDocument::Prompt(prompt) => {
                    Ok(SurveyItem::Prompt(self.prompt(prompt, index, None)?))
                }
                ContentItemDocument::RepeatableSet(set) => {
                    Ok(SurveyItem::RepeatableSet(self.repeatable_set(set, index)?))
                }
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;
        let text = SurveyText {
            title: survey.title.clone(),
            description: survey.description.clone(),
            intro_text: survey.intro_text.clone(),
            submit_text: survey.submit_text.clone(),
            summary_text: survey.summary_text.clone(),
        };
        Ok(Survey::new(
            SurveyId::new(survey.id.as_str()),
            text,
            survey.show_summary,
            survey.edit_summary,
            survey.anytime,
            items,
        ))
    }

    /// Builds one repeatable set with its nested items.
    fn repeatable_set(
        &mut self,
        set: &RepeatableSetDocument,
        index: usize,
    ) -> Result<RepeatableSet, ConfigurationError> {
        let id = ItemId::new(set.id.as_str());
        let mut items = Vec::with_capacity(set.prompts.len());
        for (position, item) in set.prompts.iter().enumerate() {
            let parent = Some(id.clone());
            items.push(match item {
                SetItemDocument::Message(message) => {
                    SetItem::Message(self.message(message, position, parent)?)
                }
                SetItemDocument::Prompt(prompt) => {
                    SetItem::Prompt(self.prompt(prompt, position, parent)?)
                }
            });
        }
        Ok(RepeatableSet {
            condition: self.condition(&id, set.condition.as_deref())?,
            id,
            index,
            termination_question: set.termination_question.clone(),
            termination_true_label: set.termination_true_label.clone(),
            termination_false_label: set.termination_false_label.clone(),
            termination_skip_enabled: set.termination_skip_enabled,
            termination_skip_label: set.termination_skip_label.clone(),
            items,
        })
    }

    /// Builds one message.
    fn message(
        &mut self,
        message: &MessageDocument,
        index: usize,
        parent: Option<ItemId>,
    ) -> Result<Message, ConfigurationError> {
        let id = ItemId::new(message.id.as_str());
        Ok(Message {
            condition: self.condition(&id, message.condition.as_deref())?,
            id,
            index,
            parent,
            text: message.message_text.clone(),
        })
    }

    /// Builds one prompt from its configured validator.
    fn prompt(
        &mut self,
        prompt: &PromptDocument,
        index: usize,
        parent: Option<ItemId>,
    ) -> Result<Prompt, ConfigurationError> {
        let id = ItemId::new(prompt.id.as_str());
        let validator = self
            .validators
            .remove(&id)
            .ok_or_else(|| ConfigurationError::MissingValidator(id.clone()))?;
        let prompt_type = validator.prompt_type();
        if prompt_type.as_str() != prompt.prompt_type {
            return Err(ConfigurationError::UnknownPromptType {
                item: id,
                declared: prompt.prompt_type.clone(),
            });
        }
        let rule = validator
            .response_rule()
            .filter(|rule| rule.matches(prompt_type))
            .ok_or_else(|| ConfigurationError::MissingValidator(id.clone()))?;
        let display_type = DisplayType::from_tag(&prompt.display_type).ok_or_else(|| {
            ConfigurationError::UnknownDisplayType {
                item: id.clone(),
                display_type: prompt.display_type.clone(),
            }
        })?;
        Ok(Prompt {
            condition: self.condition(&id, prompt.condition.as_deref())?,
            id,
            index,
            parent,
            prompt_type,
            unit: prompt.unit.clone(),
            text: prompt.prompt_text.clone(),
            abbreviated_text: prompt.abbreviated_text.clone(),
            explanation_text: prompt.explanation_text.clone(),
            skippable: prompt.skippable,
            skip_label: prompt.skip_label.clone(),
            display_type,
            display_label: prompt.display_label.clone(),
            default_value: prompt.default.clone(),
            properties: prompt
                .properties
                .iter()
                .map(|property| PromptProperty {
                    key: property.key.clone(),
                    label: property.label.clone(),
                    value: property.value.clone(),
                })
                .collect(),
            rule,
        })
    }

    /// Takes the parsed condition for an item that declares one.
    fn condition(
        &mut self,
        id: &ItemId,
        raw: Option<&str>,
    ) -> Result<Option<Condition>, ConfigurationError> {
        if raw.is_none_or(|text| text.trim().is_empty()) {
            return Ok(None);
        }
        self.conditions.remove(id).map(Some).ok_or_else(|| ConfigurationError::InvalidCondition {
            item: id.clone(),
            message: "condition was not parsed during validation".to_string(),
        })
    }
}
