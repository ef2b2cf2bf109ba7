// crates/campaign-core/src/core/configuration.rs
// ============================================================================
// Module: Campaign Configuration
// Description: Immutable compiled campaign and its atomically swapped handle.
// Purpose: Serve survey and prompt lookups to concurrent response validation.
// Dependencies: serde, time, crate::core
// ============================================================================

//! ## Overview
//! A [`Configuration`] is built once per campaign version and never mutated.
//! It is `Send + Sync` and shared behind an [`Arc`]. When a campaign is
//! revised, a new configuration is compiled and swapped into the
//! [`ConfigurationHandle`]; readers holding the previous snapshot keep using
//! it until they drop it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::CampaignUrn;
use crate::core::ChoiceOption;
use crate::core::DisplayType;
use crate::core::HashDigest;
use crate::core::ItemId;
use crate::core::Prompt;
use crate::core::PromptLocation;
use crate::core::PromptType;
use crate::core::RepeatableSet;
use crate::core::Survey;
use crate::core::SurveyId;

// ============================================================================
// SECTION: Campaign State
// ============================================================================

/// Whether a campaign accepts uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningState {
    /// Accepting responses.
    #[default]
    Running,
    /// Closed to responses.
    Stopped,
}

impl FromStr for RunningState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            _ => Err(format!("unknown running state `{value}`")),
        }
    }
}

/// Who may see a campaign's responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyState {
    /// Visible to the campaign's participants and authors.
    Shared,
    /// Visible to authors only.
    #[default]
    Private,
}

impl FromStr for PrivacyState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "private" => Ok(Self::Private),
            _ => Err(format!("unknown privacy state `{value}`")),
        }
    }
}

/// Host-supplied state that is not part of the authored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignState {
    /// Running state.
    pub running_state: RunningState,
    /// Privacy state.
    pub privacy_state: PrivacyState,
    /// When the campaign was created.
    pub created_at: OffsetDateTime,
}

impl CampaignState {
    /// Creates state for a campaign created at `created_at`.
    #[must_use]
    pub const fn new(
        running_state: RunningState,
        privacy_state: PrivacyState,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            running_state,
            privacy_state,
            created_at,
        }
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Immutable compiled campaign.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Campaign URN.
    urn: CampaignUrn,
    /// Campaign name.
    name: String,
    /// Optional description.
    description: Option<String>,
    /// Host-supplied state.
    state: CampaignState,
    /// Surveys in document order.
    surveys: Vec<Survey>,
    /// Survey index by id.
    survey_index: BTreeMap<SurveyId, usize>,
    /// Owning survey of every prompt.
    prompt_surveys: BTreeMap<ItemId, SurveyId>,
    /// Original document text.
    source: String,
    /// Digest of the canonical document.
    digest: HashDigest,
}

/// Identity fields of a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignIdentity {
    /// Campaign URN.
    pub urn: CampaignUrn,
    /// Campaign name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl Configuration {
    /// Assembles a configuration from compiled surveys.
    ///
    /// Callers guarantee `surveys` is non-empty and ids are unique; the
    /// schema builder is the only producer.
    #[must_use]
    pub(crate) fn new(
        identity: CampaignIdentity,
        state: CampaignState,
        surveys: Vec<Survey>,
        source: String,
        digest: HashDigest,
    ) -> Self {
        let survey_index = surveys
            .iter()
            .enumerate()
            .map(|(index, survey)| (survey.id().clone(), index))
            .collect();
        let prompt_surveys = surveys
            .iter()
            .flat_map(|survey| {
                survey.prompts().map(move |prompt| (prompt.id.clone(), survey.id().clone()))
            })
            .collect();
        Self {
            urn: identity.urn,
            name: identity.name,
            description: identity.description,
            state,
            surveys,
            survey_index,
            prompt_surveys,
            source,
            digest,
        }
    }

    /// Returns the campaign URN.
    #[must_use]
    pub const fn urn(&self) -> &CampaignUrn {
        &self.urn
    }

    /// Returns the campaign name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the campaign description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the running state.
    #[must_use]
    pub const fn running_state(&self) -> RunningState {
        self.state.running_state
    }

    /// Returns the privacy state.
    #[must_use]
    pub const fn privacy_state(&self) -> PrivacyState {
        self.state.privacy_state
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.state.created_at
    }

    /// Returns the original document text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the digest of the canonical document.
    #[must_use]
    pub const fn source_digest(&self) -> &HashDigest {
        &self.digest
    }

    /// Returns the surveys in document order.
    #[must_use]
    pub fn surveys(&self) -> &[Survey] {
        &self.surveys
    }

    // ------------------------------------------------------------------------
    // Survey lookups
    // ------------------------------------------------------------------------

    /// Returns true when the survey exists.
    #[must_use]
    pub fn survey_exists(&self, survey_id: &str) -> bool {
        self.survey_index.contains_key(survey_id)
    }

    /// Returns a survey by id.
    #[must_use]
    pub fn survey(&self, survey_id: &str) -> Option<&Survey> {
        self.survey_index.get(survey_id).and_then(|index| self.surveys.get(*index))
    }

    /// Returns a survey's title.
    #[must_use]
    pub fn survey_title(&self, survey_id: &str) -> Option<&str> {
        self.survey(survey_id).map(Survey::title)
    }

    /// Returns a survey's description.
    #[must_use]
    pub fn survey_description(&self, survey_id: &str) -> Option<&str> {
        self.survey(survey_id).and_then(Survey::description)
    }

    /// Returns the number of prompts in a survey, including nested prompts.
    #[must_use]
    pub fn number_of_prompts(&self, survey_id: &str) -> Option<usize> {
        self.survey(survey_id).map(Survey::number_of_prompts)
    }

    /// Returns the number of top-level items in a survey.
    #[must_use]
    pub fn number_of_survey_items(&self, survey_id: &str) -> Option<usize> {
        self.survey(survey_id).map(Survey::number_of_items)
    }

    /// Returns the ids of prompts displayed as metadata.
    #[must_use]
    pub fn metadata_prompt_ids(&self, survey_id: &str) -> Vec<&ItemId> {
        self.survey(survey_id)
            .map(|survey| {
                survey
                    .prompts()
                    .filter(|prompt| prompt.display_type == DisplayType::Metadata)
                    .map(|prompt| &prompt.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Item lookups
    // ------------------------------------------------------------------------

    /// Returns true when a repeatable set exists in a survey.
    #[must_use]
    pub fn repeatable_set_exists(&self, survey_id: &str, set_id: &str) -> bool {
        self.repeatable_set(survey_id, set_id).is_some()
    }

    /// Returns a repeatable set.
    #[must_use]
    pub fn repeatable_set(&self, survey_id: &str, set_id: &str) -> Option<&RepeatableSet> {
        self.survey(survey_id)?.repeatable_set(set_id)
    }

    /// Returns true when a prompt exists in a survey, directly or nested.
    #[must_use]
    pub fn prompt_exists(&self, survey_id: &str, prompt_id: &str) -> bool {
        self.prompt(survey_id, prompt_id).is_some()
    }

    /// Returns a prompt.
    #[must_use]
    pub fn prompt(&self, survey_id: &str, prompt_id: &str) -> Option<&Prompt> {
        self.survey(survey_id)?.prompt(prompt_id)
    }

    /// Returns a prompt's type.
    #[must_use]
    pub fn prompt_type(&self, survey_id: &str, prompt_id: &str) -> Option<PromptType> {
        self.prompt(survey_id, prompt_id).map(|prompt| prompt.prompt_type)
    }

    /// Returns whether a prompt may be skipped.
    #[must_use]
    pub fn is_prompt_skippable(&self, survey_id: &str, prompt_id: &str) -> Option<bool> {
        self.prompt(survey_id, prompt_id).map(|prompt| prompt.skippable)
    }

    /// Returns a prompt's text.
    #[must_use]
    pub fn prompt_text(&self, survey_id: &str, prompt_id: &str) -> Option<&str> {
        self.prompt(survey_id, prompt_id).map(|prompt| prompt.text.as_str())
    }

    /// Returns a prompt's display type.
    #[must_use]
    pub fn display_type(&self, survey_id: &str, prompt_id: &str) -> Option<DisplayType> {
        self.prompt(survey_id, prompt_id).map(|prompt| prompt.display_type)
    }

    /// Returns a prompt's display label.
    #[must_use]
    pub fn display_label(&self, survey_id: &str, prompt_id: &str) -> Option<&str> {
        self.prompt(survey_id, prompt_id).and_then(|prompt| prompt.display_label.as_deref())
    }

    /// Returns a prompt's unit.
    #[must_use]
    pub fn unit(&self, survey_id: &str, prompt_id: &str) -> Option<&str> {
        self.prompt(survey_id, prompt_id).and_then(|prompt| prompt.unit.as_deref())
    }

    /// Returns the label of a configured choice.
    #[must_use]
    pub fn choice_label(&self, survey_id: &str, prompt_id: &str, key: u64) -> Option<&str> {
        self.choice(survey_id, prompt_id, key).map(|option| option.label.as_str())
    }

    /// Returns the value of a configured choice.
    #[must_use]
    pub fn choice_value(&self, survey_id: &str, prompt_id: &str, key: u64) -> Option<&str> {
        self.choice(survey_id, prompt_id, key).and_then(|option| option.value.as_deref())
    }

    /// Returns true when a single-choice prompt carries values on its choices.
    #[must_use]
    pub fn prompt_contains_single_choice_values(&self, survey_id: &str, prompt_id: &str) -> bool {
        self.prompt(survey_id, prompt_id).is_some_and(|prompt| {
            prompt.prompt_type == PromptType::SingleChoice
                && prompt.rule.choices().is_some_and(crate::core::ChoiceSet::has_values)
        })
    }

    /// Resolves whether a prompt is direct or inside a repeatable set.
    #[must_use]
    pub fn prompt_location(&self, survey_id: &str, prompt_id: &str) -> Option<PromptLocation> {
        self.survey(survey_id)?.prompt_location(prompt_id)
    }

    /// Returns the survey that owns a prompt.
    #[must_use]
    pub fn survey_id_for_prompt(&self, prompt_id: &str) -> Option<&SurveyId> {
        self.prompt_surveys.get(prompt_id)
    }

    /// Returns a configured choice.
    fn choice(&self, survey_id: &str, prompt_id: &str, key: u64) -> Option<&ChoiceOption> {
        self.prompt(survey_id, prompt_id)?.rule.choices()?.option(key)
    }
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Holder of the current configuration of one campaign.
///
/// Replacement swaps the whole snapshot; a reader either sees the previous
/// configuration or the new one, never a mixture.
#[derive(Debug)]
pub struct ConfigurationHandle {
    /// Current snapshot.
    current: RwLock<Arc<Configuration>>,
}

impl ConfigurationHandle {
    /// Creates a handle holding `configuration`.
    #[must_use]
    pub fn new(configuration: Configuration) -> Self {
        Self {
            current: RwLock::new(Arc::new(configuration)),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Configuration> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swaps in a new configuration and returns the previous one.
    pub fn replace(&self, configuration: Configuration) -> Arc<Configuration> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(configuration))
    }
}
