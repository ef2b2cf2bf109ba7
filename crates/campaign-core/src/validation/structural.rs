// crates/campaign-core/src/validation/structural.rs
// ============================================================================
// Module: Structural Campaign Validator
// Description: Ordered, fail-fast validation passes over a campaign document.
// Purpose: Prove a document internally consistent before it is compiled.
// Dependencies: jsonschema, serde_json, survey-condition, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`StructuralValidator::validate`] runs the passes listed by
//! [`ValidationPass::ORDER`] and stops at the first failure. Each run builds
//! its own prompt validators; nothing is shared between runs, so one
//! validator instance may check many documents concurrently.
//!
//! Condition ordering follows the survey's encounter order: a condition may
//! only reference prompts that appear strictly earlier. Prompts inside a
//! repeatable set are visible to later items of the same set but not to
//! items after the set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use jsonschema::Draft;
use jsonschema::Validator;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use survey_condition::Condition;
use survey_condition::DEFAULT_MAX_CONDITION_BYTES;
use thiserror::Error;

use crate::core::DisplayType;
use crate::core::ItemId;
use crate::core::PromptType;
use crate::core::SurveyId;
use crate::core::document::CampaignDocument;
use crate::core::document::ContentItemDocument;
use crate::core::document::ItemNode;
use crate::core::document::SurveyDocument;
use crate::core::is_valid_urn;
use crate::interfaces::CAMPAIGN_VALIDATION_EVENT;
use crate::interfaces::CAMPAIGN_WARNING_EVENT;
use crate::interfaces::NoopEventSink;
use crate::interfaces::ValidationEvent;
use crate::interfaces::ValidationEventSink;
use crate::interfaces::ValidationOutcome;
use crate::validation::StructuralError;
use crate::validation::ValidationPass;
use crate::validation::prompt_types::PromptTypeValidator;
use crate::validation::prompt_types::is_known_prompt_type;
use crate::validation::prompt_types::validator_for;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum campaign document size in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;

/// Size limits applied while validating a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Largest accepted document, in bytes.
    pub max_document_bytes: usize,
    /// Largest accepted condition expression, in bytes.
    pub max_condition_bytes: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            max_condition_bytes: DEFAULT_MAX_CONDITION_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Non-fatal authoring finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    /// Survey the warning concerns.
    pub survey_id: SurveyId,
    /// Pass that raised the warning.
    pub pass: ValidationPass,
    /// Human-readable detail.
    pub message: String,
}

/// A document that passed every structural pass.
///
/// Holds the configured prompt validators and parsed conditions so
/// compilation never repeats any check.
#[derive(Debug, Clone)]
pub struct ValidatedCampaign {
    /// Decoded document.
    pub(crate) document: CampaignDocument,
    /// Original document text.
    pub(crate) source: String,
    /// Configured validators keyed by prompt id.
    pub(crate) validators: BTreeMap<ItemId, PromptTypeValidator>,
    /// Parsed conditions keyed by item id.
    pub(crate) conditions: BTreeMap<ItemId, Condition>,
    /// Non-fatal findings.
    pub(crate) warnings: Vec<ValidationWarning>,
}

impl ValidatedCampaign {
    /// Returns the decoded document.
    #[must_use]
    pub const fn document(&self) -> &CampaignDocument {
        &self.document
    }

    /// Returns the original document text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the configured validator for a prompt.
    #[must_use]
    pub fn validator(&self, prompt_id: &str) -> Option<&PromptTypeValidator> {
        self.validators.get(prompt_id)
    }

    /// Returns the parsed condition of an item.
    #[must_use]
    pub fn condition(&self, item_id: &str) -> Option<&Condition> {
        self.conditions.get(item_id)
    }

    /// Returns the non-fatal findings.
    #[must_use]
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// The supplied JSON Schema document could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("campaign schema failed to compile: {0}")]
pub struct SchemaCompileError(pub String);

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Orchestrates the ordered validation passes.
pub struct StructuralValidator {
    /// Compiled document schema.
    schema: Validator,
    /// Size limits.
    limits: ValidationLimits,
    /// Event receiver.
    sink: Arc<dyn ValidationEventSink>,
}

impl std::fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl StructuralValidator {
    /// Compiles the document schema (Draft 2020-12) into a validator.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaCompileError`] when the schema itself is invalid.
    pub fn new(schema: &Value) -> Result<Self, SchemaCompileError> {
        let schema = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|err| SchemaCompileError(err.to_string()))?;
        Ok(Self {
            schema,
            limits: ValidationLimits::default(),
            sink: Arc::new(NoopEventSink),
        })
    }

    /// Replaces the size limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ValidationEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the active size limits.
    #[must_use]
    pub const fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validates one document.
    ///
    /// # Errors
    ///
    /// Returns the [`StructuralError`] of the first failing pass.
    pub fn validate(&self, text: &str) -> Result<ValidatedCampaign, StructuralError> {
        let outcome = self.run_passes(text);
        self.record_outcome(&outcome);
        outcome
    }

    /// Runs every pass in order.
    fn run_passes(&self, text: &str) -> Result<ValidatedCampaign, StructuralError> {
        let document = self.decode_document(text)?;
        check_campaign_urn(&document)?;
        check_unique_ids(&document)?;
        check_prompt_types(&document)?;
        let validators = configure_prompts(&document)?;
        let conditions = check_conditions(&document, &validators, self.limits.max_condition_bytes)?;
        check_defaults(&document, &validators)?;
        check_survey_rules(&document)?;
        check_repeatable_set_rules(&document)?;
        check_prompt_rules(&document)?;
        let warnings = check_display_types(&document)?;
        Ok(ValidatedCampaign {
            document,
            source: text.to_string(),
            validators,
            conditions,
            warnings,
        })
    }

    /// Pass 1: size limit, JSON syntax, schema conformance, typed decode.
    fn decode_document(&self, text: &str) -> Result<CampaignDocument, StructuralError> {
        let schema_error = |message: String| StructuralError::new(ValidationPass::Schema, message);
        if text.len() > self.limits.max_document_bytes {
            return Err(schema_error(format!(
                "document is {} bytes; limit is {}",
                text.len(),
                self.limits.max_document_bytes
            )));
        }
        let value: Value = serde_json::from_str(text)
            .map_err(|err| schema_error(format!("document is not valid json: {err}")))?;
        if let Some(err) = self.schema.iter_errors(&value).next() {
            return Err(schema_error(format!("document does not match the schema: {err}")));
        }
        CampaignDocument::deserialize(&value)
            .map_err(|err| schema_error(format!("document could not be decoded: {err}")))
    }

    /// Reports the outcome of a run to the sink.
    fn record_outcome(&self, outcome: &Result<ValidatedCampaign, StructuralError>) {
        match outcome {
            Ok(campaign) => {
                let urn = campaign.document.campaign_urn.as_str();
                for warning in &campaign.warnings {
                    self.sink.record(
                        &ValidationEvent::new(CAMPAIGN_WARNING_EVENT, ValidationOutcome::Warning)
                            .with_campaign(urn)
                            .with_survey(warning.survey_id.as_str())
                            .with_pass(warning.pass)
                            .with_message(warning.message.as_str()),
                    );
                }
                self.sink.record(
                    &ValidationEvent::new(CAMPAIGN_VALIDATION_EVENT, ValidationOutcome::Accepted)
                        .with_campaign(urn),
                );
            }
            Err(err) => {
                self.sink.record(
                    &ValidationEvent::new(CAMPAIGN_VALIDATION_EVENT, ValidationOutcome::Rejected)
                        .with_pass(err.pass)
                        .with_message(err.to_string()),
                );
            }
        }
    }
}

// ============================================================================
// SECTION: Identity Passes
// ============================================================================

/// Pass 2: campaign URN format.
fn check_campaign_urn(document: &CampaignDocument) -> Result<(), StructuralError> {
    if is_valid_urn(&document.campaign_urn) {
        Ok(())
    } else {
        Err(StructuralError::new(
            ValidationPass::CampaignUrn,
            format!("`{}` is not a valid campaign urn", document.campaign_urn),
        ))
    }
}

/// Pass 3: every survey and item id is unique across the document.
fn check_unique_ids(document: &CampaignDocument) -> Result<(), StructuralError> {
    let mut seen = BTreeSet::new();
    let mut claim = |id: &str| {
        if seen.insert(id.to_string()) {
            Ok(())
        } else {
            Err(StructuralError::for_item(ValidationPass::UniqueIds, id, "duplicate id"))
        }
    };
    for survey in &document.surveys {
        claim(&survey.id)?;
        for entry in survey.flattened() {
            claim(entry.node.id())?;
        }
    }
    Ok(())
}

/// Pass 4: every prompt type tag is known.
fn check_prompt_types(document: &CampaignDocument) -> Result<(), StructuralError> {
    for (_, prompt) in document.prompts() {
        if !is_known_prompt_type(&prompt.prompt_type) {
            return Err(StructuralError::for_item(
                ValidationPass::PromptTypes,
                prompt.id.as_str(),
                format!("unknown prompt type `{}`", prompt.prompt_type),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Prompt Passes
// ============================================================================

/// Pass 5: configure one validator per prompt.
fn configure_prompts(
    document: &CampaignDocument,
) -> Result<BTreeMap<ItemId, PromptTypeValidator>, StructuralError> {
    let mut validators = BTreeMap::new();
    for (_, prompt) in document.prompts() {
        let mut validator = validator_for(&prompt.prompt_type).ok_or_else(|| {
            StructuralError::for_item(
                ValidationPass::PromptTypes,
                prompt.id.as_str(),
                format!("unknown prompt type `{}`", prompt.prompt_type),
            )
        })?;
        validator.validate_and_set_configuration(prompt)?;
        validators.insert(ItemId::new(prompt.id.as_str()), validator);
    }
    Ok(validators)
}

/// Pass 6: parse conditions and check their references and literals.
fn check_conditions(
    document: &CampaignDocument,
    validators: &BTreeMap<ItemId, PromptTypeValidator>,
    max_condition_bytes: usize,
) -> Result<BTreeMap<ItemId, Condition>, StructuralError> {
    let mut conditions = BTreeMap::new();
    for survey in &document.surveys {
        let mut earlier: Vec<&str> = Vec::new();
        for (position, item) in survey.content_list.iter().enumerate() {
            let node = item.node();
            if let Some(raw) = node.condition() {
                if position == 0 {
                    return Err(StructuralError::for_item(
                        ValidationPass::Conditions,
                        node.id(),
                        format!("the first item of survey `{}` cannot have a condition", survey.id),
                    ));
                }
                let condition =
                    check_condition(node, raw, &earlier, validators, max_condition_bytes)?;
                conditions.insert(ItemId::new(node.id()), condition);
            }
            if let ContentItemDocument::RepeatableSet(set) = item {
                let mut local = earlier.clone();
                local.push(set.id.as_str());
                for child in &set.prompts {
                    let child = child.node();
                    if let Some(raw) = child.condition() {
                        let condition =
                            check_condition(child, raw, &local, validators, max_condition_bytes)?;
                        conditions.insert(ItemId::new(child.id()), condition);
                    }
                    local.push(child.id());
                }
            }
            earlier.push(node.id());
        }
    }
    Ok(conditions)
}

/// Parses one condition and checks each referenced pair.
fn check_condition(
    owner: ItemNode<'_>,
    raw: &str,
    earlier: &[&str],
    validators: &BTreeMap<ItemId, PromptTypeValidator>,
    max_condition_bytes: usize,
) -> Result<Condition, StructuralError> {
    let reject = |message: String| {
        StructuralError::for_item(ValidationPass::Conditions, owner.id(), message)
    };
    let condition = Condition::parse_with_limit(raw, max_condition_bytes)
        .map_err(|err| reject(format!("invalid condition `{raw}`: {err}")))?;
    for (id, pairs) in condition.referenced_values() {
        if !earlier.contains(&id.as_str()) {
            return Err(reject(format!(
                "condition references `{id}`, which is not an earlier item of the survey"
            )));
        }
        let validator = validators
            .get(id.as_str())
            .ok_or_else(|| reject(format!("condition references `{id}`, which is not a prompt")))?;
        for pair in &pairs {
            validator
                .validate_condition_value(pair.operator, &pair.literal)
                .map_err(|err| reject(format!("condition on `{id}`: {}", err.message)))?;
        }
    }
    Ok(condition)
}

/// Pass 7: default answers are legal for their prompts.
fn check_defaults(
    document: &CampaignDocument,
    validators: &BTreeMap<ItemId, PromptTypeValidator>,
) -> Result<(), StructuralError> {
    for (_, prompt) in document.prompts() {
        let Some(default) = prompt.default.as_deref() else {
            continue;
        };
        let validator = validators.get(prompt.id.as_str()).ok_or_else(|| {
            StructuralError::for_item(
                ValidationPass::Defaults,
                prompt.id.as_str(),
                "prompt has no configured validator",
            )
        })?;
        validator.check_default_value(default)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Authoring Rules
// ============================================================================

/// Returns true when an optional text field holds non-blank text.
fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

/// Pass 8: surveys with a summary screen declare its text and edit flag.
fn check_survey_rules(document: &CampaignDocument) -> Result<(), StructuralError> {
    for survey in &document.surveys {
        if !survey.show_summary {
            continue;
        }
        let reject = |message: &str| {
            StructuralError::for_item(ValidationPass::SurveyRules, survey.id.as_str(), message)
        };
        if !is_present(survey.summary_text.as_deref()) {
            return Err(reject("showSummary is true but summaryText is missing"));
        }
        if survey.edit_summary.is_none() {
            return Err(reject("showSummary is true but editSummary is missing"));
        }
    }
    Ok(())
}

/// Pass 9: skippable repeatable sets declare a skip label.
fn check_repeatable_set_rules(document: &CampaignDocument) -> Result<(), StructuralError> {
    for survey in &document.surveys {
        for item in &survey.content_list {
            let ContentItemDocument::RepeatableSet(set) = item else {
                continue;
            };
            if set.termination_skip_enabled && !is_present(set.termination_skip_label.as_deref())
            {
                return Err(StructuralError::for_item(
                    ValidationPass::RepeatableSetRules,
                    set.id.as_str(),
                    "terminationSkipEnabled is true but terminationSkipLabel is missing",
                ));
            }
        }
    }
    Ok(())
}

/// Pass 10: skippable prompts declare a skip label, and prompts of
/// summarized surveys declare abbreviated text.
fn check_prompt_rules(document: &CampaignDocument) -> Result<(), StructuralError> {
    for (survey, prompt) in document.prompts() {
        let reject = |message: &str| {
            StructuralError::for_item(ValidationPass::PromptRules, prompt.id.as_str(), message)
        };
        if prompt.skippable && !is_present(prompt.skip_label.as_deref()) {
            return Err(reject("skippable is true but skipLabel is missing"));
        }
        if survey.show_summary && !is_present(prompt.abbreviated_text.as_deref()) {
            return Err(reject("the survey shows a summary but abbreviatedText is missing"));
        }
    }
    Ok(())
}

/// Pass 11: display types are known; repeated metadata timestamps warn.
fn check_display_types(
    document: &CampaignDocument,
) -> Result<Vec<ValidationWarning>, StructuralError> {
    let mut warnings = Vec::new();
    for survey in &document.surveys {
        let metadata_timestamps = count_metadata_timestamps(survey)?;
        if metadata_timestamps > 1 {
            warnings.push(ValidationWarning {
                survey_id: SurveyId::new(survey.id.as_str()),
                pass: ValidationPass::DisplayTypes,
                message: format!(
                    "{metadata_timestamps} timestamp prompts use the metadata display type"
                ),
            });
        }
    }
    Ok(warnings)
}

/// Checks a survey's display types and counts metadata timestamp prompts.
fn count_metadata_timestamps(survey: &SurveyDocument) -> Result<usize, StructuralError> {
    let mut count = 0;
    for prompt in survey.prompts() {
        let display_type = DisplayType::from_tag(&prompt.display_type).ok_or_else(|| {
            StructuralError::for_item(
                ValidationPass::DisplayTypes,
                prompt.id.as_str(),
                format!("unknown display type `{}`", prompt.display_type),
            )
        })?;
        if display_type == DisplayType::Metadata
            && PromptType::from_tag(&prompt.prompt_type) == Some(PromptType::Timestamp)
        {
            count += 1;
        }
    }
    Ok(count)
}
