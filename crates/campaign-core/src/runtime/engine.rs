// crates/campaign-core/src/runtime/engine.rs
// ============================================================================
// Module: Response Validation Engine
// Description: Walks a survey in declared order and checks a response batch.
// Purpose: Accept or reject one survey response atomically.
// Dependencies: serde, serde_json, thiserror, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The engine validates one survey response against an immutable
//! [`Configuration`] snapshot. Items are visited in document order; each
//! prompt's display condition is evaluated against the responses already
//! checked, which decides whether the prompt must be answered, may be
//! skipped, or must be absent. The first violation rejects the whole batch.
//!
//! The engine holds no mutable state, so validating the same batch twice
//! yields the same result.
//!
//! Security posture: response batches are untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use survey_condition::Condition;
use thiserror::Error;

use crate::core::Configuration;
use crate::core::ItemId;
use crate::core::Message;
use crate::core::NoResponse;
use crate::core::Prompt;
use crate::core::RepeatableSet;
use crate::core::SetItem;
use crate::core::SurveyItem;
use crate::interfaces::NoopEventSink;
use crate::interfaces::RESPONSE_VALIDATION_EVENT;
use crate::interfaces::ValidationEvent;
use crate::interfaces::ValidationEventSink;
use crate::interfaces::ValidationOutcome;
use crate::runtime::metadata::MetadataError;
use crate::runtime::metadata::SurveyResponseMetadata;
use crate::runtime::values::MediaSet;
use crate::runtime::values::check_value;
use crate::runtime::visibility::RecordedResponse;
use crate::runtime::visibility::RecordedResponses;
use crate::runtime::visibility::ResponseResolver;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum number of top-level responses in one batch.
pub const DEFAULT_MAX_RESPONSES: usize = 4096;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A response batch violates its survey's contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// The survey is not part of the campaign.
    #[error("survey `{0}` does not exist in the campaign")]
    UnknownSurvey(String),
    /// The metadata envelope is invalid.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// The batch exceeds the response limit.
    #[error("{actual} responses exceed the limit of {limit}")]
    TooManyResponses {
        /// Number of responses submitted.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },
    /// A response names no respondable item at this level.
    #[error("response `{0}` does not match any prompt")]
    UnexpectedResponse(String),
    /// A message was answered.
    #[error("message `{0}` cannot be answered")]
    ResponseToMessage(ItemId),
    /// A hidden item was answered.
    #[error("`{0}` was not displayed but has a response")]
    NotDisplayedAnswered(ItemId),
    /// A displayed item that cannot be skipped has no response.
    #[error("`{0}` was displayed but has no response")]
    MissingResponse(ItemId),
    /// An item that cannot be skipped was skipped.
    #[error("`{0}` cannot be skipped")]
    SkipNotAllowed(ItemId),
    /// An answer does not conform to its prompt.
    #[error("response to `{item}` is invalid: {message}")]
    InvalidValue {
        /// Prompt id.
        item: ItemId,
        /// Detail.
        message: String,
    },
    /// A repeatable set response is malformed.
    #[error("repeatable set `{item}` response is invalid: {message}")]
    RepeatableSet {
        /// Set id.
        item: ItemId,
        /// Detail.
        message: String,
    },
    /// An error inside one iteration of a repeatable set.
    #[error("repeatable set `{set}` iteration {iteration}: {source}")]
    Iteration {
        /// Set id.
        set: ItemId,
        /// Zero-based iteration index.
        iteration: usize,
        /// Underlying error.
        source: Box<Self>,
    },
}

impl ResponseError {
    /// Returns the item the error is reported against.
    #[must_use]
    pub fn item(&self) -> Option<&str> {
        match self {
            Self::UnknownSurvey(_)
            | Self::Metadata(_)
            | Self::TooManyResponses {
                ..
            } => None,
            Self::UnexpectedResponse(id) => Some(id.as_str()),
            Self::ResponseToMessage(id)
            | Self::NotDisplayedAnswered(id)
            | Self::MissingResponse(id)
            | Self::SkipNotAllowed(id)
            | Self::InvalidValue {
                item: id, ..
            }
            | Self::RepeatableSet {
                item: id, ..
            } => Some(id.as_str()),
            Self::Iteration {
                source, ..
            } => source.item(),
        }
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Substantive responses keyed by item id, sentinels removed.
pub type NormalizedResponses = BTreeMap<ItemId, Value>;

/// Submitted shape of a repeatable set response.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetResponse {
    /// The participant ended the set without answering.
    #[serde(default)]
    skipped: bool,
    /// The set was hidden by its condition.
    #[serde(default)]
    not_displayed: bool,
    /// One object per completed iteration.
    #[serde(default)]
    responses: Vec<Map<String, Value>>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Validates survey responses against one configuration snapshot.
#[derive(Clone)]
pub struct ResponseValidationEngine {
    /// Configuration responses are checked against.
    configuration: Arc<Configuration>,
    /// Event receiver.
    sink: Arc<dyn ValidationEventSink>,
    /// Maximum number of top-level responses per batch.
    max_responses: usize,
}

impl ResponseValidationEngine {
    /// Creates an engine over a configuration snapshot.
    #[must_use]
    pub fn new(configuration: Arc<Configuration>) -> Self {
        Self {
            configuration,
            sink: Arc::new(NoopEventSink),
            max_responses: DEFAULT_MAX_RESPONSES,
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ValidationEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the response limit.
    #[must_use]
    pub const fn with_max_responses(mut self, max_responses: usize) -> Self {
        self.max_responses = max_responses;
        self
    }

    /// Returns the configuration snapshot.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Validates one survey response and returns its normalized answers.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] naming the first offending item.
    pub fn validate(
        &self,
        survey_id: &str,
        metadata: &SurveyResponseMetadata,
        responses: &Map<String, Value>,
        media: &MediaSet,
    ) -> Result<NormalizedResponses, ResponseError> {
        let outcome = self.check_batch(survey_id, metadata, responses, media);
        self.record_outcome(survey_id, &outcome);
        outcome
    }

    /// Runs every check for one batch.
    fn check_batch(
        &self,
        survey_id: &str,
        metadata: &SurveyResponseMetadata,
        responses: &Map<String, Value>,
        media: &MediaSet,
    ) -> Result<NormalizedResponses, ResponseError> {
        let survey = self
            .configuration
            .survey(survey_id)
            .ok_or_else(|| ResponseError::UnknownSurvey(survey_id.to_string()))?;
        metadata.validate(self.configuration.urn())?;
        if responses.len() > self.max_responses {
            return Err(ResponseError::TooManyResponses {
                actual: responses.len(),
                limit: self.max_responses,
            });
        }

        let mut walk = Walk {
            media,
            outer: None,
            recorded: RecordedResponses::new(),
            output: NormalizedResponses::new(),
            consumed: BTreeSet::new(),
        };
        for item in survey.items() {
            match item {
                SurveyItem::Message(message) => walk.message(message, responses)?,
                SurveyItem::Prompt(prompt) => walk.prompt(prompt, responses)?,
                SurveyItem::RepeatableSet(set) => walk.repeatable_set(set, responses)?,
            }
        }
        walk.reject_unconsumed(responses)?;
        Ok(walk.output)
    }

    /// Reports the outcome of a batch to the sink.
    fn record_outcome(
        &self,
        survey_id: &str,
        outcome: &Result<NormalizedResponses, ResponseError>,
    ) {
        let event = match outcome {
            Ok(_) => ValidationEvent::new(RESPONSE_VALIDATION_EVENT, ValidationOutcome::Accepted),
            Err(err) => ValidationEvent::new(RESPONSE_VALIDATION_EVENT, ValidationOutcome::Rejected)
                .with_message(err.to_string()),
        };
        self.sink.record(
            &event
                .with_campaign(self.configuration.urn().as_str())
                .with_survey(survey_id)
                .with_digest(self.configuration.source_digest().value.as_str()),
        );
    }
}

// ============================================================================
// SECTION: Walk
// ============================================================================

/// State threaded through one level of a survey walk.
struct Walk<'a> {
    /// Uploaded media ids.
    media: &'a MediaSet,
    /// Top-level responses when walking a set iteration.
    outer: Option<&'a RecordedResponses>,
    /// Responses recorded at this level.
    recorded: RecordedResponses,
    /// Substantive answers at this level.
    output: NormalizedResponses,
    /// Response keys claimed by an item at this level.
    consumed: BTreeSet<String>,
}

impl Walk<'_> {
    /// Returns whether an item with `condition` is expected to be displayed.
    fn is_visible(&self, condition: Option<&Condition>) -> bool {
        match self.outer {
            Some(outer) => {
                ResponseResolver::new(outer).with_local(&self.recorded).is_visible(condition)
            }
            None => ResponseResolver::new(&self.recorded).is_visible(condition),
        }
    }

    /// Takes the response for an item, treating `null` as absent.
    fn take<'r>(&mut self, id: &ItemId, responses: &'r Map<String, Value>) -> Option<&'r Value> {
        let value = responses.get(id.as_str())?;
        self.consumed.insert(id.as_str().to_string());
        (!value.is_null()).then_some(value)
    }

    /// Messages never carry a response.
    fn message(
        &mut self,
        message: &Message,
        responses: &Map<String, Value>,
    ) -> Result<(), ResponseError> {
        if responses.contains_key(message.id.as_str()) {
            return Err(ResponseError::ResponseToMessage(message.id.clone()));
        }
        Ok(())
    }

    /// Checks one prompt and records its outcome.
    fn prompt(
        &mut self,
        prompt: &Prompt,
        responses: &Map<String, Value>,
    ) -> Result<(), ResponseError> {
        let visible = self.is_visible(prompt.condition.as_ref());
        let value = self.take(&prompt.id, responses);
        let recorded = self.check_prompt(prompt, visible, value)?;
        if let RecordedResponse::Answered(checked) = &recorded {
            self.output.insert(prompt.id.clone(), checked.to_json());
        }
        self.recorded.insert(prompt.id.clone(), recorded);
        Ok(())
    }

    /// Decides the recorded outcome of one prompt.
    fn check_prompt(
        &self,
        prompt: &Prompt,
        visible: bool,
        value: Option<&Value>,
    ) -> Result<RecordedResponse, ResponseError> {
        let sentinel = value.and_then(Value::as_str).and_then(NoResponse::from_response);
        match (visible, value, sentinel) {
            (false, None, _) | (false, Some(_), Some(NoResponse::NotDisplayed)) => {
                Ok(RecordedResponse::NoResponse(NoResponse::NotDisplayed))
            }
            (false, Some(_), _) => Err(ResponseError::NotDisplayedAnswered(prompt.id.clone())),
            (true, None, _) | (true, Some(_), Some(NoResponse::Skipped)) => {
                if prompt.skippable {
                    Ok(RecordedResponse::NoResponse(NoResponse::Skipped))
                } else if value.is_none() {
                    Err(ResponseError::MissingResponse(prompt.id.clone()))
                } else {
                    Err(ResponseError::SkipNotAllowed(prompt.id.clone()))
                }
            }
            (true, Some(_), Some(NoResponse::NotDisplayed)) => Err(ResponseError::InvalidValue {
                item: prompt.id.clone(),
                message: format!("prompt was displayed but answered {}", NoResponse::NotDisplayed),
            }),
            (true, Some(value), None) => check_value(&prompt.rule, value, self.media)
                .map(RecordedResponse::Answered)
                .map_err(|message| ResponseError::InvalidValue {
                    item: prompt.id.clone(),
                    message,
                }),
        }
    }

    /// Checks a repeatable set and every one of its iterations.
    fn repeatable_set(
        &mut self,
        set: &RepeatableSet,
        responses: &Map<String, Value>,
    ) -> Result<(), ResponseError> {
        let visible = self.is_visible(set.condition.as_ref());
        let Some(value) = self.take(&set.id, responses) else {
            return if !visible || set.termination_skip_enabled {
                Ok(())
            } else {
                Err(ResponseError::MissingResponse(set.id.clone()))
            };
        };
        let shape = SetResponse::deserialize(value).map_err(|err| ResponseError::RepeatableSet {
            item: set.id.clone(),
            message: err.to_string(),
        })?;
        let malformed = |message: &str| ResponseError::RepeatableSet {
            item: set.id.clone(),
            message: message.to_string(),
        };

        if !visible {
            if !shape.not_displayed || shape.skipped || !shape.responses.is_empty() {
                return Err(ResponseError::NotDisplayedAnswered(set.id.clone()));
            }
            return Ok(());
        }
        if shape.not_displayed {
            return Err(malformed("set was displayed but marked not displayed"));
        }
        if shape.skipped {
            if !set.termination_skip_enabled {
                return Err(ResponseError::SkipNotAllowed(set.id.clone()));
            }
            if !shape.responses.is_empty() {
                return Err(malformed("a skipped set cannot carry iterations"));
            }
            return Ok(());
        }
        if shape.responses.is_empty() {
            return Err(malformed("a displayed set needs at least one iteration"));
        }

        let mut iterations = Vec::with_capacity(shape.responses.len());
        for (iteration, answers) in shape.responses.iter().enumerate() {
            let normalized = self.iteration(set, answers).map_err(|err| ResponseError::Iteration {
                set: set.id.clone(),
                iteration,
                source: Box::new(err),
            })?;
            let object = normalized
                .into_iter()
                .map(|(id, value)| (id.as_str().to_string(), value))
                .collect();
            iterations.push(Value::Object(object));
        }
        self.output.insert(set.id.clone(), Value::Array(iterations));
        Ok(())
    }

    /// Walks one iteration of a set with the top-level responses visible.
    fn iteration(
        &self,
        set: &RepeatableSet,
        answers: &Map<String, Value>,
    ) -> Result<NormalizedResponses, ResponseError> {
        let mut walk = Walk {
            media: self.media,
            outer: Some(&self.recorded),
            recorded: RecordedResponses::new(),
            output: NormalizedResponses::new(),
            consumed: BTreeSet::new(),
        };
        for item in &set.items {
            match item {
                SetItem::Message(message) => walk.message(message, answers)?,
                SetItem::Prompt(prompt) => walk.prompt(prompt, answers)?,
            }
        }
        walk.reject_unconsumed(answers)?;
        Ok(walk.output)
    }

    /// Rejects response keys no item at this level claimed.
    fn reject_unconsumed(&self, responses: &Map<String, Value>) -> Result<(), ResponseError> {
        match responses.keys().find(|key| !self.consumed.contains(key.as_str())) {
            Some(key) => Err(ResponseError::UnexpectedResponse(key.clone())),
            None => Ok(()),
        }
    }
}
