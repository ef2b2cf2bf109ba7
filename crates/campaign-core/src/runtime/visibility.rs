// crates/campaign-core/src/runtime/visibility.rs
// ============================================================================
// Module: Response Visibility
// Description: Condition evaluation against already-checked responses.
// Purpose: Decide whether an item was expected to be displayed.
// Dependencies: bigdecimal, survey-condition, uuid, crate::core
// ============================================================================

//! ## Overview
//! Each comparison in a display condition is answered by
//! [`compare_response`] against the response recorded for the referenced
//! prompt. Anything that cannot be compared (a missing response, a literal
//! that does not parse for the prompt's type, an ordering operator on text)
//! evaluates false, so an item whose condition cannot be satisfied is
//! treated as hidden.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use serde_json::Value;
use survey_condition::Condition;
use survey_condition::ConditionResolver;
use survey_condition::Literal;
use survey_condition::Operator;
use uuid::Uuid;

use crate::core::ItemId;
use crate::core::NoResponse;
use crate::core::time::parse_response_timestamp;
use crate::runtime::values::CheckedValue;
use crate::runtime::values::bounded_decimal;
use crate::runtime::values::CustomAnswer;

// ============================================================================
// SECTION: Recorded Responses
// ============================================================================

/// Outcome recorded for one prompt during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedResponse {
    /// A conforming answer.
    Answered(CheckedValue),
    /// A skipped or hidden prompt.
    NoResponse(NoResponse),
}

/// Recorded responses keyed by prompt id.
pub type RecordedResponses = BTreeMap<ItemId, RecordedResponse>;

/// Resolves comparisons against iteration-local then outer responses.
pub(crate) struct ResponseResolver<'a> {
    /// Responses to top-level prompts.
    outer: &'a RecordedResponses,
    /// Responses inside the current repeatable set iteration.
    local: Option<&'a RecordedResponses>,
}

impl<'a> ResponseResolver<'a> {
    /// Creates a resolver over top-level responses.
    pub(crate) const fn new(outer: &'a RecordedResponses) -> Self {
        Self {
            outer,
            local: None,
        }
    }

    /// Adds the responses of the current iteration.
    pub(crate) const fn with_local(mut self, local: &'a RecordedResponses) -> Self {
        self.local = Some(local);
        self
    }

    /// Returns true when the item has no condition or its condition holds.
    pub(crate) fn is_visible(&self, condition: Option<&Condition>) -> bool {
        condition.is_none_or(|condition| condition.evaluate(self))
    }
}

impl ConditionResolver for ResponseResolver<'_> {
    fn compare(&self, id: &str, operator: Operator, literal: &Literal) -> bool {
        self.local
            .and_then(|local| local.get(id))
            .or_else(|| self.outer.get(id))
            .is_some_and(|recorded| compare_response(recorded, operator, literal))
    }
}

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Returns whether a recorded response satisfies `operator literal`.
#[must_use]
pub fn compare_response(
    recorded: &RecordedResponse,
    operator: Operator,
    literal: &Literal,
) -> bool {
    let sentinel = NoResponse::from_literal(literal.as_str());
    match (recorded, sentinel) {
        (RecordedResponse::NoResponse(recorded), expected) => match operator {
            Operator::Equals => expected == Some(*recorded),
            Operator::NotEquals => expected != Some(*recorded),
            _ => false,
        },
        (RecordedResponse::Answered(_), Some(_)) => operator == Operator::NotEquals,
        (RecordedResponse::Answered(value), None) => compare_value(value, operator, literal),
    }
}

/// Compares a conforming answer with a non-sentinel literal.
fn compare_value(value: &CheckedValue, operator: Operator, literal: &Literal) -> bool {
    let text = literal.as_str().trim();
    match value {
        CheckedValue::Number(number) => {
            ordered(decimal_cmp(&BigDecimal::from(*number), text), operator)
        }
        CheckedValue::Choice(key) => ordered(decimal_cmp(&BigDecimal::from(*key), text), operator),
        CheckedValue::Timestamp {
            parsed, ..
        } => ordered(parse_response_timestamp(text).map(|other| parsed.cmp(&other)), operator),
        CheckedValue::Text(answer) => equality(Some(answer.as_str() == literal.as_str()), operator),
        CheckedValue::Photo(id) => {
            equality(Uuid::parse_str(text).ok().map(|other| *id == other), operator)
        }
        CheckedValue::Choices(keys) => {
            equality(text.parse::<u64>().ok().map(|key| keys.contains(&key)), operator)
        }
        CheckedValue::CustomChoice(answer) => {
            equality(Some(custom_matches(answer, literal.as_str())), operator)
        }
        CheckedValue::CustomChoices(answers) => equality(
            Some(answers.iter().any(|answer| custom_matches(answer, literal.as_str()))),
            operator,
        ),
        CheckedValue::RemoteActivity(runs) => equality(
            serde_json::from_str::<Value>(text)
                .ok()
                .map(|other| other.as_array().is_some_and(|other| other == runs)),
            operator,
        ),
    }
}

/// Applies an ordering operator; incomparable values are false.
fn ordered(ordering: Option<Ordering>, operator: Operator) -> bool {
    ordering.is_some_and(|ordering| operator.accepts(ordering))
}

/// Applies an equality operator to a match result; ordering operators are false.
fn equality(matched: Option<bool>, operator: Operator) -> bool {
    match (operator, matched) {
        (Operator::Equals, Some(matched)) => matched,
        (Operator::NotEquals, Some(matched)) => !matched,
        _ => false,
    }
}

/// Orders a decimal answer against literal text.
fn decimal_cmp(answer: &BigDecimal, literal: &str) -> Option<Ordering> {
    bounded_decimal(literal).map(|other| answer.cmp(&other))
}

/// Matches a custom answer by key or by label.
fn custom_matches(answer: &CustomAnswer, literal: &str) -> bool {
    match answer {
        CustomAnswer::Key(key) => literal.trim().parse::<u64>().is_ok_and(|other| other == *key),
        CustomAnswer::Label(label) => label == literal,
    }
}
