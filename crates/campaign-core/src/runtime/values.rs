// crates/campaign-core/src/runtime/values.rs
// ============================================================================
// Module: Response Value Checks
// Description: Per-type conformance checks for submitted answer values.
// Purpose: Turn untrusted JSON answers into typed, normalized values.
// Dependencies: bigdecimal, serde_json, time, uuid, crate::core
// ============================================================================

//! ## Overview
//! [`check_value`] applies a prompt's [`ResponseRule`] to one submitted JSON
//! value. Accepted values become a [`CheckedValue`], which conditions are
//! evaluated against and which renders the normalized output. Numbers are
//! parsed with decimal semantics so `5`, `5.0`, and `"5"` are the same
//! answer while `5.5` is rejected as not whole.
//!
//! Security posture: answer values are untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use bigdecimal::Zero;
use serde_json::Value;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::core::ChoiceSet;
use crate::core::IntegerRange;
use crate::core::LengthRange;
use crate::core::ResponseRule;
use crate::core::time::parse_response_timestamp;

/// Largest exponent magnitude accepted in numeric answers and literals.
const MAX_DECIMAL_SCALE: u64 = 32;

/// Key every remote activity run result must carry as a number.
const SCORE_KEY: &str = "score";

// ============================================================================
// SECTION: Media
// ============================================================================

/// Identifiers of media files uploaded alongside a response batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSet(BTreeSet<Uuid>);

impl MediaSet {
    /// Creates an empty media set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a media id.
    pub fn insert(&mut self, id: Uuid) -> bool {
        self.0.insert(id)
    }

    /// Returns true when the media id was uploaded.
    #[must_use]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.0.contains(id)
    }

    /// Returns the number of uploaded media ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no media was uploaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Uuid> for MediaSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// SECTION: Checked Values
// ============================================================================

/// Answer to a custom choice prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomAnswer {
    /// A configured choice key.
    Key(u64),
    /// A participant-supplied label.
    Label(String),
}

impl CustomAnswer {
    /// Renders the normalized JSON value.
    fn to_json(&self) -> Value {
        match self {
            Self::Key(key) => Value::from(*key),
            Self::Label(label) => Value::from(label.as_str()),
        }
    }
}

/// A submitted answer that conforms to its prompt's rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckedValue {
    /// Whole number.
    Number(i64),
    /// Free text.
    Text(String),
    /// Single choice key.
    Choice(u64),
    /// Distinct choice keys.
    Choices(Vec<u64>),
    /// Single custom choice.
    CustomChoice(CustomAnswer),
    /// Several custom choices.
    CustomChoices(Vec<CustomAnswer>),
    /// Uploaded photo id.
    Photo(Uuid),
    /// Local date-time with its submitted text.
    Timestamp {
        /// Parsed value for comparisons.
        parsed: PrimitiveDateTime,
        /// Submitted text.
        raw: String,
    },
    /// Remote activity run results.
    RemoteActivity(Vec<Value>),
}

impl CheckedValue {
    /// Renders the normalized JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(value) => Value::from(*value),
            Self::Text(text) => Value::from(text.as_str()),
            Self::Choice(key) => Value::from(*key),
            Self::Choices(keys) => Value::from(keys.clone()),
            Self::CustomChoice(answer) => answer.to_json(),
            Self::CustomChoices(answers) => {
                Value::Array(answers.iter().map(CustomAnswer::to_json).collect())
            }
            Self::Photo(id) => Value::from(id.to_string()),
            Self::Timestamp {
                raw, ..
            } => Value::from(raw.as_str()),
            Self::RemoteActivity(runs) => Value::Array(runs.clone()),
        }
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Checks one submitted value against a rule.
///
/// # Errors
///
/// Returns a human-readable reason when the value does not conform.
pub fn check_value(
    rule: &ResponseRule,
    value: &Value,
    media: &MediaSet,
) -> Result<CheckedValue, String> {
    match rule {
        ResponseRule::Number {
            range,
        } => check_number(*range, value).map(CheckedValue::Number),
        ResponseRule::Text {
            length,
        } => check_text(*length, value).map(CheckedValue::Text),
        ResponseRule::Photo {
            ..
        } => check_photo(value, media).map(CheckedValue::Photo),
        ResponseRule::Timestamp => check_timestamp(value),
        ResponseRule::Choice {
            choices,
            multiple,
            custom,
        } => match (*multiple, *custom) {
            (false, false) => check_choice_key(choices, value).map(CheckedValue::Choice),
            (true, false) => check_choice_keys(choices, value).map(CheckedValue::Choices),
            (false, true) => check_custom_answer(choices, value).map(CheckedValue::CustomChoice),
            (true, true) => check_custom_answers(choices, value).map(CheckedValue::CustomChoices),
        },
        ResponseRule::RemoteActivity(_) => {
            check_remote_activity(value).map(CheckedValue::RemoteActivity)
        }
    }
}

/// Parses decimal text whose exponent magnitude stays within [`MAX_DECIMAL_SCALE`].
pub(crate) fn bounded_decimal(text: &str) -> Option<BigDecimal> {
    let decimal = BigDecimal::from_str(text).ok()?;
    if decimal.is_zero() {
        return Some(BigDecimal::zero());
    }
    let (_, scale) = decimal.as_bigint_and_exponent();
    (scale.unsigned_abs() <= MAX_DECIMAL_SCALE).then_some(decimal)
}

/// Whole number within the configured range.
fn check_number(range: IntegerRange, value: &Value) -> Result<i64, String> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return Err(format!("`{value}` is not a number")),
    };
    if BigDecimal::from_str(&text).is_err() {
        return Err(format!("`{value}` is not a number"));
    }
    let decimal = bounded_decimal(&text)
        .ok_or_else(|| format!("`{value}` has an exponent beyond {MAX_DECIMAL_SCALE} digits"))?;
    if !decimal.is_integer() {
        return Err(format!("`{value}` is not a whole number"));
    }
    let whole = decimal
        .to_i64()
        .filter(|whole| range.contains(*whole))
        .ok_or_else(|| format!("{decimal} is outside [{}, {}]", range.min, range.max))?;
    Ok(whole)
}

/// String whose character count is within the configured range.
fn check_text(length: LengthRange, value: &Value) -> Result<String, String> {
    let Value::String(text) = value else {
        return Err(format!("`{value}` is not text"));
    };
    let count = u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
    if length.contains(count) {
        Ok(text.clone())
    } else {
        Err(format!("text length {count} is outside [{}, {}]", length.min, length.max))
    }
}

/// UUID naming an uploaded media file.
fn check_photo(value: &Value, media: &MediaSet) -> Result<Uuid, String> {
    let Value::String(text) = value else {
        return Err(format!("`{value}` is not a photo id"));
    };
    let id = Uuid::parse_str(text.trim()).map_err(|_| format!("`{text}` is not a uuid"))?;
    if media.contains(&id) {
        Ok(id)
    } else {
        Err(format!("photo `{id}` was not uploaded with the responses"))
    }
}

/// Date-time in any accepted form.
fn check_timestamp(value: &Value) -> Result<CheckedValue, String> {
    let Value::String(text) = value else {
        return Err(format!("`{value}` is not a timestamp"));
    };
    let parsed = parse_response_timestamp(text.trim())
        .ok_or_else(|| format!("`{text}` is not a timestamp"))?;
    Ok(CheckedValue::Timestamp {
        parsed,
        raw: text.clone(),
    })
}

/// Parses a choice key from a JSON number or numeric string.
fn key_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// One configured key.
fn check_choice_key(choices: &ChoiceSet, value: &Value) -> Result<u64, String> {
    let key = key_from_value(value).ok_or_else(|| format!("`{value}` is not a choice key"))?;
    if choices.contains_key(key) {
        Ok(key)
    } else {
        Err(format!("{key} is not a configured choice"))
    }
}

/// Expands an array, a JSON array string, or a comma list into elements.
fn list_elements(value: &Value) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(elements) => Ok(elements.clone()),
        Value::String(text) if text.trim_start().starts_with('[') => {
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(elements)) => Ok(elements),
                _ => Err(format!("`{text}` is not a list of choices")),
            }
        }
        Value::String(text) => Ok(text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::from(part.to_string()))
            .collect()),
        _ => Err(format!("`{value}` is not a list of choices")),
    }
}

/// Non-empty list of distinct configured keys.
fn check_choice_keys(choices: &ChoiceSet, value: &Value) -> Result<Vec<u64>, String> {
    let elements = list_elements(value)?;
    if elements.is_empty() {
        return Err("at least one choice must be selected".to_string());
    }
    let mut seen = BTreeSet::new();
    let mut keys = Vec::with_capacity(elements.len());
    for element in &elements {
        let key = check_choice_key(choices, element)?;
        if !seen.insert(key) {
            return Err(format!("choice {key} is selected more than once"));
        }
        keys.push(key);
    }
    Ok(keys)
}

/// Configured key, or a non-empty participant label.
fn check_custom_answer(choices: &ChoiceSet, value: &Value) -> Result<CustomAnswer, String> {
    if let Some(key) = key_from_value(value)
        && choices.contains_key(key)
    {
        return Ok(CustomAnswer::Key(key));
    }
    match value {
        Value::String(text) if !text.trim().is_empty() => Ok(CustomAnswer::Label(text.clone())),
        Value::Number(_) => Err(format!("{value} is not a configured choice")),
        _ => Err(format!("`{value}` is not a choice key or label")),
    }
}

/// Non-empty list of distinct custom answers.
fn check_custom_answers(choices: &ChoiceSet, value: &Value) -> Result<Vec<CustomAnswer>, String> {
    let Value::Array(elements) = value else {
        return Err(format!("`{value}` is not a list of choices"));
    };
    if elements.is_empty() {
        return Err("at least one choice must be selected".to_string());
    }
    let mut answers: Vec<CustomAnswer> = Vec::with_capacity(elements.len());
    for element in elements {
        let answer = check_custom_answer(choices, element)?;
        if answers.contains(&answer) {
            return Err(format!("choice `{element}` is selected more than once"));
        }
        answers.push(answer);
    }
    Ok(answers)
}

/// Array of run results, each an object with a numeric score.
fn check_remote_activity(value: &Value) -> Result<Vec<Value>, String> {
    let runs = match value {
        Value::Array(runs) => runs.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(runs)) => runs,
            _ => return Err(format!("`{text}` is not a list of activity results")),
        },
        _ => return Err(format!("`{value}` is not a list of activity results")),
    };
    for (index, run) in runs.iter().enumerate() {
        let Value::Object(fields) = run else {
            return Err(format!("result {index} is not an object"));
        };
        if !fields.get(SCORE_KEY).is_some_and(Value::is_number) {
            return Err(format!("result {index} has no numeric `{SCORE_KEY}`"));
        }
    }
    Ok(runs)
}
