// crates/campaign-core/src/validation/prompt_types/mod.rs
// ============================================================================
// Module: Prompt Type Validators
// Description: Per-type property, condition-value, and default checks.
// Purpose: Dispatch authoring-time checks to the variant for a prompt type.
// Dependencies: crate::core, survey-condition
// ============================================================================

//! ## Overview
//! A [`PromptTypeValidator`] is created fresh for each prompt of each
//! validation run by [`validator_for`]. Configuring it with the prompt's
//! property bundle validates the bundle and retains the parsed bounds, which
//! later checks condition literals and default answers against. Once a run
//! succeeds the retained bounds become the prompt's [`ResponseRule`].
//!
//! Sentinel condition literals (`SKIPPED`, `NOT_DISPLAYED`, any case) are
//! handled here before any variant sees them.

// ============================================================================
// SECTION: Submodules
// ============================================================================

mod bounded;
mod choice;
mod remote_activity;
mod simple;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use survey_condition::Literal;
use survey_condition::Operator;

use crate::core::ItemId;
use crate::core::NoResponse;
use crate::core::PromptType;
use crate::core::ResponseRule;
use crate::core::document::PromptDocument;
use crate::core::document::PropertyDocument;
use crate::validation::StructuralError;
use crate::validation::ValidationPass;

pub use bounded::BoundedValidator;
pub use choice::ChoiceValidator;
pub use remote_activity::MAX_REMOTE_ACTIVITY_INPUT_CHARS;
pub use remote_activity::RemoteActivityValidator;
pub use simple::PhotoValidator;
pub use simple::TextValidator;
pub use simple::TimestampValidator;

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Returns a fresh validator for a prompt type tag.
#[must_use]
pub fn validator_for(tag: &str) -> Option<PromptTypeValidator> {
    let prompt_type = PromptType::from_tag(tag)?;
    let variant = match prompt_type {
        PromptType::Number => ValidatorVariant::Number(BoundedValidator::number()),
        PromptType::HoursBeforeNow => {
            ValidatorVariant::HoursBeforeNow(BoundedValidator::hours_before_now())
        }
        PromptType::SingleChoice => ValidatorVariant::SingleChoice(ChoiceValidator::single()),
        PromptType::MultiChoice => ValidatorVariant::MultiChoice(ChoiceValidator::multiple()),
        PromptType::SingleChoiceCustom => {
            ValidatorVariant::SingleChoiceCustom(ChoiceValidator::single_custom())
        }
        PromptType::MultiChoiceCustom => {
            ValidatorVariant::MultiChoiceCustom(ChoiceValidator::multiple_custom())
        }
        PromptType::Text => ValidatorVariant::Text(TextValidator::default()),
        PromptType::Photo => ValidatorVariant::Photo(PhotoValidator::default()),
        PromptType::Timestamp => ValidatorVariant::Timestamp(TimestampValidator),
        PromptType::RemoteActivity => {
            ValidatorVariant::RemoteActivity(RemoteActivityValidator::default())
        }
    };
    Some(PromptTypeValidator {
        prompt: None,
        variant,
    })
}

/// Returns true when the factory recognizes a prompt type tag.
#[must_use]
pub fn is_known_prompt_type(tag: &str) -> bool {
    PromptType::from_tag(tag).is_some()
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// One variant per prompt type, each holding its validated bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorVariant {
    /// `number` prompts.
    Number(BoundedValidator),
    /// `hours_before_now` prompts.
    HoursBeforeNow(BoundedValidator),
    /// `single_choice` prompts.
    SingleChoice(ChoiceValidator),
    /// `multi_choice` prompts.
    MultiChoice(ChoiceValidator),
    /// `single_choice_custom` prompts.
    SingleChoiceCustom(ChoiceValidator),
    /// `multi_choice_custom` prompts.
    MultiChoiceCustom(ChoiceValidator),
    /// `text` prompts.
    Text(TextValidator),
    /// `photo` prompts.
    Photo(PhotoValidator),
    /// `timestamp` prompts.
    Timestamp(TimestampValidator),
    /// `remote_activity` prompts.
    RemoteActivity(RemoteActivityValidator),
}

/// Identity of the prompt a validator was configured for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PromptBinding {
    /// Prompt id.
    id: ItemId,
    /// Whether the prompt may be skipped.
    skippable: bool,
}

/// Validator for one prompt within one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTypeValidator {
    /// Prompt this validator was configured for.
    prompt: Option<PromptBinding>,
    /// Type-specific state.
    variant: ValidatorVariant,
}

impl PromptTypeValidator {
    /// Returns the prompt type this validator checks.
    #[must_use]
    pub const fn prompt_type(&self) -> PromptType {
        match &self.variant {
            ValidatorVariant::Number(_) => PromptType::Number,
            ValidatorVariant::HoursBeforeNow(_) => PromptType::HoursBeforeNow,
            ValidatorVariant::SingleChoice(_) => PromptType::SingleChoice,
            ValidatorVariant::MultiChoice(_) => PromptType::MultiChoice,
            ValidatorVariant::SingleChoiceCustom(_) => PromptType::SingleChoiceCustom,
            ValidatorVariant::MultiChoiceCustom(_) => PromptType::MultiChoiceCustom,
            ValidatorVariant::Text(_) => PromptType::Text,
            ValidatorVariant::Photo(_) => PromptType::Photo,
            ValidatorVariant::Timestamp(_) => PromptType::Timestamp,
            ValidatorVariant::RemoteActivity(_) => PromptType::RemoteActivity,
        }
    }

    /// Returns the type-specific state.
    #[must_use]
    pub const fn variant(&self) -> &ValidatorVariant {
        &self.variant
    }

    /// Returns the id of the configured prompt, if configured.
    #[must_use]
    pub fn prompt_id(&self) -> Option<&ItemId> {
        self.prompt.as_ref().map(|binding| &binding.id)
    }

    /// Validates a prompt's property bundle and retains its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] in the `prompt_properties` pass when the
    /// bundle violates the rules of this prompt type.
    pub fn validate_and_set_configuration(
        &mut self,
        prompt: &PromptDocument,
    ) -> Result<(), StructuralError> {
        let properties = prompt.properties.as_slice();
        let outcome = match &mut self.variant {
            ValidatorVariant::Number(inner) | ValidatorVariant::HoursBeforeNow(inner) => {
                inner.configure(properties)
            }
            ValidatorVariant::SingleChoice(inner)
            | ValidatorVariant::MultiChoice(inner)
            | ValidatorVariant::SingleChoiceCustom(inner)
            | ValidatorVariant::MultiChoiceCustom(inner) => {
                inner.configure(properties, &prompt.display_type)
            }
            ValidatorVariant::Text(inner) => inner.configure(properties),
            ValidatorVariant::Photo(inner) => inner.configure(properties),
            ValidatorVariant::Timestamp(inner) => inner.configure(properties),
            ValidatorVariant::RemoteActivity(inner) => inner.configure(properties),
        };
        outcome.map_err(|message| {
            StructuralError::for_item(
                ValidationPass::PromptProperties,
                prompt.id.as_str(),
                format!("{} prompt: {message}", self.prompt_type()),
            )
        })?;
        self.prompt = Some(PromptBinding {
            id: ItemId::new(prompt.id.as_str()),
            skippable: prompt.skippable,
        });
        Ok(())
    }

    /// Validates one `(operator, literal)` pair from a condition that
    /// references this prompt.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] in the `conditions` pass when the pair can
    /// never be satisfied by an answer to this prompt.
    pub fn validate_condition_value(
        &self,
        operator: Operator,
        literal: &Literal,
    ) -> Result<(), StructuralError> {
        let binding = self.binding(ValidationPass::Conditions)?;
        let text = literal.as_str();
        let reject = |message: String| {
            StructuralError::for_item(ValidationPass::Conditions, binding.id.clone(), message)
        };

        if let Some(sentinel) = NoResponse::from_literal(text) {
            if !operator.is_equality() {
                return Err(reject(format!(
                    "`{sentinel}` may only be compared with `==` or `!=`, found `{operator}`"
                )));
            }
            if sentinel == NoResponse::Skipped && !binding.skippable {
                return Err(reject(format!("`{sentinel}` used but the prompt is not skippable")));
            }
            return Ok(());
        }

        let outcome = match &self.variant {
            ValidatorVariant::Number(inner) | ValidatorVariant::HoursBeforeNow(inner) => {
                inner.check_condition_value(text)
            }
            ValidatorVariant::SingleChoice(inner)
            | ValidatorVariant::MultiChoice(inner)
            | ValidatorVariant::SingleChoiceCustom(inner)
            | ValidatorVariant::MultiChoiceCustom(inner) => {
                inner.check_condition_value(operator, text)
            }
            ValidatorVariant::Text(_) | ValidatorVariant::Photo(_) => {
                Err(format!("only `SKIPPED` may be compared, found `{text}`"))
            }
            ValidatorVariant::Timestamp(inner) => inner.check_literal(text),
            ValidatorVariant::RemoteActivity(inner) => inner.check_condition_value(text),
        };
        outcome.map_err(reject)
    }

    /// Validates a default answer literal.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] in the `defaults` pass when the literal is
    /// not a legal answer, or when the type forbids defaults.
    pub fn check_default_value(&self, literal: &str) -> Result<(), StructuralError> {
        let binding = self.binding(ValidationPass::Defaults)?;
        let outcome = match &self.variant {
            ValidatorVariant::Number(inner) | ValidatorVariant::HoursBeforeNow(inner) => {
                inner.check_default(literal)
            }
            ValidatorVariant::SingleChoice(inner)
            | ValidatorVariant::MultiChoice(inner)
            | ValidatorVariant::SingleChoiceCustom(inner)
            | ValidatorVariant::MultiChoiceCustom(inner) => inner.check_default(literal),
            ValidatorVariant::Timestamp(inner) => inner.check_literal(literal),
            ValidatorVariant::Text(_)
            | ValidatorVariant::Photo(_)
            | ValidatorVariant::RemoteActivity(_) => {
                Err(format!("default values are not allowed for {} prompts", self.prompt_type()))
            }
        };
        outcome.map_err(|message| {
            StructuralError::for_item(ValidationPass::Defaults, binding.id.clone(), message)
        })
    }

    /// Returns the retained bounds as a response rule once configured.
    #[must_use]
    pub fn response_rule(&self) -> Option<ResponseRule> {
        self.prompt.as_ref()?;
        match &self.variant {
            ValidatorVariant::Number(inner) | ValidatorVariant::HoursBeforeNow(inner) => {
                inner.response_rule()
            }
            ValidatorVariant::SingleChoice(inner)
            | ValidatorVariant::MultiChoice(inner)
            | ValidatorVariant::SingleChoiceCustom(inner)
            | ValidatorVariant::MultiChoiceCustom(inner) => inner.response_rule(),
            ValidatorVariant::Text(inner) => inner.response_rule(),
            ValidatorVariant::Photo(inner) => inner.response_rule(),
            ValidatorVariant::Timestamp(_) => Some(ResponseRule::Timestamp),
            ValidatorVariant::RemoteActivity(inner) => inner.response_rule(),
        }
    }

    /// Returns the prompt binding or an error naming the calling pass.
    fn binding(&self, pass: ValidationPass) -> Result<&PromptBinding, StructuralError> {
        self.prompt.as_ref().ok_or_else(|| {
            StructuralError::new(
                pass,
                format!("{} validator used before its prompt was configured", self.prompt_type()),
            )
        })
    }
}

// ============================================================================
// SECTION: Property Helpers
// ============================================================================

/// Indexes properties by key, rejecting duplicates and blank keys.
fn properties_by_key(
    properties: &[PropertyDocument],
) -> Result<BTreeMap<&str, &PropertyDocument>, String> {
    let mut keyed = BTreeMap::new();
    for property in properties {
        let key = property.key.trim();
        if key.is_empty() {
            return Err("property keys must not be blank".to_string());
        }
        if keyed.insert(key, property).is_some() {
            return Err(format!("duplicate property `{key}`"));
        }
    }
    Ok(keyed)
}

/// Requires exactly the named properties and returns them in that order.
fn exact_properties<'a, const N: usize>(
    properties: &'a [PropertyDocument],
    keys: [&str; N],
) -> Result<[&'a PropertyDocument; N], String> {
    if properties.len() != N {
        return Err(format!(
            "expected exactly {N} properties ({}), found {}",
            keys.join(", "),
            properties.len()
        ));
    }
    let keyed = properties_by_key(properties)?;
    let mut found = Vec::with_capacity(N);
    for key in keys {
        let property = keyed.get(key).ok_or_else(|| format!("missing property `{key}`"))?;
        found.push(*property);
    }
    found.try_into().map_err(|_| format!("expected exactly {N} properties"))
}

/// Parses an integer carried in a property label.
fn integer_label(property: &PropertyDocument) -> Result<i64, String> {
    property.label.trim().parse::<i64>().map_err(|_| {
        format!("property `{}` must be an integer, found `{}`", property.key, property.label)
    })
}

/// Parses a non-negative integer carried in a property label.
fn non_negative_label(property: &PropertyDocument) -> Result<u64, String> {
    property.label.trim().parse::<u64>().map_err(|_| {
        format!(
            "property `{}` must be a non-negative integer, found `{}`",
            property.key, property.label
        )
    })
}

/// Parses a positive integer carried in a property label.
fn positive_label(property: &PropertyDocument) -> Result<u64, String> {
    match non_negative_label(property) {
        Ok(0) | Err(_) => Err(format!(
            "property `{}` must be a positive integer, found `{}`",
            property.key, property.label
        )),
        Ok(value) => Ok(value),
    }
}

/// Message returned when a variant is used before configuration.
const UNCONFIGURED: &str = "prompt properties have not been configured";
