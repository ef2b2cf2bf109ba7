// crates/campaign-core/src/validation/prompt_types/choice.rs
// ============================================================================
// Module: Choice Validators
// Description: Property and literal checks for the four choice prompt types.
// Purpose: Enforce unique keys and labels, value presence, and key literals.
// Dependencies: bigdecimal, crate::core, survey-condition
// ============================================================================

//! ## Overview
//! Each choice property is a `{key, label, value?}` triple whose key is a
//! non-negative integer. Keys and labels are unique. When any choice of a
//! fixed prompt carries a value every choice must, and `single_choice`
//! prompts displayed as a `count` or `measurement` require numeric values
//! on every choice. Fixed
//! choice prompts need at least two choices; custom choice prompts may start
//! empty because participants add their own.

use std::collections::BTreeSet;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use survey_condition::Operator;

use crate::core::ChoiceOption;
use crate::core::ChoiceSet;
use crate::core::ResponseRule;
use crate::core::document::PropertyDocument;
use crate::validation::prompt_types::UNCONFIGURED;

/// Fewest choices a fixed choice prompt may declare.
const MIN_FIXED_CHOICES: usize = 2;

/// Display types whose single-choice answers are aggregated numerically.
const NUMERIC_DISPLAY_TYPES: [&str; 2] = ["count", "measurement"];

/// Validator state for choice prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceValidator {
    /// Whether several keys may be selected.
    multiple: bool,
    /// Whether participants may add their own choices.
    custom: bool,
    /// Choices once configured.
    choices: Option<ChoiceSet>,
}

impl ChoiceValidator {
    /// Creates a validator for `single_choice` prompts.
    #[must_use]
    pub const fn single() -> Self {
        Self::with_mode(false, false)
    }

    /// Creates a validator for `multi_choice` prompts.
    #[must_use]
    pub const fn multiple() -> Self {
        Self::with_mode(true, false)
    }

    /// Creates a validator for `single_choice_custom` prompts.
    #[must_use]
    pub const fn single_custom() -> Self {
        Self::with_mode(false, true)
    }

    /// Creates a validator for `multi_choice_custom` prompts.
    #[must_use]
    pub const fn multiple_custom() -> Self {
        Self::with_mode(true, true)
    }

    /// Shared constructor.
    const fn with_mode(multiple: bool, custom: bool) -> Self {
        Self {
            multiple,
            custom,
            choices: None,
        }
    }

    /// Returns the configured choices.
    #[must_use]
    pub const fn choices(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref()
    }

    /// Validates and retains the choice list.
    pub(super) fn configure(
        &mut self,
        properties: &[PropertyDocument],
        display_type: &str,
    ) -> Result<(), String> {
        if !self.custom && properties.len() < MIN_FIXED_CHOICES {
            return Err(format!(
                "at least {MIN_FIXED_CHOICES} choices are required, found {}",
                properties.len()
            ));
        }

        let mut keys = BTreeSet::new();
        let mut labels = BTreeSet::new();
        let mut options = Vec::with_capacity(properties.len());
        for property in properties {
            let key = property.key.trim().parse::<u64>().map_err(|_| {
                format!("choice key `{}` must be a non-negative integer", property.key)
            })?;
            if !keys.insert(key) {
                return Err(format!("duplicate choice key {key}"));
            }
            let label = property.label.trim();
            if !labels.insert(label) {
                return Err(format!("duplicate choice label `{label}`"));
            }
            options.push(ChoiceOption {
                key,
                label: label.to_string(),
                value: property.value.as_deref().map(|value| value.trim().to_string()),
            });
        }

        let with_values = options.iter().filter(|option| option.value.is_some()).count();
        if !self.custom && with_values != 0 && with_values != options.len() {
            return Err("when any choice has a value every choice must have one".to_string());
        }
        if !self.multiple && !self.custom && NUMERIC_DISPLAY_TYPES.contains(&display_type.trim()) {
            if with_values == 0 {
                return Err(format!(
                    "choices of a single_choice prompt displayed as `{}` require numeric values",
                    display_type.trim()
                ));
            }
            for option in &options {
                let value = option.value.as_deref().unwrap_or_default();
                if BigDecimal::from_str(value).is_err() {
                    return Err(format!("value `{value}` of choice {} is not numeric", option.key));
                }
            }
        }

        self.choices = Some(ChoiceSet::new(options));
        Ok(())
    }

    /// Requires an equality operator and an existing key.
    pub(super) fn check_condition_value(
        &self,
        operator: Operator,
        literal: &str,
    ) -> Result<(), String> {
        let choices = self.configured()?;
        if !operator.is_equality() {
            return Err(format!("choice conditions only support `==` and `!=`, found `{operator}`"));
        }
        let key = literal
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("condition value `{literal}` is not a choice key"))?;
        if choices.contains_key(key) {
            Ok(())
        } else {
            Err(format!("condition value {key} is not among the configured choices"))
        }
    }

    /// Requires a default to equal a configured label.
    pub(super) fn check_default(&self, literal: &str) -> Result<(), String> {
        if self.configured()?.contains_label(literal) {
            Ok(())
        } else {
            Err(format!("default value `{literal}` is not one of the choice labels"))
        }
    }

    /// Returns the response rule for the configured choices.
    pub(super) fn response_rule(&self) -> Option<ResponseRule> {
        self.choices.clone().map(|choices| ResponseRule::Choice {
            choices,
            multiple: self.multiple,
            custom: self.custom,
        })
    }

    /// Returns the choices or the unconfigured message.
    fn configured(&self) -> Result<&ChoiceSet, String> {
        self.choices.as_ref().ok_or_else(|| UNCONFIGURED.to_string())
    }
}
