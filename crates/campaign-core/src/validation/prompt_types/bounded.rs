// crates/campaign-core/src/validation/prompt_types/bounded.rs
// ============================================================================
// Module: Bounded Number Validators
// Description: Property and literal checks for number and hours prompts.
// Purpose: Enforce `min`/`max` bundles and in-range literals.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! `number` and `hours_before_now` prompts share one shape: exactly the
//! properties `min` and `max`, each an integer carried in its label, with
//! `max >= min`. Hours additionally require both bounds to be non-negative.

use crate::core::IntegerRange;
use crate::core::ResponseRule;
use crate::core::document::PropertyDocument;
use crate::validation::prompt_types::UNCONFIGURED;
use crate::validation::prompt_types::exact_properties;
use crate::validation::prompt_types::integer_label;

/// Validator state for whole-number prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedValidator {
    /// Whether both bounds must be non-negative.
    non_negative: bool,
    /// Bounds once configured.
    range: Option<IntegerRange>,
}

impl BoundedValidator {
    /// Creates a validator for `number` prompts.
    #[must_use]
    pub const fn number() -> Self {
        Self {
            non_negative: false,
            range: None,
        }
    }

    /// Creates a validator for `hours_before_now` prompts.
    #[must_use]
    pub const fn hours_before_now() -> Self {
        Self {
            non_negative: true,
            range: None,
        }
    }

    /// Returns the configured range.
    #[must_use]
    pub const fn range(&self) -> Option<IntegerRange> {
        self.range
    }

    /// Validates and retains the `min`/`max` bundle.
    pub(super) fn configure(&mut self, properties: &[PropertyDocument]) -> Result<(), String> {
        let [min, max] = exact_properties(properties, ["min", "max"])?;
        let range = IntegerRange {
            min: integer_label(min)?,
            max: integer_label(max)?,
        };
        if self.non_negative && (range.min < 0 || range.max < 0) {
            return Err("`min` and `max` must be non-negative".to_string());
        }
        if range.max < range.min {
            return Err(format!("`max` ({}) is less than `min` ({})", range.max, range.min));
        }
        self.range = Some(range);
        Ok(())
    }

    /// Requires a condition literal to be an in-range integer.
    pub(super) fn check_condition_value(&self, literal: &str) -> Result<(), String> {
        self.check_in_range(literal, "condition value")
    }

    /// Requires a default literal to be an in-range integer.
    pub(super) fn check_default(&self, literal: &str) -> Result<(), String> {
        self.check_in_range(literal, "default value")
    }

    /// Returns the response rule for the configured range.
    pub(super) fn response_rule(&self) -> Option<ResponseRule> {
        self.range.map(|range| ResponseRule::Number {
            range,
        })
    }

    /// Shared integer-in-range check.
    fn check_in_range(&self, literal: &str, what: &str) -> Result<(), String> {
        let range = self.range.ok_or_else(|| UNCONFIGURED.to_string())?;
        let value = literal
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{what} `{literal}` is not an integer"))?;
        if range.contains(value) {
            Ok(())
        } else {
            Err(format!("{what} {value} is outside [{}, {}]", range.min, range.max))
        }
    }
}
