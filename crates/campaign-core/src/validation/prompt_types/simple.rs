// crates/campaign-core/src/validation/prompt_types/simple.rs
// ============================================================================
// Module: Text, Photo, and Timestamp Validators
// Description: Validators for prompt types with small fixed bundles.
// Purpose: Enforce length, resolution, and timestamp literal rules.
// Dependencies: crate::core
// ============================================================================

use crate::core::LengthRange;
use crate::core::ResponseRule;
use crate::core::document::PropertyDocument;
use crate::core::time::parse_authored_timestamp;
use crate::validation::prompt_types::exact_properties;
use crate::validation::prompt_types::positive_label;

// ============================================================================
// SECTION: Text
// ============================================================================

/// Validator state for `text` prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextValidator {
    /// Length bounds once configured.
    length: Option<LengthRange>,
}

impl TextValidator {
    /// Returns the configured length bounds.
    #[must_use]
    pub const fn length(&self) -> Option<LengthRange> {
        self.length
    }

    /// Requires exactly positive `min` and `max` with `max >= min`.
    pub(super) fn configure(&mut self, properties: &[PropertyDocument]) -> Result<(), String> {
        let [min, max] = exact_properties(properties, ["min", "max"])?;
        let length = LengthRange {
            min: positive_label(min)?,
            max: positive_label(max)?,
        };
        if length.max < length.min {
            return Err(format!("`max` ({}) is less than `min` ({})", length.max, length.min));
        }
        self.length = Some(length);
        Ok(())
    }

    /// Returns the response rule for the configured bounds.
    pub(super) fn response_rule(&self) -> Option<ResponseRule> {
        self.length.map(|length| ResponseRule::Text {
            length,
        })
    }
}

// ============================================================================
// SECTION: Photo
// ============================================================================

/// Validator state for `photo` prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoValidator {
    /// Maximum resolution once configured.
    resolution: Option<u64>,
}

impl PhotoValidator {
    /// Returns the configured resolution.
    #[must_use]
    pub const fn resolution(&self) -> Option<u64> {
        self.resolution
    }

    /// Requires exactly one positive `res` property.
    pub(super) fn configure(&mut self, properties: &[PropertyDocument]) -> Result<(), String> {
        let [res] = exact_properties(properties, ["res"])?;
        self.resolution = Some(positive_label(res)?);
        Ok(())
    }

    /// Returns the response rule for the configured resolution.
    pub(super) fn response_rule(&self) -> Option<ResponseRule> {
        self.resolution.map(|resolution| ResponseRule::Photo {
            resolution,
        })
    }
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Validator for `timestamp` prompts; it carries no bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampValidator;

impl TimestampValidator {
    /// Timestamp prompts accept no properties.
    pub(super) fn configure(self, properties: &[PropertyDocument]) -> Result<(), String> {
        if properties.is_empty() {
            Ok(())
        } else {
            Err(format!("timestamp prompts take no properties, found {}", properties.len()))
        }
    }

    /// Requires a literal in `yyyy-MM-ddTHH:mm:ss` form.
    pub(super) fn check_literal(self, literal: &str) -> Result<(), String> {
        parse_authored_timestamp(literal.trim())
            .map(|_| ())
            .ok_or_else(|| format!("`{literal}` is not a yyyy-MM-ddTHH:mm:ss timestamp"))
    }
}
