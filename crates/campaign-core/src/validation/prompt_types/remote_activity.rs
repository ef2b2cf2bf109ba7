// crates/campaign-core/src/validation/prompt_types/remote_activity.rs
// ============================================================================
// Module: Remote Activity Validator
// Description: Property and literal checks for remote activity prompts.
// Purpose: Enforce launch settings and JSON-array condition literals.
// Dependencies: serde_json, crate::core
// ============================================================================

//! ## Overview
//! A remote activity prompt launches an external activity and records the
//! JSON array it returns. The bundle must contain exactly `package`,
//! `activity`, `action`, `autolaunch`, `retries`, and `min_runs`, plus an
//! optional `input`. Conditions may only compare against `SKIPPED` or a JSON
//! array literal, and defaults are never allowed.

use serde_json::Value;

use crate::core::RemoteActivitySettings;
use crate::core::ResponseRule;
use crate::core::document::PropertyDocument;
use crate::validation::prompt_types::non_negative_label;
use crate::validation::prompt_types::properties_by_key;

/// Longest accepted `input` property, in characters.
pub const MAX_REMOTE_ACTIVITY_INPUT_CHARS: usize = 65_536;

/// Keys every remote activity prompt must declare.
const REQUIRED_KEYS: [&str; 6] =
    ["package", "activity", "action", "autolaunch", "retries", "min_runs"];

/// Optional key.
const INPUT_KEY: &str = "input";

/// Validator state for `remote_activity` prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteActivityValidator {
    /// Launch settings once configured.
    settings: Option<RemoteActivitySettings>,
}

impl RemoteActivityValidator {
    /// Returns the configured launch settings.
    #[must_use]
    pub const fn settings(&self) -> Option<&RemoteActivitySettings> {
        self.settings.as_ref()
    }

    /// Validates and retains the launch settings.
    pub(super) fn configure(&mut self, properties: &[PropertyDocument]) -> Result<(), String> {
        let keyed = properties_by_key(properties)?;
        if let Some(unknown) =
            keyed.keys().copied().find(|key| !REQUIRED_KEYS.contains(key) && *key != INPUT_KEY)
        {
            return Err(format!("unknown property `{unknown}`"));
        }
        for property in keyed.values() {
            if property.label.trim().is_empty() {
                return Err(format!("property `{}` has a blank label", property.key));
            }
        }
        let property = |key: &str| {
            keyed.get(key).copied().ok_or_else(|| format!("missing property `{key}`"))
        };
        let label = |key: &str| property(key).map(|found| found.label.trim());

        let package = label("package")?;
        if !package.contains('.') {
            return Err(format!("package `{package}` must contain a `.`"));
        }
        let activity = label("activity")?;
        if !activity.contains('.') {
            return Err(format!("activity `{activity}` must contain a `.`"));
        }
        let action = label("action")?;
        let autolaunch = match label("autolaunch")? {
            "true" => true,
            "false" => false,
            other => return Err(format!("autolaunch must be `true` or `false`, found `{other}`")),
        };
        let retries = non_negative_label(property("retries")?)?;
        let min_runs = non_negative_label(property("min_runs")?)?;
        if min_runs > retries.saturating_add(1) {
            return Err(format!(
                "min_runs ({min_runs}) requires more runs than retries ({retries}) allow"
            ));
        }
        let input = keyed.get(INPUT_KEY).map(|property| property.label.trim().to_string());
        if let Some(text) = &input
            && text.chars().count() > MAX_REMOTE_ACTIVITY_INPUT_CHARS
        {
            return Err(format!("input exceeds {MAX_REMOTE_ACTIVITY_INPUT_CHARS} characters"));
        }

        self.settings = Some(RemoteActivitySettings {
            package: package.to_string(),
            activity: activity.to_string(),
            action: action.to_string(),
            autolaunch,
            retries,
            min_runs,
            input,
        });
        Ok(())
    }

    /// Requires a condition literal to be a JSON array.
    pub(super) fn check_condition_value(&self, literal: &str) -> Result<(), String> {
        match serde_json::from_str::<Value>(literal) {
            Ok(Value::Array(_)) => Ok(()),
            Ok(_) | Err(_) => Err(format!("condition value `{literal}` is not a JSON array")),
        }
    }

    /// Returns the response rule for the configured settings.
    pub(super) fn response_rule(&self) -> Option<ResponseRule> {
        self.settings.clone().map(ResponseRule::RemoteActivity)
    }
}
