// crates/campaign-config/src/config.rs
// ============================================================================
// Module: Campaign Validator Configuration
// Description: Configuration loading and validation for the campaign validator.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then the `CAMPAIGN_VALIDATOR_CONFIG`
//! environment variable, then `campaign-validator.toml` in the working
//! directory. Only the last of these may be missing, in which case the
//! defaults apply. Invalid configuration fails closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "campaign-validator.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CAMPAIGN_VALIDATOR_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default maximum campaign document size in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;
/// Hard ceiling for the campaign document size in bytes.
pub const MAX_DOCUMENT_BYTES_CEILING: usize = 64 * 1024 * 1024;
/// Default maximum condition size in bytes.
pub const DEFAULT_MAX_CONDITION_BYTES: usize = 4096;
/// Default maximum number of top-level responses per batch.
pub const DEFAULT_MAX_RESPONSES: usize = 4096;
/// Hard ceiling for the number of top-level responses per batch.
pub const MAX_RESPONSES_CEILING: usize = 1_000_000;
/// Fixed maximum remote activity input size in characters.
pub const REMOTE_ACTIVITY_INPUT_BYTES: usize = 65_536;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Campaign validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Input size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Campaign document schema source.
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Validation event sink.
    #[serde(default)]
    pub events: EventsConfig,
}

impl ValidatorConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, origin) = resolve_path(path)?;
        validate_path(&resolved)?;
        if origin == PathOrigin::Default && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Parses and validates configuration from raw file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.schema.validate()?;
        self.events.validate()
    }
}

/// Input size limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum campaign document size in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
    /// Maximum display condition size in bytes.
    #[serde(default = "default_max_condition_bytes")]
    pub max_condition_bytes: usize,
    /// Maximum number of top-level responses per batch.
    #[serde(default = "default_max_responses")]
    pub max_responses: usize,
    /// Remote activity input limit; informational and fixed.
    #[serde(default = "default_remote_activity_input_bytes")]
    pub max_remote_activity_input_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
            max_condition_bytes: default_max_condition_bytes(),
            max_responses: default_max_responses(),
            max_remote_activity_input_bytes: default_remote_activity_input_bytes(),
        }
    }
}

impl LimitsConfig {
    /// Validates limit values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_document_bytes == 0 || self.max_document_bytes > MAX_DOCUMENT_BYTES_CEILING {
            return Err(ConfigError::Invalid(format!(
                "limits.max_document_bytes must be within 1..={MAX_DOCUMENT_BYTES_CEILING}"
            )));
        }
        if self.max_condition_bytes == 0 || self.max_condition_bytes > self.max_document_bytes {
            return Err(ConfigError::Invalid(
                "limits.max_condition_bytes must be within 1..=limits.max_document_bytes"
                    .to_string(),
            ));
        }
        if self.max_responses == 0 || self.max_responses > MAX_RESPONSES_CEILING {
            return Err(ConfigError::Invalid(format!(
                "limits.max_responses must be within 1..={MAX_RESPONSES_CEILING}"
            )));
        }
        if self.max_remote_activity_input_bytes != REMOTE_ACTIVITY_INPUT_BYTES {
            return Err(ConfigError::Invalid(format!(
                "limits.max_remote_activity_input_bytes is fixed at {REMOTE_ACTIVITY_INPUT_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Campaign document schema source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// External schema document; the canonical schema is used when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl SchemaConfig {
    /// Validates the schema path.
    fn validate(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) => validate_path_string("schema.path", path),
            None => Ok(()),
        }
    }

    /// Returns the external schema path, if configured.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(|path| Path::new(path.trim()))
    }
}

/// Destination of validation events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSinkKind {
    /// JSON lines on standard error.
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Events are discarded.
    #[default]
    None,
}

/// Validation event sink configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: EventSinkKind,
    /// Output file for the `file` sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl EventsConfig {
    /// Validates the sink settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (EventSinkKind::File, Some(path)) => validate_path_string("events.path", path),
            (EventSinkKind::File, None) => {
                Err(ConfigError::Invalid("events.path is required for the file sink".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "events.path is only allowed for the file sink".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }

    /// Returns the event file path for the file sink.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(|path| Path::new(path.trim()))
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default document size limit.
const fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

/// Default condition size limit.
const fn default_max_condition_bytes() -> usize {
    DEFAULT_MAX_CONDITION_BYTES
}

/// Default response count limit.
const fn default_max_responses() -> usize {
    DEFAULT_MAX_RESPONSES
}

/// Fixed remote activity input limit.
const fn default_remote_activity_input_bytes() -> usize {
    REMOTE_ACTIVITY_INPUT_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Where a resolved config path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathOrigin {
    /// Supplied by the caller.
    Explicit,
    /// Read from the environment.
    Environment,
    /// The default filename.
    Default,
}

/// Resolves the config path from caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, PathOrigin), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), PathOrigin::Explicit));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), PathOrigin::Environment));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), PathOrigin::Default))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    if path.components().any(|component| {
        component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH
    }) {
        return Err(ConfigError::Invalid("config path component too long".to_string()));
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if Path::new(trimmed).components().any(|component| {
        component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH
    }) {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}
