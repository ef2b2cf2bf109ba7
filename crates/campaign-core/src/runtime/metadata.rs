// crates/campaign-core/src/runtime/metadata.rs
// ============================================================================
// Module: Survey Response Metadata
// Description: Envelope fields submitted with every survey response.
// Purpose: Reject malformed envelopes before any answer is inspected.
// Dependencies: serde, serde_json, thiserror, uuid, crate::core
// ============================================================================

//! ## Overview
//! Metadata describes who submitted a response, from which client, when,
//! and where. [`SurveyResponseMetadata::validate`] checks the envelope
//! against the configuration it is being submitted to; the first violated
//! field is reported.
//!
//! Security posture: metadata is untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::core::CampaignUrn;
use crate::core::time::parse_response_timestamp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A metadata field is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("metadata field `{field}` is invalid: {message}")]
pub struct MetadataError {
    /// Offending field name.
    pub field: &'static str,
    /// Detail.
    pub message: String,
}

impl MetadataError {
    /// Creates a metadata error.
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Quality of the location fix at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    /// Fresh, accurate fix.
    Valid,
    /// Fix is older than the client allows.
    Stale,
    /// Fix accuracy is poor.
    Inaccurate,
    /// Location services are disabled.
    GpsOff,
    /// No fix is available.
    Unavailable,
}

/// Location fix attached to a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Accuracy radius in meters.
    pub accuracy: f64,
    /// Provider that produced the fix.
    pub provider: String,
    /// Fix time.
    pub timestamp: String,
}

/// Context in which the survey was launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchContext {
    /// Launch time in milliseconds since the epoch.
    pub launch_time: i64,
    /// Launch time zone.
    pub launch_timezone: String,
    /// Triggers active at launch.
    #[serde(default)]
    pub active_triggers: Vec<Value>,
}

/// Requested visibility of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePrivacyState {
    /// Visible to the submitter and campaign authors only.
    Private,
    /// Visible to campaign participants.
    Shared,
    /// Hidden from everyone but administrators.
    Invisible,
}

/// Envelope submitted with one survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponseMetadata {
    /// Client-generated response key.
    pub survey_key: String,
    /// Submitting user.
    pub user: String,
    /// Campaign the response belongs to.
    pub campaign_urn: String,
    /// Client application name.
    pub client: String,
    /// Completion time in milliseconds since the epoch.
    pub time: i64,
    /// Completion time zone.
    pub timezone: String,
    /// Location fix quality.
    pub location_status: LocationStatus,
    /// Location fix, absent when unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Launch context.
    pub launch_context: LaunchContext,
    /// Requested visibility.
    pub privacy_state: ResponsePrivacyState,
}

// ============================================================================
// SECTION: Validation
// ============================================================================

impl SurveyResponseMetadata {
    /// Parses the survey key.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the key is not a UUID.
    pub fn survey_key(&self) -> Result<Uuid, MetadataError> {
        Uuid::parse_str(self.survey_key.trim())
            .map_err(|_| MetadataError::new("survey_key", "must be a uuid"))
    }

    /// Validates the envelope for a campaign.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] for the first invalid field.
    pub fn validate(&self, campaign: &CampaignUrn) -> Result<(), MetadataError> {
        self.survey_key()?;
        require_text("user", &self.user)?;
        if self.campaign_urn != campaign.as_str() {
            return Err(MetadataError::new(
                "campaign_urn",
                format!("`{}` does not match `{campaign}`", self.campaign_urn),
            ));
        }
        require_text("client", &self.client)?;
        if self.time < 0 {
            return Err(MetadataError::new("time", "must not be negative"));
        }
        require_text("timezone", &self.timezone)?;
        match (self.location_status, &self.location) {
            (LocationStatus::Unavailable, Some(_)) => {
                return Err(MetadataError::new(
                    "location",
                    "must be absent when location is unavailable",
                ));
            }
            (LocationStatus::Unavailable, None) => {}
            (_, None) => {
                return Err(MetadataError::new("location", "is required for this location status"));
            }
            (_, Some(location)) => validate_location(location)?,
        }
        if self.launch_context.launch_time < 0 {
            return Err(MetadataError::new("launch_context", "launch_time must not be negative"));
        }
        require_text("launch_context", &self.launch_context.launch_timezone)
    }
}

/// Checks the fields of a location fix.
fn validate_location(location: &Location) -> Result<(), MetadataError> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        return Err(MetadataError::new("location", "latitude must be within [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        return Err(MetadataError::new("location", "longitude must be within [-180, 180]"));
    }
    if location.accuracy.is_nan() || location.accuracy < 0.0 {
        return Err(MetadataError::new("location", "accuracy must not be negative"));
    }
    require_text("location", &location.provider)?;
    if parse_response_timestamp(location.timestamp.trim()).is_none() {
        return Err(MetadataError::new(
            "location",
            format!("timestamp `{}` is not a date-time", location.timestamp),
        ));
    }
    Ok(())
}

/// Rejects blank text.
fn require_text(field: &'static str, value: &str) -> Result<(), MetadataError> {
    if value.trim().is_empty() {
        Err(MetadataError::new(field, "must not be blank"))
    } else {
        Ok(())
    }
}
