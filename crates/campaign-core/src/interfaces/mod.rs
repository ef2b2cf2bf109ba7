// crates/campaign-core/src/interfaces/mod.rs
// ============================================================================
// Module: Campaign Validation Interfaces
// Description: Event sink contract for validation outcomes.
// Purpose: Let hosts observe compile and response validation without coupling.
// Dependencies: serde, crate::validation
// ============================================================================

//! ## Overview
//! Validation never writes output itself. Hosts pass a
//! [`ValidationEventSink`] and receive one structured [`ValidationEvent`] per
//! compile attempt, per display-type warning, and per response batch. The
//! core ships a no-op sink and an in-memory recording sink; hosts supply
//! their own sinks for stderr or files.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::validation::ValidationPass;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Event name for campaign compile outcomes.
pub const CAMPAIGN_VALIDATION_EVENT: &str = "campaign_validation";

/// Event name for non-fatal authoring warnings.
pub const CAMPAIGN_WARNING_EVENT: &str = "campaign_warning";

/// Event name for response batch outcomes.
pub const RESPONSE_VALIDATION_EVENT: &str = "response_validation";

/// Outcome reported by a validation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Input accepted.
    Accepted,
    /// Input rejected.
    Rejected,
    /// Input accepted with a warning.
    Warning,
}

/// Structured validation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationEvent {
    /// Event name.
    pub event: &'static str,
    /// Wall-clock time in unix milliseconds.
    pub timestamp_ms: u128,
    /// Outcome.
    pub outcome: ValidationOutcome,
    /// Campaign URN, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_urn: Option<String>,
    /// Survey id, when the event concerns one survey.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_id: Option<String>,
    /// Failing or warning pass, for compile events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<ValidationPass>,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Source digest, for accepted compiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,
}

impl ValidationEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event: &'static str, outcome: ValidationOutcome) -> Self {
        Self {
            event,
            timestamp_ms: now_millis(),
            outcome,
            campaign_urn: None,
            survey_id: None,
            pass: None,
            message: None,
            source_digest: None,
        }
    }

    /// Sets the campaign URN.
    #[must_use]
    pub fn with_campaign(mut self, urn: impl Into<String>) -> Self {
        self.campaign_urn = Some(urn.into());
        self
    }

    /// Sets the survey id.
    #[must_use]
    pub fn with_survey(mut self, survey_id: impl Into<String>) -> Self {
        self.survey_id = Some(survey_id.into());
        self
    }

    /// Sets the pass.
    #[must_use]
    pub const fn with_pass(mut self, pass: ValidationPass) -> Self {
        self.pass = Some(pass);
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source digest.
    #[must_use]
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.source_digest = Some(digest.into());
        self
    }
}

/// Returns the current unix time in milliseconds.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Receiver for validation events.
pub trait ValidationEventSink: Send + Sync {
    /// Records one event. Sinks must not fail validation.
    fn record(&self, event: &ValidationEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl ValidationEventSink for NoopEventSink {
    fn record(&self, _event: &ValidationEvent) {}
}

/// Sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<ValidationEvent>>,
}

impl RecordingEventSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ValidationEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ValidationEventSink for RecordingEventSink {
    fn record(&self, event: &ValidationEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}
