// crates/campaign-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and campaign fixtures for core tests.
// ============================================================================
//! ## Overview
//! Result-based assertion helpers plus builders for campaign documents,
//! compiled configurations, and response metadata.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;

use campaign_config::campaign_document_schema;
use campaign_core::CampaignState;
use campaign_core::Configuration;
use campaign_core::PrivacyState;
use campaign_core::RunningState;
use campaign_core::StructuralError;
use campaign_core::StructuralValidator;
use campaign_core::ValidatedCampaign;
use campaign_core::compile_campaign;
use campaign_core::runtime::LaunchContext;
use campaign_core::runtime::LocationStatus;
use campaign_core::runtime::ResponsePrivacyState;
use campaign_core::runtime::SurveyResponseMetadata;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across core integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { fail(message) }
}

/// Returns a formatted test failure.
///
/// # Errors
/// Always returns a `TestError` carrying the message.
pub fn fail<T>(message: impl Into<String>) -> TestResult<T> {
    Err(Box::new(TestError {
        message: message.into(),
    }))
}

// ========================================================================
// Document Fixtures
// ========================================================================

/// URN used by every fixture campaign.
pub const URN: &str = "urn:campaign:sleep:study";

/// Builds a campaign document from surveys.
pub fn campaign(surveys: Vec<Value>) -> Value {
    json!({
        "campaignUrn": URN,
        "campaignName": "Sleep study",
        "surveys": surveys
    })
}

/// Builds a survey without a summary screen.
pub fn survey(id: &str, content: Vec<Value>) -> Value {
    json!({
        "id": id,
        "title": format!("Survey {id}"),
        "submitText": "Submit",
        "showSummary": false,
        "anytime": true,
        "contentList": content
    })
}

/// Builds a message item.
pub fn message(id: &str) -> Value {
    json!({ "message": { "id": id, "messageText": "Thanks for taking part." } })
}

/// Builds a prompt item of any type.
pub fn prompt(id: &str, prompt_type: &str, display_type: &str, properties: Value) -> Value {
    json!({
        "prompt": {
            "id": id,
            "promptText": format!("Question {id}"),
            "promptType": prompt_type,
            "displayType": display_type,
            "skippable": false,
            "properties": properties
        }
    })
}

/// Builds a number prompt with inclusive bounds.
pub fn number_prompt(id: &str, min: i64, max: i64) -> Value {
    prompt(
        id,
        "number",
        "count",
        json!([
            { "key": "min", "label": min.to_string() },
            { "key": "max", "label": max.to_string() }
        ]),
    )
}

/// Builds a choice prompt displayed as a category.
pub fn choice_prompt(id: &str, prompt_type: &str, choices: &[(u64, &str)]) -> Value {
    let properties: Vec<Value> = choices
        .iter()
        .map(|(key, label)| json!({ "key": key.to_string(), "label": label }))
        .collect();
    prompt(id, prompt_type, "category", Value::Array(properties))
}

/// Builds a text prompt with a character range.
pub fn text_prompt(id: &str, min: u64, max: u64) -> Value {
    prompt(
        id,
        "text",
        "event",
        json!([
            { "key": "min", "label": min.to_string() },
            { "key": "max", "label": max.to_string() }
        ]),
    )
}

/// Makes a prompt skippable with a skip label.
pub fn skippable(item: Value) -> Value {
    let item = with_field(item, "skippable", json!(true));
    with_field(item, "skipLabel", json!("Skip"))
}

/// Attaches a display condition to an item.
pub fn conditioned(item: Value, condition: &str) -> Value {
    with_field(item, "condition", json!(condition))
}

/// Sets a field on the inner object of a tagged item or on a survey.
pub fn with_field(mut item: Value, key: &str, value: Value) -> Value {
    let Some(object) = item.as_object_mut() else {
        return item;
    };
    let tagged = object.len() == 1 && object.values().all(Value::is_object);
    let target = if tagged {
        object.values_mut().next().and_then(Value::as_object_mut)
    } else {
        Some(object)
    };
    if let Some(target) = target {
        target.insert(key.to_string(), value);
    }
    item
}

/// Builds a repeatable set item.
pub fn repeatable_set(id: &str, prompts: Vec<Value>) -> Value {
    json!({
        "repeatableSet": {
            "id": id,
            "terminationQuestion": "Add another?",
            "terminationTrueLabel": "Yes",
            "terminationFalseLabel": "No",
            "terminationSkipEnabled": false,
            "prompts": prompts
        }
    })
}

// ========================================================================
// Validation Helpers
// ========================================================================

/// Builds a validator over the canonical document schema.
///
/// # Errors
/// Returns an error when the schema does not compile.
pub fn structural_validator() -> TestResult<StructuralValidator> {
    Ok(StructuralValidator::new(&campaign_document_schema())?)
}

/// Runs the structural passes over a document.
///
/// # Errors
/// Returns an error when the fixture cannot be serialized or the schema
/// does not compile.
pub fn validate(document: &Value) -> TestResult<Result<ValidatedCampaign, StructuralError>> {
    let text = serde_json::to_string(document)?;
    Ok(structural_validator()?.validate(&text))
}

/// Expects a document to fail in a given pass with a message fragment.
///
/// # Errors
/// Returns an error when the document passes or fails differently.
pub fn expect_rejected(
    document: &Value,
    pass: campaign_core::ValidationPass,
    needle: &str,
) -> TestResult<StructuralError> {
    match validate(document)? {
        Ok(_) => fail(format!("expected {pass} failure containing `{needle}`")),
        Err(err) if err.pass == pass && err.to_string().contains(needle) => Ok(err),
        Err(err) => fail(format!("expected {pass} failure containing `{needle}`, got: {err}")),
    }
}

/// Expects a document to pass every structural pass.
///
/// # Errors
/// Returns an error when any pass fails.
pub fn expect_valid(document: &Value) -> TestResult<ValidatedCampaign> {
    match validate(document)? {
        Ok(validated) => Ok(validated),
        Err(err) => fail(format!("expected a valid document, got: {err}")),
    }
}

/// Default campaign state for compiled fixtures.
pub const fn state() -> CampaignState {
    CampaignState::new(RunningState::Running, PrivacyState::Shared, OffsetDateTime::UNIX_EPOCH)
}

/// Compiles a document into a configuration.
///
/// # Errors
/// Returns an error when validation or building fails.
pub fn compile(document: &Value) -> TestResult<Configuration> {
    let text = serde_json::to_string(document)?;
    let validator = structural_validator()?;
    Ok(compile_campaign(&validator, &text, state())?.configuration)
}

// ========================================================================
// Response Helpers
// ========================================================================

/// Builds valid metadata for the fixture campaign.
pub fn metadata() -> SurveyResponseMetadata {
    SurveyResponseMetadata {
        survey_key: "5d0c1b4e-8a3f-4a8e-9b1c-2f6d7e8a9b0c".to_string(),
        user: "participant".to_string(),
        campaign_urn: URN.to_string(),
        client: "android".to_string(),
        time: 1_700_000_000_000,
        timezone: "UTC".to_string(),
        location_status: LocationStatus::Unavailable,
        location: None,
        launch_context: LaunchContext {
            launch_time: 1_699_999_990_000,
            launch_timezone: "UTC".to_string(),
            active_triggers: Vec::new(),
        },
        privacy_state: ResponsePrivacyState::Private,
    }
}

/// Converts a JSON object fixture into a response map.
///
/// # Errors
/// Returns an error when the fixture is not an object.
pub fn responses(value: Value) -> TestResult<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => fail(format!("responses fixture must be an object, got {other}")),
    }
}
