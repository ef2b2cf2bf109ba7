// crates/campaign-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the campaign binary subcommands.
// Purpose: Ensure documents and uploads are accepted or rejected end to end.
// Dependencies: campaign-cli binary, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Runs the `campaign` binary against documents and uploads written to a
//! temporary directory and checks stdout, stderr, and exit codes.
//!
//! Security posture: rejected inputs must exit non-zero with nothing on
//! stdout.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const URN: &str = "urn:campaign:sleep:study";

fn campaign_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_campaign"))
}

fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(campaign_bin())
        .current_dir(root)
        .env_remove("CAMPAIGN_VALIDATOR_CONFIG")
        .args(args)
        .output()
        .expect("run campaign")
}

fn write_json(root: &Path, name: &str, value: &Value) -> String {
    let path = root.join(name);
    fs::write(&path, serde_json::to_vec(value).expect("serialize fixture")).expect("write fixture");
    path.to_string_lossy().into_owned()
}

fn sleep_campaign() -> Value {
    json!({
        "campaignUrn": URN,
        "campaignName": "Sleep study",
        "surveys": [{
            "id": "morning",
            "title": "Morning check-in",
            "submitText": "Submit",
            "showSummary": false,
            "anytime": true,
            "contentList": [
                { "message": { "id": "intro", "messageText": "Good morning." } },
                { "prompt": {
                    "id": "hours",
                    "promptText": "How many hours did you sleep?",
                    "promptType": "number",
                    "displayType": "count",
                    "skippable": false,
                    "properties": [
                        { "key": "min", "label": "0" },
                        { "key": "max", "label": "24" }
                    ]
                } },
                { "prompt": {
                    "id": "quality",
                    "promptText": "How well did you sleep?",
                    "promptType": "single_choice",
                    "displayType": "category",
                    "skippable": false,
                    "properties": [
                        { "key": "0", "label": "Poorly" },
                        { "key": "1", "label": "Well" }
                    ]
                } }
            ]
        }]
    })
}

fn upload(responses: Value) -> Value {
    json!({
        "metadata": {
            "survey_key": "5d0c1b4e-8a3f-4a8e-9b1c-2f6d7e8a9b0c",
            "user": "participant",
            "campaign_urn": URN,
            "client": "android",
            "time": 1_700_000_000_000_i64,
            "timezone": "UTC",
            "location_status": "unavailable",
            "launch_context": {
                "launch_time": 1_699_999_990_000_i64,
                "launch_timezone": "UTC",
                "active_triggers": []
            },
            "privacy_state": "private"
        },
        "responses": responses
    })
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies a valid document prints its summary.
#[test]
fn validate_prints_summary() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());

    let output = run(root.path(), &["validate", &document]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let summary = stdout_json(&output);
    assert_eq!(summary["campaign_urn"], URN);
    assert_eq!(summary["campaign_name"], "Sleep study");
    assert_eq!(summary["surveys"][0]["id"], "morning");
    assert_eq!(summary["surveys"][0]["items"], 3);
    assert_eq!(summary["surveys"][0]["prompts"], 2);
    assert_eq!(summary["source_digest"].as_str().map(str::len), Some(64));
}

/// Verifies a duplicate id fails with exit code 1 and empty stdout.
#[test]
fn validate_rejects_duplicate_ids() {
    let root = TempDir::new().expect("temp dir");
    let mut campaign = sleep_campaign();
    campaign["surveys"][0]["contentList"][2]["prompt"]["id"] = json!("hours");
    let document = write_json(root.path(), "campaign.json", &campaign);

    let output = run(root.path(), &["validate", &document]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Campaign rejected"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("hours"), "unexpected stderr: {stderr}");
}

/// Verifies malformed JSON is reported as a rejection.
#[test]
fn validate_rejects_malformed_json() {
    let root = TempDir::new().expect("temp dir");
    let path = root.path().join("campaign.json");
    fs::write(&path, b"{ \"campaignUrn\": ").expect("write fixture");

    let output = run(root.path(), &["validate", path.to_string_lossy().as_ref()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Campaign rejected"), "unexpected stderr: {stderr}");
}

/// Verifies the configured document limit is enforced before parsing.
#[test]
fn validate_enforces_configured_document_limit() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let config = root.path().join("validator.toml");
    fs::write(&config, "[limits]\nmax_document_bytes = 64\nmax_condition_bytes = 32\n")
        .expect("write config");

    let output =
        run(root.path(), &["validate", &document, "--config", config.to_string_lossy().as_ref()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("limit 64"), "unexpected stderr: {stderr}");
}

/// Verifies an invalid config file fails closed.
#[test]
fn validate_rejects_invalid_config() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let config = root.path().join("validator.toml");
    fs::write(&config, "[events]\nsink = \"file\"\n").expect("write config");

    let output =
        run(root.path(), &["validate", &document, "--config", config.to_string_lossy().as_ref()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"), "unexpected stderr: {stderr}");
}

/// Verifies the file sink records compile events as JSON lines.
#[test]
fn validate_appends_events_to_configured_file() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let events = root.path().join("events.jsonl");
    let config = root.path().join("validator.toml");
    fs::write(
        &config,
        format!("[events]\nsink = \"file\"\npath = {:?}\n", events.to_string_lossy()),
    )
    .expect("write config");
    let config = config.to_string_lossy().into_owned();

    assert!(run(root.path(), &["validate", &document, "--config", &config]).status.success());
    assert!(run(root.path(), &["validate", &document, "--config", &config]).status.success());

    let log = fs::read_to_string(&events).expect("read events");
    let lines: Vec<Value> =
        log.lines().map(|line| serde_json::from_str(line).expect("event json")).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|event| event["event"] == "campaign_validation"));
    assert!(lines.iter().all(|event| event["outcome"] == "accepted"));
}

/// Verifies the schema command prints the canonical schema.
#[test]
fn schema_prints_document_schema() {
    let root = TempDir::new().expect("temp dir");

    let output = run(root.path(), &["schema"]);

    assert!(output.status.success());
    let schema = stdout_json(&output);
    assert_eq!(schema["title"], "Campaign Document");
    assert_eq!(schema["required"], json!(["campaignUrn", "campaignName", "surveys"]));
}

/// Verifies an external schema replaces the canonical one.
#[test]
fn validate_uses_schema_override() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let schema = write_json(
        root.path(),
        "schema.json",
        &json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["iconUrl"]
        }),
    );

    let output = run(root.path(), &["validate", &document, "--schema", &schema]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("iconUrl"), "unexpected stderr: {stderr}");
}

/// Verifies a complete upload prints the normalized responses.
#[test]
fn check_responses_accepts_complete_upload() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let body = upload(json!({ "hours": 7, "quality": 1 }));
    let upload = write_json(root.path(), "upload.json", &body);

    let output = run(
        root.path(),
        &["check-responses", &document, "--survey", "morning", "--upload", &upload],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let result = stdout_json(&output);
    assert_eq!(result["survey_id"], "morning");
    assert_eq!(result["campaign_urn"], URN);
    let responses = result["responses"].as_object().expect("responses object");
    assert!(responses.contains_key("hours"));
    assert!(responses.contains_key("quality"));
    assert!(!responses.contains_key("intro"));
}

/// Verifies a missing required response is rejected.
#[test]
fn check_responses_rejects_missing_answer() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let upload = write_json(root.path(), "upload.json", &upload(json!({ "hours": 7 })));

    let output = run(
        root.path(),
        &["check-responses", &document, "--survey", "morning", "--upload", &upload],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Responses rejected"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("quality"), "unexpected stderr: {stderr}");
}

/// Verifies an unknown survey id is rejected.
#[test]
fn check_responses_rejects_unknown_survey() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let upload = write_json(root.path(), "upload.json", &upload(json!({ "hours": 7 })));

    let output = run(
        root.path(),
        &["check-responses", &document, "--survey", "evening", "--upload", &upload],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("evening"), "unexpected stderr: {stderr}");
}

/// Verifies unknown upload fields fail to parse.
#[test]
fn check_responses_rejects_unknown_upload_fields() {
    let root = TempDir::new().expect("temp dir");
    let document = write_json(root.path(), "campaign.json", &sleep_campaign());
    let mut body = upload(json!({ "hours": 7, "quality": 1 }));
    body["extra"] = json!(true);
    let upload = write_json(root.path(), "upload.json", &body);

    let output = run(
        root.path(),
        &["check-responses", &document, "--survey", "morning", "--upload", &upload],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse upload"), "unexpected stderr: {stderr}");
}

/// Verifies `--version` prints the package version.
#[test]
fn version_flag_prints_version() {
    let root = TempDir::new().expect("temp dir");

    let output = run(root.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "unexpected stdout: {stdout}");
}
