// crates/campaign-core/tests/structural_validation.rs
// ============================================================================
// Test Module: Structural Validation
// Coverage: Pass ordering, authoring rules, conditions, defaults, and events.
// ============================================================================
//! ## Overview
//! Integration tests for the ordered structural passes over campaign documents.

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

mod support;

use std::sync::Arc;

use campaign_core::RecordingEventSink;
use campaign_core::ValidationLimits;
use campaign_core::ValidationOutcome;
use campaign_core::ValidationPass;
use serde_json::json;
use support::TestResult;
use support::campaign;
use support::choice_prompt;
use support::conditioned;
use support::ensure;
use support::expect_rejected;
use support::expect_valid;
use support::message;
use support::number_prompt;
use support::prompt;
use support::repeatable_set;
use support::skippable;
use support::structural_validator;
use support::survey;
use support::text_prompt;
use support::with_field;

// ========================================================================
// SECTION: Identity Passes
// ========================================================================

/// Tests a well-formed document passes every pass.
#[test]
fn accepts_well_formed_document() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        message("intro"),
        number_prompt("hours", 0, 24),
        conditioned(choice_prompt("quality", "single_choice", &[(0, "poor"), (1, "good")]), "hours > 6"),
        repeatable_set("naps", vec![number_prompt("nap_minutes", 1, 240)]),
    ])]);
    let validated = expect_valid(&document)?;
    ensure(validated.validator("hours").is_some(), "number prompt should be configured")?;
    ensure(validated.condition("quality").is_some(), "condition should be parsed")?;
    ensure(validated.warnings().is_empty(), "no warnings expected")?;
    Ok(())
}

/// Tests duplicate prompt ids fail before any type-specific pass runs.
#[test]
fn duplicate_ids_fail_before_type_checks() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        number_prompt("p1", 0, 10),
        number_prompt("p1", 10, 0),
    ])]);
    let err = expect_rejected(&document, ValidationPass::UniqueIds, "duplicate id")?;
    ensure(err.item.as_ref().is_some_and(|item| item.as_str() == "p1"), "error should name p1")?;
    Ok(())
}

/// Tests survey ids and item ids share one namespace.
#[test]
fn survey_and_item_ids_share_a_namespace() -> TestResult {
    let document = campaign(vec![
        survey("morning", vec![number_prompt("hours", 0, 24)]),
        survey("evening", vec![number_prompt("morning", 0, 24)]),
    ]);
    expect_rejected(&document, ValidationPass::UniqueIds, "duplicate id")?;
    Ok(())
}

/// Tests ids nested in repeatable sets are included in the uniqueness check.
#[test]
fn nested_ids_must_be_unique() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        number_prompt("hours", 0, 24),
        repeatable_set("naps", vec![number_prompt("hours", 0, 24)]),
    ])]);
    expect_rejected(&document, ValidationPass::UniqueIds, "duplicate id")?;
    Ok(())
}

/// Tests malformed campaign URNs are rejected.
#[test]
fn rejects_malformed_urn() -> TestResult {
    for urn in ["campaign:sleep:study", "urn:campaign", "urn:campaign:Sleep Study", "urn::study"] {
        let document = with_field(
            campaign(vec![survey("morning", vec![number_prompt("hours", 0, 24)])]),
            "campaignUrn",
            json!(urn),
        );
        expect_rejected(&document, ValidationPass::CampaignUrn, "not a valid campaign urn")?;
    }
    Ok(())
}

/// Tests documents that do not match the schema fail in the schema pass.
#[test]
fn schema_violations_fail_first() -> TestResult {
    let nested = campaign(vec![survey("morning", vec![
        number_prompt("hours", 0, 24),
        repeatable_set("outer", vec![repeatable_set("inner", vec![number_prompt("deep", 0, 1)])]),
    ])]);
    expect_rejected(&nested, ValidationPass::Schema, "does not match the schema")?;
    let missing = json!({ "campaignUrn": "urn:campaign:sleep:study", "surveys": [] });
    expect_rejected(&missing, ValidationPass::Schema, "does not match the schema")?;
    Ok(())
}

/// Tests the document size limit is enforced before parsing.
#[test]
fn oversized_documents_are_rejected() -> TestResult {
    let validator = structural_validator()?.with_limits(ValidationLimits {
        max_document_bytes: 16,
        ..ValidationLimits::default()
    });
    let text = serde_json::to_string(&campaign(vec![survey("morning", vec![number_prompt(
        "hours", 0, 24,
    )])]))?;
    match validator.validate(&text) {
        Err(err) if err.pass == ValidationPass::Schema && err.message.contains("limit") => Ok(()),
        other => support::fail(format!("expected a size failure, got {other:?}")),
    }
}

/// Tests unknown prompt types are rejected.
#[test]
fn rejects_unknown_prompt_type() -> TestResult {
    let document =
        campaign(vec![survey("morning", vec![prompt("clip", "video", "event", json!([]))])]);
    expect_rejected(&document, ValidationPass::PromptTypes, "unknown prompt type `video`")?;
    Ok(())
}

// ========================================================================
// SECTION: Prompt Properties
// ========================================================================

/// Tests single-choice measurement prompts need numeric values.
#[test]
fn single_choice_measurement_requires_values() -> TestResult {
    let document = campaign(vec![survey("morning", vec![prompt(
        "mood",
        "single_choice",
        "measurement",
        json!([{ "key": "0", "label": "a" }, { "key": "1", "label": "b" }]),
    )])]);
    expect_rejected(&document, ValidationPass::PromptProperties, "require numeric values")?;
    Ok(())
}

/// Tests single-choice measurement prompts accept numeric values.
#[test]
fn single_choice_measurement_with_values_passes() -> TestResult {
    let document = campaign(vec![survey("morning", vec![prompt(
        "mood",
        "single_choice",
        "measurement",
        json!([
            { "key": "0", "label": "a", "value": "1.5" },
            { "key": "1", "label": "b", "value": "3" }
        ]),
    )])]);
    expect_valid(&document)?;
    Ok(())
}

/// Tests number bounds must be ordered.
#[test]
fn number_bounds_must_be_ordered() -> TestResult {
    let document = campaign(vec![survey("morning", vec![number_prompt("hours", 10, 0)])]);
    expect_rejected(&document, ValidationPass::PromptProperties, "is less than `min`")?;
    Ok(())
}

/// Tests text length bounds must be positive.
#[test]
fn text_bounds_must_be_positive() -> TestResult {
    let document = campaign(vec![survey("morning", vec![text_prompt("notes", 0, 10)])]);
    expect_rejected(&document, ValidationPass::PromptProperties, "positive integer")?;
    Ok(())
}

/// Tests fixed choice prompts need at least two choices.
#[test]
fn choice_prompts_need_two_choices() -> TestResult {
    let document = campaign(vec![survey("morning", vec![choice_prompt(
        "mood",
        "multi_choice",
        &[(0, "fine")],
    )])]);
    expect_rejected(&document, ValidationPass::PromptProperties, "at least 2 choices")?;
    Ok(())
}

/// Tests choice labels must be unique.
#[test]
fn choice_labels_must_be_unique() -> TestResult {
    let document = campaign(vec![survey("morning", vec![choice_prompt(
        "mood",
        "single_choice",
        &[(0, "fine"), (1, "fine")],
    )])]);
    expect_rejected(&document, ValidationPass::PromptProperties, "duplicate choice label")?;
    Ok(())
}

/// Tests timestamp prompts reject property bundles.
#[test]
fn timestamp_prompts_take_no_properties() -> TestResult {
    let document = campaign(vec![survey("morning", vec![prompt(
        "woke",
        "timestamp",
        "event",
        json!([{ "key": "min", "label": "0" }]),
    )])]);
    expect_rejected(&document, ValidationPass::PromptProperties, "take no properties")?;
    Ok(())
}

/// Tests remote activity settings are checked.
#[test]
fn remote_activity_settings_are_checked() -> TestResult {
    let properties = |package: &str, min_runs: &str| {
        json!([
            { "key": "package", "label": package },
            { "key": "activity", "label": "org.example.Game" },
            { "key": "action", "label": "launch" },
            { "key": "autolaunch", "label": "false" },
            { "key": "retries", "label": "1" },
            { "key": "min_runs", "label": min_runs }
        ])
    };
    let valid = campaign(vec![survey("morning", vec![prompt(
        "game",
        "remote_activity",
        "event",
        properties("org.example", "2"),
    )])]);
    expect_valid(&valid)?;
    let bad_package = campaign(vec![survey("morning", vec![prompt(
        "game",
        "remote_activity",
        "event",
        properties("example", "1"),
    )])]);
    expect_rejected(&bad_package, ValidationPass::PromptProperties, "must contain a `.`")?;
    let too_many_runs = campaign(vec![survey("morning", vec![prompt(
        "game",
        "remote_activity",
        "event",
        properties("org.example", "3"),
    )])]);
    expect_rejected(&too_many_runs, ValidationPass::PromptProperties, "min_runs")?;
    Ok(())
}

// ========================================================================
// SECTION: Conditions
// ========================================================================

/// Tests number condition literals must lie within the prompt's bounds.
#[test]
fn number_condition_values_are_bounded() -> TestResult {
    let build = |condition: &str| {
        campaign(vec![survey("morning", vec![
            number_prompt("p1", 0, 10),
            conditioned(number_prompt("p2", 0, 10), condition),
        ])])
    };
    let err = expect_rejected(&build("p1 > 11"), ValidationPass::Conditions, "outside [0, 10]")?;
    ensure(
        err.item.as_ref().is_some_and(|item| item.as_str() == "p2"),
        "condition errors name the conditioned item",
    )?;
    expect_valid(&build("p1 > 5"))?;
    Ok(())
}

/// Tests the first item of a survey can never carry a condition.
#[test]
fn first_item_cannot_have_condition() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        conditioned(message("intro"), "hours == 1"),
        number_prompt("hours", 0, 24),
    ])]);
    expect_rejected(&document, ValidationPass::Conditions, "first item")?;
    Ok(())
}

/// Tests conditions may only reference earlier items.
#[test]
fn forward_and_self_references_fail() -> TestResult {
    for condition in ["p3 == 1", "p2 == 1"] {
        let document = campaign(vec![survey("morning", vec![
            number_prompt("p1", 0, 10),
            conditioned(number_prompt("p2", 0, 10), condition),
            number_prompt("p3", 0, 10),
        ])]);
        expect_rejected(&document, ValidationPass::Conditions, "not an earlier item")?;
    }
    Ok(())
}

/// Tests conditions cannot reference messages.
#[test]
fn references_to_messages_fail() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        message("intro"),
        conditioned(number_prompt("p1", 0, 10), "intro == 1"),
    ])]);
    expect_rejected(&document, ValidationPass::Conditions, "not a prompt")?;
    Ok(())
}

/// Tests grammar errors surface in the conditions pass.
#[test]
fn malformed_conditions_fail() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        number_prompt("p1", 0, 10),
        conditioned(number_prompt("p2", 0, 10), "p1 == 1 and"),
    ])]);
    expect_rejected(&document, ValidationPass::Conditions, "invalid condition")?;
    Ok(())
}

/// Tests `SKIPPED` may only be compared for skippable prompts.
#[test]
fn skipped_sentinel_requires_skippable_prompt() -> TestResult {
    let build = |first| {
        campaign(vec![survey("morning", vec![
            first,
            conditioned(number_prompt("p2", 0, 10), "p1 == SKIPPED"),
        ])])
    };
    expect_rejected(&build(number_prompt("p1", 0, 10)), ValidationPass::Conditions, "not skippable")?;
    expect_valid(&build(skippable(number_prompt("p1", 0, 10))))?;
    let ordered = campaign(vec![survey("morning", vec![
        skippable(number_prompt("p1", 0, 10)),
        conditioned(number_prompt("p2", 0, 10), "p1 > SKIPPED"),
    ])]);
    expect_rejected(&ordered, ValidationPass::Conditions, "may only be compared")?;
    Ok(())
}

/// Tests choice conditions use equality and configured keys.
#[test]
fn choice_conditions_use_configured_keys() -> TestResult {
    let build = |condition: &str| {
        campaign(vec![survey("morning", vec![
            choice_prompt("mood", "single_choice", &[(0, "low"), (1, "high")]),
            conditioned(number_prompt("p2", 0, 10), condition),
        ])])
    };
    expect_valid(&build("mood == 1"))?;
    expect_rejected(&build("mood < 1"), ValidationPass::Conditions, "only support `==` and `!=`")?;
    expect_rejected(&build("mood == 7"), ValidationPass::Conditions, "not among the configured")?;
    Ok(())
}

/// Tests text prompts can only be compared against `SKIPPED`.
#[test]
fn text_conditions_only_compare_skipped() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        text_prompt("notes", 1, 100),
        conditioned(number_prompt("p2", 0, 10), "notes == \"tired\""),
    ])]);
    expect_rejected(&document, ValidationPass::Conditions, "only `SKIPPED`")?;
    Ok(())
}

/// Tests prompts inside a set see earlier set prompts but later items do not.
#[test]
fn repeatable_set_prompts_are_scoped() -> TestResult {
    let inside = campaign(vec![survey("morning", vec![
        number_prompt("hours", 0, 24),
        repeatable_set("naps", vec![
            number_prompt("nap_minutes", 1, 240),
            conditioned(number_prompt("nap_quality", 0, 5), "nap_minutes > 30 and hours < 6"),
        ]),
    ])]);
    expect_valid(&inside)?;
    let after = campaign(vec![survey("morning", vec![
        number_prompt("hours", 0, 24),
        repeatable_set("naps", vec![number_prompt("nap_minutes", 1, 240)]),
        conditioned(number_prompt("rested", 0, 5), "nap_minutes > 30"),
    ])]);
    expect_rejected(&after, ValidationPass::Conditions, "not an earlier item")?;
    Ok(())
}

// ========================================================================
// SECTION: Defaults and Authoring Rules
// ========================================================================

/// Tests choice defaults must be configured labels.
#[test]
fn choice_defaults_must_be_labels() -> TestResult {
    let build = |default: &str| {
        campaign(vec![survey("morning", vec![with_field(
            choice_prompt("mood", "single_choice", &[(0, "low"), (1, "high")]),
            "default",
            json!(default),
        )])])
    };
    expect_valid(&build("high"))?;
    expect_rejected(&build("medium"), ValidationPass::Defaults, "not one of the choice labels")?;
    Ok(())
}

/// Tests number defaults are bounded and text defaults are forbidden.
#[test]
fn defaults_follow_prompt_type() -> TestResult {
    let number = campaign(vec![survey("morning", vec![with_field(
        number_prompt("hours", 0, 24),
        "default",
        json!("25"),
    )])]);
    expect_rejected(&number, ValidationPass::Defaults, "outside [0, 24]")?;
    let text = campaign(vec![survey("morning", vec![with_field(
        text_prompt("notes", 1, 10),
        "default",
        json!("hello"),
    )])]);
    expect_rejected(&text, ValidationPass::Defaults, "not allowed for text prompts")?;
    Ok(())
}

/// Tests summary screens require summary text and the edit flag.
#[test]
fn summary_surveys_need_summary_fields() -> TestResult {
    let base = with_field(
        survey("morning", vec![with_field(
            number_prompt("hours", 0, 24),
            "abbreviatedText",
            json!("Hours"),
        )]),
        "showSummary",
        json!(true),
    );
    expect_rejected(&campaign(vec![base.clone()]), ValidationPass::SurveyRules, "summaryText")?;
    let with_text = with_field(base, "summaryText", json!("Review"));
    expect_rejected(&campaign(vec![with_text.clone()]), ValidationPass::SurveyRules, "editSummary")?;
    expect_valid(&campaign(vec![with_field(with_text, "editSummary", json!(false))]))?;
    Ok(())
}

/// Tests summarized surveys need abbreviated prompt text.
#[test]
fn summary_surveys_need_abbreviated_text() -> TestResult {
    let document = campaign(vec![with_field(
        with_field(
            with_field(survey("morning", vec![number_prompt("hours", 0, 24)]), "showSummary", json!(true)),
            "summaryText",
            json!("Review"),
        ),
        "editSummary",
        json!(true),
    )]);
    expect_rejected(&document, ValidationPass::PromptRules, "abbreviatedText")?;
    Ok(())
}

/// Tests skippable repeatable sets need a skip label.
#[test]
fn skippable_set_requires_skip_label() -> TestResult {
    let set = with_field(
        repeatable_set("naps", vec![number_prompt("nap_minutes", 1, 240)]),
        "terminationSkipEnabled",
        json!(true),
    );
    let document =
        campaign(vec![survey("morning", vec![number_prompt("hours", 0, 24), set.clone()])]);
    expect_rejected(&document, ValidationPass::RepeatableSetRules, "terminationSkipLabel")?;
    let labelled = with_field(set, "terminationSkipLabel", json!("No naps"));
    expect_valid(&campaign(vec![survey("morning", vec![number_prompt("hours", 0, 24), labelled])]))?;
    Ok(())
}

/// Tests skippable prompts need a skip label.
#[test]
fn skippable_prompt_requires_skip_label() -> TestResult {
    let document = campaign(vec![survey("morning", vec![with_field(
        number_prompt("hours", 0, 24),
        "skippable",
        json!(true),
    )])]);
    expect_rejected(&document, ValidationPass::PromptRules, "skipLabel")?;
    Ok(())
}

/// Tests unknown display types fail and repeated metadata timestamps warn.
#[test]
fn display_types_are_checked() -> TestResult {
    let unknown =
        campaign(vec![survey("morning", vec![prompt("woke", "timestamp", "chart", json!([]))])]);
    expect_rejected(&unknown, ValidationPass::DisplayTypes, "unknown display type `chart`")?;
    let repeated = campaign(vec![survey("morning", vec![
        prompt("woke", "timestamp", "metadata", json!([])),
        prompt("slept", "timestamp", "metadata", json!([])),
    ])]);
    let validated = expect_valid(&repeated)?;
    ensure(
        validated
            .warnings()
            .iter()
            .any(|warning| warning.pass == ValidationPass::DisplayTypes && warning.survey_id.as_str() == "morning"),
        "expected a metadata timestamp warning",
    )?;
    Ok(())
}

// ========================================================================
// SECTION: Events
// ========================================================================

/// Tests one event is recorded per run with the failing pass.
#[test]
fn records_outcome_events() -> TestResult {
    let sink = Arc::new(RecordingEventSink::new());
    let validator = structural_validator()?.with_sink(sink.clone());
    let good = serde_json::to_string(&campaign(vec![survey("morning", vec![
        prompt("woke", "timestamp", "metadata", json!([])),
        prompt("slept", "timestamp", "metadata", json!([])),
    ])]))?;
    let bad = serde_json::to_string(&campaign(vec![survey("morning", vec![
        number_prompt("p1", 0, 1),
        number_prompt("p1", 0, 1),
    ])]))?;
    ensure(validator.validate(&good).is_ok(), "good document should pass")?;
    ensure(validator.validate(&bad).is_err(), "bad document should fail")?;
    let events = sink.events();
    let outcomes: Vec<_> = events.iter().map(|event| event.outcome).collect();
    ensure(
        outcomes
            == vec![ValidationOutcome::Warning, ValidationOutcome::Accepted, ValidationOutcome::Rejected],
        format!("unexpected outcomes {outcomes:?}"),
    )?;
    ensure(events[2].pass == Some(ValidationPass::UniqueIds), "rejection should name the pass")?;
    ensure(
        events[1].campaign_urn.as_deref() == Some(support::URN),
        "acceptance should name the campaign",
    )?;
    Ok(())
}
