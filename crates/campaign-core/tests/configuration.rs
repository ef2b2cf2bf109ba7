// crates/campaign-core/tests/configuration.rs
// ============================================================================
// Test Module: Compiled Configuration
// Coverage: Schema building, lookups, fingerprints, and snapshot swaps.
// ============================================================================
//! ## Overview
//! Integration tests for configurations compiled from validated documents.

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
use std::thread;

use campaign_core::CompileError;
use campaign_core::ConfigurationHandle;
use campaign_core::DisplayType;
use campaign_core::HashAlgorithm;
use campaign_core::PromptLocation;
use campaign_core::PromptType;
use campaign_core::ResponseRule;
use campaign_core::SchemaBuilder;
use campaign_core::ValidationPass;
use campaign_core::compile_campaign;
use serde_json::Value;
use serde_json::json;
use support::TestResult;
use support::campaign;
use support::choice_prompt;
use support::compile;
use support::conditioned;
use support::ensure;
use support::expect_valid;
use support::message;
use support::number_prompt;
use support::prompt;
use support::repeatable_set;
use support::skippable;
use support::state;
use support::structural_validator;
use support::survey;
use support::with_field;

// ========================================================================
// SECTION: Helpers
// ========================================================================

/// A two-survey campaign covering every lookup.
fn sleep_campaign() -> Value {
    campaign(vec![
        survey("morning", vec![
            message("intro"),
            with_field(
                with_field(skippable(number_prompt("hours", 0, 24)), "unit", json!("hours")),
                "displayLabel",
                json!("Hours slept"),
            ),
            prompt(
                "quality",
                "single_choice",
                "measurement",
                json!([
                    { "key": "0", "label": "poor", "value": "1" },
                    { "key": "1", "label": "good", "value": "5" }
                ]),
            ),
            prompt("woke", "timestamp", "metadata", json!([])),
            repeatable_set("naps", vec![
                number_prompt("nap_minutes", 1, 240),
                choice_prompt("nap_place", "single_choice", &[(0, "bed"), (1, "couch")]),
            ]),
        ]),
        survey("evening", vec![choice_prompt("mood", "multi_choice", &[
            (0, "calm"),
            (1, "tense"),
            (2, "tired"),
        ])]),
    ])
}

// ========================================================================
// SECTION: Tests
// ========================================================================

/// Tests lookups return exactly the declared type and display metadata.
#[test]
fn lookups_return_declared_metadata() -> TestResult {
    let config = compile(&sleep_campaign())?;
    ensure(config.urn().as_str() == support::URN, "urn should be kept")?;
    ensure(config.name() == "Sleep study", "name should be kept")?;
    ensure(config.survey_exists("morning") && !config.survey_exists("noon"), "survey existence")?;
    ensure(config.survey_title("morning") == Some("Survey morning"), "survey title")?;
    ensure(config.prompt_type("morning", "hours") == Some(PromptType::Number), "prompt type")?;
    ensure(config.display_type("morning", "hours") == Some(DisplayType::Count), "display type")?;
    ensure(config.display_label("morning", "hours") == Some("Hours slept"), "display label")?;
    ensure(config.unit("morning", "hours") == Some("hours"), "unit")?;
    ensure(config.prompt_text("morning", "hours") == Some("Question hours"), "prompt text")?;
    ensure(config.is_prompt_skippable("morning", "hours") == Some(true), "skippable")?;
    ensure(config.is_prompt_skippable("morning", "quality") == Some(false), "not skippable")?;
    ensure(config.prompt_type("evening", "hours").is_none(), "prompts are scoped to surveys")?;
    Ok(())
}

/// Tests counts and nested lookups.
#[test]
fn counts_and_nested_prompts() -> TestResult {
    let config = compile(&sleep_campaign())?;
    ensure(config.number_of_survey_items("morning") == Some(5), "five top-level items")?;
    ensure(config.number_of_prompts("morning") == Some(5), "prompts include nested prompts")?;
    ensure(config.prompt_exists("morning", "nap_minutes"), "nested prompt exists")?;
    ensure(!config.prompt_exists("morning", "intro"), "messages are not prompts")?;
    ensure(config.repeatable_set_exists("morning", "naps"), "set exists")?;
    ensure(
        config.prompt_location("morning", "nap_place")
            == Some(PromptLocation::InRepeatableSet("naps".into())),
        "nested location",
    )?;
    ensure(config.prompt_location("morning", "hours") == Some(PromptLocation::Direct), "direct")?;
    ensure(
        config.survey_id_for_prompt("mood").map(|id| id.as_str()) == Some("evening"),
        "owner survey",
    )?;
    let metadata: Vec<&str> =
        config.metadata_prompt_ids("morning").iter().map(|id| id.as_str()).collect();
    ensure(metadata == vec!["woke"], format!("unexpected metadata prompts {metadata:?}"))?;
    Ok(())
}

/// Tests choice labels and values.
#[test]
fn choice_lookups() -> TestResult {
    let config = compile(&sleep_campaign())?;
    ensure(config.choice_label("morning", "quality", 1) == Some("good"), "label")?;
    ensure(config.choice_value("morning", "quality", 1) == Some("5"), "value")?;
    ensure(config.choice_label("morning", "quality", 9).is_none(), "unknown key")?;
    ensure(config.choice_value("morning", "nap_place", 0).is_none(), "no values")?;
    ensure(config.prompt_contains_single_choice_values("morning", "quality"), "has values")?;
    ensure(!config.prompt_contains_single_choice_values("morning", "nap_place"), "no values")?;
    ensure(!config.prompt_contains_single_choice_values("evening", "mood"), "multi choice")?;
    Ok(())
}

/// Tests compiled prompts carry the validated rule and condition.
#[test]
fn prompts_carry_rules_and_conditions() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        number_prompt("hours", 0, 24),
        conditioned(number_prompt("nap", 0, 3), "hours < 6"),
    ])]);
    let config = compile(&document)?;
    let Some(hours) = config.prompt("morning", "hours") else {
        return support::fail("hours prompt missing");
    };
    match &hours.rule {
        ResponseRule::Number {
            range,
        } => ensure(range.min == 0 && range.max == 24, "range should be kept")?,
        other => return support::fail(format!("unexpected rule {other:?}")),
    }
    let Some(nap) = config.prompt("morning", "nap") else {
        return support::fail("nap prompt missing");
    };
    ensure(
        nap.condition.as_ref().is_some_and(|condition| condition.raw() == "hours < 6"),
        "condition should be kept",
    )?;
    ensure(hours.condition.is_none(), "unconditioned prompt")?;
    Ok(())
}

/// Tests the source digest depends on content, not formatting.
#[test]
fn source_digest_is_canonical() -> TestResult {
    let document = sleep_campaign();
    let validator = structural_validator()?;
    let compact = serde_json::to_string(&document)?;
    let pretty = serde_json::to_string_pretty(&document)?;
    let first = compile_campaign(&validator, &compact, state())?.configuration;
    let second = compile_campaign(&validator, &pretty, state())?.configuration;
    ensure(first.source_digest() == second.source_digest(), "formatting must not change digest")?;
    let digest = first.source_digest();
    ensure(digest.algorithm == HashAlgorithm::Sha256, "sha-256 by default")?;
    ensure(
        digest.value.len() == 64
            && digest.value.chars().all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch)),
        format!("digest is lowercase hex: {}", digest.value),
    )?;
    ensure(first.source() == compact, "source text is kept verbatim")?;
    let renamed = with_field(document, "campaignName", json!("Another name"));
    let third = compile(&renamed)?;
    ensure(first.source_digest() != third.source_digest(), "content changes the digest")?;
    Ok(())
}

/// Tests structural failures surface through the one-call entry point.
#[test]
fn compile_reports_structural_errors() -> TestResult {
    let document = campaign(vec![survey("morning", vec![
        number_prompt("p1", 0, 10),
        number_prompt("p1", 0, 10),
    ])]);
    let text = serde_json::to_string(&document)?;
    match compile_campaign(&structural_validator()?, &text, state()) {
        Err(CompileError::Structural(err)) if err.pass == ValidationPass::UniqueIds => Ok(()),
        other => support::fail(format!("expected a unique id failure, got {other:?}")),
    }
}

/// Tests the builder consumes a validated campaign directly.
#[test]
fn builder_consumes_validated_campaign() -> TestResult {
    let validated = expect_valid(&sleep_campaign())?;
    let config = SchemaBuilder::build(validated, state())?;
    ensure(config.surveys().len() == 2, "both surveys built")?;
    Ok(())
}

/// Tests snapshot replacement is atomic for concurrent readers.
#[test]
fn handle_swaps_snapshots() -> TestResult {
    let first = compile(&sleep_campaign())?;
    let second = compile(&with_field(sleep_campaign(), "campaignName", json!("Revised")))?;
    let handle = Arc::new(ConfigurationHandle::new(first));
    let held = handle.snapshot();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                let name = handle.snapshot().name().to_string();
                name == "Sleep study" || name == "Revised"
            })
        })
        .collect();
    let previous = handle.replace(second);
    for reader in readers {
        ensure(reader.join().unwrap_or(false), "reader saw a mixed configuration")?;
    }

    ensure(previous.name() == "Sleep study", "replace returns the previous snapshot")?;
    ensure(held.name() == "Sleep study", "held snapshots are unaffected")?;
    ensure(handle.snapshot().name() == "Revised", "new readers see the replacement")?;
    Ok(())
}
