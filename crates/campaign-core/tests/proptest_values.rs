// crates/campaign-core/tests/proptest_values.rs
// ============================================================================
// Module: Response Value Property-Based Tests
// Description: Property tests for numeric bounds and comparison consistency.
// Purpose: Detect boundary drift between range checks and condition ordering.
// ============================================================================

//! Property-based tests for response value invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use campaign_core::IntegerRange;
use campaign_core::MediaSet;
use campaign_core::ResponseRule;
use campaign_core::runtime::CheckedValue;
use campaign_core::runtime::RecordedResponse;
use campaign_core::runtime::check_value;
use campaign_core::runtime::compare_response;
use proptest::prelude::*;
use serde_json::json;
use survey_condition::Literal;
use survey_condition::Operator;

fn bounds_strategy() -> impl Strategy<Value = (i64, i64)> {
    (-1_000_i64 .. 1_000, 0_i64 .. 500).prop_map(|(min, width)| (min, min + width))
}

proptest! {
    #[test]
    fn number_checks_match_inclusive_range(
        (min, max) in bounds_strategy(),
        value in -2_000_i64 .. 2_000,
        as_text in any::<bool>(),
    ) {
        let rule = ResponseRule::Number { range: IntegerRange { min, max } };
        let submitted = if as_text { json!(value.to_string()) } else { json!(value) };
        let checked = check_value(&rule, &submitted, &MediaSet::new());
        if (min ..= max).contains(&value) {
            prop_assert_eq!(checked, Ok(CheckedValue::Number(value)));
        } else {
            prop_assert!(checked.is_err());
        }
    }

    #[test]
    fn fractional_numbers_are_rejected(whole in -100_i64 .. 100, tenths in 1_u8 .. 10) {
        let rule = ResponseRule::Number { range: IntegerRange { min: -1_000, max: 1_000 } };
        let submitted = json!(format!("{whole}.{tenths}"));
        prop_assert!(check_value(&rule, &submitted, &MediaSet::new()).is_err());
    }

    #[test]
    fn number_comparisons_agree_with_integer_ordering(
        answer in -1_000_i64 .. 1_000,
        literal in -1_000_i64 .. 1_000,
        operator in prop::sample::select(Operator::ALL.to_vec()),
    ) {
        let recorded = RecordedResponse::Answered(CheckedValue::Number(answer));
        let holds = compare_response(&recorded, operator, &Literal::bare(literal.to_string()));
        prop_assert_eq!(holds, operator.accepts(answer.cmp(&literal)));
    }
}
