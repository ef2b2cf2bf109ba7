// crates/survey-condition/tests/grammar.rs
// ============================================================================
// Test Module: Condition Grammar
// Coverage: Literal forms, precedence, referenced pairs, and error cases.
// ============================================================================
//! ## Overview
//! Integration tests for the display-condition parser.

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

use survey_condition::Condition;
use survey_condition::ConditionExpr;
use survey_condition::GrammarError;
use survey_condition::Literal;
use survey_condition::LiteralKind;
use survey_condition::MAX_CONDITION_NESTING;
use survey_condition::Operator;
use survey_condition::parse_condition;
use support::TestResult;
use support::ensure;
use support::fail;

// ========================================================================
// SECTION: Happy Paths
// ========================================================================

/// Tests a single comparison yields one pair under its id.
#[test]
fn parses_single_comparison() -> TestResult {
    let values = parse_condition("p1 > 5")?;
    ensure(values.len() == 1, "expected exactly one referenced id")?;
    let pairs = &values["p1"];
    ensure(pairs.len() == 1, "expected one pair for p1")?;
    ensure(pairs[0].operator == Operator::GreaterThan, "expected `>` operator")?;
    ensure(pairs[0].literal == Literal::bare("5"), "expected bare literal 5")?;
    Ok(())
}

/// Tests every operator symbol is recognized, with and without spaces.
#[test]
fn parses_every_operator() -> TestResult {
    for operator in Operator::ALL {
        for raw in [format!("p1 {} 3", operator.symbol()), format!("p1{}3", operator.symbol())] {
            let values = parse_condition(&raw)?;
            ensure(
                values["p1"][0].operator == operator,
                format!("expected {operator} from `{raw}`"),
            )?;
        }
    }
    Ok(())
}

/// Tests pairs for the same id accumulate in source order.
#[test]
fn groups_pairs_by_id_in_source_order() -> TestResult {
    let values = parse_condition("sleep > 2 and sleep < 9 or mood == 1")?;
    let sleep = &values["sleep"];
    ensure(sleep.len() == 2, "expected two pairs for sleep")?;
    ensure(sleep[0].operator == Operator::GreaterThan, "first pair should be `>`")?;
    ensure(sleep[1].operator == Operator::LessThan, "second pair should be `<`")?;
    ensure(values["mood"].len() == 1, "expected one pair for mood")?;
    Ok(())
}

/// Tests `and` binds tighter than `or`.
#[test]
fn and_binds_tighter_than_or() -> TestResult {
    let condition = Condition::parse("a == 1 or b == 2 and c == 3")?;
    let ConditionExpr::Or {
        children,
    } = condition.expression()
    else {
        return fail("expected top-level `or`");
    };
    ensure(children.len() == 2, "expected two disjuncts")?;
    ensure(
        matches!(&children[1], ConditionExpr::And { children } if children.len() == 2),
        "expected right disjunct to be a conjunction",
    )?;
    Ok(())
}

/// Tests parentheses override precedence and keywords are case-insensitive.
#[test]
fn parentheses_and_keyword_case() -> TestResult {
    let condition = Condition::parse("(a == 1 OR b == 2) AND c == 3")?;
    ensure(
        matches!(condition.expression(), ConditionExpr::And { children } if children.len() == 2),
        "expected top-level conjunction",
    )?;
    Ok(())
}

/// Tests sentinel, timestamp, negative, and decimal bare literals.
#[test]
fn bare_literal_forms() -> TestResult {
    let values = parse_condition(
        "a == SKIPPED and b != NOT_DISPLAYED and c < 2012-05-01T08:30:00 and d > -3 and e <= 2.5",
    )?;
    ensure(values["a"][0].literal.as_str() == "SKIPPED", "sentinel literal")?;
    ensure(values["b"][0].literal.as_str() == "NOT_DISPLAYED", "sentinel literal")?;
    ensure(values["c"][0].literal.as_str() == "2012-05-01T08:30:00", "timestamp literal")?;
    ensure(values["d"][0].literal.as_str() == "-3", "negative literal")?;
    ensure(values["e"][0].literal.as_str() == "2.5", "decimal literal")?;
    Ok(())
}

/// Tests quoted literals resolve escapes and may contain keywords or parens.
#[test]
fn quoted_literal_with_escapes() -> TestResult {
    let values = parse_condition(r#"label == "say \"and\" (or not)""#)?;
    let literal = &values["label"][0].literal;
    ensure(literal.kind() == LiteralKind::Quoted, "expected quoted literal")?;
    ensure(literal.as_str() == r#"say "and" (or not)"#, "expected escapes resolved")?;
    Ok(())
}

/// Tests array literals keep their brackets and skip brackets inside strings.
#[test]
fn array_literal_is_bracket_balanced() -> TestResult {
    let values = parse_condition(r#"game == [{"score": [1, 2], "tag": "a]b"}] and x == 1"#)?;
    let literal = &values["game"][0].literal;
    ensure(literal.kind() == LiteralKind::Array, "expected array literal")?;
    ensure(
        literal.as_str() == r#"[{"score": [1, 2], "tag": "a]b"}]"#,
        format!("unexpected array text {}", literal.as_str()),
    )?;
    ensure(values.contains_key("x"), "expected parsing to continue after the array")?;
    Ok(())
}

/// Tests the raw text is trimmed and displayed back unchanged.
#[test]
fn raw_text_is_preserved() -> TestResult {
    let condition = Condition::parse("  p1 == 1  ")?;
    ensure(condition.raw() == "p1 == 1", "expected trimmed raw text")?;
    ensure(condition.to_string() == "p1 == 1", "expected display to match raw text")?;
    Ok(())
}

// ========================================================================
// SECTION: Error Cases
// ========================================================================

/// Tests empty input is rejected.
#[test]
fn errors_on_empty_input() -> TestResult {
    let Err(err) = Condition::parse("   ") else {
        return fail("expected empty input error");
    };
    ensure(matches!(err, GrammarError::EmptyInput), "expected empty input diagnostic")?;
    Ok(())
}

/// Tests a bare identifier without a comparison is rejected.
#[test]
fn errors_on_missing_operator() -> TestResult {
    let Err(err) = Condition::parse("p1") else {
        return fail("expected missing operator error");
    };
    ensure(
        matches!(err, GrammarError::UnexpectedToken { expected: "comparison operator", .. }),
        format!("unexpected diagnostic {err}"),
    )?;
    Ok(())
}

/// Tests a comparison without a literal is rejected.
#[test]
fn errors_on_missing_literal() -> TestResult {
    let Err(err) = Condition::parse("p1 == and p2 == 1") else {
        return fail("expected missing literal error");
    };
    ensure(
        matches!(err, GrammarError::UnexpectedToken { expected: "literal value", .. }),
        format!("unexpected diagnostic {err}"),
    )?;
    Ok(())
}

/// Tests identifiers must start with a letter or underscore.
#[test]
fn errors_on_numeric_identifier() -> TestResult {
    let Err(err) = Condition::parse("1abc == 2") else {
        return fail("expected identifier error");
    };
    ensure(
        matches!(err, GrammarError::UnexpectedToken { position: 0, .. }),
        format!("unexpected diagnostic {err}"),
    )?;
    Ok(())
}

/// Tests a lone `=` or `!` is not an operator.
#[test]
fn errors_on_single_equals() -> TestResult {
    for raw in ["p1 = 2", "p1 ! 2"] {
        let Err(err) = Condition::parse(raw) else {
            return fail(format!("expected operator error for `{raw}`"));
        };
        ensure(
            matches!(err, GrammarError::UnexpectedToken { position: 3, .. }),
            format!("unexpected diagnostic {err}"),
        )?;
    }
    Ok(())
}

/// Tests unbalanced parentheses are rejected.
#[test]
fn errors_on_unbalanced_parentheses() -> TestResult {
    ensure(Condition::parse("(p1 == 1").is_err(), "missing `)` must fail")?;
    let Err(err) = Condition::parse("p1 == 1)") else {
        return fail("expected trailing input error");
    };
    ensure(matches!(err, GrammarError::TrailingInput { position: 7 }), "trailing `)`")?;
    Ok(())
}

/// Tests dangling combinators are rejected.
#[test]
fn errors_on_dangling_combinator() -> TestResult {
    ensure(Condition::parse("p1 == 1 and").is_err(), "dangling `and` must fail")?;
    ensure(Condition::parse("or p1 == 1").is_err(), "leading `or` must fail")?;
    Ok(())
}

/// Tests unterminated quoted and array literals are rejected.
#[test]
fn errors_on_unterminated_literals() -> TestResult {
    let Err(err) = Condition::parse("p1 == \"open") else {
        return fail("expected unterminated quote");
    };
    ensure(
        matches!(err, GrammarError::UnterminatedLiteral { position: 6 }),
        format!("unexpected diagnostic {err}"),
    )?;
    let Err(err) = Condition::parse("p1 == [1, [2]") else {
        return fail("expected unterminated array");
    };
    ensure(
        matches!(err, GrammarError::UnterminatedLiteral { position: 6 }),
        format!("unexpected diagnostic {err}"),
    )?;
    Ok(())
}

/// Tests the input size limit is enforced before lexing.
#[test]
fn errors_on_oversized_input() -> TestResult {
    let Err(err) = Condition::parse_with_limit("p1 == 12345", 4) else {
        return fail("expected size limit error");
    };
    ensure(
        matches!(err, GrammarError::InputTooLarge { max_bytes: 4, actual_bytes: 11 }),
        format!("unexpected diagnostic {err}"),
    )?;
    Ok(())
}

/// Tests the nesting limit is enforced.
#[test]
fn errors_on_deep_nesting() -> TestResult {
    let depth = MAX_CONDITION_NESTING + 1;
    let raw = format!("{}p1 == 1{}", "(".repeat(depth), ")".repeat(depth));
    let Err(err) = Condition::parse(&raw) else {
        return fail("expected nesting error");
    };
    ensure(matches!(err, GrammarError::NestingTooDeep { .. }), "expected nesting diagnostic")?;

    let ok = format!(
        "{}p1 == 1{}",
        "(".repeat(MAX_CONDITION_NESTING),
        ")".repeat(MAX_CONDITION_NESTING)
    );
    ensure(Condition::parse(&ok).is_ok(), "nesting at the limit must parse")?;
    Ok(())
}
