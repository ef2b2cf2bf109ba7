// crates/survey-condition/src/lib.rs
// ============================================================================
// Module: Survey Condition Root
// Description: Public API surface for survey display conditions.
// Purpose: Wire together the grammar and condition model modules.
// Dependencies: crate::{condition, grammar}
// ============================================================================

//! ## Overview
//! Survey items may carry a display condition that references answers to
//! earlier prompts. This crate parses that condition text, exposes the
//! referenced `(operator, literal)` pairs per prompt id for authoring-time
//! checks, and evaluates the expression at response time through a
//! caller-supplied [`ConditionResolver`].

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod condition;
pub mod grammar;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::Condition;
pub use condition::ConditionExpr;
pub use condition::ConditionPair;
pub use condition::ConditionPairs;
pub use condition::ConditionResolver;
pub use condition::Literal;
pub use condition::LiteralKind;
pub use condition::Operator;
pub use condition::ReferencedValues;
pub use condition::parse_condition;
pub use grammar::DEFAULT_MAX_CONDITION_BYTES;
pub use grammar::GrammarError;
pub use grammar::MAX_CONDITION_NESTING;
