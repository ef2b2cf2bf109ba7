// crates/survey-condition/src/condition.rs
// ============================================================================
// Module: Condition Model
// Description: Parsed display-condition expressions and their comparisons.
// Purpose: Expose referenced (operator, literal) pairs and evaluate visibility.
// Dependencies: serde, smallvec
// ============================================================================

//! ## Overview
//! A [`Condition`] keeps the raw author text next to its parsed
//! [`ConditionExpr`] tree. Authoring-time validation only needs the flattened
//! view produced by [`Condition::referenced_values`]; response-time
//! validation evaluates the tree through a [`ConditionResolver`] that knows
//! how to compare one prompt response against one literal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::grammar::DEFAULT_MAX_CONDITION_BYTES;
use crate::grammar::GrammarError;
use crate::grammar::parse_expression;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Comparison operator used inside a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    /// `==`
    #[serde(rename = "==")]
    Equals,
    /// `!=`
    #[serde(rename = "!=")]
    NotEquals,
    /// `<`
    #[serde(rename = "<")]
    LessThan,
    /// `>`
    #[serde(rename = ">")]
    GreaterThan,
    /// `<=`
    #[serde(rename = "<=")]
    LessThanOrEqual,
    /// `>=`
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
}

impl Operator {
    /// All operators in the order the grammar documents them.
    pub const ALL: [Self; 6] = [
        Self::Equals,
        Self::NotEquals,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanOrEqual,
        Self::GreaterThanOrEqual,
    ];

    /// Returns the source symbol for the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    /// Parses an operator from its source symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operator| operator.symbol() == symbol)
    }

    /// Returns true for `==` and `!=`.
    #[must_use]
    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }

    /// Applies the operator to an ordering of `response` relative to `literal`.
    #[must_use]
    pub const fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        match self {
            Self::Equals => ordering.is_eq(),
            Self::NotEquals => ordering.is_ne(),
            Self::LessThan => ordering.is_lt(),
            Self::GreaterThan => ordering.is_gt(),
            Self::LessThanOrEqual => ordering.is_le(),
            Self::GreaterThanOrEqual => ordering.is_ge(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// SECTION: Literals
// ============================================================================

/// Lexical form a literal was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    /// Unquoted run such as `5`, `SKIPPED`, or `2012-01-01T10:00:00`.
    Bare,
    /// Double-quoted text with escapes removed.
    Quoted,
    /// Bracketed JSON array text, brackets included.
    Array,
}

/// Literal value on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form.
    kind: LiteralKind,
    /// Literal text (unescaped for quoted literals).
    text: String,
}

impl Literal {
    /// Creates a literal.
    #[must_use]
    pub fn new(kind: LiteralKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Creates a bare literal.
    #[must_use]
    pub fn bare(text: impl Into<String>) -> Self {
        Self::new(LiteralKind::Bare, text)
    }

    /// Returns the literal text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the lexical form.
    #[must_use]
    pub const fn kind(&self) -> LiteralKind {
        self.kind
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LiteralKind::Bare | LiteralKind::Array => f.write_str(&self.text),
            LiteralKind::Quoted => {
                f.write_str("\"")?;
                for ch in self.text.chars() {
                    if ch == '"' || ch == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                f.write_str("\"")
            }
        }
    }
}

/// One `(operator, literal)` pair attached to a referenced prompt id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionPair {
    /// Comparison operator.
    pub operator: Operator,
    /// Right-hand literal.
    pub literal: Literal,
}

/// Pairs referenced for a single prompt id; most conditions use one or two.
pub type ConditionPairs = SmallVec<[ConditionPair; 2]>;

/// Mapping from referenced prompt id to its comparisons, in source order.
pub type ReferencedValues = BTreeMap<String, ConditionPairs>;

// ============================================================================
// SECTION: Expressions
// ============================================================================

/// Parsed condition expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionExpr {
    /// `id <op> literal`
    Comparison {
        /// Referenced prompt id.
        id: String,
        /// Comparison operator.
        operator: Operator,
        /// Right-hand literal.
        literal: Literal,
    },
    /// All children must hold.
    And {
        /// Conjoined expressions.
        children: Vec<Self>,
    },
    /// At least one child must hold.
    Or {
        /// Disjoined expressions.
        children: Vec<Self>,
    },
}

impl ConditionExpr {
    /// Visits every comparison in source order.
    pub fn for_each_comparison<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a str, Operator, &'a Literal),
    {
        match self {
            Self::Comparison {
                id,
                operator,
                literal,
            } => visit(id, *operator, literal),
            Self::And {
                children,
            }
            | Self::Or {
                children,
            } => {
                for child in children {
                    child.for_each_comparison(visit);
                }
            }
        }
    }

    /// Evaluates the expression, short-circuiting left to right.
    pub fn evaluate<R: ConditionResolver + ?Sized>(&self, resolver: &R) -> bool {
        match self {
            Self::Comparison {
                id,
                operator,
                literal,
            } => resolver.compare(id, *operator, literal),
            Self::And {
                children,
            } => children.iter().all(|child| child.evaluate(resolver)),
            Self::Or {
                children,
            } => children.iter().any(|child| child.evaluate(resolver)),
        }
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Answers a single comparison against the response recorded for `id`.
///
/// Implementations decide how a response of a given prompt type orders
/// against a literal; the expression tree only combines the answers.
pub trait ConditionResolver {
    /// Returns whether the response for `id` satisfies `operator literal`.
    fn compare(&self, id: &str, operator: Operator, literal: &Literal) -> bool;
}

impl<F> ConditionResolver for F
where
    F: Fn(&str, Operator, &Literal) -> bool,
{
    fn compare(&self, id: &str, operator: Operator, literal: &Literal) -> bool {
        (self)(id, operator, literal)
    }
}

// ============================================================================
// SECTION: Condition
// ============================================================================

/// A display condition: raw author text plus its parsed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Author text, trimmed.
    raw: String,
    /// Parsed expression tree.
    expr: ConditionExpr,
}

impl Condition {
    /// Parses a condition using the default input limit.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] when the text is not a well-formed condition.
    pub fn parse(raw: &str) -> Result<Self, GrammarError> {
        Self::parse_with_limit(raw, DEFAULT_MAX_CONDITION_BYTES)
    }

    /// Parses a condition, rejecting input longer than `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] when the text is too large or malformed.
    pub fn parse_with_limit(raw: &str, max_bytes: usize) -> Result<Self, GrammarError> {
        let expr = parse_expression(raw, max_bytes)?;
        Ok(Self {
            raw: raw.trim().to_string(),
            expr,
        })
    }

    /// Returns the trimmed source text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed expression tree.
    #[must_use]
    pub const fn expression(&self) -> &ConditionExpr {
        &self.expr
    }

    /// Groups every comparison by referenced prompt id.
    #[must_use]
    pub fn referenced_values(&self) -> ReferencedValues {
        let mut values = ReferencedValues::new();
        self.expr.for_each_comparison(&mut |id, operator, literal| {
            values.entry(id.to_string()).or_default().push(ConditionPair {
                operator,
                literal: literal.clone(),
            });
        });
        values
    }

    /// Evaluates the condition against recorded responses.
    pub fn evaluate<R: ConditionResolver + ?Sized>(&self, resolver: &R) -> bool {
        self.expr.evaluate(resolver)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parses a condition straight into its referenced-value mapping.
///
/// # Errors
///
/// Returns [`GrammarError`] when the text is not a well-formed condition.
pub fn parse_condition(raw: &str) -> Result<ReferencedValues, GrammarError> {
    Condition::parse(raw).map(|condition| condition.referenced_values())
}
