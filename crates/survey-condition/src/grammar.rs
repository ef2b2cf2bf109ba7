// crates/survey-condition/src/grammar.rs
// ============================================================================
// Module: Condition Grammar
// Description: Lexer and recursive-descent parser for display conditions.
// Purpose: Turn author-written condition text into a `ConditionExpr` tree.
// Dependencies: crate::condition
// ============================================================================

//! ## Overview
//!
//! Conditions decide whether a survey item is shown, based on answers to
//! earlier prompts. The parser is deliberately small and bounded: input is
//! untrusted author text, so size and nesting are capped.
//!
//! ### Grammar (informal)
//! - **Comparison**: `prompt_id <op> literal` with `<op>` one of
//!   `==`, `!=`, `<`, `>`, `<=`, `>=`
//! - **Boolean operators**: `and`, `or` (case-insensitive); `and` binds tighter
//! - **Parentheses**: `( ... )` for explicit grouping
//! - **Literals**:
//!   - bare runs: `5`, `-2`, `SKIPPED`, `2012-05-01T08:30:00`
//!   - quoted text: `"a \"quoted\" label"`
//!   - JSON arrays: `[{"score": 3}]`
//!
//! ### Example
//!
//! ```
//! use survey_condition::Condition;
//! use survey_condition::Operator;
//!
//! let condition = Condition::parse("mood == 1 and (sleep > 4 or sleep == SKIPPED)").unwrap();
//! let values = condition.referenced_values();
//! assert_eq!(values["sleep"].len(), 2);
//! assert_eq!(values["mood"][0].operator, Operator::Equals);
//! ```

use std::fmt;

use crate::condition::ConditionExpr;
use crate::condition::Literal;
use crate::condition::LiteralKind;
use crate::condition::Operator;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum condition size in bytes.
pub const DEFAULT_MAX_CONDITION_BYTES: usize = 4096;
/// Maximum supported parenthesis nesting depth.
pub const MAX_CONDITION_NESTING: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that can occur while parsing a condition.
///
/// # Invariants
/// - Every positional variant carries a byte offset into the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// Input was empty or contained only whitespace.
    EmptyInput,
    /// Input exceeded the configured size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Input exceeded the nesting limit.
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Unexpected token encountered during parsing.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token that was actually seen.
        found: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// A quoted or array literal was never closed.
    UnterminatedLiteral {
        /// Byte offset where the literal starts.
        position: usize,
    },
    /// Unexpected trailing input after a complete expression.
    TrailingInput {
        /// Byte offset where unexpected input begins.
        position: usize,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "condition is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => {
                write!(f, "condition exceeds size limit: {actual_bytes} bytes (max {max_bytes})")
            }
            Self::NestingTooDeep {
                max_depth,
                position,
            } => write!(f, "condition nesting exceeds depth {max_depth} at {position}"),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => {
                write!(f, "unexpected token `{found}` at {position}, expected {expected}")
            }
            Self::UnterminatedLiteral {
                position,
            } => write!(f, "unterminated literal starting at {position}"),
            Self::TrailingInput {
                position,
            } => write!(f, "unexpected trailing input at {position}"),
        }
    }
}

impl std::error::Error for GrammarError {}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Parses condition text into an expression tree.
///
/// # Errors
///
/// Returns [`GrammarError`] for oversized, empty, or malformed input.
pub(crate) fn parse_expression(input: &str, max_bytes: usize) -> Result<ConditionExpr, GrammarError> {
    if input.len() > max_bytes {
        return Err(GrammarError::InputTooLarge {
            max_bytes,
            actual_bytes: input.len(),
        });
    }
    let tokens = Lexer::new(input).lex()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expr)
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer token produced from condition input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Bare run: an identifier, number, sentinel, or timestamp.
    Word(&'a str),
    /// Double-quoted literal with escapes resolved.
    Quoted(String),
    /// Bracketed array literal, brackets included.
    Array(&'a str),
    /// Comparison operator.
    Op(Operator),
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// End-of-input marker.
    Eof,
}

/// Token paired with its byte offset.
#[derive(Debug, Clone)]
struct SpannedToken<'a> {
    /// Token value.
    token: Token<'a>,
    /// Byte offset into the input.
    position: usize,
}

/// Lexer for condition text.
struct Lexer<'a> {
    /// Source input being tokenized.
    input: &'a str,
    /// Current byte offset into the input.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Lexes the input into a sequence of tokens.
    fn lex(&mut self) -> Result<Vec<SpannedToken<'a>>, GrammarError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while let Some(&ch) = bytes.get(self.offset) {
            let start = self.offset;
            let token = match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                    continue;
                }
                b'(' => {
                    self.offset += 1;
                    Token::LParen
                }
                b')' => {
                    self.offset += 1;
                    Token::RParen
                }
                b'=' | b'!' | b'<' | b'>' => Token::Op(self.operator(bytes)?),
                b'"' => Token::Quoted(self.quoted(bytes)?),
                b'[' => Token::Array(self.array(bytes)?),
                b']' => {
                    return Err(GrammarError::UnexpectedToken {
                        expected: "literal or operator",
                        found: "]".to_string(),
                        position: start,
                    });
                }
                _ => {
                    self.consume_while(bytes, is_word_byte);
                    Self::keyword_or_word(&self.input[start .. self.offset])
                }
            };
            tokens.push(SpannedToken {
                token,
                position: start,
            });
        }

        if tokens.is_empty() {
            return Err(GrammarError::EmptyInput);
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    /// Lexes a one- or two-character comparison operator.
    fn operator(&mut self, bytes: &[u8]) -> Result<Operator, GrammarError> {
        let start = self.offset;
        let first = bytes[start];
        let followed_by_eq = bytes.get(start + 1) == Some(&b'=');
        let operator = match (first, followed_by_eq) {
            (b'=', true) => Some(Operator::Equals),
            (b'!', true) => Some(Operator::NotEquals),
            (b'<', true) => Some(Operator::LessThanOrEqual),
            (b'>', true) => Some(Operator::GreaterThanOrEqual),
            (b'<', false) => Some(Operator::LessThan),
            (b'>', false) => Some(Operator::GreaterThan),
            _ => None,
        };
        let Some(operator) = operator else {
            return Err(GrammarError::UnexpectedToken {
                expected: "comparison operator",
                found: char::from(first).to_string(),
                position: start,
            });
        };
        self.offset += operator.symbol().len();
        Ok(operator)
    }

    /// Lexes a double-quoted literal, resolving backslash escapes.
    fn quoted(&mut self, bytes: &[u8]) -> Result<String, GrammarError> {
        let start = self.offset;
        let mut text = String::new();
        let mut chars = self.input[start + 1 ..].char_indices();
        while let Some((index, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.offset = start + 1 + index + 1;
                    return Ok(text);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => text.push(escaped),
                    None => break,
                },
                _ => text.push(ch),
            }
        }
        self.offset = bytes.len();
        Err(GrammarError::UnterminatedLiteral {
            position: start,
        })
    }

    /// Lexes a bracket-balanced array literal, skipping quoted strings.
    fn array(&mut self, bytes: &[u8]) -> Result<&'a str, GrammarError> {
        let start = self.offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut cursor = start;
        while let Some(&b) = bytes.get(cursor) {
            cursor += 1;
            if in_string {
                match (escaped, b) {
                    (true, _) => escaped = false,
                    (false, b'\\') => escaped = true,
                    (false, b'"') => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        self.offset = cursor;
                        return Ok(&self.input[start .. cursor]);
                    }
                }
                _ => {}
            }
        }
        Err(GrammarError::UnterminatedLiteral {
            position: start,
        })
    }

    /// Advances while the condition matches the current byte.
    fn consume_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    /// Maps a bare run to a keyword token or word token.
    fn keyword_or_word(slice: &'a str) -> Token<'a> {
        if slice.eq_ignore_ascii_case("and") {
            Token::And
        } else if slice.eq_ignore_ascii_case("or") {
            Token::Or
        } else {
            Token::Word(slice)
        }
    }
}

/// Returns true for bytes that may appear inside a bare run.
const fn is_word_byte(b: u8) -> bool {
    !matches!(
        b,
        b' ' | b'\t'
            | b'\n'
            | b'\r'
            | b'('
            | b')'
            | b'"'
            | b'['
            | b']'
            | b'='
            | b'!'
            | b'<'
            | b'>'
    )
}

/// Returns true when `word` is a legal prompt identifier.
fn is_identifier(word: &str) -> bool {
    let mut bytes = word.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser for conditions.
struct Parser<'input> {
    /// Token stream with source positions.
    tokens: Vec<SpannedToken<'input>>,
    /// Current token index.
    index: usize,
    /// Current parenthesis nesting depth.
    nesting: usize,
}

impl<'input> Parser<'input> {
    /// Creates a parser over the token stream.
    const fn new(tokens: Vec<SpannedToken<'input>>) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
        }
    }

    /// Parses OR expressions.
    fn parse_or(&mut self) -> Result<ConditionExpr, GrammarError> {
        let mut parts = vec![self.parse_and()?];
        while self.matches(&Token::Or) {
            parts.push(self.parse_and()?);
        }
        if parts.len() == 1 {
            Ok(parts.remove(0))
        } else {
            Ok(ConditionExpr::Or {
                children: parts,
            })
        }
    }

    /// Parses AND expressions.
    fn parse_and(&mut self) -> Result<ConditionExpr, GrammarError> {
        let mut parts = vec![self.parse_primary()?];
        while self.matches(&Token::And) {
            parts.push(self.parse_primary()?);
        }
        if parts.len() == 1 {
            Ok(parts.remove(0))
        } else {
            Ok(ConditionExpr::And {
                children: parts,
            })
        }
    }

    /// Parses a comparison or a parenthesized expression.
    fn parse_primary(&mut self) -> Result<ConditionExpr, GrammarError> {
        let position = self.current().position;
        match &self.current().token {
            Token::LParen => {
                self.advance();
                self.with_nesting(position, |parser| {
                    let expr = parser.parse_or()?;
                    parser.expect(&Token::RParen, "`)`")?;
                    Ok(expr)
                })
            }
            Token::Word(word) if is_identifier(word) => {
                let id = (*word).to_string();
                self.advance();
                let operator = self.parse_operator()?;
                let literal = self.parse_literal()?;
                Ok(ConditionExpr::Comparison {
                    id,
                    operator,
                    literal,
                })
            }
            _ => Err(GrammarError::UnexpectedToken {
                expected: "prompt identifier or `(`",
                found: self.describe_current(),
                position,
            }),
        }
    }

    /// Parses the comparison operator after an identifier.
    fn parse_operator(&mut self) -> Result<Operator, GrammarError> {
        if let Token::Op(operator) = self.current().token {
            self.advance();
            Ok(operator)
        } else {
            Err(GrammarError::UnexpectedToken {
                expected: "comparison operator",
                found: self.describe_current(),
                position: self.current().position,
            })
        }
    }

    /// Parses the literal on the right-hand side of a comparison.
    fn parse_literal(&mut self) -> Result<Literal, GrammarError> {
        let literal = match &self.current().token {
            Token::Word(word) => Literal::new(LiteralKind::Bare, *word),
            Token::Quoted(text) => Literal::new(LiteralKind::Quoted, text.clone()),
            Token::Array(text) => Literal::new(LiteralKind::Array, *text),
            _ => {
                return Err(GrammarError::UnexpectedToken {
                    expected: "literal value",
                    found: self.describe_current(),
                    position: self.current().position,
                });
            }
        };
        self.advance();
        Ok(literal)
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, GrammarError>,
    ) -> Result<T, GrammarError> {
        let next_depth = self.nesting + 1;
        if next_depth > MAX_CONDITION_NESTING {
            return Err(GrammarError::NestingTooDeep {
                max_depth: MAX_CONDITION_NESTING,
                position,
            });
        }
        self.nesting = next_depth;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }

    /// Consumes the expected token or returns an error.
    fn expect(&mut self, token: &Token<'_>, expected: &'static str) -> Result<(), GrammarError> {
        if self.matches(token) {
            Ok(())
        } else {
            Err(GrammarError::UnexpectedToken {
                expected,
                found: self.describe_current(),
                position: self.current().position,
            })
        }
    }

    /// Ensures the parser is at end-of-input.
    fn expect_eof(&self) -> Result<(), GrammarError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(GrammarError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes the token if it matches the expected kind.
    fn matches(&mut self, kind: &Token<'_>) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the current token.
    fn current(&self) -> &SpannedToken<'input> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    /// Advances to the next token.
    const fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Formats the current token for diagnostics.
    fn describe_current(&self) -> String {
        match &self.current().token {
            Token::Word(word) => (*word).to_string(),
            Token::Quoted(text) => format!("\"{text}\""),
            Token::Array(text) => (*text).to_string(),
            Token::Op(operator) => operator.symbol().to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}
