//! Arbor Parser
//!
//! Parses a token stream (from `arbor-lexer`) into expression and pattern
//! AST nodes.
//!
//! Grammar rules are pure functions of a [`TokenCursor`] that return a
//! [`RuleResult`]: a match with its exact consumed token count, a silent
//! no-match, or a hard error. Only the [`Parser`] entry points own a live
//! position, and only they turn a no-match into a reported error.
//!
//! # Example
//!
//! ```
//! use arbor_parser::ast::Expression;
//! use arbor_parser::Parser;
//!
//! let expr = Parser::parse_expression_source("swap(&a, &b)").unwrap();
//! assert!(matches!(expr, Expression::Postfix(_)));
//! assert_eq!(expr.to_string(), "swap(&a, &b)");
//! ```
//!
//! Set `RUST_LOG=arbor_parser=trace` (with a subscriber installed) to follow
//! the driver as it advances.

pub mod ast;
pub mod cursor;
pub mod grammar;
pub mod outcome;
pub mod parser;
pub mod pattern;
pub mod postfix;
mod stack;

use std::fmt;

use arbor_lexer::{LexerError, Token};

pub use cursor::TokenCursor;
pub use grammar::{Grammar, PostfixRule};
pub use outcome::{ParseOutcome, RuleResult};
pub use parser::Parser;
pub use postfix::DefaultPostfix;

/// The construct a hard error was expecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Expression,
    Pattern,
    TypeAnnotation,
    Type,
    MemberName,
    ClosingParen,
    ClosingBracket,
    EndOfInput,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Production::Expression => "expression",
            Production::Pattern => "pattern",
            Production::TypeAnnotation => "type annotation",
            Production::Type => "type",
            Production::MemberName => "member name",
            Production::ClosingParen => "`)`",
            Production::ClosingBracket => "`]`",
            Production::EndOfInput => "end of input",
        };
        f.write_str(text)
    }
}

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    /// What the grammar expected, when the error comes from the grammar.
    pub expected: Option<Production>,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// `expected <production>, found <token>` at the cursor's current token.
    pub fn expected(production: Production, cursor: TokenCursor<'_>) -> Self {
        match cursor.current() {
            Some(token) => Self::expected_at(production, token),
            None => {
                let (line, column) = cursor.end_location();
                ParseError {
                    message: format!("expected {production}, found end of input"),
                    expected: Some(production),
                    line,
                    column,
                }
            }
        }
    }

    pub fn expected_at(production: Production, found: &Token) -> Self {
        ParseError {
            message: format!("expected {production}, found {}", found.describe()),
            expected: Some(production),
            line: found.span.line,
            column: found.span.column,
        }
    }
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError {
            message: err.message,
            expected: None,
            line: err.line,
            column: err.column,
        }
    }
}
