//! Arbor Lexer
//!
//! Tokenizes source text into a stream of tokens for the Arbor parser.
//! Whitespace and comments are kept as trivia tokens; the parser decides
//! where trivia may be skipped.
//!
//! # Example
//!
//! ```
//! use arbor_lexer::{Punctuator, Scanner, TokenKind};
//!
//! let tokens = Scanner::tokenize("&x").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Punctuator(Punctuator::Ampersand));
//! assert_eq!(tokens.len(), 3); // `&`, `x`, EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Keyword, Literal, Punctuator, Span, Token, TokenKind};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
