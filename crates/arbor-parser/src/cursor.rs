//! Value-semantics token cursor.
//!
//! A `TokenCursor` is a `Copy` position over a token slice. Grammar rules take
//! it by value and return new cursors, so a failed speculative attempt leaves
//! the caller's cursor untouched. Trivia is never skipped implicitly; rules
//! call [`TokenCursor::skip_whitespace`] where the grammar allows it.

use crate::ast::Identifier;
use arbor_lexer::{Keyword, Punctuator, Token, TokenKind};

#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenCursor<'t> {
    /// A cursor at the first token.
    pub fn new(tokens: &'t [Token]) -> Self {
        Self::at(tokens, 0)
    }

    pub fn at(tokens: &'t [Token], pos: usize) -> Self {
        Self {
            tokens,
            pos: pos.min(tokens.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The token under the cursor, including `Eof`.
    pub fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    /// The head token, absent at end of input.
    pub fn head(&self) -> Option<&'t Token> {
        self.current()
            .filter(|token| !matches!(token.kind, TokenKind::Eof))
    }

    /// A cursor one token further. Never moves past the end of the slice.
    #[must_use]
    pub fn advance(self) -> Self {
        self.advance_by(1)
    }

    #[must_use]
    pub fn advance_by(self, count: usize) -> Self {
        Self::at(self.tokens, self.pos + count)
    }

    /// Skip whitespace and comment tokens.
    #[must_use]
    pub fn skip_whitespace(self) -> Self {
        let mut cursor = self;
        while cursor.head().is_some_and(Token::is_trivia) {
            cursor = cursor.advance();
        }
        cursor
    }

    /// Line and column just past the last token of the slice; `(1, 1)` when
    /// the slice is empty.
    pub fn end_location(&self) -> (usize, usize) {
        self.tokens.last().map_or((1, 1), Token::end_location)
    }

    /// Number of tokens between `start` and this cursor.
    pub fn consumed_since(&self, start: TokenCursor<'t>) -> usize {
        debug_assert!(start.pos <= self.pos, "cursor moved backwards");
        self.pos - start.pos
    }

    /// Read the head token as an identifier.
    ///
    /// Contextual keywords (`get`, `set`, ...) are accepted when
    /// `include_contextual_keywords` is set; reserved words never are.
    pub fn read_identifier(&self, include_contextual_keywords: bool) -> Option<Identifier> {
        match &self.head()?.kind {
            TokenKind::Identifier { name, backticked } => Some(Identifier {
                name: name.clone(),
                backticked: *backticked,
            }),
            TokenKind::Keyword(keyword)
                if include_contextual_keywords && keyword.is_contextual() =>
            {
                Some(Identifier::new(keyword.as_str()))
            }
            _ => None,
        }
    }

    pub fn is_punctuator(&self, punctuator: Punctuator) -> bool {
        self.head().is_some_and(|token| token.is_punctuator(punctuator))
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.head()
            .is_some_and(|token| token.kind == TokenKind::Keyword(keyword))
    }

    /// The operator text of the head token, if it is a generic operator.
    pub fn operator(&self) -> Option<&'t str> {
        match &self.head()?.kind {
            TokenKind::Operator(op) => Some(op.as_str()),
            _ => None,
        }
    }
}
