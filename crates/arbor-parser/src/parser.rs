//! Parser driver.
//!
//! Owns the token stream and the live position. Entry points run a grammar
//! rule from the live position, advance by exactly the tokens the rule
//! consumed, and turn a no-match into a hard error. A failed entry point
//! leaves the position where it was.

use arbor_lexer::{Scanner, Span, Token, TokenKind};
use tracing::{debug, trace};

use crate::ast::{Expression, Pattern, TypeAnnotation};
use crate::cursor::TokenCursor;
use crate::grammar::{Grammar, PostfixRule};
use crate::outcome::{ParseOutcome, RuleResult};
use crate::postfix::DefaultPostfix;
use crate::{ParseError, Production};

/// Arbor parser.
///
/// Generic over the postfix layer; [`Parser::new`] uses [`DefaultPostfix`].
pub struct Parser<P = DefaultPostfix> {
    tokens: Vec<Token>,
    pos: usize,
    grammar: Grammar<P>,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_postfix(tokens, DefaultPostfix)
    }

    /// Parse source text that must contain exactly one expression.
    pub fn parse_expression_source(source: &str) -> Result<Expression, ParseError> {
        Self::parse_source(source, Parser::parse_expression)
    }

    /// Parse source text that must contain exactly one expression list.
    pub fn parse_expression_list_source(source: &str) -> Result<Vec<Expression>, ParseError> {
        Self::parse_source(source, Parser::parse_expression_list)
    }

    /// Parse source text that must contain exactly one pattern.
    pub fn parse_pattern_source(source: &str) -> Result<Pattern, ParseError> {
        Self::parse_source(source, Parser::parse_pattern)
    }

    /// Tokenize, then run `entry` between leading and trailing trivia and
    /// require the end of input.
    fn parse_source<T>(
        source: &str,
        entry: impl FnOnce(&mut Parser) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let tokens = Scanner::tokenize(source)?;
        let mut parser = Parser::new(tokens);
        parser.skip_trivia();
        let node = entry(&mut parser)?;
        parser.skip_trivia();
        parser.expect_end()?;
        Ok(node)
    }
}

impl<P: PostfixRule> Parser<P> {
    /// Create a parser with a custom postfix layer.
    ///
    /// An `Eof` token is appended if the stream does not already end with one.
    pub fn with_postfix(mut tokens: Vec<Token>, postfix: P) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let span = tokens.last().map_or(Span::new(0, 0, 1, 1), |last| {
                let (line, column) = last.end_location();
                Span::new(last.span.end, last.span.end, line, column)
            });
            tokens.push(Token::new(TokenKind::Eof, span));
        }

        Self {
            tokens,
            pos: 0,
            grammar: Grammar::new(postfix),
        }
    }

    /// Index of the live position in the token stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The token at the live position.
    pub fn peek(&self) -> Option<&Token> {
        self.cursor().current()
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor().head().is_none()
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.commit(Production::Expression, |grammar, cursor| {
            grammar.expression(cursor)
        })
    }

    pub fn parse_expression_list(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.commit(Production::Expression, |grammar, cursor| {
            grammar.expression_list(cursor)
        })
    }

    pub fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        self.commit(Production::Pattern, |grammar, cursor| grammar.pattern(cursor))
    }

    pub fn parse_type_annotation(&mut self) -> Result<TypeAnnotation, ParseError> {
        self.commit(Production::TypeAnnotation, |grammar, cursor| {
            grammar.type_annotation(cursor)
        })
    }

    /// Skip whitespace and comments at the live position.
    pub fn skip_trivia(&mut self) {
        let start = self.cursor();
        let consumed = start.skip_whitespace().consumed_since(start);
        self.advance(consumed);
    }

    /// Fail unless the live position is at the end of input.
    pub fn expect_end(&self) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.raise(Production::EndOfInput))
        }
    }

    // =========================================================================
    // Live cursor
    // =========================================================================

    fn cursor(&self) -> TokenCursor<'_> {
        TokenCursor::at(&self.tokens, self.pos)
    }

    /// Run `rule` at the live position and commit to its outcome.
    fn commit<T>(
        &mut self,
        production: Production,
        rule: impl FnOnce(&Grammar<P>, TokenCursor<'_>) -> RuleResult<T>,
    ) -> Result<T, ParseError> {
        match rule(&self.grammar, self.cursor()) {
            Ok(ParseOutcome::Matched { value, consumed }) => {
                self.advance(consumed);
                Ok(value)
            }
            Ok(ParseOutcome::NoMatch) => Err(self.raise(production)),
            Err(err) => {
                debug!(line = err.line, column = err.column, %err, "parse failed");
                Err(err)
            }
        }
    }

    fn raise(&self, production: Production) -> ParseError {
        let err = ParseError::expected(production, self.cursor());
        debug!(line = err.line, column = err.column, %err, "parse failed");
        err
    }

    fn advance(&mut self, consumed: usize) {
        if consumed == 0 {
            return;
        }
        trace!(pos = self.pos, consumed, "advance");
        self.pos = (self.pos + consumed).min(self.tokens.len() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Identifier, IdentifierPattern, InOutExpression, PostfixExpression,
        PrefixOperatorExpression, Type,
    };
    use pretty_assertions::assert_eq;

    fn parser(source: &str) -> Parser {
        Parser::new(Scanner::tokenize(source).unwrap())
    }

    fn expr(source: &str) -> Expression {
        Parser::parse_expression_source(source).unwrap()
    }

    fn ident(name: &str) -> Expression {
        Expression::Postfix(PostfixExpression::Identifier(Identifier::new(name)))
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    #[test]
    fn test_in_out_advances_by_two() {
        let mut p = parser("&x");
        let e = p.parse_expression().unwrap();
        assert_eq!(
            e,
            Expression::InOut(InOutExpression {
                identifier: Identifier::new("x")
            })
        );
        assert_eq!(p.position(), 2);
        assert!(p.is_at_end());
    }

    #[test]
    fn test_ampersand_then_literal_raises_expression_expected() {
        let mut p = parser("& 5");
        let err = p.parse_expression().unwrap_err();
        assert_eq!(err.expected, Some(Production::Expression));
        assert_eq!(err.message, "expected expression, found `&`");
        assert_eq!((err.line, err.column), (1, 1));
        assert_eq!(p.position(), 0);
    }

    #[test]
    fn test_prefix_operator_advances_by_sum() {
        let mut p = parser("-x");
        let e = p.parse_expression().unwrap();
        assert_eq!(
            e,
            Expression::PrefixOperator(PrefixOperatorExpression {
                operator: "-".into(),
                operand: PostfixExpression::Identifier(Identifier::new("x")),
            })
        );
        assert_eq!(p.position(), 2);
    }

    #[test]
    fn test_expression_list_entry_point() {
        let mut p = parser("a, b, c");
        let list = p.parse_expression_list().unwrap();
        assert_eq!(list, vec![ident("a"), ident("b"), ident("c")]);
        assert!(p.is_at_end());
    }

    #[test]
    fn test_trailing_comma_is_hard_error_and_position_unchanged() {
        let mut p = parser("a,");
        let err = p.parse_expression_list().unwrap_err();
        assert_eq!(err.expected, Some(Production::Expression));
        assert_eq!(err.column, 3);
        assert_eq!(p.position(), 0);
    }

    #[test]
    fn test_consecutive_entry_points_share_live_position() {
        let mut p = parser("x: Int = -y");
        let pattern = p.parse_pattern().unwrap();
        assert_eq!(pattern.to_string(), "x: Int");
        assert_eq!(p.position(), 4);

        // The driver decides where trivia may be skipped between rules.
        p.skip_trivia();
        assert!(matches!(
            p.peek().map(|t| &t.kind),
            Some(TokenKind::Punctuator(arbor_lexer::Punctuator::Equal))
        ));
    }

    #[test]
    fn test_type_annotation_entry_point() {
        let mut p = parser(": inout Int");
        let annotation = p.parse_type_annotation().unwrap();
        assert_eq!(
            annotation,
            TypeAnnotation {
                ty: Type::Named(Identifier::new("Int")),
                inout: true,
            }
        );
        assert!(p.is_at_end());

        let err = parser("Int").parse_type_annotation().unwrap_err();
        assert_eq!(err.expected, Some(Production::TypeAnnotation));
    }

    #[test]
    fn test_pattern_entry_point_error() {
        let err = parser("5").parse_pattern().unwrap_err();
        assert_eq!(err.message, "expected pattern, found `5`");
    }

    #[test]
    fn test_missing_eof_is_appended() {
        let mut tokens = Scanner::tokenize("x").unwrap();
        tokens.pop();
        let mut p = Parser::new(tokens);
        assert_eq!(p.parse_expression().unwrap(), ident("x"));
        assert!(p.is_at_end());
        assert!(p.expect_end().is_ok());
    }

    #[test]
    fn test_appended_eof_column_counts_characters() {
        let mut tokens = Scanner::tokenize("f(\"\u{e9}t\u{e9}\"").unwrap();
        tokens.pop();
        let err = Parser::new(tokens).parse_expression().unwrap_err();
        assert_eq!(err.expected, Some(Production::ClosingParen));
        assert_eq!(err.message, "expected `)`, found end of input");
        assert_eq!((err.line, err.column), (1, 8));
    }

    #[test]
    fn test_empty_token_stream() {
        let mut p = Parser::new(Vec::new());
        let err = p.parse_expression().unwrap_err();
        assert_eq!(err.message, "expected expression, found end of input");
    }

    // =========================================================================
    // Source helpers
    // =========================================================================

    #[test]
    fn test_source_helper_skips_surrounding_trivia() {
        assert_eq!(expr("  // lead\n  value  "), ident("value"));
    }

    #[test]
    fn test_source_helper_requires_end() {
        let err = Parser::parse_expression_source("a b").unwrap_err();
        assert_eq!(err.expected, Some(Production::EndOfInput));
        assert_eq!(err.message, "expected end of input, found `b`");
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_source_helper_reports_lexer_errors() {
        let err = Parser::parse_expression_source("\"open").unwrap_err();
        assert_eq!(err.expected, None);
        assert_eq!(err.message, "Unterminated string");
        assert_eq!(
            err.to_string(),
            "Parse error at line 1, column 1: Unterminated string"
        );
    }

    #[test]
    fn test_separated_prefix_operator_is_rejected() {
        let err = Parser::parse_expression_source("- x").unwrap_err();
        assert_eq!(err.expected, Some(Production::Expression));
        assert_eq!(err.message, "expected expression, found `-`");
    }

    #[test]
    fn test_pattern_source_helper() {
        assert_eq!(
            Parser::parse_pattern_source("name: String").unwrap(),
            Pattern::Identifier(IdentifierPattern {
                identifier: Identifier::new("name"),
                type_annotation: Some(TypeAnnotation {
                    ty: Type::Named(Identifier::new("String")),
                    inout: false,
                }),
            })
        );
    }

    #[test]
    fn test_deeply_nested_parentheses() {
        let depth = 50_000;
        let source = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        let expr = Parser::parse_expression_source(&source).unwrap();
        assert!(matches!(
            expr,
            Expression::Postfix(PostfixExpression::Parenthesized(_))
        ));
    }

    #[test]
    fn test_deeply_nested_calls_and_types() {
        let depth = 20_000;
        let source = format!("{}x{}", "f(".repeat(depth), ")".repeat(depth));
        let expr = Parser::parse_expression_source(&source).unwrap();
        assert!(matches!(
            expr,
            Expression::Postfix(PostfixExpression::FunctionCall { .. })
        ));

        let source = format!("x: {}Int{}", "[".repeat(depth), "]".repeat(depth));
        let pattern = Parser::parse_pattern_source(&source).unwrap();
        let Pattern::Identifier(pattern) = &pattern;
        assert!(matches!(
            pattern.type_annotation.as_ref().map(|a| &a.ty),
            Some(Type::Array(_))
        ));
    }

    #[test]
    fn test_unbalanced_deep_nesting_is_an_error() {
        let depth = 50_000;
        let source = format!("{}x{}", "(".repeat(depth), ")".repeat(depth - 1));
        let err = Parser::parse_expression_source(&source).unwrap_err();
        assert_eq!(err.expected, Some(Production::ClosingParen));
    }

    // =========================================================================
    // Round-trip
    // =========================================================================

    #[test]
    fn test_expression_round_trip() {
        let sources = [
            "x",
            "&x",
            "&`class`",
            "-x",
            "!flag",
            "-42",
            "\"quote \\\" inside\"",
            "3.14",
            "true",
            "nil",
            "(x)",
            "-(&y)",
            "f()",
            "swap(&a, &b)",
            "list.append(1, -x)",
            "value!.count++",
            "make(1)(2).get",
            "((nested))",
        ];
        for source in sources {
            let first = expr(source);
            let rendered = first.to_string();
            let second = expr(&rendered);
            assert_eq!(first, second, "round-trip of {source:?} via {rendered:?}");
        }
    }

    #[test]
    fn test_normalizing_sources_round_trip() {
        // Renderings are canonical rather than byte-exact.
        let first = expr("f(a,b,  /* c */ c)");
        assert_eq!(first.to_string(), "f(a, b, c)");
        assert_eq!(expr(&first.to_string()), first);
    }

    #[test]
    fn test_list_round_trip() {
        let list = Parser::parse_expression_list_source("a,b, -c, &d").unwrap();
        let rendered = crate::ast::render_list(&list);
        assert_eq!(rendered, "a, b, -c, &d");
        assert_eq!(Parser::parse_expression_list_source(&rendered).unwrap(), list);
    }

    #[test]
    fn test_pattern_round_trip() {
        for source in ["x", "x: Int", "x:[Int]??", "get: inout String", "`let`: T"] {
            let first = Parser::parse_pattern_source(source).unwrap();
            let second = Parser::parse_pattern_source(&first.to_string()).unwrap();
            assert_eq!(first, second, "round-trip of {source:?}");
        }
    }
}
