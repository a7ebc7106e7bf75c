//! Pattern and type-annotation rules.
//!
//! ```text
//! pattern         → identifier type-annotation?
//! type-annotation → `:` `inout`? type
//! type            → identifier | `[` type `]` | type `?`
//! ```

use arbor_lexer::{Keyword, Punctuator};

use crate::ast::{IdentifierPattern, Pattern, Type, TypeAnnotation};
use crate::cursor::TokenCursor;
use crate::grammar::{Grammar, PostfixRule};
use crate::outcome::{ParseOutcome, RuleResult};
use crate::stack::ensure_sufficient_stack;
use crate::{ParseError, Production};

impl<P: PostfixRule> Grammar<P> {
    /// Parse an identifier pattern with an optional type annotation.
    pub fn pattern(&self, cursor: TokenCursor<'_>) -> RuleResult<Pattern> {
        let Some(identifier) = cursor.read_identifier(true) else {
            return Ok(ParseOutcome::no_match());
        };
        let after_name = cursor.advance();

        let (type_annotation, end) = match self.type_annotation(after_name)? {
            ParseOutcome::Matched { value, consumed } => {
                (Some(value), after_name.advance_by(consumed))
            }
            ParseOutcome::NoMatch => (None, after_name),
        };

        let pattern = Pattern::Identifier(IdentifierPattern {
            identifier,
            type_annotation,
        });
        Ok(ParseOutcome::matched(pattern, end.consumed_since(cursor)))
    }

    /// Parse `: Type`. The colon commits to a type.
    pub fn type_annotation(&self, cursor: TokenCursor<'_>) -> RuleResult<TypeAnnotation> {
        if !cursor.is_punctuator(Punctuator::Colon) {
            return Ok(ParseOutcome::no_match());
        }

        let mut type_start = cursor.advance().skip_whitespace();
        let inout = type_start.is_keyword(Keyword::Inout);
        if inout {
            type_start = type_start.advance().skip_whitespace();
        }

        let (ty, consumed) = self
            .ty(type_start)?
            .into_option()
            .ok_or_else(|| ParseError::expected(Production::Type, type_start))?;
        let end = type_start.advance_by(consumed);
        Ok(ParseOutcome::matched(
            TypeAnnotation { ty, inout },
            end.consumed_since(cursor),
        ))
    }

    pub fn ty(&self, cursor: TokenCursor<'_>) -> RuleResult<Type> {
        ensure_sufficient_stack(|| self.ty_inner(cursor))
    }

    fn ty_inner(&self, cursor: TokenCursor<'_>) -> RuleResult<Type> {
        let (mut ty, mut end) = if let Some(name) = cursor.read_identifier(false) {
            (Type::Named(name), cursor.advance())
        } else if cursor.is_punctuator(Punctuator::LeftBracket) {
            let element_start = cursor.advance();
            let (element, consumed) = self
                .ty(element_start)?
                .into_option()
                .ok_or_else(|| ParseError::expected(Production::Type, element_start))?;
            let close = element_start.advance_by(consumed);
            if !close.is_punctuator(Punctuator::RightBracket) {
                return Err(ParseError::expected(Production::ClosingBracket, close));
            }
            (Type::Array(Box::new(element)), close.advance())
        } else {
            return Ok(ParseOutcome::no_match());
        };

        // `T?`, and `T??` which lexes as a single operator.
        loop {
            if end.is_punctuator(Punctuator::Question) {
                ty = Type::Optional(Box::new(ty));
            } else if let Some(marks) = end.operator().filter(|op| op.chars().all(|c| c == '?')) {
                for _ in marks.chars() {
                    ty = Type::Optional(Box::new(ty));
                }
            } else {
                break;
            }
            end = end.advance();
        }

        Ok(ParseOutcome::matched(ty, end.consumed_since(cursor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Identifier;
    use crate::postfix::DefaultPostfix;
    use arbor_lexer::{Scanner, Token};
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<Token> {
        Scanner::tokenize(source).unwrap()
    }

    fn pattern(source: &str) -> RuleResult<Pattern> {
        let toks = tokens(source);
        Grammar::<DefaultPostfix>::default().pattern(TokenCursor::new(&toks))
    }

    fn ty(source: &str) -> (Type, usize) {
        let toks = tokens(source);
        Grammar::<DefaultPostfix>::default()
            .ty(TokenCursor::new(&toks))
            .unwrap()
            .into_option()
            .unwrap()
    }

    fn named(name: &str) -> Type {
        Type::Named(Identifier::new(name))
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    #[test]
    fn test_pattern_without_annotation_renders_identifier() {
        let (pattern, consumed) = pattern("x").unwrap().into_option().unwrap();
        assert_eq!(pattern.to_string(), Identifier::new("x").to_string());
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_pattern_with_annotation() {
        let (pattern, consumed) = pattern("x: Int").unwrap().into_option().unwrap();
        assert_eq!(
            pattern,
            Pattern::Identifier(IdentifierPattern {
                identifier: Identifier::new("x"),
                type_annotation: Some(TypeAnnotation {
                    ty: named("Int"),
                    inout: false,
                }),
            })
        );
        assert_eq!(pattern.to_string(), "x: Int");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_pattern_annotation_without_space() {
        let (pattern, consumed) = pattern("x:Int").unwrap().into_option().unwrap();
        assert_eq!(pattern.to_string(), "x: Int");
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_whitespace_before_colon_ends_pattern() {
        let (pattern, consumed) = pattern("x : Int").unwrap().into_option().unwrap();
        assert_eq!(pattern.to_string(), "x");
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_inout_annotation() {
        let (pattern, consumed) = pattern("value: inout [String]?")
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(pattern.to_string(), "value: inout [String]?");
        // value : ws inout ws [ String ] ?
        assert_eq!(consumed, 9);
    }

    #[test]
    fn test_contextual_keyword_pattern() {
        let (pattern, _) = pattern("willSet").unwrap().into_option().unwrap();
        assert_eq!(pattern.to_string(), "willSet");
    }

    #[test]
    fn test_reserved_word_is_not_a_pattern() {
        assert_eq!(pattern("let").unwrap(), ParseOutcome::NoMatch);
        assert_eq!(pattern("5").unwrap(), ParseOutcome::NoMatch);
    }

    #[test]
    fn test_colon_without_type_is_hard_error() {
        let err = pattern("x:").unwrap_err();
        assert_eq!(err.expected, Some(Production::Type));
        assert_eq!(err.message, "expected type, found end of input");

        let err = pattern("x: 5").unwrap_err();
        assert_eq!(err.expected, Some(Production::Type));
        assert_eq!(err.column, 4);
    }

    // =========================================================================
    // Types
    // =========================================================================

    #[test]
    fn test_named_type() {
        assert_eq!(ty("Int"), (named("Int"), 1));
    }

    #[test]
    fn test_contextual_keyword_is_not_a_type_name() {
        let toks = tokens("get");
        let outcome = Grammar::<DefaultPostfix>::default()
            .ty(TokenCursor::new(&toks))
            .unwrap();
        assert_eq!(outcome, ParseOutcome::NoMatch);
    }

    #[test]
    fn test_array_type() {
        assert_eq!(ty("[Int]"), (Type::Array(Box::new(named("Int"))), 3));
    }

    #[test]
    fn test_unclosed_array_type() {
        let toks = tokens("[Int");
        let err = Grammar::<DefaultPostfix>::default()
            .ty(TokenCursor::new(&toks))
            .unwrap_err();
        assert_eq!(err.expected, Some(Production::ClosingBracket));
    }

    #[test]
    fn test_optional_types() {
        assert_eq!(ty("Int?"), (Type::Optional(Box::new(named("Int"))), 2));

        let (double, consumed) = ty("Int??");
        assert_eq!(double.to_string(), "Int??");
        assert_eq!(
            double,
            Type::Optional(Box::new(Type::Optional(Box::new(named("Int")))))
        );
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_array_of_optionals() {
        let (array, consumed) = ty("[Int?]");
        assert_eq!(array.to_string(), "[Int?]");
        assert_eq!(consumed, 4);
    }
}
