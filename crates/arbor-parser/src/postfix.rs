//! Default postfix-expression layer.
//!
//! ```text
//! postfix-expression → primary-expression postfix-suffix*
//! primary-expression → identifier | literal | `(` expression `)`
//! postfix-suffix     → `(` expression-list? `)`
//!                    | `.` identifier
//!                    | postfix-operator
//! ```
//!
//! Suffixes must be adjacent to what precedes them. An opening delimiter or a
//! `.` commits: what follows must be there, or the parse fails hard.

use arbor_lexer::{Punctuator, TokenKind};

use crate::ast::{Expression, PostfixExpression};
use crate::cursor::TokenCursor;
use crate::grammar::{Grammar, PostfixRule};
use crate::outcome::{ParseOutcome, RuleResult};
use crate::{ParseError, Production};

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPostfix;

impl PostfixRule for DefaultPostfix {
    fn parse_postfix(
        &self,
        grammar: &Grammar<Self>,
        cursor: TokenCursor<'_>,
    ) -> RuleResult<PostfixExpression> {
        let (mut expr, mut end) = match primary(grammar, cursor)? {
            ParseOutcome::Matched { value, consumed } => (value, cursor.advance_by(consumed)),
            ParseOutcome::NoMatch => return Ok(ParseOutcome::no_match()),
        };

        loop {
            if end.is_punctuator(Punctuator::LeftParen) {
                let (arguments, after) = call_arguments(grammar, end)?;
                expr = PostfixExpression::FunctionCall {
                    callee: Box::new(expr),
                    arguments,
                };
                end = after;
            } else if end.is_punctuator(Punctuator::Dot) {
                let name = end.advance();
                let member = name
                    .read_identifier(true)
                    .ok_or_else(|| ParseError::expected(Production::MemberName, name))?;
                expr = PostfixExpression::ExplicitMember {
                    base: Box::new(expr),
                    member,
                };
                end = name.advance();
            } else if let Some(op) = end.operator().filter(|_| !starts_operand(end.advance())) {
                expr = PostfixExpression::PostfixOperator {
                    operand: Box::new(expr),
                    operator: op.to_string(),
                };
                end = end.advance();
            } else {
                break;
            }
        }

        Ok(ParseOutcome::matched(expr, end.consumed_since(cursor)))
    }
}

fn primary(
    grammar: &Grammar<DefaultPostfix>,
    cursor: TokenCursor<'_>,
) -> RuleResult<PostfixExpression> {
    if let Some(name) = cursor.read_identifier(true) {
        return Ok(ParseOutcome::matched(PostfixExpression::Identifier(name), 1));
    }

    let Some(token) = cursor.head() else {
        return Ok(ParseOutcome::no_match());
    };

    match &token.kind {
        TokenKind::Literal(literal) => Ok(ParseOutcome::matched(
            PostfixExpression::Literal(literal.clone()),
            1,
        )),
        TokenKind::Punctuator(Punctuator::LeftParen) => {
            let inner = cursor.advance();
            let (value, consumed) = grammar
                .expression(inner)?
                .into_option()
                .ok_or_else(|| ParseError::expected(Production::Expression, inner))?;
            let close = inner.advance_by(consumed);
            if !close.is_punctuator(Punctuator::RightParen) {
                return Err(ParseError::expected(Production::ClosingParen, close));
            }
            let end = close.advance();
            Ok(ParseOutcome::matched(
                PostfixExpression::Parenthesized(Box::new(value)),
                end.consumed_since(cursor),
            ))
        }
        _ => Ok(ParseOutcome::no_match()),
    }
}

/// Parse `(args)` starting at the `(`. Returns the arguments and the cursor
/// past the `)`.
fn call_arguments<'t>(
    grammar: &Grammar<DefaultPostfix>,
    open: TokenCursor<'t>,
) -> Result<(Vec<Expression>, TokenCursor<'t>), ParseError> {
    let start = open.advance();
    if start.is_punctuator(Punctuator::RightParen) {
        return Ok((Vec::new(), start.advance()));
    }

    let (arguments, consumed) = grammar
        .expression_list(start)?
        .into_option()
        .ok_or_else(|| ParseError::expected(Production::Expression, start))?;
    let close = start.advance_by(consumed);
    if !close.is_punctuator(Punctuator::RightParen) {
        return Err(ParseError::expected(Production::ClosingParen, close));
    }
    Ok((arguments, close.advance()))
}

/// Whether the head token can begin an operand. An operator followed by one
/// binds to the right, so it is not a postfix operator.
fn starts_operand(cursor: TokenCursor<'_>) -> bool {
    cursor.head().is_some_and(|token| {
        matches!(
            token.kind,
            TokenKind::Identifier { .. }
                | TokenKind::Keyword(_)
                | TokenKind::Literal(_)
                | TokenKind::Punctuator(Punctuator::LeftParen | Punctuator::Ampersand)
        )
    })
}
