//! Expression grammar.
//!
//! ```text
//! expression      → `&` identifier
//!                 | prefix-operator? postfix-expression
//! expression-list → expression (`,` expression)*
//! ```
//!
//! Rules take a [`TokenCursor`] by value and report how many tokens they
//! read. The postfix layer is pluggable through [`PostfixRule`]; binary and
//! ternary combinations are not part of this grammar.

use arbor_lexer::Punctuator;

use crate::ast::{Expression, InOutExpression, PostfixExpression, PrefixOperatorExpression};
use crate::cursor::TokenCursor;
use crate::outcome::{ParseOutcome, RuleResult};
use crate::postfix::DefaultPostfix;
use crate::stack::ensure_sufficient_stack;
use crate::{ParseError, Production};

/// The postfix-expression layer the expression rule delegates to.
///
/// Implementations receive the whole grammar so they can recurse into
/// expressions (parenthesized forms, call arguments). They must honor the
/// [`RuleResult`] contract: `NoMatch` when the production does not apply,
/// and an exact consumed count on a match.
pub trait PostfixRule: Sized {
    fn parse_postfix(
        &self,
        grammar: &Grammar<Self>,
        cursor: TokenCursor<'_>,
    ) -> RuleResult<PostfixExpression>;
}

/// Recursive-descent grammar over a pluggable postfix layer.
#[derive(Debug, Clone, Default)]
pub struct Grammar<P = DefaultPostfix> {
    postfix: P,
}

impl<P: PostfixRule> Grammar<P> {
    pub fn new(postfix: P) -> Self {
        Self { postfix }
    }

    /// Parse one expression at `cursor`.
    ///
    /// Nested parentheses and call arguments recurse back into this rule, so
    /// it grows the stack on demand.
    pub fn expression(&self, cursor: TokenCursor<'_>) -> RuleResult<Expression> {
        ensure_sufficient_stack(|| self.expression_inner(cursor))
    }

    fn expression_inner(&self, cursor: TokenCursor<'_>) -> RuleResult<Expression> {
        // `&name`: the ampersand must be immediately followed by an identifier.
        if cursor.is_punctuator(Punctuator::Ampersand) {
            let after_sigil = cursor.advance();
            let Some(identifier) = after_sigil.read_identifier(true) else {
                return Ok(ParseOutcome::no_match());
            };
            let end = after_sigil.advance().skip_whitespace();
            let expr = InOutExpression { identifier };
            return Ok(ParseOutcome::matched(expr.into(), end.consumed_since(cursor)));
        }

        let (operator, operand_start) = match cursor.operator() {
            Some(op) => (Some(op), cursor.advance()),
            None => (None, cursor),
        };

        let outcome: ParseOutcome<Expression> =
            match (operator, self.postfix_expression(operand_start)?) {
                (_, ParseOutcome::NoMatch) => ParseOutcome::no_match(),
                (Some(op), ParseOutcome::Matched { value, consumed }) => {
                    let expr = PrefixOperatorExpression {
                        operator: op.to_string(),
                        operand: value,
                    };
                    let end = operand_start.advance_by(consumed);
                    ParseOutcome::matched(expr.into(), end.consumed_since(cursor))
                }
                (None, postfix) => ParseOutcome::forward(postfix),
            };
        Ok(outcome)
    }

    /// Parse a comma-separated expression list.
    ///
    /// A comma commits to another member: a comma without a following
    /// expression is a hard error, never a no-match.
    pub fn expression_list(&self, cursor: TokenCursor<'_>) -> RuleResult<Vec<Expression>> {
        let (first, mut end) = match self.expression(cursor)? {
            ParseOutcome::Matched { value, consumed } => (value, cursor.advance_by(consumed)),
            ParseOutcome::NoMatch => return Ok(ParseOutcome::no_match()),
        };

        let mut expressions = vec![first];
        while end.is_punctuator(Punctuator::Comma) {
            let member_start = end.advance().skip_whitespace();
            match self.expression(member_start)? {
                ParseOutcome::Matched { value, consumed } => {
                    expressions.push(value);
                    end = member_start.advance_by(consumed);
                }
                ParseOutcome::NoMatch => {
                    return Err(ParseError::expected(Production::Expression, member_start));
                }
            }
        }

        Ok(ParseOutcome::matched(expressions, end.consumed_since(cursor)))
    }

    /// Delegate to the postfix layer.
    ///
    /// A match that read no tokens is treated as no-match so repetition rules
    /// built on top always make progress.
    pub fn postfix_expression(&self, cursor: TokenCursor<'_>) -> RuleResult<PostfixExpression> {
        let outcome = match self.postfix.parse_postfix(self, cursor)? {
            ParseOutcome::Matched { consumed: 0, .. } => ParseOutcome::no_match(),
            outcome => outcome,
        };
        Ok(outcome)
    }
}
