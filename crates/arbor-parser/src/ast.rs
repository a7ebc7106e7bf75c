//! Abstract Syntax Tree for Arbor expressions and patterns.
//!
//! Nodes are immutable values with structural equality. Each node's
//! `Display` impl is its canonical text rendering: re-tokenizing and
//! re-parsing a rendering yields a structurally equal node.

use arbor_lexer::Literal;
use std::{fmt, mem};

use crate::stack::ensure_sufficient_stack;

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// An identifier, possibly written with backticks (`` `class` ``).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub backticked: bool,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backticked: false,
        }
    }

    pub fn backticked(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backticked: true,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.backticked {
            write!(f, "`{}`", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// A type as written in a type annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// `Int`, `String`
    Named(Identifier),

    /// `[Element]`
    Array(Box<Type>),

    /// `Wrapped?`
    Optional(Box<Type>),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::Array(element) => write!(f, "[{element}]"),
            Type::Optional(wrapped) => write!(f, "{wrapped}?"),
        }
    }
}

impl Drop for Type {
    fn drop(&mut self) {
        if let Type::Array(inner) | Type::Optional(inner) = self {
            let inner = mem::replace(&mut **inner, Type::Named(Identifier::new("")));
            ensure_sufficient_stack(|| drop(inner));
        }
    }
}

/// `: Type` or `: inout Type`. The colon belongs to the annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub ty: Type,
    pub inout: bool,
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(": ")?;
        if self.inout {
            f.write_str("inout ")?;
        }
        write!(f, "{}", self.ty)
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `name` or `name: Type`
    Identifier(IdentifierPattern),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierPattern {
    pub identifier: Identifier,
    pub type_annotation: Option<TypeAnnotation>,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Identifier(pattern) => write!(f, "{pattern}"),
        }
    }
}

impl fmt::Display for IdentifierPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if let Some(annotation) = &self.type_annotation {
            write!(f, "{annotation}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Expression variants. Exactly one is produced per successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// `&value`
    InOut(InOutExpression),

    /// `-value`, `!flag`
    PrefixOperator(PrefixOperatorExpression),

    Postfix(PostfixExpression),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InOutExpression {
    pub identifier: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixOperatorExpression {
    pub operator: String,
    pub operand: PostfixExpression,
}

/// A primary expression followed by any number of postfix suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostfixExpression {
    /// Identifier reference: `count`
    Identifier(Identifier),

    /// `42`, `"text"`, `true`, `nil`
    Literal(Literal),

    /// `(expr)`
    Parenthesized(Box<Expression>),

    /// `callee(a, b)`
    FunctionCall {
        callee: Box<PostfixExpression>,
        arguments: Vec<Expression>,
    },

    /// `base.member`
    ExplicitMember {
        base: Box<PostfixExpression>,
        member: Identifier,
    },

    /// `value++`, `value!`
    PostfixOperator {
        operand: Box<PostfixExpression>,
        operator: String,
    },
}

impl From<InOutExpression> for Expression {
    fn from(expr: InOutExpression) -> Self {
        Expression::InOut(expr)
    }
}

impl From<PrefixOperatorExpression> for Expression {
    fn from(expr: PrefixOperatorExpression) -> Self {
        Expression::PrefixOperator(expr)
    }
}

impl From<PostfixExpression> for Expression {
    fn from(expr: PostfixExpression) -> Self {
        Expression::Postfix(expr)
    }
}

// Nested nodes are released one level at a time on a grown stack.
impl Drop for PostfixExpression {
    fn drop(&mut self) {
        let leaf = || PostfixExpression::Literal(Literal::Nil);
        match self {
            PostfixExpression::Identifier(_) | PostfixExpression::Literal(_) => {}
            PostfixExpression::Parenthesized(inner) => {
                let inner = mem::replace(&mut **inner, Expression::Postfix(leaf()));
                ensure_sufficient_stack(|| drop(inner));
            }
            PostfixExpression::FunctionCall { callee, arguments } => {
                let callee = mem::replace(&mut **callee, leaf());
                let arguments = mem::take(arguments);
                ensure_sufficient_stack(|| drop((callee, arguments)));
            }
            PostfixExpression::ExplicitMember { base: child, .. }
            | PostfixExpression::PostfixOperator { operand: child, .. } => {
                let child = mem::replace(&mut **child, leaf());
                ensure_sufficient_stack(|| drop(child));
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::InOut(expr) => write!(f, "{expr}"),
            Expression::PrefixOperator(expr) => write!(f, "{expr}"),
            Expression::Postfix(expr) => write!(f, "{expr}"),
        }
    }
}

impl fmt::Display for InOutExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{}", self.identifier)
    }
}

impl fmt::Display for PrefixOperatorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.operand)
    }
}

impl fmt::Display for PostfixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixExpression::Identifier(name) => write!(f, "{name}"),
            PostfixExpression::Literal(literal) => write!(f, "{literal}"),
            PostfixExpression::Parenthesized(inner) => write!(f, "({inner})"),
            PostfixExpression::FunctionCall { callee, arguments } => {
                write!(f, "{callee}(")?;
                write_list(f, arguments)?;
                f.write_str(")")
            }
            PostfixExpression::ExplicitMember { base, member } => write!(f, "{base}.{member}"),
            PostfixExpression::PostfixOperator { operand, operator } => {
                write!(f, "{operand}{operator}")
            }
        }
    }
}

/// Render `items` separated by `, `, the form the list rule reads back.
pub fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Render an expression list, e.g. `a, b, c`.
pub fn render_list(expressions: &[Expression]) -> String {
    struct List<'a>(&'a [Expression]);

    impl fmt::Display for List<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_list(f, self.0)
        }
    }

    List(expressions).to_string()
}
