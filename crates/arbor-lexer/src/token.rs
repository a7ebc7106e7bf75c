use std::fmt;

/// A position in source text, tracking line and column for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token classification.
///
/// Data-carrying variants embed their payload directly. Whitespace and comments
/// are real tokens: grammar rules decide where they may be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A plain or backtick-escaped identifier.
    Identifier { name: String, backticked: bool },

    Keyword(Keyword),
    Literal(Literal),

    /// A custom or built-in operator such as `-`, `++`, `&&`.
    Operator(String),

    Punctuator(Punctuator),

    // Trivia
    Whitespace(String),
    Comment(String),

    // End of input
    Eof,
}

/// Fixed structural tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Equal,
    At,
    Hash,
    Ampersand,
    Arrow,
    Question,
}

impl Punctuator {
    pub fn as_str(self) -> &'static str {
        match self {
            Punctuator::LeftParen => "(",
            Punctuator::RightParen => ")",
            Punctuator::LeftBracket => "[",
            Punctuator::RightBracket => "]",
            Punctuator::LeftBrace => "{",
            Punctuator::RightBrace => "}",
            Punctuator::Dot => ".",
            Punctuator::Comma => ",",
            Punctuator::Colon => ":",
            Punctuator::Semicolon => ";",
            Punctuator::Equal => "=",
            Punctuator::At => "@",
            Punctuator::Hash => "#",
            Punctuator::Ampersand => "&",
            Punctuator::Arrow => "->",
            Punctuator::Question => "?",
        }
    }
}

/// Reserved words.
///
/// Contextual keywords are only reserved in specific grammar positions and
/// may be read as identifiers elsewhere (see [`Keyword::is_contextual`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Reserved
    Let,
    Var,
    Func,
    Inout,
    In,
    Return,
    If,
    Else,
    As,
    Is,
    Class,
    Struct,
    Enum,
    Protocol,
    Import,
    Try,
    Throw,

    // Contextual
    Get,
    Set,
    WillSet,
    DidSet,
    Mutating,
    Nonmutating,
    Lazy,
    Weak,
    Unowned,
    Optional,
    Required,
    Override,
    Final,
    Convenience,
    Dynamic,
    Infix,
    Prefix,
    Postfix,
    Left,
    Right,
    Open,
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        let keyword = match word {
            "let" => Keyword::Let,
            "var" => Keyword::Var,
            "func" => Keyword::Func,
            "inout" => Keyword::Inout,
            "in" => Keyword::In,
            "return" => Keyword::Return,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "as" => Keyword::As,
            "is" => Keyword::Is,
            "class" => Keyword::Class,
            "struct" => Keyword::Struct,
            "enum" => Keyword::Enum,
            "protocol" => Keyword::Protocol,
            "import" => Keyword::Import,
            "try" => Keyword::Try,
            "throw" => Keyword::Throw,
            "get" => Keyword::Get,
            "set" => Keyword::Set,
            "willSet" => Keyword::WillSet,
            "didSet" => Keyword::DidSet,
            "mutating" => Keyword::Mutating,
            "nonmutating" => Keyword::Nonmutating,
            "lazy" => Keyword::Lazy,
            "weak" => Keyword::Weak,
            "unowned" => Keyword::Unowned,
            "optional" => Keyword::Optional,
            "required" => Keyword::Required,
            "override" => Keyword::Override,
            "final" => Keyword::Final,
            "convenience" => Keyword::Convenience,
            "dynamic" => Keyword::Dynamic,
            "infix" => Keyword::Infix,
            "prefix" => Keyword::Prefix,
            "postfix" => Keyword::Postfix,
            "left" => Keyword::Left,
            "right" => Keyword::Right,
            "open" => Keyword::Open,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Let => "let",
            Keyword::Var => "var",
            Keyword::Func => "func",
            Keyword::Inout => "inout",
            Keyword::In => "in",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::As => "as",
            Keyword::Is => "is",
            Keyword::Class => "class",
            Keyword::Struct => "struct",
            Keyword::Enum => "enum",
            Keyword::Protocol => "protocol",
            Keyword::Import => "import",
            Keyword::Try => "try",
            Keyword::Throw => "throw",
            Keyword::Get => "get",
            Keyword::Set => "set",
            Keyword::WillSet => "willSet",
            Keyword::DidSet => "didSet",
            Keyword::Mutating => "mutating",
            Keyword::Nonmutating => "nonmutating",
            Keyword::Lazy => "lazy",
            Keyword::Weak => "weak",
            Keyword::Unowned => "unowned",
            Keyword::Optional => "optional",
            Keyword::Required => "required",
            Keyword::Override => "override",
            Keyword::Final => "final",
            Keyword::Convenience => "convenience",
            Keyword::Dynamic => "dynamic",
            Keyword::Infix => "infix",
            Keyword::Prefix => "prefix",
            Keyword::Postfix => "postfix",
            Keyword::Left => "left",
            Keyword::Right => "right",
            Keyword::Open => "open",
        }
    }

    /// Whether this keyword is only reserved in specific positions.
    pub fn is_contextual(self) -> bool {
        !matches!(
            self,
            Keyword::Let
                | Keyword::Var
                | Keyword::Func
                | Keyword::Inout
                | Keyword::In
                | Keyword::Return
                | Keyword::If
                | Keyword::Else
                | Keyword::As
                | Keyword::Is
                | Keyword::Class
                | Keyword::Struct
                | Keyword::Enum
                | Keyword::Protocol
                | Keyword::Import
                | Keyword::Try
                | Keyword::Throw
        )
    }
}

/// Literal payloads. Numbers keep their source text so renderings are exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Integer(String),
    Floating(String),
    String(String),
    Boolean(bool),
    Nil,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(text) | Literal::Floating(text) => f.write_str(text),
            Literal::String(value) => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Literal::Boolean(value) => write!(f, "{value}"),
            Literal::Nil => f.write_str("nil"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier { name, backticked } => {
                if *backticked {
                    write!(f, "`{name}`")
                } else {
                    f.write_str(name)
                }
            }
            TokenKind::Keyword(keyword) => f.write_str(keyword.as_str()),
            TokenKind::Literal(literal) => write!(f, "{literal}"),
            TokenKind::Operator(op) => f.write_str(op),
            TokenKind::Punctuator(punctuator) => f.write_str(punctuator.as_str()),
            TokenKind::Whitespace(text) | TokenKind::Comment(text) => f.write_str(text),
            TokenKind::Eof => Ok(()),
        }
    }
}

/// A token produced by the Arbor scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whitespace and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace(_) | TokenKind::Comment(_))
    }

    pub fn is_punctuator(&self, punctuator: Punctuator) -> bool {
        self.kind == TokenKind::Punctuator(punctuator)
    }

    /// Line and column just past the token's last character.
    ///
    /// Columns count characters, not bytes. Line breaks follow the scanner:
    /// `\n`, `\r\n` and a lone `\r` each end a line.
    pub fn end_location(&self) -> (usize, usize) {
        let text = self.kind.to_string();
        let mut chars = text.chars().peekable();
        let (mut line, mut column) = (self.span.line, self.span.column);
        while let Some(c) = chars.next() {
            match c {
                '\n' => (line, column) = (line + 1, 1),
                '\r' if chars.peek() != Some(&'\n') => (line, column) = (line + 1, 1),
                _ => column += 1,
            }
        }
        (line, column)
    }

    /// Short description for diagnostics, e.g. `` `5` `` or `end of input`.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Eof => "end of input".into(),
            TokenKind::Whitespace(_) => "whitespace".into(),
            TokenKind::Comment(_) => "comment".into(),
            kind => format!("`{kind}`"),
        }
    }
}
