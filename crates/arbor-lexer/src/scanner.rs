use crate::token::{Keyword, Literal, Punctuator, Span, Token, TokenKind};
use crate::LexerError;

/// Characters that may appear in an operator run.
fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '/' | '=' | '-' | '+' | '!' | '*' | '%' | '<' | '>' | '&' | '|' | '^' | '~' | '?'
    )
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Arbor source scanner.
///
/// Tokenizes source text into a flat stream of tokens. Whitespace and comments
/// are emitted as trivia tokens rather than dropped, because adjacency is
/// significant to the grammar (`&x` versus `& x`).
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    /// Char index into `chars`.
    pos: usize,
    /// Byte offset into `source`, kept in step with `pos`.
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens ending with `Eof`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }

    fn scan_tokens(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }

        let span = Span::new(self.offset, self.offset, self.line, self.column);
        self.tokens.push(Token::new(TokenKind::Eof, span));
        Ok(())
    }

    /// Scan the next token.
    fn scan_token(&mut self) -> Result<(), LexerError> {
        let ch = self.peek();

        match ch {
            ' ' | '\t' | '\n' | '\r' => {
                self.scan_whitespace();
                Ok(())
            }

            // Comments
            '/' if self.peek_next() == '/' => {
                self.scan_line_comment();
                Ok(())
            }
            '/' if self.peek_next() == '*' => self.scan_block_comment(),

            '"' => self.scan_string(),
            '`' => self.scan_backticked_identifier(),
            '0'..='9' => {
                self.scan_number();
                Ok(())
            }

            // Punctuation
            '(' => self.single(Punctuator::LeftParen),
            ')' => self.single(Punctuator::RightParen),
            '[' => self.single(Punctuator::LeftBracket),
            ']' => self.single(Punctuator::RightBracket),
            '{' => self.single(Punctuator::LeftBrace),
            '}' => self.single(Punctuator::RightBrace),
            '.' => self.single(Punctuator::Dot),
            ',' => self.single(Punctuator::Comma),
            ':' => self.single(Punctuator::Colon),
            ';' => self.single(Punctuator::Semicolon),
            '@' => self.single(Punctuator::At),
            '#' => self.single(Punctuator::Hash),

            c if is_operator_char(c) => {
                self.scan_operator();
                Ok(())
            }

            c if is_identifier_start(c) => {
                self.scan_identifier();
                Ok(())
            }

            _ => Err(self.error(format!("Unexpected character: '{ch}'"))),
        }
    }

    // --- Scanners ---

    fn scan_whitespace(&mut self) {
        let start = self.mark();
        while !self.is_at_end() && matches!(self.peek(), ' ' | '\t' | '\n' | '\r') {
            self.advance();
        }
        let text = self.source[start.start..self.offset].to_string();
        self.push(TokenKind::Whitespace(text), start);
    }

    /// Scan a line comment (`// ...`), not including the line break.
    fn scan_line_comment(&mut self) {
        let start = self.mark();
        while !self.is_at_end() && self.peek() != '\n' && self.peek() != '\r' {
            self.advance();
        }
        let text = self.source[start.start..self.offset].to_string();
        self.push(TokenKind::Comment(text), start);
    }

    /// Scan a block comment (`/* ... */`). Block comments nest.
    fn scan_block_comment(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance();
        self.advance();

        let mut depth = 1;
        while depth > 0 {
            if self.is_at_end() {
                return Err(LexerError {
                    message: "Unterminated block comment".into(),
                    line: start.line,
                    column: start.column,
                });
            }
            if self.peek() == '/' && self.peek_next() == '*' {
                depth += 1;
                self.advance();
            } else if self.peek() == '*' && self.peek_next() == '/' {
                depth -= 1;
                self.advance();
            }
            self.advance();
        }

        let text = self.source[start.start..self.offset].to_string();
        self.push(TokenKind::Comment(text), start);
        Ok(())
    }

    /// Scan a double-quoted string literal.
    fn scan_string(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance(); // consume opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            match self.peek() {
                '\\' => {
                    self.advance(); // consume backslash
                    if self.is_at_end() {
                        return Err(self.error("Unterminated escape sequence".into()));
                    }
                    match self.peek() {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        c => return Err(self.error(format!("Invalid escape sequence: '\\{c}'"))),
                    }
                    self.advance();
                }
                '\n' | '\r' => break,
                c => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        if self.is_at_end() || self.peek() != '"' {
            return Err(LexerError {
                message: "Unterminated string".into(),
                line: start.line,
                column: start.column,
            });
        }

        self.advance(); // consume closing quote
        self.push(TokenKind::Literal(Literal::String(value)), start);
        Ok(())
    }

    /// Scan an integer or floating literal. Underscores are kept verbatim.
    fn scan_number(&mut self) {
        let start = self.mark();
        self.consume_digits();

        let mut floating = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            floating = true;
            self.advance(); // consume `.`
            self.consume_digits();
        }

        let text = self.source[start.start..self.offset].to_string();
        let literal = if floating {
            Literal::Floating(text)
        } else {
            Literal::Integer(text)
        };
        self.push(TokenKind::Literal(literal), start);
    }

    fn consume_digits(&mut self) {
        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == '_') {
            self.advance();
        }
    }

    /// Scan an identifier, keyword or word literal (`true`, `false`, `nil`).
    fn scan_identifier(&mut self) {
        let start = self.mark();
        while !self.is_at_end() && is_identifier_char(self.peek()) {
            self.advance();
        }

        let word = &self.source[start.start..self.offset];
        let kind = match word {
            "true" => TokenKind::Literal(Literal::Boolean(true)),
            "false" => TokenKind::Literal(Literal::Boolean(false)),
            "nil" => TokenKind::Literal(Literal::Nil),
            _ => match Keyword::lookup(word) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier {
                    name: word.to_string(),
                    backticked: false,
                },
            },
        };
        self.push(kind, start);
    }

    /// Scan `` `name` ``. Any word, reserved or not, becomes an identifier.
    fn scan_backticked_identifier(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance(); // consume opening backtick

        if self.is_at_end() || !is_identifier_start(self.peek()) {
            return Err(self.error("Expected identifier after '`'".into()));
        }
        let name_start = self.offset;
        while !self.is_at_end() && is_identifier_char(self.peek()) {
            self.advance();
        }
        let name = self.source[name_start..self.offset].to_string();

        if self.peek() != '`' {
            return Err(LexerError {
                message: "Unterminated backticked identifier".into(),
                line: start.line,
                column: start.column,
            });
        }
        self.advance(); // consume closing backtick

        self.push(
            TokenKind::Identifier {
                name,
                backticked: true,
            },
            start,
        );
        Ok(())
    }

    /// Scan a maximal operator run. The runs `&`, `=`, `?` and `->` are
    /// punctuators rather than operators.
    fn scan_operator(&mut self) {
        let start = self.mark();
        while !self.is_at_end() && is_operator_char(self.peek()) {
            // A comment opener ends the run.
            if self.offset > start.start
                && self.peek() == '/'
                && matches!(self.peek_next(), '/' | '*')
            {
                break;
            }
            self.advance();
        }

        let text = &self.source[start.start..self.offset];
        let kind = match text {
            "&" => TokenKind::Punctuator(Punctuator::Ampersand),
            "=" => TokenKind::Punctuator(Punctuator::Equal),
            "?" => TokenKind::Punctuator(Punctuator::Question),
            "->" => TokenKind::Punctuator(Punctuator::Arrow),
            _ => TokenKind::Operator(text.to_string()),
        };
        self.push(kind, start);
    }

    // --- Helpers ---

    fn single(&mut self, punctuator: Punctuator) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance();
        self.push(TokenKind::Punctuator(punctuator), start);
        Ok(())
    }

    /// Span start for a token beginning at the current position.
    fn mark(&self) -> Span {
        Span::new(self.offset, self.offset, self.line, self.column)
    }

    fn push(&mut self, kind: TokenKind, start: Span) {
        let span = Span::new(start.start, self.offset, start.line, start.column);
        self.tokens.push(Token::new(kind, span));
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        self.offset += c.len_utf8();
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            // `\r\n` counts as one line break, handled by the `\n`.
            '\r' if self.peek() != '\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: String) -> LexerError {
        LexerError {
            message,
            line: self.line,
            column: self.column,
        }
    }
}
