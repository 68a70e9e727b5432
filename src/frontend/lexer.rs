//! Lexer for Papyrus
//!
//! Converts source code into a stream of tokens. Line breaks are tokens since
//! they terminate statements; `\` at the end of a line joins it with the next.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The lexer state
pub struct Lexer {
    /// Original source text
    text: String,
    /// Source code as characters
    source: Vec<char>,
    /// Byte offset of every character, plus the total length
    offsets: Vec<usize>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    line: u32,
    column: u32,
    start_line: u32,
    start_column: u32,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        let mut offsets: Vec<usize> = source.char_indices().map(|(i, _)| i).collect();
        offsets.push(source.len());
        Self {
            text: source.to_string(),
            source: source.chars().collect(),
            offsets,
            pos: 0,
            start: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// The source text being tokenized
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn mark_start(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(
            self.offsets[self.start],
            self.offsets[self.pos.min(self.source.len())],
            self.start_line,
            self.start_column,
        )
    }

    /// Create a token with the current span
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Skip blanks, comments and line continuations. Line breaks are kept.
    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                // Line continuation
                '\\' if self.continues_line() => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                // Block comment
                ';' if self.peek_next() == Some('/') => {
                    self.mark_start();
                    self.advance();
                    self.advance();
                    loop {
                        match (self.peek(), self.peek_next()) {
                            (Some('/'), Some(';')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => {
                                self.advance();
                            }
                            (None, _) => {
                                return Err(Error::UnterminatedComment { span: self.make_span() })
                            }
                        }
                    }
                }
                // Line comment
                ';' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Whether the `\` at the current position is followed only by blanks
    /// up to the end of the line
    fn continues_line(&self) -> bool {
        self.source[self.pos + 1..]
            .iter()
            .find(|c| !matches!(c, ' ' | '\t' | '\r'))
            .map_or(true, |&c| c == '\n')
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();

        // Check if it's a keyword
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident(text));

        self.make_token(kind)
    }

    /// Digits of `radix` from the current position; returns how many were read
    fn read_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(|c| c.is_digit(radix)) {
            self.advance();
            count += 1;
        }
        count
    }

    fn invalid_number(&self) -> Error {
        Error::InvalidNumber {
            text: self.source[self.start..self.pos].iter().collect(),
            span: self.make_span(),
        }
    }

    /// Read a number literal (integer or float)
    fn read_number(&mut self) -> Result<Token> {
        // Check for hex literal
        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x') | Some('X')) {
            self.advance(); // 0
            self.advance(); // x

            if self.read_digits(16) == 0 {
                return Err(self.invalid_number());
            }

            let text: String = self.source[self.start..self.pos].iter().collect();
            return Ok(self.make_token(TokenKind::IntLit(text)));
        }

        let mut is_float = false;

        self.read_digits(10);

        // Check for decimal point
        if self.peek() == Some('.') && self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.advance(); // consume '.'
            self.read_digits(10);

            // Exponent
            if matches!(self.peek(), Some('e') | Some('E')) {
                self.advance();

                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }

                if self.read_digits(10) == 0 {
                    return Err(self.invalid_number());
                }
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();

        if is_float {
            let value = text.parse().map_err(|_| self.invalid_number())?;
            Ok(self.make_token(TokenKind::FloatLit(value)))
        } else {
            Ok(self.make_token(TokenKind::IntLit(text)))
        }
    }

    /// Read a string literal
    fn read_string(&mut self) -> Result<Token> {
        self.advance(); // consume opening quote

        let mut value = String::new();

        loop {
            match self.peek() {
                Some('"') => {
                    self.advance(); // consume closing quote
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some(c) if c != '\n' => {
                            value.push('\\');
                            value.push(c);
                        }
                        _ => return Err(Error::UnterminatedString { span: self.make_span() }),
                    }
                    self.advance();
                }
                Some('\n') | None => {
                    return Err(Error::UnterminatedString { span: self.make_span() });
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Ok(self.make_token(TokenKind::StringLit(value)))
    }

    /// Read a `{ ... }` documentation comment
    fn read_doc_comment(&mut self) -> Result<Token> {
        self.advance(); // consume {

        let mut value = String::new();
        loop {
            match self.advance() {
                Some('}') => break,
                Some(c) => value.push(c),
                None => return Err(Error::UnterminatedComment { span: self.make_span() }),
            }
        }

        Ok(self.make_token(TokenKind::DocComment(value.trim().to_string())))
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace()?;
        self.mark_start();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::eof(self.make_span())),
        };

        // Identifiers and keywords
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.read_identifier());
        }

        // Numbers
        if c.is_ascii_digit() {
            return self.read_number();
        }

        // String literals
        if c == '"' {
            return self.read_string();
        }

        // Documentation comments
        if c == '{' {
            return self.read_doc_comment();
        }

        self.advance();

        // Operators and punctuation
        let kind = match c {
            '\n' => TokenKind::Newline,
            '+' => self.with_eq(TokenKind::Plus, TokenKind::PlusEq),
            '-' => self.with_eq(TokenKind::Minus, TokenKind::MinusEq),
            '*' => self.with_eq(TokenKind::Star, TokenKind::StarEq),
            '/' => self.with_eq(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.with_eq(TokenKind::Percent, TokenKind::PercentEq),
            '=' => self.with_eq(TokenKind::Eq, TokenKind::EqEq),
            '!' => self.with_eq(TokenKind::Not, TokenKind::Ne),
            '<' => self.with_eq(TokenKind::Lt, TokenKind::Le),
            '>' => self.with_eq(TokenKind::Gt, TokenKind::Ge),
            '&' if self.peek() == Some('&') => {
                self.advance();
                TokenKind::AndAnd
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                TokenKind::OrOr
            }
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            _ => TokenKind::Unknown(c),
        };

        Ok(self.make_token(kind))
    }

    /// Pick `compound` if the next character is `=`
    fn with_eq(&mut self, plain: TokenKind, compound: TokenKind) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            compound
        } else {
            plain
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
