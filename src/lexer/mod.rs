//! Lexer for the Lore language.
//!
//! The scanner walks the source byte by byte and produces a flat token
//! sequence terminated by a single [`TokenKind::Eof`] token. Lexical errors
//! are reported on standard error and scanning continues, so the parser
//! always receives a complete sequence.

mod token;

pub use token::*;

pub struct Lexer<'a> {
    source: &'a [u8],
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            tokens: vec![],
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Consumes the lexer and returns the token sequence. The last token is
    /// always `Eof`.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            literal_value: String::new(),
            line: self.line,
        });

        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> u8 {
        let byte = self.source[self.current];
        self.current += 1;
        byte
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            return 0;
        }

        self.source[self.current]
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            return 0;
        }

        self.source[self.current + 1]
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_literal_token(kind, String::new());
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal_value: String) {
        let text = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        self.tokens.push(Token {
            kind,
            text,
            literal_value,
            line: self.line,
        });
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            b'(' => self.add_token(TokenKind::LeftParen),
            b')' => self.add_token(TokenKind::RightParen),
            b'.' => self.add_token(TokenKind::Period),
            b',' => self.add_token(TokenKind::Comma),
            b':' => self.add_token(TokenKind::Colon),
            b'\'' => self.add_token(TokenKind::SingleQuote),
            b' ' | b'\r' | b'\t' => {}
            b'\n' => self.line += 1,
            b'"' => self.read_string(),
            b'/' => {
                if self.peek() == b'/' {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Unknown);
                }
            }
            c if c.is_ascii_alphabetic() => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            c => {
                eprintln!("Line {}: Error: Unexpected character '{}'", self.line, c as char);
                self.add_token(TokenKind::Unknown);
            }
        }
    }

    fn read_identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        let text = &self.source[self.start..self.current];

        if text == b"true" || text == b"false" {
            let literal_value = String::from_utf8_lossy(text).into_owned();
            self.add_literal_token(TokenKind::BoolLiteral, literal_value);
        } else {
            self.add_token(TokenKind::Keyword);
        }
    }

    fn read_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut kind = TokenKind::IntLiteral;

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            kind = TokenKind::FloatLiteral;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let literal_value = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        self.add_literal_token(kind, literal_value);
    }

    fn read_string(&mut self) {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            eprintln!("Line {}: Error: Unterminated string.", self.line);
            return;
        }

        self.advance();

        // The interior is carried byte for byte; Lore has no escape syntax.
        let value =
            String::from_utf8_lossy(&self.source[self.start + 1..self.current - 1]).into_owned();
        self.add_literal_token(TokenKind::StringLiteral, value);
    }
}
