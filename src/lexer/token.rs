use std::fmt::Display;

/// Classification of a lexeme.
///
/// There are no reserved words: every identifier-shaped word is lexed as
/// `Keyword` and left for the parser to match against the known phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral,
    Period,
    Comma,
    Colon,
    SingleQuote,
    LeftParen,
    RightParen,
    Eof,
    Unknown,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::IntLiteral => "INT_LITERAL",
            TokenKind::FloatLiteral => "FLOAT_LITERAL",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::BoolLiteral => "BOOL_LITERAL",
            TokenKind::Period => "PERIOD",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::SingleQuote => "SINGLE_QUOTE",
            TokenKind::LeftParen => "L_PAREN",
            TokenKind::RightParen => "R_PAREN",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown => "UNKNOWN",
        })
    }
}

/// A single lexeme with its decoded payload and source line.
///
/// `text` is the raw source slice. `literal_value` carries the interpreted
/// payload for literal kinds (the string interior, the digit string, or
/// `"true"`/`"false"`) and stays empty for everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub literal_value: String,
    pub line: usize,
}
