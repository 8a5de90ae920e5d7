//! Token definitions for RDL source.
//!
//! RDL has no reserved words: `type`, `resource`, `include` and friends are
//! ordinary identifiers whose meaning depends on where they appear, so the
//! token set is small. Newlines are significant (they terminate statements
//! that have no `;`) and comments are kept because they are attached to the
//! declarations they annotate.

use std::fmt;

/// A token in RDL source.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Ident(String),
    StringLiteral(String),
    IntLiteral(i64),
    FloatLiteral(f64),

    // Comments
    /// `// text`, with the marker removed and the text trimmed.
    LineComment(String),
    /// `# text`, accepted for compatibility with older schemas.
    LegacyComment(String),

    Newline,

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Less,         // <
    Greater,      // >
    Comma,        // ,
    Semicolon,    // ;
    Equal,        // =
    Dot,          // .
    Colon,        // :
    Minus,        // -

    Eof,
}

/// Source location information for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{}", name),
            Token::StringLiteral(s) => write!(f, "{:?}", s),
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::FloatLiteral(n) => write!(f, "{}", n),
            Token::LineComment(text) => write!(f, "// {}", text),
            Token::LegacyComment(text) => write!(f, "# {}", text),
            Token::Newline => write!(f, "end of line"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Equal => write!(f, "="),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Minus => write!(f, "-"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}
