//! Lexer for RDL source.
//!
//! This module implements the tokenizer using the logos library. It converts
//! source text into a stream of tokens with line and column information.
//! Unlike most languages RDL keeps newlines and line comments in the stream:
//! a newline can end a statement, and a comment documents the declaration it
//! precedes or trails.

use crate::token::{Span, Token};
use logos::Logos;
use thiserror::Error;

/// Logos-based token enum for lexing.
///
/// This enum is used internally by logos for efficient tokenization.
/// It's converted to our main Token enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    // Whitespace other than newlines (skip)
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*", |lex| lex.slice()[2..].trim().to_string())]
    LineComment(String),

    #[token("/*", lex_block_comment)]
    BlockComment,

    #[regex(r"#[^\n]*", |lex| lex.slice()[1..].trim().to_string())]
    LegacyComment(String),

    // Identifiers: a letter or underscore, then letters, digits or underscores
    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Int(String),

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    Float(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    Str(String),

    // A quote that runs into the end of the line
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedStr,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("=")]
    Equal,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token("-")]
    Minus,
}

/// Consumes a block comment. Returns false (a lex error) when the comment is
/// never closed, after swallowing the rest of the input.
fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> bool {
    // We've already consumed "/*", now find "*/"
    let remainder = lex.remainder();

    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{char}'")]
    UnexpectedCharacter { char: char, span: Span },

    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("Unterminated block comment")]
    UnterminatedComment { span: Span },

    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String, span: Span },

    #[error("Improperly escaped string: {text}")]
    InvalidEscape { text: String, span: Span },
}

impl LexError {
    /// Get the span of this error
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidNumber { span, .. }
            | LexError::InvalidEscape { span, .. } => span,
        }
    }
}

/// Tokenizer over a single source text.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
    // Running position used to turn byte offsets into line/column pairs.
    cursor: usize,
    line: u32,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
            cursor: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Tokenizes the whole source. The returned stream always ends with
    /// [`Token::Eof`]. Every lexical error is collected before returning.
    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut lexer = LogosToken::lexer(self.source);

        while let Some(result) = lexer.next() {
            let range = lexer.span();
            let span = self.span_at(range.start, range.end);

            match result {
                Ok(logos_token) => match self.convert(logos_token, span) {
                    Ok(Some(token)) => self.tokens.push((token, span)),
                    Ok(None) => {}
                    Err(err) => self.errors.push(err),
                },
                Err(()) => {
                    let slice = &self.source[range.clone()];
                    let err = if slice.starts_with("/*") {
                        LexError::UnterminatedComment { span }
                    } else {
                        LexError::UnexpectedCharacter {
                            char: slice.chars().next().unwrap_or('\0'),
                            span,
                        }
                    };
                    self.errors.push(err);
                }
            }
        }

        let end = self.source.len();
        let eof = self.span_at(end, end);
        self.tokens.push((Token::Eof, eof));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    /// Computes the span for `start..end`, advancing the line counter past it.
    fn span_at(&mut self, start: usize, end: usize) -> Span {
        self.advance_to(start);
        let column = self.source[self.line_start..start].chars().count() as u32 + 1;
        let span = Span::new(start, end, self.line, column);
        self.advance_to(end);
        span
    }

    fn advance_to(&mut self, offset: usize) {
        if offset <= self.cursor {
            return;
        }
        for (i, b) in self.source.as_bytes()[self.cursor..offset].iter().enumerate() {
            if *b == b'\n' {
                self.line += 1;
                self.line_start = self.cursor + i + 1;
            }
        }
        self.cursor = offset;
    }

    /// Converts a logos token; `None` for tokens that never reach the parser.
    fn convert(&self, token: LogosToken, span: Span) -> Result<Option<Token>, LexError> {
        Ok(Some(match token {
            LogosToken::Newline => Token::Newline,
            LogosToken::LineComment(text) => Token::LineComment(text),
            LogosToken::LegacyComment(text) => Token::LegacyComment(text),
            LogosToken::Ident(name) => Token::Ident(name),
            LogosToken::Int(text) => match text.parse::<i64>() {
                Ok(n) => Token::IntLiteral(n),
                Err(_) => return Err(LexError::InvalidNumber { text, span }),
            },
            LogosToken::Float(text) => match text.parse::<f64>() {
                Ok(n) => Token::FloatLiteral(n),
                Err(_) => return Err(LexError::InvalidNumber { text, span }),
            },
            LogosToken::Str(text) => match unquote(&text) {
                Some(s) => Token::StringLiteral(s),
                None => return Err(LexError::InvalidEscape { text, span }),
            },
            LogosToken::UnterminatedStr => return Err(LexError::UnterminatedString { span }),
            LogosToken::LeftBrace => Token::LeftBrace,
            LogosToken::RightBrace => Token::RightBrace,
            LogosToken::LeftParen => Token::LeftParen,
            LogosToken::RightParen => Token::RightParen,
            LogosToken::LeftBracket => Token::LeftBracket,
            LogosToken::RightBracket => Token::RightBracket,
            LogosToken::Less => Token::Less,
            LogosToken::Greater => Token::Greater,
            LogosToken::Comma => Token::Comma,
            LogosToken::Semicolon => Token::Semicolon,
            LogosToken::Equal => Token::Equal,
            LogosToken::Dot => Token::Dot,
            LogosToken::Colon => Token::Colon,
            LogosToken::Minus => Token::Minus,
            LogosToken::Whitespace | LogosToken::BlockComment => return Ok(None),
        }))
    }
}

/// Decodes a double-quoted literal, quotes included.
///
/// Accepts the usual single-character escapes (`\a \b \f \n \r \t \v \\ \"`),
/// octal `\ooo`, and hex `\xHH`, `\uHHHH`, `\UHHHHHHHH`. Returns `None` for
/// anything else.
pub fn unquote(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next()? {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            '\\' => '\\',
            '"' => '"',
            'x' => hex_escape(&mut chars, 2)?,
            'u' => hex_escape(&mut chars, 4)?,
            'U' => hex_escape(&mut chars, 8)?,
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                if value > 255 {
                    return None;
                }
                char::from_u32(value)?
            }
            _ => return None,
        };
        out.push(escaped);
    }
    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}
