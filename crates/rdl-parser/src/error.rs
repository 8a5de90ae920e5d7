//! Parse error types.

use crate::diagnostic::Diagnostic;
use std::io;
use std::path::Path;
use termcolor::WriteColor;
use thiserror::Error;

/// What went wrong, broadly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Malformed input: unexpected token, unterminated block, bad literal.
    Syntax,
    /// Well-formed input that makes no sense: unknown type, bad option,
    /// conflicting definitions.
    Semantic,
    /// A legacy construct rejected in pedantic mode.
    Legacy,
    /// A schema or included file could not be read.
    Io,
}

/// The first error of a parse. Parsing stops at it; there is no recovery.
#[derive(Debug, Clone, Error)]
#[error("{diagnostic}")]
pub struct ParseError {
    kind: ParseErrorKind,
    diagnostic: Diagnostic,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, diagnostic: Diagnostic) -> Self {
        Self { kind, diagnostic }
    }

    /// An unreadable file, reported against the file itself.
    pub fn io(path: &Path, err: &io::Error) -> Self {
        Self::new(
            ParseErrorKind::Io,
            Diagnostic::error(path, format!("cannot read '{}': {}", path.display(), err)),
        )
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }

    pub fn message(&self) -> &str {
        self.diagnostic.message()
    }

    pub fn line(&self) -> u32 {
        self.diagnostic.line()
    }

    pub fn file(&self) -> &Path {
        self.diagnostic.file()
    }

    /// Writes the error in plain or verbose form.
    pub fn emit(&self, out: &mut dyn WriteColor, verbose: bool) -> io::Result<()> {
        self.diagnostic.emit(out, verbose)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
