//! Diagnostic infrastructure for error and warning reporting
//!
//! Every diagnostic carries a file, a line and a message. Two renderings are
//! available: a one-line form, `Error(file.rdl:12): message`, and a verbose
//! form that adds a colored window of the surrounding source lines.

use codespan_reporting::files::{Files, SimpleFile};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use termcolor::{Color, ColorSpec, NoColor, WriteColor};

/// Number of source lines shown on each side of the offending line in
/// verbose output.
const CONTEXT_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        }
    }

    fn color(self) -> Color {
        match self {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        }
    }
}

/// A message tied to a source location
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    file: PathBuf,
    /// 1-based; 0 when the message is not tied to a line.
    line: u32,
    column: u32,
    message: String,
    /// Source text, kept for the verbose rendering.
    source: Option<Arc<str>>,
}

impl Diagnostic {
    pub fn new(severity: Severity, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            severity,
            file: file.into(),
            line: 0,
            column: 0,
            message: message.into(),
            source: None,
        }
    }

    pub fn error(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, file, message)
    }

    pub fn warning(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, file, message)
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_source(mut self, source: Arc<str>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }

    /// Writes the diagnostic. The verbose form needs the source text and
    /// falls back to the one-line form without it.
    pub fn emit(&self, out: &mut dyn WriteColor, verbose: bool) -> io::Result<()> {
        match (&self.source, verbose && self.line > 0) {
            (Some(source), true) => self.emit_verbose(out, source),
            _ => writeln!(out, "{}", self),
        }
    }

    /// Renders to a string without color.
    pub fn render(&self, verbose: bool) -> String {
        let mut out = NoColor::new(Vec::new());
        // Writing to a Vec cannot fail.
        let _ = self.emit(&mut out, verbose);
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }

    fn emit_verbose(&self, out: &mut dyn WriteColor, source: &str) -> io::Result<()> {
        let mut highlight = ColorSpec::new();
        highlight.set_fg(Some(self.severity.color())).set_bold(true);

        out.set_color(&highlight)?;
        write!(
            out,
            "{} ({}, line {}): {}",
            self.severity.label(),
            self.file_name(),
            self.line,
            self.message
        )?;
        out.reset()?;
        writeln!(out)?;

        let file = SimpleFile::new(self.file_name(), source);
        let Ok(last_index) = file.line_index((), source.trim_end_matches('\n').len()) else {
            return Ok(());
        };
        let target = (self.line as usize - 1).min(last_index);
        let first = target.saturating_sub(CONTEXT_LINES);
        let last = (target + CONTEXT_LINES).min(last_index);

        for index in first..=last {
            let Ok(range) = file.line_range((), index) else {
                break;
            };
            let text = source[range].trim_end_matches(['\n', '\r']);
            if index == target {
                out.set_color(&highlight)?;
                write!(out, "{:3}\t{}", index + 1, text)?;
                out.reset()?;
                writeln!(out)?;
            } else {
                writeln!(out, "{:3}\t{}", index + 1, text)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{}({}:{}): {}",
                self.severity.label(),
                self.file_name(),
                self.line,
                self.message
            )
        } else {
            write!(f, "{}({}): {}", self.severity.label(), self.file_name(), self.message)
        }
    }
}
