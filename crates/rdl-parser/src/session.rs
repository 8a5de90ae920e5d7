//! Parse sessions: options, warning collection, and include bookkeeping.
//!
//! A [`Session`] owns everything that outlives a single file: the options,
//! the set of files already included or used (so each is merged at most
//! once per root parse), and the warnings emitted so far.

use crate::diagnostic::Diagnostic;
use crate::error::{ParseError, ParseResult};
use crate::model::Schema;
use crate::parser::Parser;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use termcolor::{ColorChoice, StandardStream};

/// Options controlling a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Render diagnostics with a window of surrounding source lines.
    pub verbose: bool,
    /// Reject legacy constructs and conflicting redefinitions.
    pub pedantic: bool,
    /// Suppress warnings.
    pub nowarn: bool,
}

/// State shared by a root parser and every child it spawns.
pub(crate) struct SessionState {
    pub(crate) options: ParseOptions,
    included: FxHashSet<PathBuf>,
    /// Files currently being parsed, outermost first.
    open: Vec<PathBuf>,
    warnings: RefCell<Vec<Diagnostic>>,
    stream: Option<ColorChoice>,
}

impl SessionState {
    fn new(options: ParseOptions, stream: Option<ColorChoice>) -> Self {
        Self {
            options,
            included: FxHashSet::default(),
            open: Vec::new(),
            warnings: RefCell::new(Vec::new()),
            stream,
        }
    }

    pub(crate) fn warn(&self, diagnostic: Diagnostic) {
        if self.options.nowarn {
            return;
        }
        tracing::trace!(warning = %diagnostic, "parser warning");
        if let Some(choice) = self.stream {
            let mut stderr = StandardStream::stderr(choice);
            // Warnings are best-effort; a closed stderr must not fail the parse.
            let _ = diagnostic.emit(&mut stderr, self.options.verbose);
        }
        self.warnings.borrow_mut().push(diagnostic);
    }

    pub(crate) fn is_included(&self, key: &Path) -> bool {
        self.included.contains(key)
    }

    pub(crate) fn mark_included(&mut self, key: PathBuf) {
        self.included.insert(key);
    }

    /// Records that `path` is being parsed. Returns false if it already is,
    /// i.e. the include graph has a cycle.
    pub(crate) fn enter(&mut self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| normalize(path));
        if self.open.contains(&key) {
            return false;
        }
        self.open.push(key);
        true
    }

    pub(crate) fn leave(&mut self) {
        self.open.pop();
    }

    fn reset(&mut self) {
        self.included.clear();
        self.open.clear();
    }
}

/// A parse session.
///
/// ```ignore
/// let mut session = Session::new(ParseOptions::default());
/// let schema = session.parse_file("api.rdl")?;
/// for warning in session.warnings() {
///     println!("{}", warning);
/// }
/// ```
pub struct Session {
    state: SessionState,
}

impl Session {
    /// A session that collects warnings without printing them.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            state: SessionState::new(options, None),
        }
    }

    /// A session that also writes each warning to stderr as it happens.
    pub fn stderr(options: ParseOptions, color: ColorChoice) -> Self {
        Self {
            state: SessionState::new(options, Some(color)),
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.state.options
    }

    /// Warnings emitted so far, oldest first.
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.state.warnings.borrow().clone()
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        self.state.warnings.take()
    }

    /// Parses a schema file and everything it includes or uses.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> ParseResult<Schema> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| ParseError::io(path, &err))?;
        self.parse_root(path.to_path_buf(), Arc::from(source))
    }

    /// Parses schema text. `name` is used in diagnostics and as the base for
    /// resolving relative `include` and `use` paths.
    pub fn parse_source(&mut self, name: impl Into<PathBuf>, source: &str) -> ParseResult<Schema> {
        self.parse_root(name.into(), Arc::from(source))
    }

    fn parse_root(&mut self, path: PathBuf, source: Arc<str>) -> ParseResult<Schema> {
        let _span = tracing::debug_span!("parse", file = %path.display()).entered();
        self.state.reset();
        self.state.enter(&path);
        let result = Parser::new(path, source, &mut self.state, None).and_then(Parser::parse);
        self.state.leave();
        result
    }
}

/// Parses an RDL file, printing warnings to stderr.
///
/// `verbose` selects the multi-line diagnostic rendering, `pedantic` rejects
/// legacy constructs and conflicting redefinitions, and `nowarn` silences
/// warnings.
pub fn parse_file(
    path: impl AsRef<Path>,
    verbose: bool,
    pedantic: bool,
    nowarn: bool,
) -> ParseResult<Schema> {
    let options = ParseOptions {
        verbose,
        pedantic,
        nowarn,
    };
    Session::stderr(options, ColorChoice::Auto).parse_file(path)
}

/// Lexically cleans a path: drops `.` components and folds `dir/..`.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b.rdl")), PathBuf::from("a/b.rdl"));
        assert_eq!(normalize(Path::new("a/x/../b.rdl")), PathBuf::from("a/b.rdl"));
        assert_eq!(normalize(Path::new("../b.rdl")), PathBuf::from("../b.rdl"));
        assert_eq!(normalize(Path::new("./b.rdl")), PathBuf::from("b.rdl"));
    }

    #[test]
    fn test_nowarn_drops_warnings() {
        let state = SessionState::new(
            ParseOptions {
                nowarn: true,
                ..Default::default()
            },
            None,
        );
        state.warn(Diagnostic::warning("a.rdl", "ignored"));
        assert!(state.warnings.borrow().is_empty());
    }

    #[test]
    fn test_enter_detects_reentry() {
        let mut state = SessionState::new(ParseOptions::default(), None);
        assert!(state.enter(Path::new("no/such/file.rdl")));
        assert!(!state.enter(Path::new("no/such/./file.rdl")));
        state.leave();
        assert!(state.enter(Path::new("no/such/file.rdl")));
    }
}
