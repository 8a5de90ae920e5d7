//! Recursive-descent parser for RDL.
//!
//! A [`Parser`] handles one source text. `include` and `use` spawn child
//! parsers that share the session and see this parser's registry through a
//! [`Scope`], so types resolve across the whole include tree while each file
//! produces its own [`Schema`].

mod import;
mod options;
mod resource;
mod types;

use crate::diagnostic::Diagnostic;
use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::lexer::{LexError, Lexer};
use crate::model::{BaseType, Schema, Type, TypeName};
use crate::registry::{Entry, Scope, TypeLookup, TypeRegistry};
use crate::session::{ParseOptions, SessionState};
use crate::token::{Span, Token};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) struct Parser<'a> {
    file: PathBuf,
    source: Arc<str>,
    tokens: Vec<(Token, Span)>,
    /// Next unconsumed token.
    pos: usize,
    /// Most recently consumed token; diagnostics point here.
    last: usize,
    session: &'a mut SessionState,
    parent: Option<&'a Scope<'a>>,
    registry: TypeRegistry,
    /// Names of types defined by this file, in definition order.
    order: Vec<TypeName>,
    schema: Schema,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        file: PathBuf,
        source: Arc<str>,
        session: &'a mut SessionState,
        parent: Option<&'a Scope<'a>>,
    ) -> ParseResult<Self> {
        let tokens = match Lexer::new(&source).tokenize() {
            Ok(tokens) => tokens,
            Err(errors) => return Err(lex_error(&file, &source, &errors)),
        };
        Ok(Self {
            file,
            source,
            tokens,
            pos: 0,
            last: 0,
            session,
            parent,
            registry: TypeRegistry::new(),
            order: Vec::new(),
            schema: Schema::default(),
        })
    }

    /// Parses the whole source into a schema.
    pub(crate) fn parse(mut self) -> ParseResult<Schema> {
        let mut comment: Option<String> = None;
        loop {
            match self.next() {
                Token::Eof => break,
                Token::LineComment(text) => comment = merge_comment(comment, Some(text)),
                Token::LegacyComment(text) => {
                    self.accept_legacy("'#' for line comments, use '//' instead", "use '//', not '#'")?;
                    comment = merge_comment(comment, Some(text));
                }
                Token::Semicolon => self.warn("stray ';' character"),
                Token::Ident(word) => match word.as_str() {
                    "namespace" => {
                        self.absorb_schema_comment(comment.take());
                        self.parse_namespace()?;
                    }
                    "name" | "service" => {
                        if word == "service" {
                            self.accept_legacy("'service'", "use 'name', not 'service'")?;
                        }
                        self.absorb_schema_comment(comment.take());
                        self.parse_name()?;
                    }
                    "version" => {
                        self.absorb_schema_comment(comment.take());
                        self.parse_version()?;
                    }
                    "include" => {
                        self.absorb_schema_comment(comment.take());
                        self.parse_include()?;
                    }
                    "use" => {
                        self.absorb_schema_comment(comment.take());
                        self.parse_use()?;
                    }
                    "type" => self.parse_type(comment.take())?,
                    "resource" => {
                        let resource = self.parse_resource(comment.take())?;
                        self.schema.resources.push(resource);
                    }
                    _ => {
                        return Err(
                            self.syntax_error(format!("Unrecognized keyword in schema: '{}'", word))
                        )
                    }
                },
                other => return Err(self.syntax_error(format!("unexpected token '{}'", other))),
            }
        }
        Ok(self.finish())
    }

    fn finish(self) -> Schema {
        let Parser {
            mut registry,
            order,
            mut schema,
            ..
        } = self;
        for name in &order {
            if let Some(Entry::Defined(t)) = registry.remove(name) {
                schema.types.push(t);
            }
        }
        schema
    }

    // ========================================================================
    // Schema header
    // ========================================================================

    fn absorb_schema_comment(&mut self, comment: Option<String>) {
        self.schema.comment = merge_comment(self.schema.comment.take(), comment);
    }

    fn end_schema_statement(&mut self) {
        let comment = self.schema.comment.take();
        self.schema.comment = self.statement_end(comment);
    }

    fn parse_namespace(&mut self) -> ParseResult<()> {
        if self.schema.namespace.is_some() {
            return Err(self.semantic_error("duplicate namespace declaration"));
        }
        // Dotted names are read straight from the source so that segments
        // like `v1.2` are not split into number tokens.
        let start = self.tokens[self.pos].1.start;
        let name: String = self.source[start..]
            .chars()
            .take_while(|&c| c == '.' || c == '_' || c.is_alphanumeric())
            .collect();
        if !name.starts_with(|c: char| c == '_' || c.is_alphanumeric()) {
            self.next();
            return Err(self.expected("dotted name"));
        }
        let end = start + name.len();
        while self.tokens[self.pos].1.start < end && self.tokens[self.pos].0 != Token::Eof {
            self.next();
        }
        self.schema.namespace = Some(name);
        self.end_schema_statement();
        Ok(())
    }

    fn parse_name(&mut self) -> ParseResult<()> {
        if self.schema.name.is_some() {
            return Err(self.semantic_error("duplicate name declaration"));
        }
        let name = self.identifier("name")?;
        self.end_schema_statement();
        self.schema.name = Some(name);
        Ok(())
    }

    fn parse_version(&mut self) -> ParseResult<()> {
        if self.schema.version.is_some() {
            return Err(self.semantic_error("duplicate version declaration"));
        }
        let version = self.int32_literal("integer value")?;
        self.end_schema_statement();
        self.schema.version = Some(version);
        Ok(())
    }

    // ========================================================================
    // Token cursor
    // ========================================================================

    /// Consumes the next token, skipping newlines.
    fn next(&mut self) -> Token {
        let mut i = self.pos;
        while self.tokens[i].0 == Token::Newline {
            i += 1;
        }
        self.last = i;
        self.pos = (i + 1).min(self.tokens.len() - 1);
        self.tokens[i].0.clone()
    }

    /// The next token without skipping newlines.
    fn peek_inline(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// The next token, skipping newlines.
    fn peek(&self) -> &Token {
        self.tokens[self.pos..]
            .iter()
            .map(|(tok, _)| tok)
            .find(|tok| **tok != Token::Newline)
            .unwrap_or(&Token::Eof)
    }

    /// Consumes `tok` if it comes next on the current line.
    fn eat_inline(&mut self, tok: &Token) -> bool {
        if self.peek_inline() == tok {
            self.next();
            true
        } else {
            false
        }
    }

    /// True when a `.` immediately follows the last token, with no space.
    fn at_adjacent_dot(&self) -> bool {
        let (tok, span) = &self.tokens[self.pos];
        *tok == Token::Dot && span.start == self.tokens[self.last].1.end
    }

    fn expect(&mut self, tok: Token) -> ParseResult<()> {
        if self.next() == tok {
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", tok)))
        }
    }

    fn identifier(&mut self, what: &str) -> ParseResult<String> {
        match self.next() {
            Token::Ident(name) => Ok(name),
            _ => Err(self.expected(&format!("'{}'", what))),
        }
    }

    /// An identifier possibly followed by `.Name` segments, as in `Other.Bar`.
    fn type_ref(&mut self, what: &str) -> ParseResult<String> {
        let first = self.identifier(what)?;
        self.compound_name(first)
    }

    /// Extends an identifier that has already been consumed with any directly
    /// attached `.Name` segments.
    fn compound_name(&mut self, mut name: String) -> ParseResult<String> {
        while self.at_adjacent_dot() {
            self.next();
            let segment = self.identifier("identifier")?;
            name.push('.');
            name.push_str(&segment);
        }
        Ok(name)
    }

    fn string_literal(&mut self, what: &str) -> ParseResult<String> {
        match self.next() {
            Token::StringLiteral(s) => Ok(s),
            _ => Err(self.expected(what)),
        }
    }

    fn int32_literal(&mut self, what: &str) -> ParseResult<i32> {
        match self.next() {
            Token::IntLiteral(n) => i32::try_from(n).map_err(|_| self.expected(what)),
            _ => Err(self.expected(what)),
        }
    }

    /// Ends a statement: an optional `;` and an optional trailing `//`
    /// comment on the same line, merged into `comment`.
    fn statement_end(&mut self, comment: Option<String>) -> Option<String> {
        self.eat_inline(&Token::Semicolon);
        self.trailing_comment(comment)
    }

    fn trailing_comment(&mut self, comment: Option<String>) -> Option<String> {
        if let Token::LineComment(text) = self.peek_inline() {
            let text = text.clone();
            self.next();
            return merge_comment(comment, Some(text));
        }
        comment
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn options(&self) -> &ParseOptions {
        &self.session.options
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        let span = self.tokens[self.last].1;
        ParseError::new(
            kind,
            Diagnostic::error(&self.file, message)
                .at(span.line, span.column)
                .with_source(self.source.clone()),
        )
    }

    fn syntax_error(&self, message: impl Into<String>) -> ParseError {
        self.error(ParseErrorKind::Syntax, message)
    }

    fn semantic_error(&self, message: impl Into<String>) -> ParseError {
        self.error(ParseErrorKind::Semantic, message)
    }

    /// "expected X, found 'Y'" about the last consumed token.
    fn expected(&self, what: &str) -> ParseError {
        let found = &self.tokens[self.last].0;
        self.syntax_error(format!("expected {}, found '{}'", what, found))
    }

    fn warn(&self, message: impl Into<String>) {
        let span = self.tokens[self.last].1;
        self.session.warn(
            Diagnostic::warning(&self.file, message)
                .at(span.line, span.column)
                .with_source(self.source.clone()),
        );
    }

    /// Gate for legacy syntax: an error in pedantic mode, otherwise a warning.
    fn accept_legacy(&self, item: &str, advice: &str) -> ParseResult<()> {
        if self.options().pedantic {
            return Err(self.error(
                ParseErrorKind::Legacy,
                format!("legacy feature not supported: {}", item),
            ));
        }
        self.warn(advice);
        Ok(())
    }

    // ========================================================================
    // Type lookup and registration
    // ========================================================================

    /// Resolves a name through this registry, its ancestors, and finally the
    /// legacy lowercase synonyms of the numeric and boolean base types.
    fn find_type(&self, name: &str) -> Option<&Entry> {
        if let Some(entry) = self.lookup(name) {
            return Some(entry);
        }
        if self.options().pedantic {
            return None;
        }
        let base = legacy_synonym(name)?;
        self.warn(format!("Use '{}', not '{}'", base.name(), name));
        self.registry.entry(base.name())
    }

    /// The canonical name for a type reference, if it resolves.
    fn resolve_name(&self, name: &str) -> Option<String> {
        self.find_type(name).map(|e| e.name().to_string())
    }

    fn base_type_by_name(&self, name: &str) -> Option<BaseType> {
        self.find_type(name).and_then(|e| self.base_type_of(e))
    }

    /// Reserves `name` so the body being parsed can refer to it. Returns
    /// false, with a warning, if the name is already taken.
    fn register_placeholder(&mut self, name: &str) -> bool {
        if self.lookup(name).is_some() {
            self.warn(format!("redefinition of {}", name));
            return false;
        }
        tracing::trace!(name, "reserved type name");
        self.registry.add_pending(name);
        self.order.push(name.to_string());
        true
    }

    fn drop_placeholder(&mut self, name: &str) {
        if self.registry.entry(name).is_some_and(Entry::is_pending) {
            self.registry.remove(name);
            self.order.retain(|n| n != name);
            self.warn(format!("type {} has no definition and was dropped", name));
        }
    }

    /// Adds a definition, honoring the redefinition rules: an identical
    /// definition is ignored, a conflicting one is an error in pedantic mode
    /// and otherwise replaces the earlier one and moves to the end of the
    /// definition order.
    fn register_type(&mut self, t: Type) -> ParseResult<()> {
        let name = t.name().to_string();
        match self.lookup(&name) {
            Some(Entry::Defined(prev)) if *prev == t => return Ok(()),
            Some(Entry::Defined(_)) => {
                if self.options().pedantic {
                    return Err(self.semantic_error(format!("conflicting definitions of {}", name)));
                }
                tracing::debug!(name = %name, "replacing earlier definition");
            }
            Some(Entry::Pending(_)) | None => {}
        }
        self.order.retain(|n| *n != name);
        self.registry.add_type(t);
        self.order.push(name);
        Ok(())
    }

    fn directory(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new(""))
    }
}

impl TypeLookup for Parser<'_> {
    fn lookup(&self, name: &str) -> Option<&Entry> {
        self.registry
            .entry(name)
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }
}

/// Older schemas used lowercase Java-style names for some base types.
fn legacy_synonym(name: &str) -> Option<BaseType> {
    match name.to_ascii_lowercase().as_str() {
        "byte" => Some(BaseType::Int8),
        "short" => Some(BaseType::Int16),
        "integer" => Some(BaseType::Int32),
        "long" => Some(BaseType::Int64),
        "float" => Some(BaseType::Float32),
        "double" => Some(BaseType::Float64),
        "boolean" => Some(BaseType::Bool),
        _ => None,
    }
}

/// Joins two comments with a space; empty comments are ignored.
pub(crate) fn merge_comment(first: Option<String>, second: Option<String>) -> Option<String> {
    let second = second.filter(|s| !s.is_empty());
    match (first.filter(|s| !s.is_empty()), second) {
        (Some(a), Some(b)) => Some(format!("{} {}", a, b)),
        (a, b) => a.or(b),
    }
}

fn lex_error(file: &Path, source: &Arc<str>, errors: &[LexError]) -> ParseError {
    let diagnostic = match errors.first() {
        Some(err) => Diagnostic::error(file, err.to_string()).at(err.span().line, err.span().column),
        None => Diagnostic::error(file, "invalid input"),
    };
    ParseError::new(ParseErrorKind::Syntax, diagnostic.with_source(source.clone()))
}
