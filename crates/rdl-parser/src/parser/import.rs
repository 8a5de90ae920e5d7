//! `include` and `use`: parsing other schemas into this one.
//!
//! `include "file.rdl"` merges the other file's types and resources as if
//! they were written here. `use "file.rdl"` imports only its types, each
//! renamed with the used schema's name as a prefix (`Other.Bar`). Both are
//! skipped when the same resolved path was already included or used during
//! the current root parse.

use super::Parser;
use crate::builtin;
use crate::error::{ParseErrorKind, ParseResult};
use crate::model::{BaseType, Schema, Type};
use crate::registry::Scope;
use crate::session::normalize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The name `use` recognizes for the built-in RDL meta-schema.
const BUILTIN_SCHEMA: &str = "rdl";

impl<'a> Parser<'a> {
    pub(super) fn parse_include(&mut self) -> ParseResult<()> {
        let file_name = self.string_literal("name of file to include")?;
        self.end_schema_statement();

        let path = normalize(&self.directory().join(&file_name));
        if self.session.is_included(&path) {
            tracing::debug!(path = %path.display(), "already included");
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "including");
        let schema = self.parse_child(&path)?;
        for t in schema.types {
            self.register_type(t)?;
        }
        self.schema.resources.extend(schema.resources);
        self.session.mark_included(path);
        Ok(())
    }

    pub(super) fn parse_use(&mut self) -> ParseResult<()> {
        let target = self.string_literal("name of file to use")?;
        self.end_schema_statement();

        let (key, schema) = if target == BUILTIN_SCHEMA {
            let key = PathBuf::from(BUILTIN_SCHEMA);
            if self.session.is_included(&key) {
                return Ok(());
            }
            tracing::debug!("using built-in rdl schema");
            (key, self.parse_builtin()?)
        } else {
            let path = normalize(&self.directory().join(&target));
            if self.session.is_included(&path) {
                tracing::debug!(path = %path.display(), "already used");
                return Ok(());
            }
            tracing::debug!(path = %path.display(), "using");
            let schema = self.parse_child(&path)?;
            (path, schema)
        };

        let Some(name) = schema.name.as_deref() else {
            return Err(self.semantic_error(format!(
                "used schema '{}' does not declare a name",
                target
            )));
        };
        let prefix = format!("{}.", name);
        for t in schema.types {
            if let Some(t) = prefix_type(t, &prefix) {
                self.register_type(t)?;
            }
        }
        self.session.mark_included(key);
        Ok(())
    }

    /// Parses another file with this parser as its parent scope.
    fn parse_child(&mut self, path: &Path) -> ParseResult<Schema> {
        let source = std::fs::read_to_string(path).map_err(|err| {
            self.error(
                ParseErrorKind::Io,
                format!("cannot read '{}': {}", path.display(), err),
            )
        })?;
        if !self.session.enter(path) {
            return Err(self.semantic_error(format!("circular include of '{}'", path.display())));
        }

        let scope = Scope {
            registry: &self.registry,
            parent: self.parent,
        };
        let result = Parser::new(path.to_path_buf(), Arc::from(source), &mut *self.session, Some(&scope))
            .and_then(Parser::parse);
        self.session.leave();
        result
    }

    /// The built-in schema stands alone: it sees no types of the using file.
    fn parse_builtin(&mut self) -> ParseResult<Schema> {
        Parser::new(
            PathBuf::from(builtin::RDL_SCHEMA_FILE),
            Arc::from(builtin::RDL_SCHEMA),
            &mut *self.session,
            None,
        )
        .and_then(Parser::parse)
    }
}

/// Renames a type and every non-base reference inside it with `prefix`.
/// Base types are never prefixed and yield `None`.
pub(crate) fn prefix_type(mut t: Type, prefix: &str) -> Option<Type> {
    let prefixed = |name: &mut String| {
        if BaseType::from_name(name.as_str()).is_none() {
            name.insert_str(0, prefix);
        }
    };

    match &mut t {
        Type::Base(_) => return None,
        Type::Alias(_) | Type::String(_) | Type::Number(_) | Type::Bytes(_) | Type::Enum(_) => {}
        Type::Array(a) => prefixed(&mut a.items),
        Type::Map(m) => {
            prefixed(&mut m.keys);
            prefixed(&mut m.items);
        }
        Type::Struct(s) => {
            for field in &mut s.fields {
                prefixed(&mut field.field_type);
                if let Some(items) = field.items.as_mut() {
                    prefixed(items);
                }
                if let Some(keys) = field.keys.as_mut() {
                    prefixed(keys);
                }
            }
        }
        Type::Union(u) => {
            for variant in &mut u.variants {
                prefixed(variant);
            }
        }
    }

    let def = t.def_mut()?;
    def.name.insert_str(0, prefix);
    prefixed(&mut def.supertype);
    Some(t)
}
