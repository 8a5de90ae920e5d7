//! Resource URL templates: `/users/{id}/items?active&sort={sortField}`.
//!
//! The path part may contain `{name}` or `{name:pattern}` placeholders. The
//! query part is a `&`-separated list of `key={name}` bindings or bare
//! `key` flags. Every placeholder and query key becomes a resource input.

use crate::model::ResourceInput;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathTemplateError {
    #[error("bad path template syntax: {0}")]
    Syntax(String),

    #[error("path parameter name cannot be empty: {0}")]
    EmptyName(String),

    #[error("bad query parameter in path template: {0}")]
    BadQuery(String),
}

/// The result of splitting a URL template.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplate {
    /// Everything before `?`.
    pub path: String,
    /// Path parameters in order of appearance, then query parameters.
    pub inputs: Vec<ResourceInput>,
}

pub fn parse_path_template(template: &str) -> Result<PathTemplate, PathTemplateError> {
    let (path, query) = match template.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (template, None),
    };

    let mut inputs = parse_path_params(path)?;
    if let Some(query) = query {
        inputs.extend(parse_query(query)?);
    }
    Ok(PathTemplate {
        path: path.to_string(),
        inputs,
    })
}

fn parse_path_params(path: &str) -> Result<Vec<ResourceInput>, PathTemplateError> {
    let syntax = || PathTemplateError::Syntax(path.to_string());
    let mut inputs = Vec::new();
    let mut rest = path;

    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(syntax());
        }
        // Braces may nest inside a pattern, e.g. `{id:[0-9]{3}}`.
        let mut depth = 0usize;
        let mut close = None;
        for (i, c) in rest[open..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(syntax)?;
        let placeholder = &rest[open + 1..close];

        let mut input = match placeholder.split_once(':') {
            Some((name, pattern)) => {
                let mut input = ResourceInput::new(name);
                input.pattern = Some(pattern.to_string());
                input
            }
            None => ResourceInput::new(placeholder),
        };
        if input.name.is_empty() {
            return Err(PathTemplateError::EmptyName(path.to_string()));
        }
        input.path_param = true;
        inputs.push(input);
        rest = &rest[close + 1..];
    }
    Ok(inputs)
}

fn parse_query(query: &str) -> Result<Vec<ResourceInput>, PathTemplateError> {
    let mut inputs = Vec::new();
    for item in query.split('&') {
        let bad = || PathTemplateError::BadQuery(item.to_string());
        match item.split_once('=') {
            Some((key, value)) => {
                let name = value
                    .strip_prefix('{')
                    .and_then(|v| v.strip_suffix('}'))
                    .filter(|name| !name.is_empty() && !key.is_empty())
                    .ok_or_else(bad)?;
                let mut input = ResourceInput::new(name);
                input.query_param = Some(key.to_string());
                inputs.push(input);
            }
            None => {
                if item.is_empty() || item.contains(['{', '}']) {
                    return Err(bad());
                }
                let mut input = ResourceInput::new(item);
                input.query_param = Some(item.to_string());
                input.flag = true;
                inputs.push(input);
            }
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_query() {
        let t = parse_path_template("/users/{id}/items?active&sort={sortField}").unwrap();
        assert_eq!(t.path, "/users/{id}/items");
        assert_eq!(t.inputs.len(), 3);

        assert_eq!(t.inputs[0].name, "id");
        assert!(t.inputs[0].path_param);

        assert_eq!(t.inputs[1].name, "active");
        assert_eq!(t.inputs[1].query_param.as_deref(), Some("active"));
        assert!(t.inputs[1].flag);

        assert_eq!(t.inputs[2].name, "sortField");
        assert_eq!(t.inputs[2].query_param.as_deref(), Some("sort"));
        assert!(!t.inputs[2].flag);
    }

    #[test]
    fn test_pattern_with_nested_braces() {
        let t = parse_path_template("/codes/{code:[A-Z]{3}}/x").unwrap();
        assert_eq!(t.inputs[0].name, "code");
        assert_eq!(t.inputs[0].pattern.as_deref(), Some("[A-Z]{3}"));
    }

    #[test]
    fn test_no_params() {
        let t = parse_path_template("/status").unwrap();
        assert_eq!(t.path, "/status");
        assert!(t.inputs.is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_path_template("/a/{id"),
            Err(PathTemplateError::Syntax(_))
        ));
        assert!(matches!(
            parse_path_template("/a/id}"),
            Err(PathTemplateError::Syntax(_))
        ));
        assert!(matches!(
            parse_path_template("/a/{:x}"),
            Err(PathTemplateError::EmptyName(_))
        ));
        assert!(matches!(
            parse_path_template("/a?sort=name"),
            Err(PathTemplateError::BadQuery(_))
        ));
    }
}
