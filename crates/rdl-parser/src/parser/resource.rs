//! `resource` statements.

use super::{merge_comment, Parser};
use crate::error::ParseResult;
use crate::model::{ExceptionDef, HttpMethod, Resource, ResourceAuth, ResourceInput, ResourceOutput};
use crate::path::parse_path_template;
use crate::token::Token;

/// The one exception type that need not be declared; generators supply it.
const IMPLICIT_EXCEPTION_TYPE: &str = "ResourceError";

impl<'a> Parser<'a> {
    /// `resource Type METHOD "template" [(options)] { ... }`, after the
    /// `resource` keyword.
    pub(super) fn parse_resource(&mut self, comment: Option<String>) -> ParseResult<Resource> {
        let resource_type = self.type_ref("resource type")?;
        let Some(resource_type) = self.resolve_name(&resource_type) else {
            return Err(self.semantic_error(format!("Type not found: {}", resource_type)));
        };

        let method_name = self.identifier("HTTP method")?;
        let method: HttpMethod = method_name.parse().map_err(|upper| {
            self.semantic_error(format!("Bad HTTP method in resource: {}", upper))
        })?;

        let template = self.string_literal("URL template")?;
        let template = parse_path_template(&template).map_err(|e| self.syntax_error(e.to_string()))?;

        let mut r = Resource::new(resource_type, method, template.path);
        r.inputs = template.inputs;
        r.comment = comment;

        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| match option.to_lowercase().as_str() {
                "async" => {
                    r.is_async = true;
                    Ok(())
                }
                _ if option.starts_with("x_") => p.extended_option(&mut r.annotations, option),
                _ => Err(p.semantic_error(format!("Unsupported resource option: {}", option))),
            })?;
        }
        self.expect(Token::LeftBrace)?;

        let mut pending: Option<String> = None;
        loop {
            match self.next() {
                Token::RightBrace => break,
                Token::Eof => return Err(self.syntax_error("Unterminated resource definition")),
                Token::Semicolon => {}
                Token::LineComment(text) => pending = merge_comment(pending, Some(text)),
                Token::LegacyComment(text) => {
                    self.accept_legacy("'#' for line comments, use '//' instead", "use '//', not '#'")?;
                    pending = merge_comment(pending, Some(text));
                }
                Token::Ident(word) => {
                    match word.as_str() {
                        "authenticate" => {
                            self.ensure_no_auth(&r)?;
                            r.auth = Some(ResourceAuth {
                                authenticate: true,
                                ..Default::default()
                            });
                            r.comment = self.statement_end(r.comment.take());
                        }
                        "authorize" => self.parse_authorization(&mut r)?,
                        "expected" => self.parse_expected(&mut r)?,
                        "exceptions" => self.parse_exceptions(&mut r)?,
                        "responses" => {
                            return Err(self.semantic_error("resource 'responses' no longer supported"))
                        }
                        "async" => r.is_async = true,
                        _ => {
                            let type_name = self.compound_name(word)?;
                            self.parse_resource_param(&mut r, type_name, pending.take())?;
                        }
                    }
                    pending = None;
                }
                _ => return Err(self.expected("resource parameter or '}'")),
            }
        }

        self.validate_resource(&r)?;
        Ok(r)
    }

    fn validate_resource(&self, r: &Resource) -> ParseResult<()> {
        if let Some(input) = r.inputs.iter().find(|i| i.input_type.is_empty()) {
            return Err(self.semantic_error(format!(
                "Resource input '{}' has no corresponding type declaration",
                input.name
            )));
        }
        if r.method.has_body() {
            match r.inputs.iter().filter(|i| i.is_body()).count() {
                0 => {
                    return Err(self.semantic_error(format!(
                        "{} on a resource with no corresponding input parameter",
                        r.method
                    )))
                }
                1 => {}
                _ => {
                    return Err(self.semantic_error(format!(
                        "{} on a resource with too many corresponding input parameters",
                        r.method
                    )))
                }
            }
        }
        Ok(())
    }

    fn ensure_no_auth(&self, r: &Resource) -> ParseResult<()> {
        if r.auth.is_some() {
            return Err(self.semantic_error(
                "Cannot specify more than one authorization permission per resource",
            ));
        }
        Ok(())
    }

    /// `Type name [(options)]`: declares an input, completes one bound by the
    /// path template, or declares an output header.
    fn parse_resource_param(
        &mut self,
        r: &mut Resource,
        type_name: String,
        comment: Option<String>,
    ) -> ParseResult<()> {
        let Some(type_name) = self.resolve_name(&type_name) else {
            return Err(self.semantic_error(format!("Undefined type: {}", type_name)));
        };

        let name = match self.next() {
            Token::Ident(name) => name,
            Token::Less => {
                return Err(self.semantic_error("parameterized resource parameters are not supported"))
            }
            _ => return Err(self.expected("param name")),
        };

        let existing = r.inputs.iter().position(|i| i.name == name);
        let bound = existing.is_some();
        let mut input = match existing {
            Some(i) => r.inputs[i].clone(),
            None => ResourceInput::new(name.clone()),
        };
        input.comment = comment;
        input.input_type = type_name;

        let mut output = false;
        if self.eat_inline(&Token::LeftParen) {
            output = self.parse_param_options(bound, &mut input)?;
        }
        input.comment = self.statement_end(input.comment.take());

        if output {
            r.outputs.push(ResourceOutput {
                name,
                output_type: input.input_type,
                header: input.header,
                comment: input.comment,
                optional: input.optional,
                annotations: input.annotations,
            });
        } else {
            match existing {
                Some(i) => r.inputs[i] = input,
                None => r.inputs.push(input),
            }
        }
        Ok(())
    }

    /// Returns true when the parameter is marked `out`.
    fn parse_param_options(&mut self, bound: bool, input: &mut ResourceInput) -> ParseResult<bool> {
        let mut optional = false;
        let mut output = false;
        self.option_list(|p, option| {
            match option {
                "default" => input.default = Some(p.default_value(&input.input_type)?),
                "required" => {
                    p.accept_legacy("required", "omit 'required', it is the default")?;
                    optional = false;
                }
                "optional" => optional = true,
                "out" => {
                    if bound {
                        return Err(p.semantic_error("Cannot make a path or queryparam an output"));
                    }
                    output = true;
                }
                "header" => {
                    if bound {
                        return Err(p.semantic_error("Cannot make a path or queryparam a header param"));
                    }
                    p.expect(Token::Equal)?;
                    input.header = Some(p.string_literal("header name")?);
                }
                "context" => {
                    p.warn("Deprecated resource param option: 'context=...'.");
                    p.expect(Token::Equal)?;
                    input.context = Some(p.string_literal("quoted context variable name")?);
                }
                _ if option.starts_with("x_") => p.extended_option(&mut input.annotations, option)?,
                _ => {
                    return Err(p.semantic_error(format!(
                        "Unsupported resource parameter option: {}",
                        option
                    )))
                }
            }
            Ok(())
        })?;
        input.optional = optional;
        Ok(output)
    }

    /// `authorize("action", "resource"[, "domain"])`
    fn parse_authorization(&mut self, r: &mut Resource) -> ParseResult<()> {
        self.ensure_no_auth(r)?;
        self.expect(Token::LeftParen)?;
        let mut auth = ResourceAuth::default();
        loop {
            match self.next() {
                Token::RightParen => break,
                Token::Comma => {}
                Token::StringLiteral(s) => {
                    let slot = [&mut auth.action, &mut auth.resource, &mut auth.domain]
                        .into_iter()
                        .find(|slot| slot.is_none());
                    match slot {
                        Some(slot) => *slot = Some(s),
                        None => {
                            return Err(self.semantic_error("too many options for the authorize statement"))
                        }
                    }
                }
                Token::Eof => return Err(self.syntax_error("Unterminated authorize statement")),
                _ => return Err(self.expected("string literal")),
            }
        }
        r.auth = Some(auth);
        r.comment = self.statement_end(r.comment.take());
        Ok(())
    }

    /// `expected SYM[, SYM...]`
    fn parse_expected(&mut self, r: &mut Resource) -> ParseResult<()> {
        r.expected = self.identifier("symbol")?;
        let mut alternatives = Vec::new();
        while self.eat_inline(&Token::Comma) {
            alternatives.push(self.identifier("symbol")?);
        }
        r.alternatives = alternatives;
        r.comment = self.statement_end(r.comment.take());
        Ok(())
    }

    /// `exceptions { Type SYM; ... }`. Comment lines before an entry
    /// document that entry.
    fn parse_exceptions(&mut self, r: &mut Resource) -> ParseResult<()> {
        self.expect(Token::LeftBrace)?;
        let mut pending: Option<String> = None;
        loop {
            match self.next() {
                Token::RightBrace => break,
                Token::Eof => return Err(self.syntax_error("Unterminated exceptions block")),
                Token::Semicolon => {}
                Token::LineComment(text) => pending = merge_comment(pending, Some(text)),
                Token::Ident(name) => {
                    let name = self.compound_name(name)?;
                    let exception_type = match self.resolve_name(&name) {
                        Some(resolved) => resolved,
                        None if name == IMPLICIT_EXCEPTION_TYPE => name,
                        None => return Err(self.semantic_error(format!("No such type: {}", name))),
                    };
                    let symbol = self.identifier("symbol")?;
                    let comment = self.statement_end(pending.take());
                    r.exceptions.insert(
                        symbol,
                        ExceptionDef {
                            exception_type,
                            comment,
                        },
                    );
                }
                _ => return Err(self.expected("exception type or '}'")),
            }
        }
        Ok(())
    }
}
