//! Option lists, extended annotations, and literal values.

use super::Parser;
use crate::error::ParseResult;
use crate::model::{Annotations, BaseType, Number, Type, Value};
use crate::registry::TypeLookup;
use crate::token::Token;

impl<'a> Parser<'a> {
    /// Parses `name[=value], ... )` after the opening `(` has been consumed,
    /// calling `on_option` with each option name. The handler consumes any
    /// `=value` itself.
    pub(super) fn option_list<F>(&mut self, mut on_option: F) -> ParseResult<()>
    where
        F: FnMut(&mut Self, &str) -> ParseResult<()>,
    {
        let mut first = true;
        loop {
            let mut tok = self.next();
            if tok == Token::RightParen {
                return Ok(());
            }
            if !first {
                if tok != Token::Comma {
                    return Err(self.expected("',' or ')'"));
                }
                tok = self.next();
            }
            first = false;
            let Token::Ident(name) = tok else {
                return Err(self.expected("option name"));
            };
            on_option(self, &name)?;
        }
    }

    /// Records `x_name` or `x_name="value"`; a bare name stores an empty value.
    pub(super) fn extended_option(&mut self, annotations: &mut Annotations, name: &str) -> ParseResult<()> {
        let value = if self.eat_inline(&Token::Equal) {
            self.string_literal("String literal")?
        } else {
            String::new()
        };
        annotations.insert(name.to_string(), value);
        Ok(())
    }

    /// `=N` for size-like options.
    pub(super) fn int32_option(&mut self) -> ParseResult<i32> {
        self.expect(Token::Equal)?;
        self.int32_literal("int32 literal")
    }

    /// An optionally negated integer or float.
    pub(super) fn numeric_literal(&mut self, what: &str) -> ParseResult<Number> {
        match self.next() {
            Token::IntLiteral(n) => Ok(Number::Int64(n)),
            Token::FloatLiteral(n) => Ok(Number::from_f64(n)),
            Token::Minus => Ok(self.numeric_literal(what)?.negate()),
            _ => Err(self.expected(what)),
        }
    }

    /// Parses `=value` for a field or parameter of type `type_name`. The
    /// literal's form is dictated by the type's base type.
    pub(super) fn default_value(&mut self, type_name: &str) -> ParseResult<Value> {
        self.expect(Token::Equal)?;
        match self.base_type_by_name(type_name) {
            Some(b) if b.is_string_family() => Ok(Value::String(self.string_literal("string literal")?)),
            Some(b) if b.is_numeric() => Ok(Value::Number(self.numeric_literal("numeric literal")?)),
            Some(BaseType::Bool) => match self.identifier("'true' or 'false'")?.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(self.expected("'true' or 'false'")),
            },
            Some(BaseType::Enum) => {
                let symbol = self.identifier("enum symbol")?;
                let symbols = self.find_in_chain(type_name, |t| match t {
                    Type::Enum(e) => Some(e.elements.iter().map(|el| el.symbol.clone()).collect::<Vec<_>>()),
                    _ => None,
                });
                if let Some(symbols) = symbols {
                    if !symbols.contains(&symbol) {
                        return Err(self.semantic_error(format!(
                            "default value '{}' is not a symbol of {}",
                            symbol, type_name
                        )));
                    }
                }
                Ok(Value::Symbol(symbol))
            }
            Some(b) => Err(self.semantic_error(format!("cannot provide default value for a {} type", b))),
            None => Err(self.semantic_error(format!(
                "cannot provide default value for unresolved type {}",
                type_name
            ))),
        }
    }
}
