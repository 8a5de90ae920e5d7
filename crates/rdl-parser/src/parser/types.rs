//! `type` statements: one parser per kind of definition.

use super::{merge_comment, Parser};
use crate::error::ParseResult;
use crate::model::{
    AliasTypeDef, Annotations, ArrayTypeDef, BaseType, BytesTypeDef, EnumElementDef, EnumTypeDef,
    MapTypeDef, NumberTypeDef, StringTypeDef, StructFieldDef, StructTypeDef, Type, TypeDef, TypeRef,
    UnionTypeDef,
};
use crate::registry::{Entry, TypeLookup};
use crate::token::Token;

impl<'a> Parser<'a> {
    /// `type Name Supertype ...`, after the `type` keyword.
    pub(super) fn parse_type(&mut self, comment: Option<String>) -> ParseResult<()> {
        let name = self.identifier("type name")?;
        let supertype = self.type_ref("supertype name")?;

        if let Some(Entry::Defined(Type::Base(_))) = self.lookup(&name) {
            return Err(self.semantic_error(format!(
                "type definition cannot override RDL base type: {}",
                name
            )));
        }
        // A base-type supertype is recorded under its canonical name, which
        // also settles legacy synonyms like `integer`.
        let supertype = match self.find_type(&supertype) {
            Some(Entry::Defined(Type::Base(b))) => b.base.name().to_string(),
            _ => supertype,
        };

        let placeholder = self.register_placeholder(&name);
        let mut def = TypeDef::new(name.clone(), supertype);
        def.comment = comment;

        let parsed = match self.base_type_by_name(&def.supertype) {
            Some(BaseType::Struct) => Some(self.parse_struct_type(def)?),
            Some(b) if b.is_string_family() => Some(self.parse_string_type(def)?),
            Some(b) if b.is_numeric() => Some(self.parse_number_type(def)?),
            Some(BaseType::Bytes) => Some(self.parse_bytes_type(def)?),
            Some(BaseType::Array) => Some(self.parse_array_type(def)?),
            Some(BaseType::Map) => Some(self.parse_map_type(def)?),
            Some(BaseType::Enum) => self.parse_enum_type(def)?,
            Some(BaseType::Union) => Some(self.parse_union_type(def)?),
            Some(BaseType::Bool) => Some(self.parse_bool_type(def)?),
            _ => {
                return Err(self.semantic_error(format!(
                    "Cannot derive from this type: {}",
                    def.supertype
                )))
            }
        };

        match parsed {
            Some(t) => self.register_type(t),
            None => {
                if placeholder {
                    self.drop_placeholder(&name);
                }
                Ok(())
            }
        }
    }

    /// `(closed, x_name=...)` header options for structs, enums and unions.
    /// `closed` is only meaningful for structs.
    fn parse_header_options(&mut self, kind: &str, annotations: &mut Annotations) -> ParseResult<bool> {
        let mut closed = false;
        self.option_list(|p, option| {
            let lower = option.to_lowercase();
            if lower == "closed" && kind == "Struct" {
                closed = true;
                Ok(())
            } else if lower.starts_with("x_") {
                p.extended_option(annotations, option)
            } else {
                Err(p.semantic_error(format!("Unsupported {} option: {}", kind, option)))
            }
        })?;
        Ok(closed)
    }

    fn alias(&mut self, mut def: TypeDef) -> Type {
        def.comment = self.statement_end(def.comment);
        Type::Alias(AliasTypeDef { def })
    }

    // ========================================================================
    // String family
    // ========================================================================

    fn parse_string_type(&mut self, def: TypeDef) -> ParseResult<Type> {
        if def.supertype != BaseType::String.name() {
            return Ok(self.alias(def));
        }
        let mut t = StringTypeDef {
            def,
            pattern: None,
            values: Vec::new(),
            min_size: None,
            max_size: None,
        };
        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| match option.to_lowercase().as_str() {
                "pattern" => {
                    p.expect(Token::Equal)?;
                    let raw = p.string_literal("pattern string")?;
                    t.pattern = Some(p.expand_pattern(&raw)?);
                    Ok(())
                }
                "values" => {
                    t.values = p.parse_values_option()?;
                    Ok(())
                }
                "minsize" => {
                    t.min_size = Some(p.int32_option()?);
                    Ok(())
                }
                "maxsize" => {
                    t.max_size = Some(p.int32_option()?);
                    Ok(())
                }
                lower if lower.starts_with("x_") => p.extended_option(&mut t.def.annotations, option),
                _ => Err(p.semantic_error(format!("Unsupported String option: {}", option))),
            })?;
        }
        t.def.comment = self.statement_end(t.def.comment.take());
        Ok(Type::String(t))
    }

    /// Substitutes `{TypeName}` references with the named string type's
    /// pattern. Braces that do not name a type (regex repetition such as
    /// `{2,4}`) are kept as written.
    fn expand_pattern(&self, pattern: &str) -> ParseResult<String> {
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open + 1..].find('}') else {
                return Err(self.syntax_error(format!("Malformed pattern reference: {}", pattern)));
            };
            let reference = &rest[open + 1..open + 1 + len];
            let whole = &rest[..open + len + 2];
            match self.lookup(reference) {
                Some(entry) => {
                    if self.base_type_of(entry) != Some(BaseType::String) {
                        return Err(self.semantic_error(format!(
                            "A pattern can only include other string types: {}",
                            reference
                        )));
                    }
                    let Some(included) = entry.as_type().and_then(|t| match t {
                        Type::String(s) => s.pattern.clone(),
                        _ => None,
                    }) else {
                        return Err(self.semantic_error(format!(
                            "Included pattern type has no pattern: {}",
                            reference
                        )));
                    };
                    out.push_str(&rest[..open]);
                    out.push_str(&included);
                }
                None => {
                    if is_identifier(reference) {
                        self.warn(format!(
                            "pattern reference '{{{}}}' does not name a type and is kept as written",
                            reference
                        ));
                    }
                    out.push_str(whole);
                }
            }
            rest = &rest[open + len + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// `=["a", "b", ...]`
    fn parse_values_option(&mut self) -> ParseResult<Vec<String>> {
        self.expect(Token::Equal)?;
        self.expect(Token::LeftBracket)?;
        let mut values = Vec::new();
        loop {
            match self.next() {
                Token::RightBracket => break,
                Token::Comma => {}
                Token::StringLiteral(s) => values.push(s),
                Token::Eof => return Err(self.syntax_error("unterminated values list")),
                _ => return Err(self.expected("string literal")),
            }
        }
        if values.is_empty() {
            return Err(self.semantic_error("values option must have at least one entry"));
        }
        Ok(values)
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    fn parse_number_type(&mut self, def: TypeDef) -> ParseResult<Type> {
        if !BaseType::from_name(&def.supertype).is_some_and(BaseType::is_numeric) {
            return Ok(self.alias(def));
        }
        let mut t = NumberTypeDef {
            def,
            min: None,
            max: None,
        };
        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| match option {
                "min" => {
                    p.expect(Token::Equal)?;
                    t.min = Some(p.numeric_literal("numeric literal")?);
                    Ok(())
                }
                "max" => {
                    p.expect(Token::Equal)?;
                    t.max = Some(p.numeric_literal("numeric literal")?);
                    Ok(())
                }
                _ if option.starts_with("x_") => p.extended_option(&mut t.def.annotations, option),
                _ => Err(p.semantic_error(format!("Unsupported Number option: {}", option))),
            })?;
        }
        t.def.comment = self.statement_end(t.def.comment.take());
        Ok(Type::Number(t))
    }

    fn parse_bool_type(&mut self, mut def: TypeDef) -> ParseResult<Type> {
        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| {
                if option.to_lowercase().starts_with("x_") {
                    p.extended_option(&mut def.annotations, option)
                } else {
                    Err(p.semantic_error(format!("Unsupported Bool option: {}", option)))
                }
            })?;
        }
        Ok(self.alias(def))
    }

    /// `Bytes`, optionally `Bytes[N]` for a fixed size, then options.
    fn parse_bytes_type(&mut self, def: TypeDef) -> ParseResult<Type> {
        let mut t = BytesTypeDef {
            def,
            size: None,
            min_size: None,
            max_size: None,
        };
        if self.eat_inline(&Token::LeftBracket) {
            t.size = Some(self.int32_literal("fixed size")?);
            self.expect(Token::RightBracket)?;
        }
        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| {
                match option.to_lowercase().as_str() {
                    "size" => t.size = Some(p.int32_option()?),
                    "minsize" => t.min_size = Some(p.int32_option()?),
                    "maxsize" => t.max_size = Some(p.int32_option()?),
                    lower if lower.starts_with("x_") => p.extended_option(&mut t.def.annotations, option)?,
                    _ => return Err(p.semantic_error(format!("Unsupported Bytes option: {}", option))),
                }
                if t.size.is_some() && (t.min_size.is_some() || t.max_size.is_some()) {
                    return Err(p.semantic_error(
                        "Cannot specify fixed size and minsize/maxsize in the same type",
                    ));
                }
                Ok(())
            })?;
        }
        t.def.comment = self.statement_end(t.def.comment.take());
        Ok(Type::Bytes(t))
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// `Array`, `Array<Items>`, then options.
    fn parse_array_type(&mut self, def: TypeDef) -> ParseResult<Type> {
        let mut t = ArrayTypeDef {
            def,
            items: BaseType::Any.name().to_string(),
            size: None,
            min_size: None,
            max_size: None,
        };
        if self.eat_inline(&Token::Less) {
            if let Some(items) = self.type_spec()? {
                t.items = items;
            }
            self.expect(Token::Greater)?;
        }
        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| match option.to_lowercase().as_str() {
                "size" => {
                    t.size = Some(p.int32_option()?);
                    Ok(())
                }
                "minsize" => {
                    t.min_size = Some(p.int32_option()?);
                    Ok(())
                }
                "maxsize" => {
                    t.max_size = Some(p.int32_option()?);
                    Ok(())
                }
                lower if lower.starts_with("x_") => p.extended_option(&mut t.def.annotations, option),
                _ => Err(p.semantic_error(format!("Unsupported Array option: {}", option))),
            })?;
        }
        t.def.comment = self.statement_end(t.def.comment.take());
        Ok(Type::Array(t))
    }

    /// `Map`, `Map<Keys, Items>`, then options.
    fn parse_map_type(&mut self, def: TypeDef) -> ParseResult<Type> {
        let mut t = MapTypeDef {
            def,
            keys: BaseType::String.name().to_string(),
            items: BaseType::Any.name().to_string(),
            size: None,
            min_size: None,
            max_size: None,
        };
        if self.eat_inline(&Token::Less) {
            t.keys = self.map_key_spec()?;
            self.expect(Token::Comma)?;
            if let Some(items) = self.type_spec()? {
                t.items = items;
            }
            self.expect(Token::Greater)?;
        }
        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| match option.to_lowercase().as_str() {
                "size" => {
                    t.size = Some(p.int32_option()?);
                    Ok(())
                }
                "minsize" => {
                    t.min_size = Some(p.int32_option()?);
                    Ok(())
                }
                "maxsize" => {
                    t.max_size = Some(p.int32_option()?);
                    Ok(())
                }
                lower if lower.starts_with("x_") => p.extended_option(&mut t.def.annotations, option),
                _ => Err(p.semantic_error(format!("Unsupported Map option: {}", option))),
            })?;
        }
        t.def.comment = self.statement_end(t.def.comment.take());
        Ok(Type::Map(t))
    }

    /// A map key type; it must exist and derive from the string family.
    fn map_key_spec(&mut self) -> ParseResult<TypeRef> {
        let keys = self.type_spec()?;
        match keys {
            Some(keys) if self.base_type_by_name(&keys).is_some_and(BaseType::is_string_family) => Ok(keys),
            _ => Err(self.semantic_error("Map key types must derive from String")),
        }
    }

    /// A type name used inside `<...>`: `Any` (returned as `None`), a known
    /// type, or a nested `Array<...>` / `Map<...,...>` which is registered as
    /// a synthetic named type.
    pub(super) fn type_spec(&mut self) -> ParseResult<Option<TypeRef>> {
        let name = self.type_ref("type name")?;
        if name.eq_ignore_ascii_case("any") {
            return Ok(None);
        }
        let Some(resolved) = self.resolve_name(&name) else {
            return Err(self.semantic_error(format!("Undefined type: {}", name)));
        };
        match self.peek_inline() {
            Token::Newline | Token::LineComment(_) => {
                self.next();
                return Err(self.syntax_error("unexpected end of line"));
            }
            Token::Less => {}
            _ => return Ok(Some(resolved)),
        }
        self.next();
        match resolved.as_str() {
            "Array" => {
                let items = self.type_spec()?;
                self.expect(Token::Greater)?;
                match items {
                    Some(items) => self.synthetic_array(items).map(Some),
                    None => Ok(Some(resolved)),
                }
            }
            "Map" => {
                let keys = self.map_key_spec()?;
                self.expect(Token::Comma)?;
                let items = self.type_spec()?;
                self.expect(Token::Greater)?;
                let items = items.unwrap_or_else(|| BaseType::Any.name().to_string());
                self.synthetic_map(keys, items).map(Some)
            }
            _ => Err(self.semantic_error("parameterized type only supported for arrays and maps")),
        }
    }

    /// `ArrayOf<Items>`, registered on first use.
    fn synthetic_array(&mut self, items: TypeRef) -> ParseResult<TypeRef> {
        let name = format!("ArrayOf{}", items.replace('.', ""));
        if self.lookup(&name).is_none() {
            tracing::debug!(name = %name, "registering synthetic array type");
            self.register_type(Type::Array(ArrayTypeDef {
                def: TypeDef::new(name.clone(), BaseType::Array.name()),
                items,
                size: None,
                min_size: None,
                max_size: None,
            }))?;
        }
        Ok(name)
    }

    /// `MapFrom<Keys>To<Items>`, registered on first use.
    fn synthetic_map(&mut self, keys: TypeRef, items: TypeRef) -> ParseResult<TypeRef> {
        let name = format!("MapFrom{}To{}", keys.replace('.', ""), items.replace('.', ""));
        if self.lookup(&name).is_none() {
            tracing::debug!(name = %name, "registering synthetic map type");
            self.register_type(Type::Map(MapTypeDef {
                def: TypeDef::new(name.clone(), BaseType::Map.name()),
                keys,
                items,
                size: None,
                min_size: None,
                max_size: None,
            }))?;
        }
        Ok(name)
    }

    // ========================================================================
    // Struct
    // ========================================================================

    fn parse_struct_type(&mut self, mut def: TypeDef) -> ParseResult<Type> {
        // `type Foo Struct;` declares an alias with no body.
        if matches!(self.peek_inline(), Token::Semicolon | Token::LineComment(_)) {
            return Ok(self.alias(def));
        }
        let mut closed = false;
        if self.eat_inline(&Token::LeftParen) {
            closed = self.parse_header_options("Struct", &mut def.annotations)?;
        }
        self.expect(Token::LeftBrace)?;

        let mut fields: Vec<StructFieldDef> = Vec::new();
        let mut pending: Option<String> = None;
        loop {
            match self.next() {
                Token::RightBrace => break,
                Token::Eof => return Err(self.syntax_error("Unterminated struct definition")),
                Token::LineComment(text) => pending = merge_comment(pending, Some(text)),
                Token::LegacyComment(text) => {
                    self.accept_legacy("'#' for line comments, use '//' instead", "use '//', not '#'")?;
                    pending = merge_comment(pending, Some(text));
                }
                Token::Ident(word) if word == "closed" => {
                    self.accept_legacy(
                        "'closed' inside a struct body",
                        "use 'type X Struct (closed) {...}' to close a struct",
                    )?;
                    closed = true;
                    pending = self.statement_end(pending);
                }
                Token::Ident(word) => {
                    let type_name = self.compound_name(word)?;
                    let Some(field_type) = self.resolve_name(&type_name) else {
                        return Err(self.semantic_error(format!("No such type: {}", type_name)));
                    };
                    let field = self.parse_struct_field(field_type, pending.take())?;
                    fields.push(field);
                }
                _ => return Err(self.expected("field type or '}'")),
            }
        }

        let mut t = StructTypeDef {
            def,
            fields,
            closed,
        };
        t.def.comment = self.trailing_comment(t.def.comment.take());
        Ok(Type::Struct(t))
    }

    /// The rest of a field after its type: optional `<...>` parameters, the
    /// field name, options, and the statement end.
    fn parse_struct_field(&mut self, field_type: TypeRef, comment: Option<String>) -> ParseResult<StructFieldDef> {
        let mut field = StructFieldDef {
            field_type,
            comment,
            ..Default::default()
        };

        if self.eat_inline(&Token::Less) {
            match field.field_type.to_lowercase().as_str() {
                "array" => {
                    field.items = self.type_spec()?;
                    self.expect(Token::Greater)?;
                }
                "map" => {
                    field.keys = Some(self.map_key_spec()?);
                    self.expect(Token::Comma)?;
                    field.items = self.type_spec()?;
                    self.expect(Token::Greater)?;
                }
                _ => {
                    return Err(
                        self.semantic_error("parameterized type only supported for arrays and maps")
                    )
                }
            }
        }

        field.name = self.identifier("field name")?;

        if self.eat_inline(&Token::LeftParen) {
            self.option_list(|p, option| match option {
                "optional" => {
                    field.optional = true;
                    Ok(())
                }
                "default" => {
                    field.default = Some(p.default_value(&field.field_type)?);
                    Ok(())
                }
                _ if option.starts_with("x_") => p.extended_option(&mut field.annotations, option),
                _ => Err(p.semantic_error(format!("Unsupported Struct field option: {}", option))),
            })?;
        }
        field.comment = self.statement_end(field.comment.take());
        Ok(field)
    }

    // ========================================================================
    // Enum and Union
    // ========================================================================

    /// Returns `None` for `type E Enum;`, which declares nothing.
    fn parse_enum_type(&mut self, mut def: TypeDef) -> ParseResult<Option<Type>> {
        if self.eat_inline(&Token::Semicolon) {
            self.trailing_comment(None);
            return Ok(None);
        }
        if self.eat_inline(&Token::LeftParen) {
            self.parse_header_options("Enum", &mut def.annotations)?;
        }
        self.expect(Token::LeftBrace)?;
        // A comment on the opening line documents the type itself.
        def.comment = self.trailing_comment(def.comment);

        let mut elements = Vec::new();
        let mut pending: Option<String> = None;
        loop {
            match self.next() {
                Token::RightBrace => break,
                Token::LineComment(text) => pending = merge_comment(pending, Some(text)),
                Token::Ident(symbol) => {
                    if *self.peek() == Token::Comma {
                        self.next();
                    }
                    let comment = self.trailing_comment(pending.take());
                    elements.push(EnumElementDef { symbol, comment });
                }
                _ => return Err(self.syntax_error("Enum type not terminated properly")),
            }
        }

        let mut t = EnumTypeDef { def, elements };
        t.def.comment = self.trailing_comment(t.def.comment.take());
        Ok(Some(Type::Enum(t)))
    }

    /// `Union<A, B, ...>`, then options.
    fn parse_union_type(&mut self, mut def: TypeDef) -> ParseResult<Type> {
        self.expect(Token::Less)?;
        if *self.peek() == Token::Greater {
            self.next();
            return Err(self.semantic_error("Union must have at least one variant"));
        }
        let mut variants = Vec::new();
        loop {
            let Token::Ident(name) = self.next() else {
                return Err(self.syntax_error("malformed union variant list"));
            };
            let name = self.compound_name(name)?;
            // Variants may name types defined later in the file.
            let variant = self.resolve_name(&name).unwrap_or(name);
            variants.push(variant);
            match self.next() {
                Token::Comma => {}
                Token::Greater => break,
                _ => return Err(self.expected("',' or '>'")),
            }
        }
        if self.eat_inline(&Token::LeftParen) {
            self.parse_header_options("Union", &mut def.annotations)?;
        }
        let mut t = UnionTypeDef { def, variants };
        t.def.comment = self.statement_end(t.def.comment.take());
        Ok(Type::Union(t))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c == '.' || c.is_alphanumeric())
}
