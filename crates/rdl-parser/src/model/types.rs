//! Type definitions produced by the parser.

use super::value::{Number, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A type name as declared (`Foo`, or `Other.Foo` after `use`).
pub type TypeName = String;

/// A reference to a type by name.
pub type TypeRef = String;

/// Extended annotations (`x_name="value"` options), keyed by full name.
pub type Annotations = BTreeMap<String, String>;

/// The fixed set of base types every user type ultimately derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bytes,
    String,
    Timestamp,
    Symbol,
    #[serde(rename = "UUID")]
    Uuid,
    Array,
    Map,
    Struct,
    Enum,
    Union,
    Any,
}

impl BaseType {
    pub const ALL: [BaseType; 18] = [
        BaseType::Bool,
        BaseType::Int8,
        BaseType::Int16,
        BaseType::Int32,
        BaseType::Int64,
        BaseType::Float32,
        BaseType::Float64,
        BaseType::Bytes,
        BaseType::String,
        BaseType::Timestamp,
        BaseType::Symbol,
        BaseType::Uuid,
        BaseType::Array,
        BaseType::Map,
        BaseType::Struct,
        BaseType::Enum,
        BaseType::Union,
        BaseType::Any,
    ];

    /// The canonical name used in RDL source.
    pub fn name(self) -> &'static str {
        match self {
            BaseType::Bool => "Bool",
            BaseType::Int8 => "Int8",
            BaseType::Int16 => "Int16",
            BaseType::Int32 => "Int32",
            BaseType::Int64 => "Int64",
            BaseType::Float32 => "Float32",
            BaseType::Float64 => "Float64",
            BaseType::Bytes => "Bytes",
            BaseType::String => "String",
            BaseType::Timestamp => "Timestamp",
            BaseType::Symbol => "Symbol",
            BaseType::Uuid => "UUID",
            BaseType::Array => "Array",
            BaseType::Map => "Map",
            BaseType::Struct => "Struct",
            BaseType::Enum => "Enum",
            BaseType::Union => "Union",
            BaseType::Any => "Any",
        }
    }

    /// Looks up a base type by its exact canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            BaseType::Int8
                | BaseType::Int16
                | BaseType::Int32
                | BaseType::Int64
                | BaseType::Float32
                | BaseType::Float64
        )
    }

    /// String, UUID, Symbol and Timestamp all share the string representation.
    pub fn is_string_family(self) -> bool {
        matches!(
            self,
            BaseType::String | BaseType::Uuid | BaseType::Symbol | BaseType::Timestamp
        )
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields shared by every user-defined type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: TypeName,
    #[serde(rename = "type")]
    pub supertype: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl TypeDef {
    pub fn new(name: impl Into<TypeName>, supertype: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            supertype: supertype.into(),
            comment: None,
            annotations: Annotations::new(),
        }
    }
}

/// A named type that adds nothing but a name (and maybe annotations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, rename = "minSize", skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i32>,
    #[serde(default, rename = "maxSize", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BytesTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
    #[serde(default, rename = "minSize", skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i32>,
    #[serde(default, rename = "maxSize", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    pub items: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
    #[serde(default, rename = "minSize", skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i32>,
    #[serde(default, rename = "maxSize", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    pub keys: TypeRef,
    pub items: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
    #[serde(default, rename = "minSize", skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i32>,
    #[serde(default, rename = "maxSize", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructFieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeRef,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Item type of an inline `Array<T>` or `Map<K,T>` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<TypeRef>,
    /// Key type of an inline `Map<K,T>` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    pub fields: Vec<StructFieldDef>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumElementDef {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    pub elements: Vec<EnumElementDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionTypeDef {
    #[serde(flatten)]
    pub def: TypeDef,
    pub variants: Vec<TypeRef>,
}

/// A registered type: one of the built-in base types, or a user definition
/// of one of the concrete kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Type {
    Base(BaseTypeDef),
    Alias(AliasTypeDef),
    String(StringTypeDef),
    Number(NumberTypeDef),
    Bytes(BytesTypeDef),
    Array(ArrayTypeDef),
    Map(MapTypeDef),
    Struct(StructTypeDef),
    Enum(EnumTypeDef),
    Union(UnionTypeDef),
}

/// Wrapper so base types serialize as `{"kind":"Base","base":"Int32"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTypeDef {
    pub base: BaseType,
}

impl Type {
    pub fn base(base: BaseType) -> Self {
        Type::Base(BaseTypeDef { base })
    }

    /// The shared definition fields; `None` for base types.
    pub fn def(&self) -> Option<&TypeDef> {
        match self {
            Type::Base(_) => None,
            Type::Alias(t) => Some(&t.def),
            Type::String(t) => Some(&t.def),
            Type::Number(t) => Some(&t.def),
            Type::Bytes(t) => Some(&t.def),
            Type::Array(t) => Some(&t.def),
            Type::Map(t) => Some(&t.def),
            Type::Struct(t) => Some(&t.def),
            Type::Enum(t) => Some(&t.def),
            Type::Union(t) => Some(&t.def),
        }
    }

    pub fn def_mut(&mut self) -> Option<&mut TypeDef> {
        match self {
            Type::Base(_) => None,
            Type::Alias(t) => Some(&mut t.def),
            Type::String(t) => Some(&mut t.def),
            Type::Number(t) => Some(&mut t.def),
            Type::Bytes(t) => Some(&mut t.def),
            Type::Array(t) => Some(&mut t.def),
            Type::Map(t) => Some(&mut t.def),
            Type::Struct(t) => Some(&mut t.def),
            Type::Enum(t) => Some(&mut t.def),
            Type::Union(t) => Some(&mut t.def),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Type::Base(b) => b.base.name(),
            _ => self.def().map(|d| d.name.as_str()).unwrap_or_default(),
        }
    }

    /// The declared supertype; `None` for base types.
    pub fn supertype(&self) -> Option<&str> {
        self.def().map(|d| d.supertype.as_str())
    }

    pub fn comment(&self) -> Option<&str> {
        self.def().and_then(|d| d.comment.as_deref())
    }
}
