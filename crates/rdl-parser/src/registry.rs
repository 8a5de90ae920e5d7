//! Type registry: name to type lookup and base-type resolution.
//!
//! Each parser owns one registry. Included and used schemas are parsed by
//! child parsers that see their parents' registries through a [`Scope`]
//! chain, so a lookup falls back outward until a definition is found.

use crate::model::{BaseType, Type};
use rustc_hash::FxHashMap;

/// Upper bound on supertype hops. Redefinitions in non-pedantic mode can
/// leave alias cycles behind, and resolution must still terminate.
const MAX_SUPERTYPE_DEPTH: usize = 256;

/// A registry slot: either a forward-reference placeholder or a definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Reserved by a `type` statement whose body is still being parsed.
    Pending(String),
    Defined(Type),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Pending(name) => name,
            Entry::Defined(t) => t.name(),
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Entry::Defined(t) => Some(t),
            Entry::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Entry::Pending(_))
    }
}

/// Name-keyed type storage, seeded with the base types.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: FxHashMap<String, Entry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut types = FxHashMap::default();
        for base in BaseType::ALL {
            types.insert(base.name().to_string(), Entry::Defined(Type::base(base)));
        }
        Self { types }
    }

    /// Inserts or replaces a definition.
    pub fn add_type(&mut self, t: Type) {
        self.types.insert(t.name().to_string(), Entry::Defined(t));
    }

    pub fn add_pending(&mut self, name: &str) {
        self.types
            .insert(name.to_string(), Entry::Pending(name.to_string()));
    }

    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        self.types.remove(name)
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.types.get(name)
    }

    pub fn find_type(&self, name: &str) -> Option<&Type> {
        self.entry(name).and_then(Entry::as_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that can resolve a type name to a registry entry.
pub trait TypeLookup {
    fn lookup(&self, name: &str) -> Option<&Entry>;

    /// Follows the supertype chain of `entry` to its base type.
    ///
    /// Returns `None` when the chain reaches a placeholder or an unknown
    /// name, or loops.
    fn base_type_of(&self, entry: &Entry) -> Option<BaseType> {
        let mut current = entry;
        for _ in 0..MAX_SUPERTYPE_DEPTH {
            match current {
                Entry::Pending(_) => return None,
                Entry::Defined(Type::Base(b)) => return Some(b.base),
                Entry::Defined(t) => current = self.lookup(t.supertype()?)?,
            }
        }
        None
    }

    fn base_type(&self, name: &str) -> Option<BaseType> {
        self.lookup(name).and_then(|e| self.base_type_of(e))
    }

    /// The nearest definition of the given kind on the supertype chain, as
    /// used to find the enum behind an alias of an enum type.
    fn find_in_chain<'s, F, R>(&'s self, name: &str, mut f: F) -> Option<R>
    where
        F: FnMut(&'s Type) -> Option<R>,
    {
        let mut current = self.lookup(name)?;
        for _ in 0..MAX_SUPERTYPE_DEPTH {
            let t = current.as_type()?;
            if let Some(found) = f(t) {
                return Some(found);
            }
            current = self.lookup(t.supertype()?)?;
        }
        None
    }
}

impl TypeLookup for TypeRegistry {
    fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entry(name)
    }
}

/// A read-only view of a parser's registry and its ancestors, handed to
/// child parsers.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    pub registry: &'a TypeRegistry,
    pub parent: Option<&'a Scope<'a>>,
}

impl<'a> TypeLookup for Scope<'a> {
    fn lookup(&self, name: &str) -> Option<&Entry> {
        self.registry
            .entry(name)
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }
}
