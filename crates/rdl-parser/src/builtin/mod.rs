//! The built-in `rdl` schema, which describes RDL's own model in RDL.
//!
//! `use "rdl";` parses it instead of reading a file, making types such as
//! `rdl.TypeDef` and `rdl.Resource` available to the using schema.

/// The name diagnostics report for the built-in schema.
pub const RDL_SCHEMA_FILE: &str = "rdl.rdl";

pub const RDL_SCHEMA: &str = include_str!("rdl.rdl");
