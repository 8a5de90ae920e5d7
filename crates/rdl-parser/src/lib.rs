//! RDL Schema Parser
//!
//! Lexer, type registry and recursive-descent parser for the Resource
//! Description Language: a schema language for data types and HTTP
//! resources.
//!
//! ```ignore
//! let schema = rdl_parser::parse_file("api.rdl", false, false, false)?;
//! for t in &schema.types {
//!     println!("{}", t.name());
//! }
//! ```

pub mod builtin;
pub mod diagnostic;
pub mod error;
pub mod lexer;
pub mod model;
mod parser;
pub mod path;
pub mod registry;
pub mod session;
pub mod token;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{LexError, Lexer};
pub use model::*;
pub use path::{parse_path_template, PathTemplate, PathTemplateError};
pub use registry::{Entry, TypeLookup, TypeRegistry};
pub use session::{parse_file, ParseOptions, Session};
pub use token::{Span, Token};
