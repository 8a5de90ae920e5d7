//! Subcommands. Each returns `Ok(false)` when the schema failed to parse;
//! the error has already been reported by then.

pub mod check;
pub mod json;

use crate::output::{resolve_color_choice, StyledOutput};
use crate::GlobalArgs;
use rdl_parser::{Schema, Session};
use std::path::Path;

/// Parses `file`, streaming warnings to stderr and reporting a failure there.
fn load(file: &Path, global: &GlobalArgs, out: &mut StyledOutput) -> anyhow::Result<Option<Schema>> {
    let options = global.parse_options();
    let mut session = Session::stderr(options, resolve_color_choice(global.color));
    match session.parse_file(file) {
        Ok(schema) => Ok(Some(schema)),
        Err(err) => {
            tracing::debug!(kind = ?err.kind(), "parse failed");
            err.emit(out.stderr(), options.verbose)?;
            Ok(None)
        }
    }
}
