//! `rdl check`: parse a schema and summarize it.

use super::load;
use crate::output::{resolve_color_choice, StyledOutput};
use crate::GlobalArgs;
use std::path::Path;

pub fn execute(file: &Path, global: &GlobalArgs) -> anyhow::Result<bool> {
    let mut out = StyledOutput::new(resolve_color_choice(global.color));
    let Some(schema) = load(file, global, &mut out)? else {
        return Ok(false);
    };

    out.success("ok");
    out.plain(&format!(
        ": {} ({} types, {} resources)",
        schema.name.as_deref().unwrap_or_else(|| file_label(file)),
        schema.types.len(),
        schema.resources.len()
    ));
    out.newline();
    Ok(true)
}

fn file_label(file: &Path) -> &str {
    file.file_name().and_then(|n| n.to_str()).unwrap_or("schema")
}
