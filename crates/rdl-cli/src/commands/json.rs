//! `rdl json`: parse a schema and print it as JSON.

use super::load;
use crate::output::{resolve_color_choice, StyledOutput};
use crate::GlobalArgs;
use anyhow::Context;
use std::path::Path;

pub fn execute(file: &Path, output: Option<&Path>, global: &GlobalArgs) -> anyhow::Result<bool> {
    let mut out = StyledOutput::new(resolve_color_choice(global.color));
    let Some(schema) = load(file, global, &mut out)? else {
        return Ok(false);
    };

    let json = serde_json::to_string_pretty(&schema)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "wrote schema");
        }
        None => {
            out.plain(&json);
            out.newline();
        }
    }
    Ok(true)
}
