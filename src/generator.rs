use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::ast_visitor::ClassSet;
use crate::errors::{Result, ScannerError};

/// File name of the generated asset
pub const OUTPUT_FILE_NAME: &str = "templates.js";

/// Classes sorted ascending, for deterministic output
pub fn sorted_classes(classes: &ClassSet) -> Vec<&str> {
    let mut sorted: Vec<&str> = classes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
}

/// Render the JavaScript module Tailwind scans for class names.
///
/// The output only depends on the set contents, never on insertion order.
pub fn render_template_js(classes: &ClassSet) -> String {
    format!(
        "// Generated by template scanner - do not edit directly\n\
         const templates = `\n\
         {}\n\
         `;\n\
         \n\
         export default templates;\n",
        sorted_classes(classes).join(" ")
    )
}

/// Generate the JavaScript file listing all template classes, replacing any
/// previous content
pub fn generate_template_js(classes: &ClassSet, output_path: &Path) -> Result<()> {
    let content = render_template_js(classes);

    write_atomic(output_path, &content).map_err(|e| ScannerError::OutputError {
        path: output_path.display().to_string(),
        message: e.to_string(),
    })?;

    info!("Found classes: {}", sorted_classes(classes).join(", "));
    Ok(())
}

/// Write file atomically by writing to temp file then renaming.
/// The temp file is removed again if any step fails.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("js.tmp");

    let result = write_and_rename(&temp_path, path, content);
    if result.is_err() && temp_path.exists() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)
}
