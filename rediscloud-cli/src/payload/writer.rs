//! Writing generated artifacts to disk

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize `value` as pretty JSON (2-space indent, trailing newline) into `path`
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize JSON for {}", path.display()))?;
    text.push('\n');
    write_text(path, &text)
}

/// Write text into `path`, creating parent directories as needed
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write file: {}", path.display()))?;
    log::debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}
