//! Small filesystem and naming helpers shared by the reporters.

use crate::Result;

use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Create the parent directory of `path` if it does not exist yet.
pub fn make_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent directory of {}", path.display()))?;
        }
    }
    Ok(())
}

/// Reduce `name` to characters that are safe inside a file name.
///
/// Runs of anything outside `[A-Za-z0-9_-]` collapse into a single `_`;
/// leading and trailing separators are stripped.
pub fn valid_filename(name: &str) -> Result<String> {
    const UNSAFE_RE: &str = r"[^A-Za-z0-9_-]+";
    let re = Regex::new(UNSAFE_RE)?;
    Ok(re.replace_all(name, "_").trim_matches('_').to_string())
}

/// The final component of a path, for embedding relative links.
pub fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Write one string per line to `path`, creating parent directories.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    make_parent_dir(path)?;
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
