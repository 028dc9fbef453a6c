//! Shared diagnostics helpers for consistent, colored stderr output.

use colored::Colorize;

/// Print a non-fatal warning with a colored prefix.
///
/// Reporters warn instead of failing when a record lacks an optional field
/// they would have rendered.
pub fn warn(message: impl AsRef<str>) {
    eprintln!("{} {}", "WARN".yellow().bold(), message.as_ref());
}

/// Print a progress note, e.g. after an artifact has been written.
pub fn info(message: impl AsRef<str>) {
    eprintln!("{} {}", "INFO".green().bold(), message.as_ref());
}

/// Format an error message with a colored prefix.
pub fn error_message(message: impl AsRef<str>) -> String {
    format!("{} {}", "ERROR".red().bold(), message.as_ref())
}
