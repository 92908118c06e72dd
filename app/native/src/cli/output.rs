//! Output helpers shared by CLI commands.

use colored::Colorize;
use serde::Serialize;

use crate::error::DeskmateError;

/// Prints a value as pretty JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), DeskmateError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shortens `s` to at most `max_chars` characters, ending in `…` when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Renders a done flag as a colored check mark or cross.
#[must_use]
pub fn format_done(done: bool) -> String {
    if done { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// Renders an empty title as a dimmed placeholder.
#[must_use]
pub fn format_title(title: &str, max_chars: usize) -> String {
    if title.is_empty() {
        "(untitled)".dimmed().to_string()
    } else {
        truncate(title, max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate("Release", 10), "Release");
        assert_eq!(truncate("Release", 7), "Release");
    }

    #[test]
    fn test_truncate_cuts_on_char_boundary() {
        assert_eq!(truncate("Ship the release", 8), "Ship th…");
        assert_eq!(truncate("café au lait", 5), "café…");
    }

    #[test]
    fn test_truncate_to_one_char() {
        assert_eq!(truncate("Release", 1), "…");
    }

    #[test]
    fn test_format_done() {
        assert!(format_done(true).contains('✓'));
        assert!(format_done(false).contains('✗'));
    }

    #[test]
    fn test_format_title_placeholder() {
        assert!(format_title("", 10).contains("(untitled)"));
        assert_eq!(format_title("Planning", 10), "Planning");
    }
}
