//! User-facing diagnostic messages.
//!
//! Fatal configuration errors are printed as a single red
//! `ROCm Configuration Error:` line followed by context and suggested fixes.

use std::fmt;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

/// Headline label of a fatal diagnostic.
const ERROR_LABEL: &str = "ROCm Configuration Error";

/// A diagnostic message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related file or directory
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        // The whole headline is colored, not just the label
        if color {
            output.push_str(&format!("\x1b[0;31m{}: {}\x1b[0m\n", ERROR_LABEL, self.message));
        } else {
            output.push_str(&format!("{}: {}\n", ERROR_LABEL, self.message));
        }

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            for line in ctx.lines() {
                output.push_str(&format!("  | {}\n", line));
            }
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Whether stderr should receive ANSI colors.
pub fn stderr_supports_color(no_color: bool) -> bool {
    !no_color && io::stderr().is_terminal()
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting() {
        let diag = Diagnostic::error("cannot find rocm library libMIOpen.so")
            .with_context("looked for /opt/rocm/miopen/lib/libMIOpen.so")
            .with_suggestion("Check that the ROCm installation is complete");

        let output = diag.format(false);
        assert!(output.starts_with("ROCm Configuration Error: cannot find rocm library"));
        assert!(output.contains("  | looked for /opt/rocm/miopen/lib/libMIOpen.so"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Check that the ROCm installation"));
    }

    #[test]
    fn test_colored_headline_is_red() {
        let output = Diagnostic::error("boom").format(true);
        assert!(output.starts_with("\x1b[0;31mROCm Configuration Error: boom\x1b[0m"));
    }

    #[test]
    fn test_multiline_context_is_indented() {
        let diag = Diagnostic::error("compiler probe failed").with_context("line one\nline two");
        let output = diag.format(false);
        assert!(output.contains("  | line one\n  | line two\n"));
    }
}
