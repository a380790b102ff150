//! Error message formatting with actionable suggestions.

use std::error::Error;

use npq_core::error::NpqError;

use super::Palette;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    palette: Palette,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            palette: Palette::detect(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            palette: Palette::plain(),
        }
    }

    /// Format an error with context and suggestions
    pub fn format_error(&self, error: &NpqError) -> String {
        let mut output = String::new();

        // Main error message
        output.push_str(&self.palette.failure("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        // Add source chain if available
        let mut source = error.source();
        while let Some(err) = source {
            output.push_str(&self.palette.muted("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            output.push('\n');
            source = err.source();
        }

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&self.palette.muted("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        output
    }

    /// Format a simple error message
    pub fn format_simple(&self, message: &str) -> String {
        format!("{}: {}", self.palette.failure("error"), message)
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
