//! Terminal output formatting and utilities.
//!
//! Command results go to stdout as pretty JSON so they can be piped into
//! other tools. Status messages go to stderr.

pub mod errors;

use std::env;
use std::io::{self, IsTerminal, Write};

use serde_json::Value;

/// ANSI styling for stderr, off when `NO_COLOR` is set or stderr is not a terminal
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn detect() -> Self {
        Self {
            enabled: env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    fn paint(&self, sgr: u8, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{sgr}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(32, text)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(33, text)
    }

    pub fn failure(&self, text: &str) -> String {
        self.paint(31, text)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(2, text)
    }
}

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    palette: Palette,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            palette: Palette::detect(),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.palette.success("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.palette.warning("⚠"), message);
    }

    /// Print a command result
    pub fn json(&self, value: &Value) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout)
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
