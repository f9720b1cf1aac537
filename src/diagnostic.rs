//! User-facing messages and compiler-output display.
//!
//! Everything the tool prints about itself goes through an [`OutputFormatter`]. The
//! formatter is picked once at startup by [`select_formatter`] and handed to the driver.

use itertools::Itertools;

#[cfg(feature = "pretty")]
pub mod beautifier;
#[cfg(feature = "pretty")]
pub mod parser;
#[cfg(feature = "pretty")]
pub mod pretty;

#[cfg(feature = "pretty")]
pub use pretty::RichFormatter;

/// Name used to prefix every message
pub const TOOL_NAME: &str = "ccwrap";

/// Whether the rich formatter was compiled in
pub const RICH_FORMATTER_AVAILABLE: bool = cfg!(feature = "pretty");

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Note,
    Info,
}

impl DiagnosticLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Note => "note",
            DiagnosticLevel::Info => "info",
        }
    }
}

/// Formats compiler output and the tool's own messages.
pub trait OutputFormatter {
    /// Turn the combined compiler output into display text.
    fn format_output(&self, text: &str, color: bool, beautify: u8) -> String;

    /// Render one message of the given severity.
    fn render_message(&self, level: DiagnosticLevel, msg: &str) -> String;

    fn emit(&self, level: DiagnosticLevel, msg: &str) {
        eprintln!("{}", self.render_message(level, msg));
    }

    fn error(&self, msg: &str) {
        self.emit(DiagnosticLevel::Error, msg);
    }

    fn warning(&self, msg: &str) {
        self.emit(DiagnosticLevel::Warning, msg);
    }

    fn note(&self, msg: &str) {
        self.emit(DiagnosticLevel::Note, msg);
    }

    fn info(&self, msg: &str) {
        self.emit(DiagnosticLevel::Info, msg);
    }
}

/// Fallback used when the rich formatter is not compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn format_output(&self, text: &str, _color: bool, _beautify: u8) -> String {
        text.lines().map(|line| format!("{}: {}", TOOL_NAME, line)).join("\n")
    }

    fn render_message(&self, _level: DiagnosticLevel, msg: &str) -> String {
        format!("{}: {}", TOOL_NAME, msg)
    }
}

/// Pick the best formatter this build offers.
#[cfg(feature = "pretty")]
pub fn select_formatter(color: bool) -> Box<dyn OutputFormatter> {
    use std::io::IsTerminal;

    let color = pretty::stderr_color(color, std::io::stderr().is_terminal(), std::env::var_os("NO_COLOR"));
    colored::control::set_override(color);
    Box::new(RichFormatter::new(color))
}

#[cfg(not(feature = "pretty"))]
pub fn select_formatter(_color: bool) -> Box<dyn OutputFormatter> {
    Box::new(PlainFormatter)
}
