//! Colored, beautified output.

use colored::{ColoredString, Colorize};
use itertools::Itertools;
use std::ffi::OsString;

use super::beautifier::beautify_line;
use super::parser::{LineKind, parse_line};
use super::{DiagnosticLevel, OutputFormatter, TOOL_NAME};

/// Formatter that classifies and beautifies compiler output
#[derive(Debug, Clone, Copy)]
pub struct RichFormatter {
    color: bool,
}

impl RichFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

/// Everything colored goes to stderr, so stderr decides. A non-empty `NO_COLOR` wins.
pub fn stderr_color(requested: bool, stderr_is_terminal: bool, no_color: Option<OsString>) -> bool {
    requested && stderr_is_terminal && no_color.is_none_or(|value| value.is_empty())
}

fn paint_line(line: &str, kind: Option<LineKind>) -> String {
    let painted: ColoredString = match kind {
        Some(LineKind::Error) => line.red(),
        Some(LineKind::Warning) => line.green(),
        Some(LineKind::Message) => line.yellow(),
        Some(LineKind::Note) => line.blue(),
        None => return line.to_string(),
    };
    painted.to_string()
}

impl OutputFormatter for RichFormatter {
    fn format_output(&self, text: &str, color: bool, beautify: u8) -> String {
        text.lines()
            .filter_map(|raw| {
                let parsed = parse_line(raw);
                let line = beautify_line(raw, &parsed, beautify);
                if line.is_empty() {
                    return None;
                }
                Some(if color { paint_line(&line, parsed.kind) } else { line })
            })
            .join("\n")
    }

    fn render_message(&self, level: DiagnosticLevel, msg: &str) -> String {
        let text = format!("{}: {}: {}", TOOL_NAME, level.as_str(), msg);
        if !self.color {
            return text;
        }
        match level {
            DiagnosticLevel::Error => text.as_str().red().to_string(),
            DiagnosticLevel::Warning => text.as_str().green().to_string(),
            DiagnosticLevel::Note => text.as_str().blue().to_string(),
            DiagnosticLevel::Info => text.as_str().yellow().to_string(),
        }
    }
}
