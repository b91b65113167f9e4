//! Human-readable diagnostic output with optional ANSI colors.

use std::io::{self, Write};

use ori_ir::Span;

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const HELP: &str = "\x1b[1;32m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Writes diagnostics as text.
///
/// Without source text, labels show raw byte ranges (`12..18`); with
/// [`TerminalEmitter::with_source`] they show `line:col`.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    lines: Option<LineOffsetTable>,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            lines: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.lines = Some(LineOffsetTable::build(source));
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn location(&self, span: Span) -> String {
        match &self.lines {
            Some(table) => {
                let (line, col) = table.span_start(span);
                format!("{line}:{col}")
            }
            None => format!("{span:?}"),
        }
    }
}

impl TerminalEmitter<io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::new(io::stderr(), mode, is_tty)
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => colors::ERROR,
        Severity::Warning => colors::WARNING,
        Severity::Note => colors::NOTE,
    }
}

fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.paint(
            &diagnostic.severity.to_string(),
            severity_color(diagnostic.severity),
        );
        self.paint(&format!("[{}]", diagnostic.code), colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let location = self.location(label.span);
            let _ = write!(self.writer, "  {marker} {location}: ");
            let color = if label.is_primary {
                colors::ERROR
            } else {
                colors::SECONDARY
            };
            self.paint(&label.message, color);
            let _ = writeln!(self.writer);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.paint("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "  = ");
            self.paint("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.paint("error", colors::ERROR);
            let errors = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {errors}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {errors}");
            }
        } else if warning_count > 0 {
            self.paint("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}
