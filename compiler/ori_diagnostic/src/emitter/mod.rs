//! Diagnostic rendering.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Closing `aborting due to N previous errors` line.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
