//! Diagnostic queue: collects, deduplicates, limits and sorts diagnostics.
//!
//! Passes push everything they find; the session drains the queue once at
//! the end of compilation. Sorting is by source position so output order
//! does not depend on the order passes ran in (the capability checker works
//! on functions in parallel).

use ori_ir::Span;

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, ErrorGuaranteed};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 50,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// No limit, no deduplication. Used by tests.
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct QueuedDiagnostic {
    diagnostic: Diagnostic,
    /// Insertion order; keeps the sort stable for equal positions.
    seq: usize,
}

impl QueuedDiagnostic {
    fn sort_key(&self) -> (u32, u32, usize) {
        let span = self.diagnostic.primary_span().unwrap_or(Span::DUMMY);
        (span.start, span.end, self.seq)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<QueuedDiagnostic>,
    error_count: usize,
    dropped: usize,
    config: DiagnosticConfig,
    lines: Option<LineOffsetTable>,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Attach source text so [`DiagnosticQueue::line_col`] can resolve spans.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.lines = Some(LineOffsetTable::build(source));
        self
    }

    /// Queue a diagnostic. Returns `false` if it was filtered out.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if diag.is_error() && self.limit_reached() {
            self.dropped += 1;
            return false;
        }
        if self.config.deduplicate && self.diagnostics.iter().any(|q| q.diagnostic == diag) {
            return false;
        }
        if diag.is_error() {
            self.error_count += 1;
        }
        let seq = self.diagnostics.len();
        self.diagnostics.push(QueuedDiagnostic {
            diagnostic: diag,
            seq,
        });
        true
    }

    /// Queue an error and return the proof that it was reported.
    ///
    /// The proof is returned even when the limit filtered the diagnostic
    /// out: the limit only applies once earlier errors exist.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a non-error");
        self.add(diag);
        ErrorGuaranteed::new_emitted()
    }

    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.add(diag);
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Errors discarded because the limit was reached.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// `(line, column)` of a span's start, when source was attached.
    pub fn line_col(&self, span: Span) -> Option<(u32, u32)> {
        self.lines.as_ref().map(|t| t.span_start(span))
    }

    /// Drain all diagnostics sorted by primary span.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut queued = std::mem::take(&mut self.diagnostics);
        queued.sort_by_key(QueuedDiagnostic::sort_key);
        self.error_count = 0;
        queued.into_iter().map(|q| q.diagnostic).collect()
    }
}
