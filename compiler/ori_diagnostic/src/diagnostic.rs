use std::fmt;

use ori_ir::Span;

use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    /// The main error location.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Related context.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A diagnostic with everything needed to render it.
///
/// Built with the `with_*` methods:
///
/// ```text
/// Diagnostic::error(ErrorCode::E2014)
///     .with_message("`fetch` uses `Async` but does not declare it")
///     .with_label(span, "requires `Async`")
///     .with_suggestion("add `uses Async` to the signature")
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// First primary label's span.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {:?}: {}", marker, label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {suggestion}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
