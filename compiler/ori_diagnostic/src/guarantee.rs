use std::fmt;

/// Proof that at least one error diagnostic was emitted.
///
/// Only [`DiagnosticQueue`](crate::DiagnosticQueue) and
/// [`ErrorGuaranteed::from_error_count`] can create one.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// `Some` when `count > 0`.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then_some(ErrorGuaranteed(()))
    }

    pub(crate) fn new_emitted() -> Self {
        ErrorGuaranteed(())
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}

impl std::error::Error for ErrorGuaranteed {}

#[cfg(test)]
mod tests;
