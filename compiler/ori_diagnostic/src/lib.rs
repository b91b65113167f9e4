//! Diagnostic system for the pattern core.
//!
//! Every compile-time error carries:
//! - an error code for searchability
//! - a message saying what went wrong
//! - a primary span saying where
//! - labels, notes and suggestions giving context and a fix
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that at least one error was
//! emitted. A pass that fails returns it instead of a bare `Err(())`, so an
//! error can never be swallowed without being reported.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn check_module(..) -> Result<Annotations, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
