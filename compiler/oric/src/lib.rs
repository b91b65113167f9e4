//! Ori Compiler - session wiring for the pattern core.
//!
//! Takes an already-built [`Module`](ori_ir::Module) and
//! [`ExprArena`](ori_ir::ExprArena) through every static phase and hands
//! the result to the runtime:
//!
//! 1. `ori_patterns` classifies pattern calls and intrinsics
//! 2. `ori_capabilities` checks declared capabilities
//! 3. `ori_canon` compiles `pre_check`/`post_check` per [`CheckMode`](ori_ir::CheckMode)
//! 4. `ori_eval` runs the result as a structured task tree
//!
//! ```text
//! let session = Session::from_env()?;
//! let compiled = session.compile(module, arena, interner)?;
//! let outcome = session.run(compiled, "main", vec![]);
//! std::process::exit(outcome.exit_code());
//! ```
//!
//! Call [`init_tracing`] once at startup to see pass and task logs.

pub mod config;
pub mod session;
pub mod tracing_setup;

pub use config::{CompilerConfig, ConfigError};
pub use session::{CompileFailure, CompiledModule, Session};
pub use tracing_setup::init_tracing;

pub use ori_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};
pub use ori_eval::{
    EvalError, EvalErrorKind, HostFunctions, RunOutcome, Runtime, RuntimeConfig, TaskEvent,
    TaskOrigin, TaskOutcome, TaskState, Value,
};
pub use ori_ir::{AstBuilder, CheckMode};
