#![deny(clippy::arithmetic_side_effects)]
//! Ori Eval - runtime for the Ori pattern core.
//!
//! Runs a checked, contract-compiled [`Program`] under a structured
//! concurrency scheduler.
//!
//! # Architecture
//!
//! - [`Program`]: the immutable module, arena, interner, capability
//!   annotations and host externs, shared by every task
//! - [`Runtime`]: owns the scheduler and runtime-wide state (`cache`
//!   entries, observed contract violations) and runs an entry function as
//!   the root task
//! - `interpreter`: a tree walker, one per task thread
//! - [`scheduler`]: the task tree, cancellation, and [`TaskEvent`]s
//! - [`Channel`]: bounded and unbounded channels between tasks
//!
//! Tasks form a tree. A task is terminal only once its body has finished
//! and all of its children are terminal, so no child outlives its parent.

mod channel;
mod config;
mod environment;
pub mod errors;
mod interpreter;
mod operators;
mod program;
mod runtime;
pub mod scheduler;
mod value;

pub use channel::{Capacity, Channel, ChannelError};
pub use config::RuntimeConfig;
pub use environment::Environment;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use operators::{evaluate_binary, evaluate_unary};
pub use program::{HostFn, HostFunctions, Program};
pub use runtime::{ObservedViolation, RunOutcome, Runtime};
pub use scheduler::{
    CancelToken, TaskEvent, TaskId, TaskOrigin, TaskOutcome, TaskRecord, TaskSnapshot, TaskState,
    TaskTree,
};
pub use value::{FunctionValue, Lambda, Value};
