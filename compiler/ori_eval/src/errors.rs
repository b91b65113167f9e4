//! Runtime errors.
//!
//! Every failure inside the evaluator is an [`EvalError`] propagated with
//! `?`. Construct them through the factory functions in this module so the
//! message always matches the kind.

use std::fmt;

use ori_ir::{BinaryOp, CheckPhase, Span};

/// Structured error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    ModuloByZero,
    IntegerOverflow {
        operation: &'static str,
    },

    // Type/Operator
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
    InvalidBinaryOp {
        type_name: &'static str,
        op: BinaryOp,
    },

    // Access
    UndefinedVariable {
        name: String,
    },
    UndefinedFunction {
        name: String,
    },
    NotCallable {
        type_name: &'static str,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    StackOverflow {
        limit: usize,
    },

    // Pattern
    NonExhaustiveMatch,
    Unhashable {
        type_name: &'static str,
    },

    // Contracts
    CheckFailed {
        phase: CheckPhase,
        /// Zero-based index of the failing condition.
        index: usize,
        message: String,
    },

    // Tasks and channels
    /// Unwinding signal of a cancelled task. Never caught by `catch`.
    Cancelled,
    SuspensionNotAllowed {
        operation: &'static str,
    },
    ChannelClosed,
    InvalidCapacity {
        capacity: i64,
    },
    TaskSpawn {
        message: String,
    },

    Panic {
        message: String,
    },
    Host {
        name: String,
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulo by zero"),
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),

            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::InvalidBinaryOp { type_name, op } => write!(
                f,
                "operator `{}` cannot be applied to {type_name}",
                op.as_symbol()
            ),

            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::UndefinedFunction { name } => write!(f, "undefined function: @{name}"),
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::StackOverflow { limit } => {
                write!(f, "maximum recursion depth exceeded (limit: {limit})")
            }

            Self::NonExhaustiveMatch => write!(f, "non-exhaustive match"),
            Self::Unhashable { type_name } => write!(f, "{type_name} cannot be used as a cache key"),

            Self::CheckFailed { message, .. } => write!(f, "{message}"),

            Self::Cancelled => write!(f, "task cancelled"),
            Self::SuspensionNotAllowed { operation } => write!(
                f,
                "`{operation}` may suspend, but the enclosing function does not use Async"
            ),
            Self::ChannelClosed => write!(f, "send on a closed channel"),
            Self::InvalidCapacity { capacity } => {
                write!(f, "channel capacity must be at least 1, got {capacity}")
            }
            Self::TaskSpawn { message } => write!(f, "could not start task: {message}"),

            Self::Panic { message } => write!(f, "panic: {message}"),
            Self::Host { name, message } => write!(f, "extern `{name}` failed: {message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    pub span: Option<Span>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
        }
    }

    /// Attach `span` unless a more precise one is already set.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == EvalErrorKind::Cancelled
    }

    pub fn is_check_failure(&self) -> bool {
        matches!(self.kind, EvalErrorKind::CheckFailed { .. })
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

// Arithmetic

pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

// Type/Operator

pub fn type_mismatch(expected: &'static str, got: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch { expected, got })
}

pub fn invalid_binary_op(type_name: &'static str, op: BinaryOp) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp { type_name, op })
}

// Access

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

pub fn not_callable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { type_name })
}

pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { limit })
}

// Pattern

pub fn non_exhaustive_match() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonExhaustiveMatch)
}

pub fn unhashable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Unhashable { type_name })
}

// Contracts

pub fn check_failed(phase: CheckPhase, index: usize, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CheckFailed {
        phase,
        index,
        message: message.into(),
    })
}

// Tasks and channels

pub fn cancelled() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Cancelled)
}

pub fn suspension_not_allowed(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SuspensionNotAllowed { operation })
}

pub fn channel_closed() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ChannelClosed)
}

pub fn invalid_capacity(capacity: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidCapacity { capacity })
}

pub fn task_spawn_failed(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TaskSpawn {
        message: message.into(),
    })
}

// Miscellaneous

pub fn panic_called(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Panic {
        message: message.into(),
    })
}

pub fn host_failed(name: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Host {
        name: name.to_string(),
        message: message.into(),
    })
}
