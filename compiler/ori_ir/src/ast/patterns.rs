//! Built-in pattern nodes.
//!
//! Ori distinguishes two syntactic families of built-in patterns:
//!
//! - **`function_seq`** (`run`, `try`, `match`, `catch`): a bare, ordered
//!   sequence of expressions. Order matters; arguments are never named
//!   (`run` additionally accepts `pre_check:`/`post_check:` at its edges).
//! - **`function_exp`** (`recurse`, `parallel`, `spawn`, `timeout`, `cache`,
//!   `with`, `for`): every argument is a named property.
//!
//! The family is fixed by the pattern kind and checked exactly once, when the
//! classifier turns a call into a [`PatternNode`].

use crate::{CallArg, ChecksBlock, ExprId, Name, Span, Spanned};

/// Syntactic family of a pattern.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatternFamily {
    /// Positional sequence of expressions.
    Seq,
    /// Named properties only.
    Exp,
}

impl PatternFamily {
    pub fn name(self) -> &'static str {
        match self {
            PatternFamily::Seq => "function_seq",
            PatternFamily::Exp => "function_exp",
        }
    }
}

/// The eleven built-in patterns.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatternKind {
    // function_seq
    Run,
    Try,
    Match,
    Catch,
    // function_exp
    Recurse,
    Parallel,
    Spawn,
    Timeout,
    Cache,
    With,
    For,
}

impl PatternKind {
    pub const ALL: [PatternKind; 11] = [
        PatternKind::Run,
        PatternKind::Try,
        PatternKind::Match,
        PatternKind::Catch,
        PatternKind::Recurse,
        PatternKind::Parallel,
        PatternKind::Spawn,
        PatternKind::Timeout,
        PatternKind::Cache,
        PatternKind::With,
        PatternKind::For,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Run => "run",
            PatternKind::Try => "try",
            PatternKind::Match => "match",
            PatternKind::Catch => "catch",
            PatternKind::Recurse => "recurse",
            PatternKind::Parallel => "parallel",
            PatternKind::Spawn => "spawn",
            PatternKind::Timeout => "timeout",
            PatternKind::Cache => "cache",
            PatternKind::With => "with",
            PatternKind::For => "for",
        }
    }

    /// Resolve a callee name to a pattern kind.
    ///
    /// This is the only place a pattern is identified by its spelling.
    /// Type conversions (`as`, `as?`) are a separate grammar production and
    /// never reach this table.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "run" => PatternKind::Run,
            "try" => PatternKind::Try,
            "match" => PatternKind::Match,
            "catch" => PatternKind::Catch,
            "recurse" => PatternKind::Recurse,
            "parallel" => PatternKind::Parallel,
            "spawn" => PatternKind::Spawn,
            "timeout" => PatternKind::Timeout,
            "cache" => PatternKind::Cache,
            "with" => PatternKind::With,
            "for" => PatternKind::For,
            _ => return None,
        })
    }

    pub fn family(self) -> PatternFamily {
        match self {
            PatternKind::Run | PatternKind::Try | PatternKind::Match | PatternKind::Catch => {
                PatternFamily::Seq
            }
            PatternKind::Recurse
            | PatternKind::Parallel
            | PatternKind::Spawn
            | PatternKind::Timeout
            | PatternKind::Cache
            | PatternKind::With
            | PatternKind::For => PatternFamily::Exp,
        }
    }

    /// Patterns whose evaluation creates child tasks.
    pub fn is_concurrent(self) -> bool {
        matches!(
            self,
            PatternKind::Parallel | PatternKind::Spawn | PatternKind::Timeout
        )
    }
}

/// A classified pattern invocation.
///
/// Produced by the classifier from a `Call` node. Argument shape matches
/// `family`; `checks` is only ever set on `run`, and is cleared by the
/// contract compiler once guards have been inserted.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PatternNode {
    pub family: PatternFamily,
    pub kind: PatternKind,
    pub args: Vec<CallArg>,
    pub checks: Option<ChecksBlock>,
    pub span: Span,
}

impl PatternNode {
    pub fn new(kind: PatternKind, args: Vec<CallArg>, span: Span) -> Self {
        PatternNode {
            family: kind.family(),
            kind,
            args,
            checks: None,
            span,
        }
    }

    #[must_use]
    pub fn with_checks(mut self, checks: Option<ChecksBlock>) -> Self {
        self.checks = checks.filter(|c| !c.is_empty());
        self
    }

    /// Value of the named property `name`, if present.
    pub fn prop(&self, name: Name) -> Option<ExprId> {
        self.args
            .iter()
            .find(|arg| arg.name == Some(name))
            .map(|arg| arg.value)
    }

    /// Positional arguments in order (the whole argument list for `Seq`).
    pub fn positional(&self) -> impl Iterator<Item = ExprId> + '_ {
        self.args
            .iter()
            .filter(|arg| arg.name.is_none())
            .map(|arg| arg.value)
    }

    pub fn has_checks(&self) -> bool {
        self.checks.is_some()
    }
}

impl Spanned for PatternNode {
    fn span(&self) -> Span {
        self.span
    }
}

/// Runtime intrinsics recognized by the classifier.
///
/// These are ordinary calls syntactically; classification turns them into
/// `ExprKind::Intrinsic` so later passes match on an enum instead of
/// re-comparing callee names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Intrinsic {
    /// `channel()` / `channel(capacity)` -> `(producer, consumer)`
    Channel,
    /// `send(producer, value)`
    Send,
    /// `recv(consumer)` -> `Some(value)` or `None` once closed
    Recv,
    /// `close(producer)`
    Close,
    /// `sleep(duration)`
    Sleep,
    /// `panic(message)`
    Panic,
}

impl Intrinsic {
    pub const ALL: [Intrinsic; 6] = [
        Intrinsic::Channel,
        Intrinsic::Send,
        Intrinsic::Recv,
        Intrinsic::Close,
        Intrinsic::Sleep,
        Intrinsic::Panic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Channel => "channel",
            Intrinsic::Send => "send",
            Intrinsic::Recv => "recv",
            Intrinsic::Close => "close",
            Intrinsic::Sleep => "sleep",
            Intrinsic::Panic => "panic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Accepted argument counts, inclusive.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Intrinsic::Channel => (0, 1),
            Intrinsic::Send => (2, 2),
            Intrinsic::Recv | Intrinsic::Close | Intrinsic::Sleep | Intrinsic::Panic => (1, 1),
        }
    }

    /// Whether executing this intrinsic may suspend the calling task.
    pub fn may_suspend(self) -> bool {
        matches!(self, Intrinsic::Send | Intrinsic::Recv | Intrinsic::Sleep)
    }

    /// Whether this intrinsic touches the task scheduler (and so needs `Async`).
    pub fn is_async(self) -> bool {
        !matches!(self, Intrinsic::Panic)
    }
}
