//! Classification errors.
//!
//! Each error carries typed data; the text is produced only when the error
//! is turned into a [`Diagnostic`], because names need the interner.

use ori_diagnostic::{Diagnostic, ErrorCode};
use ori_ir::{CheckPhase, Intrinsic, Name, PatternKind, Span, StringInterner};

/// Why a pattern call's arguments do not fit its family or shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    /// `function_exp` pattern given a positional argument.
    PositionalArgument { index: usize },
    /// `function_seq` pattern given a named argument.
    NamedArgument { name: Name },
    MissingProperty { name: &'static str },
    UnknownProperty { name: Name },
    DuplicateProperty { name: Name },
    /// A sequence pattern with no body expression.
    EmptyBody,
    /// Wrong number of positional arguments.
    ArgumentCount { expected: usize, found: usize },
    /// `match` without a scrutinee.
    MissingScrutinee,
    /// An argument that must be `pattern -> expr` is not.
    ExpectedArm { index: usize },
    /// `parallel` with no branches.
    NoBranches,
}

/// Why a `pre_check:` or `post_check:` is rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckProblem {
    /// `pre_check` not in first position.
    NotFirst,
    /// `post_check` not in last position.
    NotLast,
    Duplicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntrinsicProblem {
    Arity { min: usize, max: usize, found: usize },
    NamedArgument { name: Name },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// E3002
    Malformed {
        kind: PatternKind,
        reason: MalformedReason,
        span: Span,
    },
    /// E3004
    CheckPosition {
        kind: PatternKind,
        phase: CheckPhase,
        problem: CheckProblem,
        span: Span,
    },
    /// E3001
    Intrinsic {
        op: Intrinsic,
        problem: IntrinsicProblem,
        span: Span,
    },
}

impl PatternError {
    pub fn span(&self) -> Span {
        match self {
            PatternError::Malformed { span, .. }
            | PatternError::CheckPosition { span, .. }
            | PatternError::Intrinsic { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PatternError::Malformed { .. } => ErrorCode::E3002,
            PatternError::CheckPosition { .. } => ErrorCode::E3004,
            PatternError::Intrinsic { .. } => ErrorCode::E3001,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, PatternError::Malformed { .. })
    }

    pub fn into_diagnostic(self, interner: &StringInterner) -> Diagnostic {
        let code = self.code();
        match self {
            PatternError::Malformed { kind, reason, span } => {
                malformed_diagnostic(kind, &reason, span, interner)
            }
            PatternError::CheckPosition {
                phase,
                problem,
                span,
                ..
            } => {
                let (message, label) = match problem {
                    CheckProblem::NotFirst => (
                        format!("`{phase}` must be the first argument of `run`"),
                        "move this to the start of `run(...)`",
                    ),
                    CheckProblem::NotLast => (
                        format!("`{phase}` must be the last argument of `run`"),
                        "move this to the end of `run(...)`",
                    ),
                    CheckProblem::Duplicate => (
                        format!("`{phase}` given more than once"),
                        "combine conditions with a list: `[a, b]`",
                    ),
                };
                Diagnostic::error(code)
                    .with_message(message)
                    .with_label(span, label)
            }
            PatternError::Intrinsic { op, problem, span } => {
                let message = match problem {
                    IntrinsicProblem::Arity { min, max, found } if min == max => format!(
                        "`{}` takes {min} argument{}, found {found}",
                        op.name(),
                        if min == 1 { "" } else { "s" }
                    ),
                    IntrinsicProblem::Arity { min, max, found } => format!(
                        "`{}` takes {min} to {max} arguments, found {found}",
                        op.name()
                    ),
                    IntrinsicProblem::NamedArgument { name } => format!(
                        "`{}` does not take named arguments (found `{}:`)",
                        op.name(),
                        interner.lookup(name)
                    ),
                };
                Diagnostic::error(code)
                    .with_message(message)
                    .with_label(span, "in this call")
            }
        }
    }
}

fn malformed_diagnostic(
    kind: PatternKind,
    reason: &MalformedReason,
    span: Span,
    interner: &StringInterner,
) -> Diagnostic {
    let pattern = kind.name();
    let family = kind.family().name();
    let diag = Diagnostic::error(ErrorCode::E3002);
    match reason {
        MalformedReason::PositionalArgument { index } => diag
            .with_message(format!(
                "`{pattern}` requires named arguments, argument {} is positional",
                index + 1
            ))
            .with_label(span, "positional argument")
            .with_note(format!("`{pattern}` is a {family} pattern: every argument is `name: value`")),
        MalformedReason::NamedArgument { name } => diag
            .with_message(format!(
                "`{pattern}` takes a sequence of expressions, not named argument `{}`",
                interner.lookup(*name)
            ))
            .with_label(span, "named argument")
            .with_note(format!("`{pattern}` is a {family} pattern: arguments are positional")),
        MalformedReason::MissingProperty { name } => diag
            .with_message(format!("`{pattern}` is missing required argument `{name}`"))
            .with_label(span, format!("add `{name}: ...`")),
        MalformedReason::UnknownProperty { name } => diag
            .with_message(format!(
                "`{pattern}` has no argument named `{}`",
                interner.lookup(*name)
            ))
            .with_label(span, "unknown argument"),
        MalformedReason::DuplicateProperty { name } => diag
            .with_message(format!(
                "argument `{}` given more than once to `{pattern}`",
                interner.lookup(*name)
            ))
            .with_label(span, "duplicate argument"),
        MalformedReason::EmptyBody => diag
            .with_message(format!("`{pattern}` needs at least one expression"))
            .with_label(span, "empty sequence"),
        MalformedReason::ArgumentCount { expected, found } => diag
            .with_message(format!(
                "`{pattern}` takes {expected} expression{}, found {found}",
                if *expected == 1 { "" } else { "s" }
            ))
            .with_label(span, "wrong number of expressions"),
        MalformedReason::MissingScrutinee => diag
            .with_message("`match` needs a value to match on")
            .with_label(span, "write `match(value, pattern -> result, ...)`"),
        MalformedReason::ExpectedArm { index } => diag
            .with_message(format!(
                "argument {} of `{pattern}` must be an arm `pattern -> expression`",
                index + 1
            ))
            .with_label(span, "not an arm"),
        MalformedReason::NoBranches => diag
            .with_message("`parallel` needs at least one named branch")
            .with_label(span, "write `parallel(name: expr, ...)`"),
    }
}
