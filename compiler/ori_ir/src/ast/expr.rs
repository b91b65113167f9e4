//! Expression nodes.

use smallvec::SmallVec;

use super::Intrinsic;
use crate::{BinaryOp, ExprId, GuardId, Name, PatternId, Span, Spanned, UnaryOp};

/// An expression with its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// A call argument: `value` or `name: value`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallArg {
    pub name: Option<Name>,
    pub value: ExprId,
    pub span: Span,
}

impl CallArg {
    pub fn positional(value: ExprId, span: Span) -> Self {
        CallArg {
            name: None,
            value,
            span,
        }
    }

    pub fn named(name: Name, value: ExprId, span: Span) -> Self {
        CallArg {
            name: Some(name),
            value,
            span,
        }
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

impl Spanned for CallArg {
    fn span(&self) -> Span {
        self.span
    }
}

/// Left-hand side of a `let` binding.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BindingPattern {
    /// `let x = ...`
    Name(Name),
    /// `let (a, b) = ...`
    Tuple(Vec<Name>),
    /// `let _ = ...`
    Wildcard,
}

/// Pattern of a `match`/`for` arm.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MatchPattern {
    Wildcard,
    Binding(Name),
    Int(i64),
    Bool(bool),
    Some(Name),
    None,
    Ok(Name),
    Err(Name),
    /// Result of a `timeout` whose deadline elapsed first.
    TimedOut,
}

/// Expression kinds.
///
/// `Pattern`, `Intrinsic` and `Guard` never come out of the parser: the
/// classifier produces the first two from `Call` nodes, the contract
/// compiler produces guards.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Int(i64),
    Bool(bool),
    Str(Name),
    Unit,
    /// Duration literal in nanoseconds (`10ms`).
    Duration(u64),

    Ident(Name),
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    List(Vec<ExprId>),
    Tuple(Vec<ExprId>),
    Lambda {
        params: Vec<Name>,
        body: ExprId,
    },
    Call {
        func: ExprId,
        args: Vec<CallArg>,
    },
    Let {
        pattern: BindingPattern,
        value: ExprId,
    },
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    /// `pattern -> body`, only meaningful inside `match` and `for`.
    Arm {
        pattern: MatchPattern,
        body: ExprId,
    },
    /// `cond | "message"`, only meaningful inside `pre_check`/`post_check`.
    CheckMessage {
        cond: ExprId,
        message: Name,
    },
    /// `with Capability = provider in body`.
    WithCapability {
        capability: Name,
        provider: ExprId,
        body: ExprId,
    },

    Pattern(PatternId),
    Intrinsic {
        op: Intrinsic,
        args: Vec<ExprId>,
    },
    Guard(GuardId),
}

impl ExprKind {
    /// Direct child expressions in evaluation order.
    ///
    /// `Pattern` and `Guard` children live in side tables; use
    /// [`ExprArena::children`](crate::ExprArena::children) for a full walk.
    pub fn inline_children(&self) -> SmallVec<[ExprId; 4]> {
        let mut out = SmallVec::new();
        match self {
            ExprKind::Int(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Unit
            | ExprKind::Duration(_)
            | ExprKind::Ident(_)
            | ExprKind::Pattern(_)
            | ExprKind::Guard(_) => {}
            ExprKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            ExprKind::Unary { operand, .. } => out.push(*operand),
            ExprKind::List(items) | ExprKind::Tuple(items) => out.extend(items.iter().copied()),
            ExprKind::Lambda { body, .. } => out.push(*body),
            ExprKind::Call { func, args } => {
                out.push(*func);
                out.extend(args.iter().map(|a| a.value));
            }
            ExprKind::Let { value, .. } => out.push(*value),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                out.push(*else_branch);
            }
            ExprKind::Arm { body, .. } => out.push(*body),
            ExprKind::CheckMessage { cond, .. } => out.push(*cond),
            ExprKind::WithCapability { provider, body, .. } => {
                out.push(*provider);
                out.push(*body);
            }
            ExprKind::Intrinsic { args, .. } => out.extend(args.iter().copied()),
        }
        out
    }
}
