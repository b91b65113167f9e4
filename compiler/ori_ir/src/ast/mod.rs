//! AST node types consumed by the pattern core.
//!
//! The parser is an external collaborator: it hands over an [`ExprArena`]
//! holding [`Expr`] nodes and a [`Module`] of signatures. Passes in this
//! workspace rewrite arena nodes in place (pattern classification, contract
//! desugaring) but never change a node's span.
//!
//! [`ExprArena`]: crate::ExprArena

mod checks;
mod expr;
mod items;
mod patterns;

pub use checks::{CheckCondition, CheckMode, CheckModeParseError, CheckPhase, ChecksBlock, ConditionGroup, Guard};
pub use expr::{BindingPattern, CallArg, Expr, ExprKind, MatchPattern};
pub use items::{ExternFunction, FunctionSignature, Module, Param};
pub use patterns::{Intrinsic, PatternFamily, PatternKind, PatternNode};
