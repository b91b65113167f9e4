//! Ori IR: data types shared by every stage of the pattern core.
//!
//! - [`Span`] and [`Name`] for source positions and interned identifiers
//! - [`ExprArena`] holding expressions, classified [`PatternNode`]s and
//!   contract [`Guard`]s
//! - [`FunctionSignature`], [`ExternFunction`] and [`Module`]
//! - [`CapabilitySet`] for effect tracking
//! - [`AstBuilder`] for constructing modules without a parser
//!
//! # Design
//!
//! - **Intern everything**: identifiers, capability names and messages are
//!   [`Name`]s, so equality is an integer compare.
//! - **Flatten everything**: no `Box<Expr>`; nodes reference each other by
//!   32-bit ids into the arena.
//! - **Rewrite in place**: passes replace a node's kind but never its id or
//!   span.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod builder;
mod capability;
mod expr_id;
mod interner;
mod name;
mod operators;
mod span;
mod symbols;
mod traits;
pub mod visitor;

pub use arena::{ExprArena, SharedArena};
pub use ast::{
    BindingPattern, CallArg, CheckCondition, CheckMode, CheckModeParseError, CheckPhase,
    ChecksBlock, ConditionGroup, Expr, ExprKind, ExternFunction, FunctionSignature, Guard,
    Intrinsic, MatchPattern, Module, Param, PatternFamily, PatternKind, PatternNode,
};
pub use builder::AstBuilder;
pub use capability::{is_marker_capability, CapabilitySet, DisplayCapabilities};
pub use expr_id::{ExprId, ExternId, FunctionId, GuardId, PatternId};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use operators::{BinaryOp, UnaryOp};
pub use span::Span;
pub use symbols::{Symbol, SymbolTable};
pub use traits::{Named, Spanned};
