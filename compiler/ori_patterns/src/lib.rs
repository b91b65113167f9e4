//! Ori Patterns - the built-in pattern table and the call classifier.
//!
//! This crate provides:
//! - [`PatternDefinition`]: the static description of one built-in pattern
//!   (family, properties, scoped bindings, intrinsic capabilities)
//! - [`PatternRegistry`]: enum-dispatched lookup from [`PatternKind`]
//! - [`classify_call`] / [`classify_module`]: turn parsed calls into
//!   [`PatternNode`]s and intrinsic nodes, or report [`PatternError`]s
//!
//! # Architecture
//!
//! Adding a pattern means adding a `PatternKind` variant, one definition
//! type, and one registry arm. The classifier never matches on pattern
//! names; it only asks the definition.
//!
//! [`PatternKind`]: ori_ir::PatternKind
//! [`PatternNode`]: ori_ir::PatternNode

mod classify;
mod errors;
mod registry;

// Pattern definitions
mod cache;
mod for_pattern;
mod parallel;
mod recurse;
mod sequence;
mod spawn;
mod timeout;
mod with_pattern;

use ori_ir::{CallArg, ExprArena, ExprId, ExprKind, Name, PatternFamily, PatternKind, Span, StringInterner};

pub use classify::{classify_call, classify_module, Classified, ClassifyOutput};
pub use errors::{CheckProblem, IntrinsicProblem, MalformedReason, PatternError};
pub use registry::PatternRegistry;

/// A name the pattern binds while evaluating some of its properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScopedBinding {
    pub name: Name,
    /// Properties in which `name` is visible.
    pub for_props: &'static [&'static str],
}

/// Arguments of one pattern call as seen by shape validation.
///
/// For `Seq` patterns `args` holds only the body (checks already split off);
/// for `Exp` patterns every argument is named and names are unique.
pub struct ShapeContext<'a> {
    pub arena: &'a ExprArena,
    pub interner: &'a StringInterner,
    pub kind: PatternKind,
    pub args: &'a [CallArg],
    pub span: Span,
}

impl ShapeContext<'_> {
    /// Value of the named property, if present.
    pub fn prop(&self, name: &str) -> Option<&CallArg> {
        let target = self.interner.get(name)?;
        self.args.iter().find(|arg| arg.name == Some(target))
    }

    pub fn is_arm(&self, id: ExprId) -> bool {
        matches!(self.arena.kind(id), ExprKind::Arm { .. })
    }

    pub fn malformed(&self, span: Span, reason: MalformedReason) -> PatternError {
        PatternError::Malformed {
            kind: self.kind,
            reason,
            span,
        }
    }
}

/// Static description of a built-in pattern.
///
/// Implementors are zero-sized and live in statics inside the registry.
pub trait PatternDefinition: Send + Sync {
    fn kind(&self) -> PatternKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn family(&self) -> PatternFamily {
        self.kind().family()
    }

    /// Required property names (`Exp` patterns only).
    fn required_props(&self) -> &'static [&'static str] {
        &[]
    }

    /// Optional property names (`Exp` patterns only).
    fn optional_props(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether any property name is accepted. Only `parallel` uses this,
    /// for its named branches.
    fn allows_arbitrary_props(&self) -> bool {
        false
    }

    /// Capabilities the pattern needs regardless of its arguments.
    fn capabilities(&self) -> &'static [Name] {
        &[]
    }

    fn scoped_bindings(&self) -> &'static [ScopedBinding] {
        &[]
    }

    /// Pattern-specific shape rules, run after the family rules passed.
    fn check_shape(&self, ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
        let _ = ctx;
        Ok(())
    }
}
