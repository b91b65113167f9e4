//! `parallel(name: expr, ...)` - run every branch as a child task.
//!
//! Branch names are arbitrary; the result is a tuple of branch values in
//! declaration order.

use ori_ir::{Name, PatternKind};

use crate::{MalformedReason, PatternDefinition, PatternError, ShapeContext};

#[derive(Clone, Copy)]
pub struct ParallelPattern;

impl PatternDefinition for ParallelPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Parallel
    }

    fn allows_arbitrary_props(&self) -> bool {
        true
    }

    fn capabilities(&self) -> &'static [Name] {
        &[Name::ASYNC]
    }

    fn check_shape(&self, ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
        if ctx.args.is_empty() {
            return Err(ctx.malformed(ctx.span, MalformedReason::NoBranches));
        }
        Ok(())
    }
}
