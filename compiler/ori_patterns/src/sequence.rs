//! The `function_seq` patterns: `run`, `try`, `match`, `catch`.
//!
//! Their arguments are an ordered list of expressions; the family rules
//! (no named arguments, checks only at the edges of `run`) are enforced by
//! the classifier before `check_shape` sees the body.

use ori_ir::PatternKind;

use crate::{MalformedReason, PatternDefinition, PatternError, ShapeContext};

/// `run(e1, e2, ..., en)` - sequential scope, evaluates to `en`.
#[derive(Clone, Copy)]
pub struct RunPattern;

impl PatternDefinition for RunPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Run
    }

    fn check_shape(&self, ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
        non_empty(ctx)
    }
}

/// `try(e1, ..., en)` - like `run`, but a binding of `Err`/`None`
/// returns it early.
#[derive(Clone, Copy)]
pub struct TryPattern;

impl PatternDefinition for TryPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Try
    }

    fn check_shape(&self, ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
        non_empty(ctx)
    }
}

/// `match(scrutinee, pattern -> expr, ...)`
#[derive(Clone, Copy)]
pub struct MatchExprPattern;

impl PatternDefinition for MatchExprPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Match
    }

    fn check_shape(&self, ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
        let Some((scrutinee, arms)) = ctx.args.split_first() else {
            return Err(ctx.malformed(ctx.span, MalformedReason::MissingScrutinee));
        };
        if ctx.is_arm(scrutinee.value) {
            return Err(ctx.malformed(scrutinee.span, MalformedReason::MissingScrutinee));
        }
        if arms.is_empty() {
            return Err(ctx.malformed(
                ctx.span,
                MalformedReason::ArgumentCount {
                    expected: 2,
                    found: 1,
                },
            ));
        }
        for (offset, arm) in arms.iter().enumerate() {
            if !ctx.is_arm(arm.value) {
                return Err(ctx.malformed(
                    arm.span,
                    MalformedReason::ExpectedArm { index: offset + 1 },
                ));
            }
        }
        Ok(())
    }
}

/// `catch(expr)` - turns a runtime failure of `expr` into `Err(message)`.
#[derive(Clone, Copy)]
pub struct CatchPattern;

impl PatternDefinition for CatchPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Catch
    }

    fn check_shape(&self, ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
        if ctx.args.len() == 1 {
            Ok(())
        } else {
            Err(ctx.malformed(
                ctx.span,
                MalformedReason::ArgumentCount {
                    expected: 1,
                    found: ctx.args.len(),
                },
            ))
        }
    }
}

fn non_empty(ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
    if ctx.args.is_empty() {
        Err(ctx.malformed(ctx.span, MalformedReason::EmptyBody))
    } else {
        Ok(())
    }
}
