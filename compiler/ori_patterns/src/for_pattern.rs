//! `for(over: items, match: pattern -> expr, default: value, map: f)`
//!
//! Yields the arm body for the first element (after `map`) matching the
//! arm's pattern, or `default` if none does.

use ori_ir::PatternKind;

use crate::{MalformedReason, PatternDefinition, PatternError, ShapeContext};

#[derive(Clone, Copy)]
pub struct ForPattern;

impl PatternDefinition for ForPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::For
    }

    fn required_props(&self) -> &'static [&'static str] {
        &["over", "match", "default"]
    }

    fn optional_props(&self) -> &'static [&'static str] {
        &["map"]
    }

    fn check_shape(&self, ctx: &ShapeContext<'_>) -> Result<(), PatternError> {
        let Some(arm) = ctx.prop("match") else {
            return Ok(());
        };
        if ctx.is_arm(arm.value) {
            return Ok(());
        }
        let index = ctx
            .args
            .iter()
            .position(|a| a.value == arm.value)
            .unwrap_or_default();
        Err(ctx.malformed(arm.span, MalformedReason::ExpectedArm { index }))
    }
}
