//! `recurse(condition: bool, base: value, step: expr, memo: bool)`
//!
//! Conditional recursion. Inside `step`, `self` names the enclosing
//! function; with `memo: true` calls through `self` are memoized for the
//! duration of the outermost call.

use ori_ir::{Name, PatternKind};

use crate::{PatternDefinition, ScopedBinding};

#[derive(Clone, Copy)]
pub struct RecursePattern;

impl PatternDefinition for RecursePattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Recurse
    }

    fn required_props(&self) -> &'static [&'static str] {
        &["condition", "base", "step"]
    }

    fn optional_props(&self) -> &'static [&'static str] {
        &["memo"]
    }

    fn scoped_bindings(&self) -> &'static [ScopedBinding] {
        static BINDINGS: [ScopedBinding; 1] = [ScopedBinding {
            name: Name::SELF_FN,
            for_props: &["step"],
        }];
        &BINDINGS
    }
}
