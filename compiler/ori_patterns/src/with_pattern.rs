//! `with(acquire: r, action: f, release: g)` - scoped resource use.
//!
//! `release(resource)` runs after `action(resource)` whether the action
//! succeeded, failed, or was cancelled.

use ori_ir::PatternKind;

use crate::PatternDefinition;

#[derive(Clone, Copy)]
pub struct WithPattern;

impl PatternDefinition for WithPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::With
    }

    fn required_props(&self) -> &'static [&'static str] {
        &["acquire", "action"]
    }

    fn optional_props(&self) -> &'static [&'static str] {
        &["release"]
    }
}
