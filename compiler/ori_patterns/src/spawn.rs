//! `spawn(body: expr)` - start a child task without awaiting it.
//!
//! The child is still part of the task tree: the spawning task does not
//! complete until it does. Evaluates to `()`.

use ori_ir::{Name, PatternKind};

use crate::PatternDefinition;

#[derive(Clone, Copy)]
pub struct SpawnPattern;

impl PatternDefinition for SpawnPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Spawn
    }

    fn required_props(&self) -> &'static [&'static str] {
        &["body"]
    }

    fn capabilities(&self) -> &'static [Name] {
        &[Name::ASYNC]
    }
}
