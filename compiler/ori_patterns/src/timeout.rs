//! `timeout(duration: d, body: expr)` - race `body` against a deadline.
//!
//! Evaluates to `Ok(value)` when the body wins and `Err(TimedOut)` when the
//! deadline does.

use ori_ir::{Name, PatternKind};

use crate::PatternDefinition;

#[derive(Clone, Copy)]
pub struct TimeoutPattern;

impl PatternDefinition for TimeoutPattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Timeout
    }

    fn required_props(&self) -> &'static [&'static str] {
        &["duration", "body"]
    }

    fn capabilities(&self) -> &'static [Name] {
        &[Name::ASYNC]
    }
}
