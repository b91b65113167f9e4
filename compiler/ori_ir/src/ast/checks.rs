//! Contract nodes: `pre_check:` / `post_check:` and their desugared guards.

use std::fmt;
use std::str::FromStr;

use crate::{ExprId, Name, Span, Spanned};

/// One condition of a check, optionally carrying a custom message.
///
/// `pre_check: b != 0 | "divisor must be non-zero"` produces a condition
/// with `message = Some(..)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CheckCondition {
    pub expr: ExprId,
    pub message: Option<Name>,
    pub span: Span,
}

impl Spanned for CheckCondition {
    fn span(&self) -> Span {
        self.span
    }
}

/// A check argument: one condition or a bracketed list of them.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConditionGroup {
    Single(CheckCondition),
    List(Vec<CheckCondition>),
}

impl ConditionGroup {
    pub fn as_slice(&self) -> &[CheckCondition] {
        match self {
            ConditionGroup::Single(cond) => std::slice::from_ref(cond),
            ConditionGroup::List(conds) => conds,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Contract attached to a `run` pattern.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ChecksBlock {
    pub pre: Option<ConditionGroup>,
    pub post: Option<ConditionGroup>,
}

impl ChecksBlock {
    /// True when neither phase carries a condition.
    pub fn is_empty(&self) -> bool {
        group_is_empty(self.pre.as_ref()) && group_is_empty(self.post.as_ref())
    }

    pub fn group(&self, phase: CheckPhase) -> Option<&ConditionGroup> {
        match phase {
            CheckPhase::Pre => self.pre.as_ref(),
            CheckPhase::Post => self.post.as_ref(),
        }
    }
}

fn group_is_empty(group: Option<&ConditionGroup>) -> bool {
    match group {
        None => true,
        Some(group) => group.is_empty(),
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CheckPhase {
    Pre,
    Post,
}

impl CheckPhase {
    /// Property name as written in source.
    pub fn keyword(self) -> &'static str {
        match self {
            CheckPhase::Pre => "pre_check",
            CheckPhase::Post => "post_check",
        }
    }

    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "pre_check" => Some(CheckPhase::Pre),
            "post_check" => Some(CheckPhase::Post),
            _ => None,
        }
    }

    /// Message used when a failing condition has none of its own.
    pub fn default_message(self) -> &'static str {
        match self {
            CheckPhase::Pre => "pre_check failed",
            CheckPhase::Post => "post_check failed",
        }
    }
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// How contract guards behave at runtime. Fixed once per compilation unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CheckMode {
    /// A failing guard aborts the enclosing task.
    #[default]
    Enforce,
    /// A failing guard is logged and recorded; execution continues.
    Observe,
    /// Checks are removed at compile time.
    Ignore,
}

impl CheckMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckMode::Enforce => "enforce",
            CheckMode::Observe => "observe",
            CheckMode::Ignore => "ignore",
        }
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized check mode string.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CheckModeParseError {
    pub input: String,
}

impl fmt::Display for CheckModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown check mode `{}` (expected `enforce`, `observe` or `ignore`)",
            self.input
        )
    }
}

impl std::error::Error for CheckModeParseError {}

impl FromStr for CheckMode {
    type Err = CheckModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforce" => Ok(CheckMode::Enforce),
            "observe" => Ok(CheckMode::Observe),
            "ignore" => Ok(CheckMode::Ignore),
            _ => Err(CheckModeParseError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A desugared contract check.
///
/// Conditions are evaluated left to right and stop at the first failure.
/// For a post guard, `subject` names the binding holding the body's result;
/// each condition is then a one-argument lambda applied to that value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Guard {
    pub phase: CheckPhase,
    pub conditions: Vec<CheckCondition>,
    pub subject: Option<Name>,
    pub mode: CheckMode,
    pub span: Span,
}

impl Spanned for Guard {
    fn span(&self) -> Span {
        self.span
    }
}
