//! Arm patterns of `match` and `for`.

use ori_ir::{MatchPattern, Name};

use crate::Value;

/// Bindings introduced by matching `value` against `pattern`, or `None` if
/// it does not match.
pub(super) fn match_pattern(pattern: &MatchPattern, value: &Value) -> Option<Vec<(Name, Value)>> {
    match (pattern, value) {
        (MatchPattern::Wildcard, _) => Some(Vec::new()),
        (MatchPattern::Binding(name), v) => Some(vec![(*name, v.clone())]),
        (MatchPattern::Int(expected), Value::Int(n)) if expected == n => Some(Vec::new()),
        (MatchPattern::Bool(expected), Value::Bool(b)) if expected == b => Some(Vec::new()),
        (MatchPattern::Some(name), Value::Some(inner))
        | (MatchPattern::Ok(name), Value::Ok(inner))
        | (MatchPattern::Err(name), Value::Err(inner)) => Some(vec![(*name, (**inner).clone())]),
        (MatchPattern::None, Value::None) | (MatchPattern::TimedOut, Value::TimedOut) => {
            Some(Vec::new())
        }
        // `TimedOut` also matches the `Err(TimedOut)` a timeout produces.
        (MatchPattern::TimedOut, Value::Err(inner)) if **inner == Value::TimedOut => Some(Vec::new()),
        _ => None,
    }
}
