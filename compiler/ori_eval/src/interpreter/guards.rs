//! Contract guards produced from `pre_check:`/`post_check:`.

use tracing::warn;

use ori_ir::{CheckMode, Guard};

use super::Interpreter;
use crate::errors::{check_failed, type_mismatch, EvalResult};
use crate::runtime::ObservedViolation;
use crate::Value;

impl Interpreter<'_> {
    /// Evaluate conditions left to right, stopping at the first that fails.
    ///
    /// Post guards apply each condition (a one-argument function) to the
    /// subject binding. Under `enforce` a failure is a `CheckFailed` error;
    /// under `observe` it is logged, recorded, and evaluation continues.
    pub(super) fn eval_guard(&mut self, guard: &Guard) -> EvalResult {
        if guard.mode == CheckMode::Ignore {
            return Ok(Value::Unit);
        }
        let subject = match guard.subject {
            Some(name) => Some(self.eval_ident(name)?),
            None => None,
        };

        for (index, cond) in guard.conditions.iter().enumerate() {
            let value = self.eval(cond.expr)?;
            let value = match (&subject, &value) {
                (Some(subject), Value::Function(_)) => {
                    self.call_value(&value, vec![subject.clone()], cond.span)?
                }
                _ => value,
            };
            let Some(holds) = value.as_bool() else {
                return Err(type_mismatch("bool", value.type_name()).with_span(cond.span));
            };
            if holds {
                continue;
            }

            let message = cond.message.map_or_else(
                || guard.phase.default_message().to_string(),
                |m| self.program.interner.lookup(m).to_string(),
            );
            if guard.mode == CheckMode::Enforce {
                return Err(check_failed(guard.phase, index, message).with_span(cond.span));
            }
            warn!(
                phase = %guard.phase,
                index,
                task = %self.task,
                "{message}"
            );
            self.shared.violations.lock().push(ObservedViolation {
                phase: guard.phase,
                index,
                message,
                span: cond.span,
                task: self.task,
            });
            break;
        }
        Ok(Value::Unit)
    }
}
