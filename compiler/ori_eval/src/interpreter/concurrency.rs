//! `parallel`, `spawn` and `timeout`: patterns that start child tasks.

#![allow(
    clippy::disallowed_types,
    reason = "child task bodies hold the shared runtime state"
)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use ori_ir::{ExprId, PatternNode};
use ori_stack::RecursionGuard;

use super::Interpreter;
use crate::errors::{cancelled, type_mismatch, EvalResult};
use crate::scheduler::{TaskId, TaskOrigin, TaskState};
use crate::Value;

impl Interpreter<'_> {
    /// Start `expr` as a child of this task.
    ///
    /// The child sees a snapshot of the current bindings and keeps the
    /// enclosing function as its owner for suspension checks.
    fn spawn_child(&self, origin: TaskOrigin, expr: ExprId) -> TaskId {
        let shared = Arc::clone(self.shared);
        let captures = self.env.capture();
        let owner = self.current_fn;
        self.shared
            .scheduler
            .spawn(self.task, origin, move |task, cancel| {
                let guard = RecursionGuard::new(shared.config.recursion_limit);
                let mut child =
                    Interpreter::for_task(&shared, task, cancel, &guard, captures, owner);
                child.eval(expr)
            })
    }

    /// One child per named branch; a tuple of results in declaration order.
    pub(super) fn eval_parallel(&mut self, node: &PatternNode) -> EvalResult {
        self.ensure_may_suspend("parallel")?;
        let children: Vec<TaskId> = node
            .args
            .iter()
            .filter_map(|arg| arg.name.map(|name| (name, arg.value)))
            .map(|(name, value)| self.spawn_child(TaskOrigin::Branch(name), value))
            .collect();

        let states = self.shared.scheduler.wait_all(&children, true);
        if let Some(err) = states.iter().find_map(|state| match state {
            TaskState::Failed(err) => Some(err.clone()),
            _ => None,
        }) {
            return Err(err);
        }
        self.checkpoint()?;

        let mut values = Vec::with_capacity(states.len());
        for state in states {
            match state {
                TaskState::Done(value) => values.push(value),
                _ => return Err(cancelled()),
            }
        }
        Ok(Value::tuple(values))
    }

    /// Fire-and-forget child; the enclosing task still waits for it to
    /// finish before it completes.
    pub(super) fn eval_spawn(&mut self, node: &PatternNode) -> EvalResult {
        let body = self.prop(node, self.program.props.body)?;
        self.spawn_child(TaskOrigin::Spawn, body);
        Ok(Value::Unit)
    }

    /// Race `body` against `duration`.
    pub(super) fn eval_timeout(&mut self, node: &PatternNode) -> EvalResult {
        self.ensure_may_suspend("timeout")?;
        let props = self.program.props;
        let duration = match self.eval(self.prop(node, props.duration)?)? {
            Value::Duration(ns) => Duration::from_nanos(ns),
            other => return Err(type_mismatch("Duration", other.type_name())),
        };
        let body = self.prop(node, props.body)?;
        let child = self.spawn_child(TaskOrigin::TimeoutBody, body);

        let scheduler = &self.shared.scheduler;
        let outcome = match Instant::now().checked_add(duration) {
            Some(deadline) => scheduler.race(child, deadline),
            None => scheduler.wait_all(&[child], false).pop(),
        };
        let Some(state) = outcome else {
            scheduler.cancel(child);
            scheduler.wait_all(&[child], false);
            self.checkpoint()?;
            return Ok(Value::err(Value::TimedOut));
        };

        match state {
            TaskState::Done(value) => Ok(Value::ok(value)),
            TaskState::Failed(err) => Err(err),
            _ => Err(cancelled()),
        }
    }
}
