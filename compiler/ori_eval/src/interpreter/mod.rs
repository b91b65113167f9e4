//! Tree-walking interpreter for one task.
//!
//! Each task thread owns one [`Interpreter`]. It walks the shared
//! [`Program`](crate::Program) arena and talks to the scheduler for
//! anything that crosses task boundaries.
//!
//! - `call` - function values, argument binding, `recurse` memo
//! - `patterns` - `run`, `try`, `match`, `catch`, `recurse`, `cache`,
//!   `with`, `for`
//! - `concurrency` - `parallel`, `spawn`, `timeout`
//! - `intrinsics` - channels, `sleep`, `panic`
//! - `guards` - contract guards
//! - `matching` - arm patterns
//!
//! Cancellation is checked at every call and pattern entry (a
//! *checkpoint*) and at every suspension point.

#![allow(
    clippy::disallowed_types,
    reason = "interpreters share runtime state with other task threads"
)]

mod call;
mod concurrency;
mod guards;
mod intrinsics;
mod matching;
mod patterns;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use ori_ir::{BinaryOp, BindingPattern, ExprId, ExprKind, FunctionId, Name, Span, Symbol};
use ori_stack::{ensure_sufficient_stack, RecursionGuard};

use crate::errors::{
    cancelled, recursion_limit_exceeded, suspension_not_allowed, type_mismatch,
    undefined_variable, EvalResult,
};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::runtime::Shared;
use crate::scheduler::{CancelToken, TaskId};
use crate::value::{FunctionValue, Lambda};
use crate::{Environment, Program, Value};

/// Memo table of one `recurse(memo: true)` evaluation.
struct MemoFrame {
    function: FunctionId,
    table: FxHashMap<Vec<Value>, Value>,
}

pub(crate) struct Interpreter<'a> {
    shared: &'a Arc<Shared>,
    program: &'a Program,
    task: TaskId,
    cancel: CancelToken,
    recursion: &'a RecursionGuard,
    env: Environment,
    /// Function whose body is executing; its capabilities govern suspension.
    current_fn: Option<FunctionId>,
    memo: Vec<MemoFrame>,
    /// Nesting of `with` releases; cancellation is not observed inside.
    shielded: u32,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        shared: &'a Arc<Shared>,
        task: TaskId,
        cancel: CancelToken,
        recursion: &'a RecursionGuard,
    ) -> Self {
        Interpreter {
            shared,
            program: &shared.program,
            task,
            cancel,
            recursion,
            env: Environment::new(),
            current_fn: None,
            memo: Vec::new(),
            shielded: 0,
        }
    }

    /// Interpreter for a child task, starting from captured bindings.
    pub fn for_task(
        shared: &'a Arc<Shared>,
        task: TaskId,
        cancel: CancelToken,
        recursion: &'a RecursionGuard,
        captures: FxHashMap<Name, Value>,
        current_fn: Option<FunctionId>,
    ) -> Self {
        let mut interp = Self::new(shared, task, cancel, recursion);
        interp.env = Environment::from_captures(captures);
        interp.current_fn = current_fn;
        interp
    }

    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    /// Evaluate a function body one call deeper.
    fn eval_body(&mut self, body: ExprId, span: Span) -> EvalResult {
        let guard = self.recursion;
        guard
            .enter(|| self.eval(body))
            .map_err(|e| recursion_limit_exceeded(e.limit).with_span(span))?
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let program = self.program;
        let span = program.arena.span(id);
        match program.arena.kind(id) {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Str(name) => Ok(Value::string(program.interner.lookup(*name))),
            ExprKind::Unit => Ok(Value::Unit),
            ExprKind::Duration(ns) => Ok(Value::Duration(*ns)),
            ExprKind::Ident(name) => self.eval_ident(*name).map_err(|e| e.with_span(span)),
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right, span),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(*operand)?;
                evaluate_unary(*op, &value).map_err(|e| e.with_span(span))
            }
            ExprKind::List(items) => Ok(Value::list(self.eval_all(items)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::Lambda { params, body } => Ok(Value::Function(FunctionValue::Lambda(
                Arc::new(Lambda {
                    params: params.clone(),
                    body: *body,
                    captures: self.env.capture(),
                    owner: self.current_fn,
                }),
            ))),
            ExprKind::Call { func, args } => self.eval_call(*func, args, span),
            ExprKind::Let { pattern, value } => {
                let value = self.eval(*value)?;
                self.bind(pattern, value).map_err(|e| e.with_span(span))?;
                Ok(Value::Unit)
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval_bool(*cond)?;
                self.eval(if cond { *then_branch } else { *else_branch })
            }
            ExprKind::Arm { .. } => Err(type_mismatch("expression", "match arm").with_span(span)),
            ExprKind::CheckMessage { cond, .. } => self.eval(*cond),
            // Capabilities only gate compilation here: the provider runs for
            // its effects and its value is discarded.
            ExprKind::WithCapability { provider, body, .. } => {
                self.eval(*provider)?;
                self.eval(*body)
            }
            ExprKind::Pattern(pid) => {
                self.checkpoint()?;
                let node = program.arena.pattern(*pid);
                trace!(kind = node.kind.name(), task = %self.task, "pattern");
                self.eval_pattern(node).map_err(|e| e.with_span(span))
            }
            ExprKind::Intrinsic { op, args } => {
                let values = self.eval_all(args)?;
                self.eval_intrinsic(*op, values).map_err(|e| e.with_span(span))
            }
            ExprKind::Guard(gid) => self.eval_guard(program.arena.guard(*gid)),
        }
    }

    fn eval_all(&mut self, ids: &[ExprId]) -> EvalResult<Vec<Value>> {
        ids.iter().map(|id| self.eval(*id)).collect()
    }

    pub(crate) fn eval_bool(&mut self, id: ExprId) -> EvalResult<bool> {
        let value = self.eval(id)?;
        value.as_bool().ok_or_else(|| {
            type_mismatch("bool", value.type_name()).with_span(self.program.arena.span(id))
        })
    }

    fn eval_ident(&mut self, name: Name) -> EvalResult {
        if let Some(value) = self.env.lookup(name) {
            return Ok(value.clone());
        }
        match self.program.symbols.resolve(name) {
            Some(Symbol::Function(id)) => Ok(Value::Function(FunctionValue::Named(id))),
            Some(Symbol::Extern(id)) => Ok(Value::Function(FunctionValue::Extern(id))),
            None => Err(undefined_variable(self.program.interner.lookup(name))),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> EvalResult {
        if op.is_short_circuit() {
            let lhs = self.eval_bool(left)?;
            return match (op, lhs) {
                (BinaryOp::And, false) => Ok(Value::Bool(false)),
                (BinaryOp::Or, true) => Ok(Value::Bool(true)),
                _ => Ok(Value::Bool(self.eval_bool(right)?)),
            };
        }
        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;
        evaluate_binary(op, &lhs, &rhs).map_err(|e| e.with_span(span))
    }

    /// Bind a `let` pattern in the innermost scope.
    fn bind(&mut self, pattern: &BindingPattern, value: Value) -> EvalResult<()> {
        match pattern {
            BindingPattern::Name(name) => self.env.define(*name, value),
            BindingPattern::Wildcard => {}
            BindingPattern::Tuple(names) => {
                let Value::Tuple(items) = &value else {
                    return Err(type_mismatch("tuple", value.type_name()));
                };
                if items.len() != names.len() {
                    return Err(type_mismatch("tuple of matching arity", "tuple"));
                }
                for (name, item) in names.iter().zip(items.iter()) {
                    self.env.define(*name, item.clone());
                }
            }
        }
        Ok(())
    }

    /// Evaluate `f` in a fresh innermost scope.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        self.env.push_scope();
        let result = f(self);
        self.env.pop_scope();
        result
    }

    /// Fail with `Cancelled` if this task has been asked to stop.
    pub(crate) fn checkpoint(&self) -> EvalResult<()> {
        if self.shielded == 0 && self.cancel.is_cancelled() {
            return Err(cancelled());
        }
        Ok(())
    }

    /// Token suspension points wait on; never cancelled inside a release.
    fn wait_token(&self) -> CancelToken {
        if self.shielded > 0 {
            CancelToken::new()
        } else {
            self.cancel.clone()
        }
    }

    /// Suspension is only legal on behalf of a function that uses `Async`.
    fn ensure_may_suspend(&self, operation: &'static str) -> EvalResult<()> {
        match self.current_fn {
            Some(id) if !self.program.annotations.may_suspend(id) => {
                Err(suspension_not_allowed(operation))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests;
