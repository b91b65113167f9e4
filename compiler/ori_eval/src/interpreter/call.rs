//! Calls: named functions, lambdas, externs, and `self` inside `recurse`.

use std::mem;

use ori_ir::{CallArg, ExprId, ExprKind, FunctionId, Name, Span};

use super::Interpreter;
use crate::errors::{arity_mismatch, host_failed, not_callable, undefined_function, EvalResult};
use crate::value::FunctionValue;
use crate::{Environment, Value};

impl Interpreter<'_> {
    pub(super) fn eval_call(&mut self, func: ExprId, args: &[CallArg], span: Span) -> EvalResult {
        self.checkpoint().map_err(|e| e.with_span(span))?;
        let callee = self.eval(func)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push((arg.name, self.eval(arg.value)?));
        }
        let args = self.order_args(&callee, values).map_err(|e| e.with_span(span))?;

        let through_self =
            matches!(self.program.arena.kind(func), ExprKind::Ident(n) if *n == Name::SELF_FN);
        if through_self {
            if let Value::Function(FunctionValue::Named(id)) = &callee {
                return self.call_memoized(*id, args, span);
            }
        }
        self.call_value(&callee, args, span)
    }

    /// Put named arguments of a named-function call into parameter order.
    fn order_args(
        &self,
        callee: &Value,
        args: Vec<(Option<Name>, Value)>,
    ) -> EvalResult<Vec<Value>> {
        let Value::Function(FunctionValue::Named(id)) = callee else {
            return Ok(args.into_iter().map(|(_, v)| v).collect());
        };
        if args.iter().all(|(name, _)| name.is_none()) {
            return Ok(args.into_iter().map(|(_, v)| v).collect());
        }
        let sig = self.program.module.function(*id);
        let got = args.len();
        let mut slots: Vec<Option<Value>> = vec![None; sig.params.len()];
        let (named, positional): (Vec<_>, Vec<_>) = args.into_iter().partition(|(n, _)| n.is_some());
        for (name, value) in named {
            let slot = sig
                .params
                .iter()
                .position(|p| Some(p.name) == name)
                .and_then(|i| slots.get_mut(i))
                .filter(|slot| slot.is_none());
            let Some(slot) = slot else {
                return Err(self.arity_error(*id, got));
            };
            *slot = Some(value);
        }
        let mut empty = slots.iter_mut().filter(|slot| slot.is_none());
        for (_, value) in positional {
            let Some(slot) = empty.next() else {
                return Err(self.arity_error(*id, got));
            };
            *slot = Some(value);
        }
        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.arity_error(*id, got))
    }

    fn arity_error(&self, id: FunctionId, got: usize) -> crate::EvalError {
        let sig = self.program.module.function(id);
        arity_mismatch(self.program.interner.lookup(sig.name), sig.params.len(), got)
    }

    pub(crate) fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: Span) -> EvalResult {
        match callee {
            Value::Function(FunctionValue::Named(id)) => self.call_function_by_id(*id, args, span),
            Value::Function(FunctionValue::Lambda(lambda)) => {
                if lambda.params.len() != args.len() {
                    return Err(arity_mismatch("lambda", lambda.params.len(), args.len()).with_span(span));
                }
                let mut env = Environment::from_captures(lambda.captures.clone());
                env.push_scope();
                for (param, arg) in lambda.params.iter().zip(args) {
                    env.define(*param, arg);
                }
                self.with_frame(env, lambda.owner, |this| this.eval_body(lambda.body, span))
            }
            Value::Function(FunctionValue::Extern(id)) => {
                let program = self.program;
                let name = program.interner.lookup(program.module.extern_fn(*id).name);
                let Some(host) = program.host.get(id) else {
                    return Err(undefined_function(name).with_span(span));
                };
                host(args.as_slice()).map_err(|message| host_failed(name, message).with_span(span))
            }
            other => Err(not_callable(other.type_name()).with_span(span)),
        }
    }

    /// Call a module function with positional `args`.
    pub(crate) fn call_function_by_id(
        &mut self,
        id: FunctionId,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        let program = self.program;
        let sig = program.module.function(id);
        if sig.params.len() != args.len() {
            return Err(self.arity_error(id, args.len()).with_span(span));
        }
        let mut env = Environment::new();
        for (param, arg) in sig.params.iter().zip(args) {
            env.define(param.name, arg);
        }
        self.with_frame(env, Some(id), |this| this.eval_body(sig.body, span))
    }

    /// `self(args)` inside `recurse(memo: true)` consults the memo table.
    fn call_memoized(&mut self, id: FunctionId, args: Vec<Value>, span: Span) -> EvalResult {
        let memoizing = self.memo.last().is_some_and(|frame| frame.function == id)
            && args.iter().all(Value::is_hashable);
        if !memoizing {
            return self.call_function_by_id(id, args, span);
        }
        if let Some(hit) = self.memo.last().and_then(|frame| frame.table.get(&args)) {
            return Ok(hit.clone());
        }
        let value = self.call_function_by_id(id, args.clone(), span)?;
        if let Some(frame) = self.memo.last_mut() {
            frame.table.insert(args, value.clone());
        }
        Ok(value)
    }

    /// Run `f` with `env` and `owner` in place of the caller's.
    fn with_frame(
        &mut self,
        env: Environment,
        owner: Option<FunctionId>,
        f: impl FnOnce(&mut Self) -> EvalResult,
    ) -> EvalResult {
        let saved_env = mem::replace(&mut self.env, env);
        let saved_fn = mem::replace(&mut self.current_fn, owner);
        let result = f(self);
        self.env = saved_env;
        self.current_fn = saved_fn;
        result
    }
}
