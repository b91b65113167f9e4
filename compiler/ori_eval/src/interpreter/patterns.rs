//! Sequential and resource patterns.

use std::time::Instant;

use rustc_hash::FxHashMap;

use ori_ir::{ExprId, ExprKind, Name, PatternKind, PatternNode};

use super::matching::match_pattern;
use super::{Interpreter, MemoFrame};
use crate::errors::{non_exhaustive_match, type_mismatch, unhashable, EvalResult};
use crate::runtime::CacheEntry;
use crate::value::FunctionValue;
use crate::Value;

impl Interpreter<'_> {
    pub(super) fn eval_pattern(&mut self, node: &PatternNode) -> EvalResult {
        match node.kind {
            PatternKind::Run => self.eval_run(node),
            PatternKind::Try => self.eval_try(node),
            PatternKind::Match => self.eval_match(node),
            PatternKind::Catch => self.eval_catch(node),
            PatternKind::Recurse => self.eval_recurse(node),
            PatternKind::Parallel => self.eval_parallel(node),
            PatternKind::Spawn => self.eval_spawn(node),
            PatternKind::Timeout => self.eval_timeout(node),
            PatternKind::Cache => self.eval_cache(node),
            PatternKind::With => self.eval_with(node),
            PatternKind::For => self.eval_for(node),
        }
    }

    /// Value of a property the classifier guarantees is present.
    pub(super) fn prop(&self, node: &PatternNode, name: Name) -> EvalResult<ExprId> {
        node.prop(name).ok_or_else(|| {
            type_mismatch("pattern property", "missing property").with_span(node.span)
        })
    }

    fn eval_run(&mut self, node: &PatternNode) -> EvalResult {
        self.scoped(|this| {
            let mut last = Value::Unit;
            for id in node.positional() {
                last = this.eval(id)?;
            }
            Ok(last)
        })
    }

    /// Like `run`, but a `let` of `Err`/`None` returns it early and a `let`
    /// of `Ok(v)`/`Some(v)` binds `v`.
    fn eval_try(&mut self, node: &PatternNode) -> EvalResult {
        let program = self.program;
        self.scoped(|this| {
            let mut last = Value::Unit;
            for id in node.positional() {
                let ExprKind::Let { pattern, value } = program.arena.kind(id) else {
                    last = this.eval(id)?;
                    continue;
                };
                let unwrapped = match this.eval(*value)? {
                    early @ (Value::Err(_) | Value::None) => return Ok(early),
                    Value::Ok(inner) | Value::Some(inner) => *inner,
                    other => other,
                };
                this.bind(pattern, unwrapped)?;
                last = Value::Unit;
            }
            Ok(last)
        })
    }

    fn eval_match(&mut self, node: &PatternNode) -> EvalResult {
        let mut args = node.positional();
        let Some(scrutinee) = args.next() else {
            return Err(non_exhaustive_match());
        };
        let value = self.eval(scrutinee)?;
        for arm in args {
            if let Some(result) = self.try_arm(arm, &value)? {
                return Ok(result);
            }
        }
        Err(non_exhaustive_match())
    }

    /// Evaluate `arm` against `value` if it matches.
    fn try_arm(&mut self, arm: ExprId, value: &Value) -> EvalResult<Option<Value>> {
        let ExprKind::Arm { pattern, body } = self.program.arena.kind(arm) else {
            return Err(type_mismatch("match arm", "expression"));
        };
        let Some(bindings) = match_pattern(pattern, value) else {
            return Ok(None);
        };
        self.scoped(|this| {
            for (name, bound) in bindings {
                this.env.define(name, bound);
            }
            this.eval(*body).map(Some)
        })
    }

    /// Runtime failures become `Err(message)`; cancellation is never caught.
    fn eval_catch(&mut self, node: &PatternNode) -> EvalResult {
        let Some(expr) = node.positional().next() else {
            return Ok(Value::ok(Value::Unit));
        };
        match self.eval(expr) {
            Ok(value) => Ok(Value::ok(value)),
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => Ok(Value::err(Value::string(&err.message))),
        }
    }

    /// `self` is the enclosing function inside `step`.
    fn eval_recurse(&mut self, node: &PatternNode) -> EvalResult {
        let props = self.program.props;
        if self.eval_bool(self.prop(node, props.condition)?)? {
            return self.eval(self.prop(node, props.base)?);
        }
        let step = self.prop(node, props.step)?;
        let Some(function) = self.current_fn else {
            return self.eval(step);
        };
        let memo = match node.prop(props.memo) {
            Some(id) => self.eval_bool(id)?,
            None => false,
        };

        let push = memo && !self.memo.last().is_some_and(|frame| frame.function == function);
        if push {
            self.memo.push(MemoFrame {
                function,
                table: FxHashMap::default(),
            });
        }
        let result = self.scoped(|this| {
            this.env.define(
                Name::SELF_FN,
                Value::Function(FunctionValue::Named(function)),
            );
            this.eval(step)
        });
        if push {
            self.memo.pop();
        }
        result
    }

    /// Runtime-wide memo keyed by `key`; `operation` is only evaluated on a
    /// miss or after `ttl` has elapsed.
    fn eval_cache(&mut self, node: &PatternNode) -> EvalResult {
        let props = self.program.props;
        let key = self.eval(self.prop(node, props.key)?)?;
        if !key.is_hashable() {
            return Err(unhashable(key.type_name()));
        }

        let now = Instant::now();
        {
            let mut cache = self.shared.cache.lock();
            if let Some(entry) = cache.get(&key) {
                if entry.is_live(now) {
                    return Ok(entry.value.clone());
                }
            }
            cache.retain(|_, entry| entry.is_live(now));
        }

        let operation = self.eval(self.prop(node, props.operation)?)?;
        let value = match operation {
            Value::Function(_) => self.call_value(&operation, Vec::new(), node.span)?,
            other => other,
        };
        let expires = match node.prop(props.ttl) {
            Some(id) => match self.eval(id)? {
                Value::Duration(ns) => now.checked_add(std::time::Duration::from_nanos(ns)),
                other => return Err(type_mismatch("Duration", other.type_name())),
            },
            None => None,
        };
        self.shared.cache.lock().insert(
            key,
            CacheEntry {
                value: value.clone(),
                expires,
            },
        );
        Ok(value)
    }

    /// `release(resource)` runs whatever `action` did, including when the
    /// task is being cancelled.
    fn eval_with(&mut self, node: &PatternNode) -> EvalResult {
        let props = self.program.props;
        let resource = self.eval(self.prop(node, props.acquire)?)?;
        let action = self.prop(node, props.action)?;
        let outcome = self.eval(action).and_then(|action| match action {
            Value::Function(_) => self.call_value(&action, vec![resource.clone()], node.span),
            other => Ok(other),
        });

        let Some(release) = node.prop(props.release) else {
            return outcome;
        };
        self.shielded = self.shielded.saturating_add(1);
        let released = self.eval(release).and_then(|release| match release {
            Value::Function(_) => self.call_value(&release, vec![resource], node.span),
            other => Ok(other),
        });
        self.shielded = self.shielded.saturating_sub(1);

        let value = outcome?;
        released?;
        // A cancellation that arrived during the action surfaces here.
        self.checkpoint()?;
        Ok(value)
    }

    /// First element (after `map`) matching the arm yields the arm body.
    fn eval_for(&mut self, node: &PatternNode) -> EvalResult {
        let props = self.program.props;
        let over = self.eval(self.prop(node, props.over)?)?;
        let Value::List(items) = over else {
            return Err(type_mismatch("list", over.type_name()));
        };
        let map = match node.prop(props.map) {
            Some(id) => Some(self.eval(id)?),
            None => None,
        };
        let arm = self.prop(node, props.match_)?;

        for item in items.iter() {
            self.checkpoint()?;
            let item = match &map {
                Some(f) => self.call_value(f, vec![item.clone()], node.span)?,
                None => item.clone(),
            };
            if let Some(result) = self.try_arm(arm, &item)? {
                return Ok(result);
            }
        }
        self.eval(self.prop(node, props.default)?)
    }
}
