//! End-to-end runs: classify, check capabilities, compile contracts, run.

#![allow(
    clippy::disallowed_types,
    reason = "host functions in tests share counters through Arc"
)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use ori_capabilities::CapabilityAnnotations;
use ori_ir::{AstBuilder, BinaryOp, CheckMode, CheckPhase, ExprId, ExprKind, MatchPattern};

use crate::{
    EvalErrorKind, HostFunctions, Program, RunOutcome, Runtime, RuntimeConfig, TaskOrigin,
    TaskOutcome, TaskState, Value,
};

fn program(b: AstBuilder, mode: CheckMode, host: &HostFunctions) -> Arc<Program> {
    let interner = b.interner().clone();
    let (module, mut arena) = b.finish();
    let classified = ori_patterns::classify_module(&module, &mut arena, &interner);
    assert!(!classified.has_errors(), "{:?}", classified.errors);
    let annotations = match ori_capabilities::check_module(&module, &arena, &interner) {
        Ok(annotations) => annotations,
        Err(errors) => panic!("unexpected capability errors: {errors:?}"),
    };
    ori_canon::compile_contracts(&mut arena, mode);
    Arc::new(Program::new(module, arena, interner, annotations, host))
}

fn runtime_with(b: AstBuilder, mode: CheckMode, host: &HostFunctions) -> Runtime {
    Runtime::new(program(b, mode, host), RuntimeConfig::default())
}

fn run(b: AstBuilder, entry: &str, args: Vec<Value>) -> RunOutcome {
    runtime_with(b, CheckMode::Enforce, &HostFunctions::new()).run(entry, args)
}

fn error_kind(outcome: &RunOutcome) -> EvalErrorKind {
    match outcome.error() {
        Some(err) => err.kind.clone(),
        None => panic!("expected a failure, got {outcome:?}"),
    }
}

/// Host function that counts its calls and returns its first argument.
fn counter(calls: &Arc<AtomicUsize>) -> impl Fn(&[Value]) -> Result<Value, String> {
    let calls = Arc::clone(calls);
    move |args| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(args.first().cloned().unwrap_or(Value::Unit))
    }
}

/// `@divide (a, b) = run(pre_check: b != 0, a / b, post_check: r -> r * b <= a)`
fn checked_division(b: &mut AstBuilder) {
    let b1 = b.ident("b");
    let zero = b.int(0);
    let pre = b.binary(BinaryOp::NotEq, b1, zero);
    let (a2, b2) = (b.ident("a"), b.ident("b"));
    let div = b.binary(BinaryOp::Div, a2, b2);
    let (r, b3, a3) = (b.ident("r"), b.ident("b"), b.ident("a"));
    let product = b.binary(BinaryOp::Mul, r, b3);
    let le = b.binary(BinaryOp::LtEq, product, a3);
    let post = b.lambda(&["r"], le);
    let args = vec![b.named("pre_check", pre), b.pos(div), b.named("post_check", post)];
    let run = b.call_with("run", args);
    let params = vec![b.param("a"), b.param("b")];
    b.function("divide", params, &[], run);
}

fn sleep_ms(b: &mut AstBuilder, millis: u64) -> ExprId {
    let d = b.duration_ms(millis);
    b.call("sleep", vec![d])
}

// Contracts

#[test]
fn checked_division_returns_the_quotient() {
    let mut b = AstBuilder::default();
    checked_division(&mut b);
    let outcome = run(b, "divide", vec![Value::Int(10), Value::Int(3)]);
    assert_eq!(outcome, RunOutcome::Done(Value::Int(3)));
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn failed_pre_check_stops_before_the_body() {
    let mut b = AstBuilder::default();
    checked_division(&mut b);
    let outcome = run(b, "divide", vec![Value::Int(10), Value::Int(0)]);
    assert_eq!(
        error_kind(&outcome),
        EvalErrorKind::CheckFailed {
            phase: CheckPhase::Pre,
            index: 0,
            message: "pre_check failed".to_string(),
        }
    );
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn observed_pre_check_is_recorded_and_the_body_runs() {
    let mut b = AstBuilder::default();
    checked_division(&mut b);
    let runtime = runtime_with(b, CheckMode::Observe, &HostFunctions::new());
    let outcome = runtime.run("divide", vec![Value::Int(10), Value::Int(0)]);

    assert_eq!(error_kind(&outcome), EvalErrorKind::DivisionByZero);
    let violations = runtime.observed_violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].phase, CheckPhase::Pre);
    assert_eq!(violations[0].message, "pre_check failed");
}

#[test]
fn ignored_checks_are_not_evaluated() {
    let mut b = AstBuilder::default();
    checked_division(&mut b);
    let runtime = runtime_with(b, CheckMode::Ignore, &HostFunctions::new());
    let outcome = runtime.run("divide", vec![Value::Int(10), Value::Int(0)]);
    assert_eq!(error_kind(&outcome), EvalErrorKind::DivisionByZero);
    assert!(runtime.observed_violations().is_empty());
}

#[test]
fn failing_condition_reports_its_index_and_message() {
    // run(pre_check: [a > 0, b != 0 | "divisor must be nonzero"], a / b)
    let mut b = AstBuilder::default();
    let (a1, zero1) = (b.ident("a"), b.int(0));
    let positive = b.binary(BinaryOp::Gt, a1, zero1);
    let (b1, zero2) = (b.ident("b"), b.int(0));
    let nonzero = b.binary(BinaryOp::NotEq, b1, zero2);
    let nonzero = b.check_message(nonzero, "divisor must be nonzero");
    let pre = b.list(vec![positive, nonzero]);
    let (a2, b2) = (b.ident("a"), b.ident("b"));
    let div = b.binary(BinaryOp::Div, a2, b2);
    let args = vec![b.named("pre_check", pre), b.pos(div)];
    let body = b.call_with("run", args);
    let params = vec![b.param("a"), b.param("b")];
    b.function("divide", params, &[], body);

    let outcome = run(b, "divide", vec![Value::Int(10), Value::Int(0)]);
    assert_eq!(
        error_kind(&outcome),
        EvalErrorKind::CheckFailed {
            phase: CheckPhase::Pre,
            index: 1,
            message: "divisor must be nonzero".to_string(),
        }
    );
}

#[test]
fn failed_post_check_sees_the_result() {
    // run(x + 1, post_check: r -> r < x)
    let mut b = AstBuilder::default();
    let (x, one) = (b.ident("x"), b.int(1));
    let sum = b.binary(BinaryOp::Add, x, one);
    let (r, x2) = (b.ident("r"), b.ident("x"));
    let lt = b.binary(BinaryOp::Lt, r, x2);
    let post = b.lambda(&["r"], lt);
    let args = vec![b.pos(sum), b.named("post_check", post)];
    let body = b.call_with("run", args);
    let params = vec![b.param("x")];
    b.function("grow", params, &[], body);

    let outcome = run(b, "grow", vec![Value::Int(1)]);
    let Some(err) = outcome.error() else {
        panic!("expected a post_check failure");
    };
    assert!(err.is_check_failure());
    assert_eq!(err.message, "post_check failed");
}

#[test]
fn trivially_true_checks_do_not_change_the_result() {
    fn build(checked: bool) -> AstBuilder {
        let mut b = AstBuilder::default();
        let (x, two) = (b.ident("x"), b.int(2));
        let double = b.binary(BinaryOp::Mul, x, two);
        let mut args = vec![b.pos(double)];
        if checked {
            let pre = b.bool(true);
            let yes = b.bool(true);
            let post = b.lambda(&["r"], yes);
            args.insert(0, b.named("pre_check", pre));
            args.push(b.named("post_check", post));
        }
        let body = b.call_with("run", args);
        let params = vec![b.param("x")];
        b.function("double", params, &[], body);
        b
    }

    let plain = run(build(false), "double", vec![Value::Int(21)]);
    let checked = run(build(true), "double", vec![Value::Int(21)]);
    assert_eq!(plain, RunOutcome::Done(Value::Int(42)));
    assert_eq!(checked, plain);
}

// Sequential patterns

#[test]
fn run_binds_in_order_and_yields_the_last_value() {
    let mut b = AstBuilder::default();
    let five = b.int(5);
    let let_x = b.let_("x", five);
    let (x, x2) = (b.ident("x"), b.ident("x"));
    let square = b.binary(BinaryOp::Mul, x, x2);
    let let_y = b.let_("y", square);
    let (y, one) = (b.ident("y"), b.int(1));
    let last = b.binary(BinaryOp::Add, y, one);
    let body = b.call("run", vec![let_x, let_y, last]);
    b.function("main", vec![], &[], body);

    assert_eq!(run(b, "main", vec![]), RunOutcome::Done(Value::Int(26)));
}

#[test]
fn try_returns_the_first_error_early() {
    // try(let q = catch(10 / n), q + 1)
    let mut b = AstBuilder::default();
    let (ten, n) = (b.int(10), b.ident("n"));
    let div = b.binary(BinaryOp::Div, ten, n);
    let caught = b.call("catch", vec![div]);
    let let_q = b.let_("q", caught);
    let (q, one) = (b.ident("q"), b.int(1));
    let next = b.binary(BinaryOp::Add, q, one);
    let body = b.call("try", vec![let_q, next]);
    let params = vec![b.param("n")];
    b.function("step", params, &[], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &HostFunctions::new());
    assert_eq!(
        runtime.run("step", vec![Value::Int(2)]),
        RunOutcome::Done(Value::Int(6))
    );
    assert_eq!(
        runtime.run("step", vec![Value::Int(0)]),
        RunOutcome::Done(Value::err(Value::string("division by zero")))
    );
}

#[test]
fn match_takes_the_first_matching_arm() {
    let mut b = AstBuilder::default();
    let n = b.ident("n");
    let zero_body = b.str("zero");
    let zero = b.arm(MatchPattern::Int(0), zero_body);
    let x = b.name("x");
    let other_body = b.str("other");
    let other = b.arm(MatchPattern::Binding(x), other_body);
    let body = b.call("match", vec![n, zero, other]);
    let params = vec![b.param("n")];
    b.function("describe", params, &[], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &HostFunctions::new());
    assert_eq!(
        runtime.run("describe", vec![Value::Int(0)]),
        RunOutcome::Done(Value::string("zero"))
    );
    assert_eq!(
        runtime.run("describe", vec![Value::Int(7)]),
        RunOutcome::Done(Value::string("other"))
    );
}

#[test]
fn match_without_a_matching_arm_fails() {
    let mut b = AstBuilder::default();
    let n = b.ident("n");
    let one = b.int(1);
    let zero = b.arm(MatchPattern::Int(0), one);
    let body = b.call("match", vec![n, zero]);
    let params = vec![b.param("n")];
    b.function("only_zero", params, &[], body);

    let outcome = run(b, "only_zero", vec![Value::Int(5)]);
    assert_eq!(error_kind(&outcome), EvalErrorKind::NonExhaustiveMatch);
}

#[test]
fn catch_turns_a_panic_into_err() {
    let mut b = AstBuilder::default();
    let msg = b.str("boom");
    let panic = b.call("panic", vec![msg]);
    let body = b.call("catch", vec![panic]);
    b.function("main", vec![], &[], body);

    assert_eq!(
        run(b, "main", vec![]),
        RunOutcome::Done(Value::err(Value::string("panic: boom")))
    );
}

#[test]
fn recurse_with_memo_computes_large_fibonacci() {
    // recurse(condition: n <= 1, base: n, step: self(n - 1) + self(n - 2), memo: true)
    let mut b = AstBuilder::default();
    let (n, one) = (b.ident("n"), b.int(1));
    let condition = b.binary(BinaryOp::LtEq, n, one);
    let base = b.ident("n");
    let (n1, one1) = (b.ident("n"), b.int(1));
    let minus1 = b.binary(BinaryOp::Sub, n1, one1);
    let left = b.call("self", vec![minus1]);
    let (n2, two) = (b.ident("n"), b.int(2));
    let minus2 = b.binary(BinaryOp::Sub, n2, two);
    let right = b.call("self", vec![minus2]);
    let step = b.binary(BinaryOp::Add, left, right);
    let memo = b.bool(true);
    let body = b.call_named(
        "recurse",
        &[("condition", condition), ("base", base), ("step", step), ("memo", memo)],
    );
    let params = vec![b.param("n")];
    b.function("fib", params, &[], body);

    assert_eq!(
        run(b, "fib", vec![Value::Int(60)]),
        RunOutcome::Done(Value::Int(1_548_008_755_920))
    );
}

#[test]
fn cache_calls_the_operation_once_per_key() {
    let calls = Arc::new(AtomicUsize::new(0));
    let host = HostFunctions::new().with("compute", counter(&calls));

    // @lookup (k) uses Cache, FFI = cache(key: k, operation: () -> compute(k))
    let mut b = AstBuilder::default();
    b.extern_fn("compute", &["k"], &[]);
    let key = b.ident("k");
    let k = b.ident("k");
    let call = b.call("compute", vec![k]);
    let operation = b.lambda(&[], call);
    let body = b.call_named("cache", &[("key", key), ("operation", operation)]);
    let params = vec![b.param("k")];
    b.function("lookup", params, &["Cache", "FFI"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &host);
    for _ in 0..3 {
        assert_eq!(
            runtime.run("lookup", vec![Value::Int(4)]),
            RunOutcome::Done(Value::Int(4))
        );
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    runtime.run("lookup", vec![Value::Int(5)]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn expired_cache_entries_are_recomputed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let host = HostFunctions::new().with("compute", counter(&calls));

    let mut b = AstBuilder::default();
    b.extern_fn("compute", &["k"], &[]);
    let key = b.ident("k");
    let k = b.ident("k");
    let call = b.call("compute", vec![k]);
    let operation = b.lambda(&[], call);
    let ttl = b.duration_ms(0);
    let body = b.call_named("cache", &[("key", key), ("operation", operation), ("ttl", ttl)]);
    let params = vec![b.param("k")];
    b.function("lookup", params, &["Cache", "FFI"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &host);
    runtime.run("lookup", vec![Value::Int(1)]);
    runtime.run("lookup", vec![Value::Int(1)]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Each miss drops whatever has expired before inserting.
    for key in 2..6 {
        runtime.run("lookup", vec![Value::Int(key)]);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(runtime.cached_entries(), 1);
}

#[test]
fn cache_rejects_unhashable_keys() {
    let mut b = AstBuilder::default();
    let one = b.int(1);
    let key = b.lambda(&[], one);
    let operation = b.int(2);
    let body = b.call_named("cache", &[("key", key), ("operation", operation)]);
    b.function("main", vec![], &["Cache"], body);

    let outcome = run(b, "main", vec![]);
    assert!(matches!(
        error_kind(&outcome),
        EvalErrorKind::Unhashable { .. }
    ));
}

/// `@use_resource (x) uses FFI = with(acquire: x, action: r -> <action>, release: r -> release(r))`
fn with_resource(action: impl FnOnce(&mut AstBuilder) -> ExprId) -> AstBuilder {
    let mut b = AstBuilder::default();
    b.extern_fn("release", &["r"], &[]);
    let acquire = b.ident("x");
    let action_body = action(&mut b);
    let action = b.lambda(&["r"], action_body);
    let r = b.ident("r");
    let release_call = b.call("release", vec![r]);
    let release = b.lambda(&["r"], release_call);
    let body = b.call_named(
        "with",
        &[("acquire", acquire), ("action", action), ("release", release)],
    );
    let params = vec![b.param("x")];
    b.function("use_resource", params, &["FFI"], body);
    b
}

#[test]
fn with_releases_after_success() {
    let released = Arc::new(AtomicUsize::new(0));
    let host = HostFunctions::new().with("release", counter(&released));
    let b = with_resource(|b| {
        let (r, one) = (b.ident("r"), b.int(1));
        b.binary(BinaryOp::Add, r, one)
    });

    let outcome = runtime_with(b, CheckMode::Enforce, &host).run("use_resource", vec![Value::Int(41)]);
    assert_eq!(outcome, RunOutcome::Done(Value::Int(42)));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn with_releases_when_the_action_fails() {
    let released = Arc::new(AtomicUsize::new(0));
    let host = HostFunctions::new().with("release", counter(&released));
    let b = with_resource(|b| {
        let (r, zero) = (b.ident("r"), b.int(0));
        b.binary(BinaryOp::Div, r, zero)
    });

    let outcome = runtime_with(b, CheckMode::Enforce, &host).run("use_resource", vec![Value::Int(1)]);
    assert_eq!(error_kind(&outcome), EvalErrorKind::DivisionByZero);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

/// `for(over: xs, map: x -> x * 10, match: 30 -> "found", default: "none")`
fn find_thirty() -> AstBuilder {
    let mut b = AstBuilder::default();
    let over = b.ident("xs");
    let (x, ten) = (b.ident("x"), b.int(10));
    let times = b.binary(BinaryOp::Mul, x, ten);
    let map = b.lambda(&["x"], times);
    let found = b.str("found");
    let arm = b.arm(MatchPattern::Int(30), found);
    let default = b.str("none");
    let body = b.call_named(
        "for",
        &[("over", over), ("map", map), ("match", arm), ("default", default)],
    );
    let params = vec![b.param("xs")];
    b.function("find", params, &[], body);
    b
}

#[test]
fn for_yields_the_first_matching_element() {
    let runtime = runtime_with(find_thirty(), CheckMode::Enforce, &HostFunctions::new());
    let xs = Value::list((1..=4).map(Value::Int).collect());
    assert_eq!(
        runtime.run("find", vec![xs]),
        RunOutcome::Done(Value::string("found"))
    );
    let xs = Value::list(vec![Value::Int(1)]);
    assert_eq!(
        runtime.run("find", vec![xs]),
        RunOutcome::Done(Value::string("none"))
    );
}

// Calls

#[test]
fn named_arguments_bind_by_parameter_name() {
    let mut b = AstBuilder::default();
    let (a, bb) = (b.ident("a"), b.ident("b"));
    let sub = b.binary(BinaryOp::Sub, a, bb);
    let params = vec![b.param("a"), b.param("b")];
    b.function("sub", params, &[], sub);
    let (one, ten) = (b.int(1), b.int(10));
    let call = b.call_named("sub", &[("b", one), ("a", ten)]);
    b.function("main", vec![], &[], call);

    assert_eq!(run(b, "main", vec![]), RunOutcome::Done(Value::Int(9)));
}

#[test]
fn unbounded_recursion_hits_the_limit() {
    let mut b = AstBuilder::default();
    let (n, one) = (b.ident("n"), b.int(1));
    let next = b.binary(BinaryOp::Add, n, one);
    let body = b.call("spin", vec![next]);
    let params = vec![b.param("n")];
    b.function("spin", params, &[], body);

    let program = program(b, CheckMode::Enforce, &HostFunctions::new());
    let config = RuntimeConfig::default().with_recursion_limit(100);
    let outcome = Runtime::new(program, config).run("spin", vec![Value::Int(0)]);
    assert_eq!(error_kind(&outcome), EvalErrorKind::StackOverflow { limit: 100 });
}

#[test]
fn finished_task_trees_are_reclaimed_by_the_next_run() {
    let mut b = AstBuilder::default();
    let (x, y) = (b.int(1), b.int(2));
    let body = b.call_named("parallel", &[("x", x), ("y", y)]);
    b.function("main", vec![], &["Async"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &HostFunctions::new());
    runtime.run("main", vec![]);
    let first = runtime.tasks();
    assert_eq!(first.len(), 3);

    runtime.run("main", vec![]);
    let second = runtime.tasks();
    assert_eq!(second.len(), 3);
    let last_first = first.iter().map(|t| t.id).max();
    assert!(second.iter().all(|t| Some(t.id) > last_first));
}

#[test]
fn capability_provider_runs_once_and_the_body_value_is_kept() {
    let calls = Arc::new(AtomicUsize::new(0));
    let host = HostFunctions::new().with("provide", counter(&calls));

    // @main () uses FFI = with Cache = provide(1) in 7
    let mut b = AstBuilder::default();
    b.extern_fn("provide", &["x"], &[]);
    let one = b.int(1);
    let provider = b.call("provide", vec![one]);
    let seven = b.int(7);
    let body = b.with_capability("Cache", provider, seven);
    b.function("main", vec![], &["FFI"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &host);
    assert_eq!(runtime.run("main", vec![]), RunOutcome::Done(Value::Int(7)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_entry_point_fails() {
    let mut b = AstBuilder::default();
    let unit = b.unit();
    b.function("main", vec![], &[], unit);
    let outcome = run(b, "missing", vec![]);
    assert!(matches!(
        error_kind(&outcome),
        EvalErrorKind::UndefinedFunction { .. }
    ));
}

// Concurrency

#[test]
fn parallel_yields_branch_values_in_declaration_order() {
    let mut b = AstBuilder::default();
    let (one, one2) = (b.int(1), b.int(1));
    let x = b.binary(BinaryOp::Add, one, one2);
    let slow = sleep_ms(&mut b, 20);
    let (two, three) = (b.int(2), b.int(3));
    let six = b.binary(BinaryOp::Mul, two, three);
    let y = b.call("run", vec![slow, six]);
    let body = b.call_named("parallel", &[("x", x), ("y", y)]);
    b.function("main", vec![], &["Async"], body);

    assert_eq!(
        run(b, "main", vec![]),
        RunOutcome::Done(Value::tuple(vec![Value::Int(2), Value::Int(6)]))
    );
}

#[test]
fn failing_branch_cancels_its_sibling() {
    // @expensive_a () uses Async = run(sleep(5s), 1)
    // @expensive_b () = 1 / 0
    // @main () uses Async = parallel(x: expensive_a(), y: expensive_b())
    let mut b = AstBuilder::default();
    let long = sleep_ms(&mut b, 5_000);
    let one = b.int(1);
    let a_body = b.call("run", vec![long, one]);
    b.function("expensive_a", vec![], &["Async"], a_body);
    let (one, zero) = (b.int(1), b.int(0));
    let b_body = b.binary(BinaryOp::Div, one, zero);
    b.function("expensive_b", vec![], &[], b_body);
    let (x, y) = (b.call("expensive_a", vec![]), b.call("expensive_b", vec![]));
    let body = b.call_named("parallel", &[("x", x), ("y", y)]);
    b.function("main", vec![], &["Async"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &HostFunctions::new());
    let outcome = runtime.run("main", vec![]);
    assert_eq!(error_kind(&outcome), EvalErrorKind::DivisionByZero);

    let x = runtime.program().interner().intern("x");
    let branch = runtime
        .tasks()
        .into_iter()
        .find(|t| t.origin == TaskOrigin::Branch(x));
    assert_eq!(branch.map(|t| t.state), Some(TaskState::Cancelled));
}

#[test]
fn timeout_cancels_a_slow_body_and_its_children() {
    // @long_task () uses Async = sleep(50ms)
    // @main () uses Async = timeout(duration: 10ms, body: spawn(body: long_task()))
    let mut b = AstBuilder::default();
    let nap = sleep_ms(&mut b, 50);
    b.function("long_task", vec![], &["Async"], nap);
    let call = b.call("long_task", vec![]);
    let spawn = b.call_named("spawn", &[("body", call)]);
    let duration = b.duration_ms(10);
    let body = b.call_named("timeout", &[("duration", duration), ("body", spawn)]);
    b.function("main", vec![], &["Async"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &HostFunctions::new());
    assert_eq!(
        runtime.run("main", vec![]),
        RunOutcome::Done(Value::err(Value::TimedOut))
    );

    let tasks = runtime.tasks();
    let state_of = |origin: TaskOrigin| {
        tasks
            .iter()
            .find(|t| t.origin == origin)
            .map(|t| t.state.clone())
    };
    assert_eq!(state_of(TaskOrigin::TimeoutBody), Some(TaskState::Cancelled));
    assert_eq!(state_of(TaskOrigin::Spawn), Some(TaskState::Cancelled));
}

#[test]
fn sleep_beyond_any_deadline_ends_only_by_cancellation() {
    // @main () uses Async = timeout(duration: 10ms, body: sleep(<u64::MAX ns>))
    let mut b = AstBuilder::default();
    let forever = b.expr(ExprKind::Duration(u64::MAX));
    let nap = b.call("sleep", vec![forever]);
    let duration = b.duration_ms(10);
    let body = b.call_named("timeout", &[("duration", duration), ("body", nap)]);
    b.function("main", vec![], &["Async"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &HostFunctions::new());
    assert_eq!(
        runtime.run("main", vec![]),
        RunOutcome::Done(Value::err(Value::TimedOut))
    );
    let body_state = runtime
        .tasks()
        .into_iter()
        .find(|t| t.origin == TaskOrigin::TimeoutBody)
        .map(|t| t.state);
    assert_eq!(body_state, Some(TaskState::Cancelled));
}

#[test]
fn timeout_wraps_a_fast_body_in_ok() {
    let mut b = AstBuilder::default();
    let five = b.int(5);
    let duration = b.duration_ms(1_000);
    let body = b.call_named("timeout", &[("duration", duration), ("body", five)]);
    b.function("main", vec![], &["Async"], body);

    assert_eq!(
        run(b, "main", vec![]),
        RunOutcome::Done(Value::ok(Value::Int(5)))
    );
}

#[test]
fn spawned_failure_is_an_event_not_a_parent_failure() {
    let mut b = AstBuilder::default();
    let (one, zero) = (b.int(1), b.int(0));
    let boom = b.binary(BinaryOp::Div, one, zero);
    b.function("boom", vec![], &[], boom);
    let call = b.call("boom", vec![]);
    let spawn = b.call_named("spawn", &[("body", call)]);
    let seven = b.int(7);
    let body = b.call("run", vec![spawn, seven]);
    b.function("main", vec![], &["Async"], body);

    let runtime = runtime_with(b, CheckMode::Enforce, &HostFunctions::new());
    assert_eq!(runtime.run("main", vec![]), RunOutcome::Done(Value::Int(7)));

    let spawned: Vec<TaskOutcome> = runtime
        .events()
        .try_iter()
        .filter(|e| e.origin == TaskOrigin::Spawn)
        .map(|e| e.outcome)
        .collect();
    assert_eq!(
        spawned,
        vec![TaskOutcome::Failed("division by zero".to_string())]
    );
}

#[test]
fn channel_delivers_in_order_then_none_after_close() {
    // run(
    //   let (p, c) = channel(1),
    //   spawn(body: run(send(p, 1), send(p, 2), close(p))),
    //   (recv(c), recv(c), recv(c)),
    // )
    let mut b = AstBuilder::default();
    let one = b.int(1);
    let chan = b.call("channel", vec![one]);
    let let_pc = b.let_tuple(&["p", "c"], chan);
    let (p1, v1) = (b.ident("p"), b.int(1));
    let send1 = b.call("send", vec![p1, v1]);
    let (p2, v2) = (b.ident("p"), b.int(2));
    let send2 = b.call("send", vec![p2, v2]);
    let p3 = b.ident("p");
    let close = b.call("close", vec![p3]);
    let producer = b.call("run", vec![send1, send2, close]);
    let spawn = b.call_named("spawn", &[("body", producer)]);
    let receives: Vec<ExprId> = (0..3)
        .map(|_| {
            let c = b.ident("c");
            b.call("recv", vec![c])
        })
        .collect();
    let received = b.tuple(receives);
    let body = b.call("run", vec![let_pc, spawn, received]);
    b.function("main", vec![], &["Async"], body);

    assert_eq!(
        run(b, "main", vec![]),
        RunOutcome::Done(Value::tuple(vec![
            Value::some(Value::Int(1)),
            Value::some(Value::Int(2)),
            Value::None,
        ]))
    );
}

#[test]
fn zero_capacity_channel_is_rejected() {
    let mut b = AstBuilder::default();
    let zero = b.int(0);
    let body = b.call("channel", vec![zero]);
    b.function("main", vec![], &["Async"], body);

    let outcome = run(b, "main", vec![]);
    assert_eq!(
        error_kind(&outcome),
        EvalErrorKind::InvalidCapacity { capacity: 0 }
    );
}

#[test]
fn suspension_outside_async_fails_at_runtime() {
    // Skip the capability check so the body reaches the interpreter.
    let mut b = AstBuilder::default();
    let nap = sleep_ms(&mut b, 1);
    b.function("main", vec![], &[], nap);
    let interner = b.interner().clone();
    let (module, mut arena) = b.finish();
    let classified = ori_patterns::classify_module(&module, &mut arena, &interner);
    assert!(!classified.has_errors());
    let program = Program::new(
        module,
        arena,
        interner,
        CapabilityAnnotations::default(),
        &HostFunctions::new(),
    );

    let outcome = Runtime::new(Arc::new(program), RuntimeConfig::default()).run("main", vec![]);
    assert_eq!(
        error_kind(&outcome),
        EvalErrorKind::SuspensionNotAllowed { operation: "sleep" }
    );
}
