use pretty_assertions::assert_eq;

use ori_ir::{AstBuilder, BinaryOp, CallArg, ExprArena, ExprId, PatternNode};

use super::*;

/// Build `run(pre_check: b != 0, a / b, post_check: r -> r * b <= a)` and
/// classify it. Returns the arena and the id of the `run` node.
fn checked_division() -> (ExprArena, ExprId) {
    let mut b = AstBuilder::default();
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

    let interner = b.interner().clone();
    let (module, mut arena) = b.finish();
    let out = ori_patterns::classify_module(&module, &mut arena, &interner);
    assert!(!out.has_errors());
    (arena, run)
}

fn run_node(arena: &ExprArena, run: ExprId) -> &PatternNode {
    let ExprKind::Pattern(pid) = arena.kind(run) else {
        panic!("run was not classified");
    };
    arena.pattern(*pid)
}

fn arg_kinds(arena: &ExprArena, run: ExprId) -> Vec<&'static str> {
    run_node(arena, run)
        .args
        .iter()
        .map(|arg| match arena.kind(arg.value) {
            ExprKind::Guard(gid) => match arena.guard(*gid).phase {
                CheckPhase::Pre => "pre",
                CheckPhase::Post => "post",
            },
            ExprKind::Let { .. } => "let",
            ExprKind::Ident(name) if *name == Name::CHECK_RESULT => "result",
            _ => "body",
        })
        .collect()
}

#[test]
fn enforce_inserts_guards_around_the_body() {
    let (mut arena, run) = checked_division();
    let stats = compile_contracts(&mut arena, CheckMode::Enforce);

    assert_eq!(
        stats,
        ContractStats {
            lowered: 1,
            dropped: 0,
            guards: 2
        }
    );
    assert_eq!(arg_kinds(&arena, run), vec!["pre", "let", "post", "result"]);
    assert!(!run_node(&arena, run).has_checks());
}

#[test]
fn guards_carry_mode_and_subject() {
    let (mut arena, run) = checked_division();
    compile_contracts(&mut arena, CheckMode::Observe);

    let guards: Vec<&Guard> = run_node(&arena, run)
        .args
        .iter()
        .filter_map(|arg| match arena.kind(arg.value) {
            ExprKind::Guard(gid) => Some(arena.guard(*gid)),
            _ => None,
        })
        .collect();
    assert_eq!(guards.len(), 2);
    assert!(guards.iter().all(|g| g.mode == CheckMode::Observe));
    assert_eq!(guards[0].subject, None);
    assert_eq!(guards[1].subject, Some(Name::CHECK_RESULT));
    assert_eq!(guards[0].conditions.len(), 1);
}

#[test]
fn let_binds_the_original_last_expression() {
    let (mut arena, run) = checked_division();
    let body = run_node(&arena, run).positional().next();
    compile_contracts(&mut arena, CheckMode::Enforce);

    let node = run_node(&arena, run);
    let ExprKind::Let { pattern, value } = arena.kind(node.args[1].value) else {
        panic!("expected a let");
    };
    assert_eq!(*pattern, BindingPattern::Name(Name::CHECK_RESULT));
    assert_eq!(Some(*value), body);
}

#[test]
fn ignore_drops_checks_and_keeps_the_body() {
    let (mut arena, run) = checked_division();
    let before: Vec<CallArg> = run_node(&arena, run).args.clone();
    let stats = compile_contracts(&mut arena, CheckMode::Ignore);

    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.guards, 0);
    assert_eq!(run_node(&arena, run).args, before);
    assert!(!run_node(&arena, run).has_checks());
}

#[test]
fn compilation_is_idempotent() {
    for mode in [CheckMode::Enforce, CheckMode::Observe, CheckMode::Ignore] {
        let (mut arena, run) = checked_division();
        compile_contracts(&mut arena, mode);
        let once = run_node(&arena, run).clone();
        let len = arena.len();

        let again = compile_contracts(&mut arena, mode);
        assert_eq!(again, ContractStats::default());
        assert_eq!(run_node(&arena, run), &once);
        assert_eq!(arena.len(), len);
    }
}

#[test]
fn pre_only_keeps_body_unchanged_after_the_guard() {
    let mut b = AstBuilder::default();
    let pre = b.bool(true);
    let first = b.int(1);
    let second = b.int(2);
    let args = vec![b.named("pre_check", pre), b.pos(first), b.pos(second)];
    let run = b.call_with("run", args);
    b.function("main", vec![], &[], run);
    let interner = b.interner().clone();
    let (module, mut arena) = b.finish();
    ori_patterns::classify_module(&module, &mut arena, &interner);

    compile_contracts(&mut arena, CheckMode::Enforce);
    assert_eq!(arg_kinds(&arena, run), vec!["pre", "body", "body"]);
}

#[test]
fn condition_lists_keep_their_order_and_messages() {
    let mut b = AstBuilder::default();
    let c1 = b.bool(true);
    let c2 = b.bool(false);
    let with_msg = b.check_message(c2, "second failed");
    let list = b.list(vec![c1, with_msg]);
    let body = b.int(7);
    let args = vec![b.named("pre_check", list), b.pos(body)];
    let run = b.call_with("run", args);
    b.function("main", vec![], &[], run);
    let interner = b.interner().clone();
    let (module, mut arena) = b.finish();
    ori_patterns::classify_module(&module, &mut arena, &interner);

    compile_contracts(&mut arena, CheckMode::Enforce);
    let node = run_node(&arena, run);
    let ExprKind::Guard(gid) = arena.kind(node.args[0].value) else {
        panic!("expected a guard");
    };
    let guard = arena.guard(*gid);
    let exprs: Vec<ExprId> = guard.conditions.iter().map(|c| c.expr).collect();
    assert_eq!(exprs, vec![c1, c2]);
    assert_eq!(guard.conditions[0].message, None);
    assert_eq!(guard.conditions[1].message, Some(interner.intern("second failed")));
}

#[test]
fn unchecked_runs_are_left_alone() {
    let mut b = AstBuilder::default();
    let body = b.int(1);
    let run = b.call("run", vec![body]);
    b.function("main", vec![], &[], run);
    let interner = b.interner().clone();
    let (module, mut arena) = b.finish();
    ori_patterns::classify_module(&module, &mut arena, &interner);
    let before = run_node(&arena, run).clone();

    assert_eq!(compile_contracts(&mut arena, CheckMode::Enforce), ContractStats::default());
    assert_eq!(run_node(&arena, run), &before);
}
