//! Call classification.
//!
//! [`classify_call`] decides, for one call, whether it is a built-in
//! pattern, a runtime intrinsic, or an ordinary call, and validates the
//! argument shape. [`classify_module`] applies it to every call reachable
//! from the module's functions and rewrites the arena in place.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use ori_ir::{
    CallArg, CheckCondition, CheckPhase, ChecksBlock, ConditionGroup, ExprArena, ExprId, ExprKind,
    Intrinsic, Module, Name, PatternFamily, PatternKind, PatternNode, Span, StringInterner,
    SymbolTable,
};

use crate::{
    CheckProblem, IntrinsicProblem, MalformedReason, PatternDefinition, PatternError,
    PatternRegistry, ShapeContext,
};

/// What a call turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classified {
    Pattern(PatternNode),
    Intrinsic { op: Intrinsic, args: Vec<ExprId> },
}

/// Classify a single call `callee(args)`.
///
/// Returns `None` when `callee` names neither a pattern nor an intrinsic.
/// Reads the arena (to recognize arms and check messages) but never
/// changes it.
pub fn classify_call(
    arena: &ExprArena,
    interner: &StringInterner,
    callee: Name,
    args: &[CallArg],
    span: Span,
) -> Option<Result<Classified, PatternError>> {
    let text = interner.lookup(callee);
    if let Some(kind) = PatternKind::from_name(text) {
        let registry = PatternRegistry::new();
        let def = registry.get(kind);
        let result = match def.family() {
            PatternFamily::Seq => classify_seq(def, arena, interner, args, span),
            PatternFamily::Exp => classify_exp(def, arena, interner, args, span),
        };
        return Some(result.map(Classified::Pattern));
    }
    let op = Intrinsic::from_name(text)?;
    Some(classify_intrinsic(op, args, span))
}

fn classify_seq(
    def: &dyn PatternDefinition,
    arena: &ExprArena,
    interner: &StringInterner,
    args: &[CallArg],
    span: Span,
) -> Result<PatternNode, PatternError> {
    let kind = def.kind();
    let last = args.len().saturating_sub(1);
    let mut checks = ChecksBlock::default();
    let mut body = Vec::with_capacity(args.len());

    for (index, arg) in args.iter().enumerate() {
        let Some(name) = arg.name else {
            body.push(arg.clone());
            continue;
        };
        // Only `run` takes contracts; on any other sequence pattern a check
        // keyword is just another named argument.
        let phase = CheckPhase::from_keyword(interner.lookup(name))
            .filter(|_| kind == PatternKind::Run);
        let Some(phase) = phase else {
            return Err(PatternError::Malformed {
                kind,
                reason: MalformedReason::NamedArgument { name },
                span: arg.span,
            });
        };
        let problem = if checks.group(phase).is_some() {
            Some(CheckProblem::Duplicate)
        } else if phase == CheckPhase::Pre && index != 0 {
            Some(CheckProblem::NotFirst)
        } else if phase == CheckPhase::Post && index != last {
            Some(CheckProblem::NotLast)
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(PatternError::CheckPosition {
                kind,
                phase,
                problem,
                span: arg.span,
            });
        }
        let group = condition_group(arena, arg.value);
        match phase {
            CheckPhase::Pre => checks.pre = Some(group),
            CheckPhase::Post => checks.post = Some(group),
        }
    }

    def.check_shape(&ShapeContext {
        arena,
        interner,
        kind,
        args: &body,
        span,
    })?;
    Ok(PatternNode::new(kind, body, span).with_checks(Some(checks)))
}

fn classify_exp(
    def: &dyn PatternDefinition,
    arena: &ExprArena,
    interner: &StringInterner,
    args: &[CallArg],
    span: Span,
) -> Result<PatternNode, PatternError> {
    let kind = def.kind();
    let malformed = |reason, span| PatternError::Malformed { kind, reason, span };
    let mut seen: FxHashSet<Name> = FxHashSet::default();

    for (index, arg) in args.iter().enumerate() {
        let Some(name) = arg.name else {
            return Err(malformed(
                MalformedReason::PositionalArgument { index },
                arg.span,
            ));
        };
        if !seen.insert(name) {
            return Err(malformed(
                MalformedReason::DuplicateProperty { name },
                arg.span,
            ));
        }
        let text = interner.lookup(name);
        let known = def.required_props().contains(&text) || def.optional_props().contains(&text);
        if !known && !def.allows_arbitrary_props() {
            return Err(malformed(MalformedReason::UnknownProperty { name }, arg.span));
        }
    }

    for &required in def.required_props() {
        let present = interner.get(required).is_some_and(|n| seen.contains(&n));
        if !present {
            return Err(malformed(
                MalformedReason::MissingProperty { name: required },
                span,
            ));
        }
    }

    def.check_shape(&ShapeContext {
        arena,
        interner,
        kind,
        args,
        span,
    })?;
    Ok(PatternNode::new(kind, args.to_vec(), span))
}

fn classify_intrinsic(
    op: Intrinsic,
    args: &[CallArg],
    span: Span,
) -> Result<Classified, PatternError> {
    if let Some(name) = args.iter().find_map(|a| a.name) {
        return Err(PatternError::Intrinsic {
            op,
            problem: IntrinsicProblem::NamedArgument { name },
            span,
        });
    }
    let (min, max) = op.arity();
    if args.len() < min || args.len() > max {
        return Err(PatternError::Intrinsic {
            op,
            problem: IntrinsicProblem::Arity {
                min,
                max,
                found: args.len(),
            },
            span,
        });
    }
    Ok(Classified::Intrinsic {
        op,
        args: args.iter().map(|a| a.value).collect(),
    })
}

/// `[c1, c2 | "msg"]` becomes a list group, anything else a single one.
fn condition_group(arena: &ExprArena, value: ExprId) -> ConditionGroup {
    match arena.kind(value) {
        ExprKind::List(items) => {
            ConditionGroup::List(items.iter().map(|&id| condition(arena, id)).collect())
        }
        _ => ConditionGroup::Single(condition(arena, value)),
    }
}

fn condition(arena: &ExprArena, id: ExprId) -> CheckCondition {
    let span = arena.span(id);
    match arena.kind(id) {
        ExprKind::CheckMessage { cond, message } => CheckCondition {
            expr: *cond,
            message: Some(*message),
            span,
        },
        _ => CheckCondition {
            expr: id,
            message: None,
            span,
        },
    }
}

/// Result of classifying a whole module.
#[derive(Debug, Default)]
pub struct ClassifyOutput {
    pub errors: Vec<PatternError>,
    pub patterns: usize,
    pub intrinsics: usize,
}

impl ClassifyOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Classify every call reachable from `module`'s function bodies.
///
/// Pattern calls become `ExprKind::Pattern`, intrinsic calls become
/// `ExprKind::Intrinsic`. A call whose callee is shadowed by a module-level
/// function or extern of the same name is left alone. All errors are
/// collected; a failing call is left unrewritten.
#[tracing::instrument(level = "debug", skip_all)]
pub fn classify_module(
    module: &Module,
    arena: &mut ExprArena,
    interner: &StringInterner,
) -> ClassifyOutput {
    let symbols = SymbolTable::build(module);
    let mut output = ClassifyOutput::default();

    for id in reachable_calls(module, arena) {
        let ExprKind::Call { func, args } = arena.kind(id) else {
            continue;
        };
        let ExprKind::Ident(callee) = *arena.kind(*func) else {
            continue;
        };
        if symbols.resolve(callee).is_some() {
            trace!(callee = interner.lookup(callee), "callee shadowed by module item");
            continue;
        }
        let span = arena.span(id);
        let Some(result) = classify_call(arena, interner, callee, args, span) else {
            continue;
        };
        match result {
            Ok(Classified::Pattern(node)) => {
                trace!(kind = node.kind.name(), ?span, "classified pattern");
                let pid = arena.alloc_pattern(node);
                arena.set_kind(id, ExprKind::Pattern(pid));
                output.patterns += 1;
            }
            Ok(Classified::Intrinsic { op, args }) => {
                arena.set_kind(id, ExprKind::Intrinsic { op, args });
                output.intrinsics += 1;
            }
            Err(err) => output.errors.push(err),
        }
    }

    debug!(
        patterns = output.patterns,
        intrinsics = output.intrinsics,
        errors = output.errors.len(),
        "classification done"
    );
    output
}

/// Call nodes reachable from function bodies, outermost first.
fn reachable_calls(module: &Module, arena: &ExprArena) -> Vec<ExprId> {
    let mut seen = FxHashSet::default();
    let mut stack: Vec<ExprId> = module.functions.iter().rev().map(|f| f.body).collect();
    let mut calls = Vec::new();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if matches!(arena.kind(id), ExprKind::Call { .. }) {
            calls.push(id);
        }
        let children = arena.children(id);
        stack.extend(children.into_iter().rev());
    }
    calls
}
