//! Contract desugaring: `pre_check:`/`post_check:` on `run` into guards.
//!
//! A checked `run(pre_check: p, e1, ..., en, post_check: q)` becomes
//!
//! ```text
//! run(Guard(pre: p), e1, ..., e(n-1), let __check_result = en,
//!     Guard(post: q on __check_result), __check_result)
//! ```
//!
//! under `enforce` and `observe`. The guard carries the mode; what a failing
//! guard does is up to the evaluator. Under `ignore` the checks are simply
//! dropped. Either way the pattern's `checks` are cleared, so running the
//! pass again is a no-op.

use tracing::{debug, trace};

use ori_ir::{
    BindingPattern, CallArg, CheckCondition, CheckMode, CheckPhase, ChecksBlock, ConditionGroup,
    ExprArena, ExprId, ExprKind, Guard, Name, PatternId, PatternKind, Span,
};

/// Counts from one contract pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractStats {
    /// `run` nodes rewritten with guards.
    pub lowered: usize,
    /// `run` nodes whose checks were discarded (`ignore`).
    pub dropped: usize,
    pub guards: usize,
}

/// Desugar every checked `run` in `arena` under `mode`.
#[tracing::instrument(level = "debug", skip(arena), fields(nodes = arena.len()))]
pub fn compile_contracts(arena: &mut ExprArena, mode: CheckMode) -> ContractStats {
    let checked: Vec<PatternId> = arena
        .ids()
        .filter_map(|id| match arena.kind(id) {
            ExprKind::Pattern(pid) => Some(*pid),
            _ => None,
        })
        .filter(|pid| {
            let node = arena.pattern(*pid);
            node.kind == PatternKind::Run && node.has_checks()
        })
        .collect();

    let mut lowerer = ContractLowerer {
        arena,
        mode,
        stats: ContractStats::default(),
    };
    for pid in checked {
        lowerer.lower_run(pid);
    }
    debug!(
        lowered = lowerer.stats.lowered,
        dropped = lowerer.stats.dropped,
        "contracts compiled"
    );
    lowerer.stats
}

struct ContractLowerer<'a> {
    arena: &'a mut ExprArena,
    mode: CheckMode,
    stats: ContractStats,
}

impl ContractLowerer<'_> {
    fn lower_run(&mut self, pid: PatternId) {
        let node = self.arena.pattern_mut(pid);
        let Some(ChecksBlock { pre, post }) = node.checks.take() else {
            return;
        };
        let span = node.span;

        if self.mode == CheckMode::Ignore {
            trace!(?span, "dropping checks");
            self.stats.dropped += 1;
            return;
        }

        let mut body: Vec<ExprId> = self.arena.pattern(pid).positional().collect();
        let mut args = Vec::with_capacity(body.len() + 4);

        if let Some(group) = pre {
            let guard = self.guard(CheckPhase::Pre, group, None, span);
            args.push(guard);
        }

        if let Some(group) = post {
            let last = match body.pop() {
                Some(last) => last,
                None => self.arena.alloc(ExprKind::Unit, span),
            };
            args.extend(body.drain(..));
            let value_span = self.arena.span(last);
            args.push(self.arena.alloc(
                ExprKind::Let {
                    pattern: BindingPattern::Name(Name::CHECK_RESULT),
                    value: last,
                },
                value_span,
            ));
            args.push(self.guard(CheckPhase::Post, group, Some(Name::CHECK_RESULT), span));
            args.push(self.arena.alloc(ExprKind::Ident(Name::CHECK_RESULT), value_span));
        } else {
            args.append(&mut body);
        }

        let node = self.arena.pattern_mut(pid);
        node.args = args
            .into_iter()
            .map(|value| CallArg {
                name: None,
                value,
                span,
            })
            .collect();
        self.stats.lowered += 1;
    }

    fn guard(
        &mut self,
        phase: CheckPhase,
        group: ConditionGroup,
        subject: Option<Name>,
        fallback: Span,
    ) -> ExprId {
        let conditions: Vec<CheckCondition> = match group {
            ConditionGroup::Single(cond) => vec![cond],
            ConditionGroup::List(conds) => conds,
        };
        let span = conditions
            .iter()
            .map(|c| c.span)
            .reduce(Span::merge)
            .unwrap_or(fallback);
        let gid = self.arena.alloc_guard(Guard {
            phase,
            conditions,
            subject,
            mode: self.mode,
            span,
        });
        self.stats.guards += 1;
        self.arena.alloc(ExprKind::Guard(gid), span)
    }
}

#[cfg(test)]
mod tests;
