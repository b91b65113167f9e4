//! Expression arena.
//!
//! Expressions are stored flat and referenced by [`ExprId`]. Classified
//! pattern nodes and contract guards live in side tables indexed by
//! [`PatternId`] and [`GuardId`]; the owning expression holds the id.
//!
//! Passes rewrite nodes in place with [`ExprArena::set_kind`]. A node's id
//! and span never change, so diagnostics and annotations keyed by `ExprId`
//! stay valid across passes.

use smallvec::SmallVec;

use crate::expr_id::next_index;
use crate::{Expr, ExprId, ExprKind, Guard, GuardId, PatternId, PatternNode, Span};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    patterns: Vec<PatternNode>,
    guards: Vec<Guard>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(next_index(self.exprs.len()));
        self.exprs.push(Expr::new(kind, span));
        id
    }

    pub fn alloc_pattern(&mut self, node: PatternNode) -> PatternId {
        let id = PatternId::new(next_index(self.patterns.len()));
        self.patterns.push(node);
        id
    }

    pub fn alloc_guard(&mut self, guard: Guard) -> GuardId {
        let id = GuardId::new(next_index(self.guards.len()));
        self.guards.push(guard);
        id
    }

    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    /// Replace the kind of `id`, keeping its span.
    pub fn set_kind(&mut self, id: ExprId, kind: ExprKind) {
        self.exprs[id.index()].kind = kind;
    }

    #[inline]
    pub fn pattern(&self, id: PatternId) -> &PatternNode {
        &self.patterns[id.index()]
    }

    #[inline]
    pub fn pattern_mut(&mut self, id: PatternId) -> &mut PatternNode {
        &mut self.patterns[id.index()]
    }

    #[inline]
    pub fn guard(&self, id: GuardId) -> &Guard {
        &self.guards[id.index()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// All expression ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = ExprId> {
        (0..self.exprs.len()).map(|i| ExprId::new(next_index(i)))
    }

    /// Every direct child of `id`, including pattern arguments, check
    /// conditions and guard conditions.
    pub fn children(&self, id: ExprId) -> SmallVec<[ExprId; 4]> {
        match self.kind(id) {
            ExprKind::Pattern(pid) => {
                let node = self.pattern(*pid);
                let mut out: SmallVec<[ExprId; 4]> =
                    node.args.iter().map(|arg| arg.value).collect();
                if let Some(checks) = &node.checks {
                    for group in [&checks.pre, &checks.post].into_iter().flatten() {
                        out.extend(group.as_slice().iter().map(|c| c.expr));
                    }
                }
                out
            }
            ExprKind::Guard(gid) => self.guard(*gid).conditions.iter().map(|c| c.expr).collect(),
            kind => kind.inline_children(),
        }
    }
}

/// Arena shared between the compiler and task threads.
#[derive(Clone, Debug)]
#[allow(
    clippy::disallowed_types,
    reason = "Arc is the implementation of SharedArena"
)]
pub struct SharedArena(std::sync::Arc<ExprArena>);

impl SharedArena {
    pub fn new(arena: ExprArena) -> Self {
        SharedArena(std::sync::Arc::new(arena))
    }
}

impl std::ops::Deref for SharedArena {
    type Target = ExprArena;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
