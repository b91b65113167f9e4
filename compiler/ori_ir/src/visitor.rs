//! Read-only AST traversal.
//!
//! Default `visit_*` methods call the matching `walk_*` function, which
//! recurses into children. Override a `visit_*` method to act on a node and
//! call `walk_*` from it to keep descending.
//!
//! ```text
//! struct CountSpawns(usize);
//!
//! impl<'ast> Visitor<'ast> for CountSpawns {
//!     fn visit_pattern(&mut self, id: ExprId, node: &'ast PatternNode, arena: &'ast ExprArena) {
//!         if node.kind == PatternKind::Spawn {
//!             self.0 += 1;
//!         }
//!         walk_pattern(self, node, arena);
//!     }
//! }
//! ```

use crate::{ExprArena, ExprId, ExprKind, FunctionSignature, Guard, Module, PatternNode};

pub trait Visitor<'ast> {
    fn visit_module(&mut self, module: &'ast Module, arena: &'ast ExprArena) {
        walk_module(self, module, arena);
    }

    fn visit_function(&mut self, func: &'ast FunctionSignature, arena: &'ast ExprArena) {
        self.visit_expr(func.body, arena);
    }

    fn visit_expr(&mut self, id: ExprId, arena: &'ast ExprArena) {
        walk_expr(self, id, arena);
    }

    fn visit_pattern(&mut self, id: ExprId, node: &'ast PatternNode, arena: &'ast ExprArena) {
        let _ = id;
        walk_pattern(self, node, arena);
    }

    fn visit_guard(&mut self, id: ExprId, guard: &'ast Guard, arena: &'ast ExprArena) {
        let _ = id;
        for cond in &guard.conditions {
            self.visit_expr(cond.expr, arena);
        }
    }
}

pub fn walk_module<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    module: &'ast Module,
    arena: &'ast ExprArena,
) {
    for func in &module.functions {
        visitor.visit_function(func, arena);
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: ExprId,
    arena: &'ast ExprArena,
) {
    match arena.kind(id) {
        ExprKind::Pattern(pid) => visitor.visit_pattern(id, arena.pattern(*pid), arena),
        ExprKind::Guard(gid) => visitor.visit_guard(id, arena.guard(*gid), arena),
        kind => {
            for child in kind.inline_children() {
                visitor.visit_expr(child, arena);
            }
        }
    }
}

/// Visit pattern arguments in source order, then any attached checks.
pub fn walk_pattern<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    node: &'ast PatternNode,
    arena: &'ast ExprArena,
) {
    for arg in &node.args {
        visitor.visit_expr(arg.value, arena);
    }
    if let Some(checks) = &node.checks {
        for group in [&checks.pre, &checks.post].into_iter().flatten() {
            for cond in group.as_slice() {
                visitor.visit_expr(cond.expr, arena);
            }
        }
    }
}
