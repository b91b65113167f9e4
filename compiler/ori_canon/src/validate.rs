//! Debug-mode validation of the desugared tree.
//!
//! After contract compilation:
//! - no pattern node still carries `checks`
//! - every child id resolves to an arena node
//! - every `Guard` id resolves, and only post guards have a subject
//!
//! These are `debug_assert!`s; release builds skip them.

use ori_ir::{CheckPhase, ExprArena, ExprKind};

/// Assert that `arena` is fully desugared.
pub fn validate(arena: &ExprArena) {
    for id in arena.ids() {
        for child in arena.children(id) {
            debug_assert!(
                child.index() < arena.len(),
                "{id:?} has out-of-bounds child {child:?} (arena has {} nodes)",
                arena.len(),
            );
        }
        match arena.kind(id) {
            ExprKind::Pattern(pid) => {
                debug_assert!(
                    pid.index() < arena.pattern_count(),
                    "{id:?} refers to missing pattern {pid:?}",
                );
                debug_assert!(
                    !arena.pattern(*pid).has_checks(),
                    "{id:?} still carries checks after contract compilation",
                );
            }
            ExprKind::Guard(gid) => {
                debug_assert!(
                    gid.index() < arena.guard_count(),
                    "{id:?} refers to missing guard {gid:?}",
                );
                let guard = arena.guard(*gid);
                debug_assert_eq!(
                    guard.subject.is_some(),
                    guard.phase == CheckPhase::Post,
                    "{id:?}: only post guards bind a subject",
                );
            }
            _ => {}
        }
    }
}
