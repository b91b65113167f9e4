//! Pattern registry for looking up pattern definitions by kind.

use ori_ir::PatternKind;

use crate::cache::CachePattern;
use crate::for_pattern::ForPattern;
use crate::parallel::ParallelPattern;
use crate::recurse::RecursePattern;
use crate::sequence::{CatchPattern, MatchExprPattern, RunPattern, TryPattern};
use crate::spawn::SpawnPattern;
use crate::timeout::TimeoutPattern;
use crate::with_pattern::WithPattern;
use crate::PatternDefinition;

static RUN: RunPattern = RunPattern;
static TRY: TryPattern = TryPattern;
static MATCH: MatchExprPattern = MatchExprPattern;
static CATCH: CatchPattern = CatchPattern;
static RECURSE: RecursePattern = RecursePattern;
static PARALLEL: ParallelPattern = ParallelPattern;
static SPAWN: SpawnPattern = SpawnPattern;
static TIMEOUT: TimeoutPattern = TimeoutPattern;
static CACHE: CachePattern = CachePattern;
static WITH: WithPattern = WithPattern;
static FOR: ForPattern = ForPattern;

/// Registry mapping [`PatternKind`] to its definition.
///
/// Direct enum dispatch over zero-sized statics: no allocation, no hashing,
/// and a new `PatternKind` variant is a compile error here until handled.
pub struct PatternRegistry {
    _private: (),
}

impl PatternRegistry {
    pub fn new() -> Self {
        PatternRegistry { _private: () }
    }

    pub fn get(&self, kind: PatternKind) -> &'static dyn PatternDefinition {
        match kind {
            PatternKind::Run => &RUN,
            PatternKind::Try => &TRY,
            PatternKind::Match => &MATCH,
            PatternKind::Catch => &CATCH,
            PatternKind::Recurse => &RECURSE,
            PatternKind::Parallel => &PARALLEL,
            PatternKind::Spawn => &SPAWN,
            PatternKind::Timeout => &TIMEOUT,
            PatternKind::Cache => &CACHE,
            PatternKind::With => &WITH,
            PatternKind::For => &FOR,
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = PatternKind> {
        PatternKind::ALL.into_iter()
    }

    pub fn len(&self) -> usize {
        PatternKind::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use ori_ir::{Name, PatternFamily};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_kind_maps_to_its_definition() {
        let registry = PatternRegistry::new();
        assert_eq!(registry.len(), 11);
        for kind in registry.kinds() {
            let def = registry.get(kind);
            assert_eq!(def.kind(), kind);
            assert_eq!(def.name(), kind.name());
        }
    }

    #[test]
    fn seq_patterns_have_no_properties() {
        let registry = PatternRegistry::new();
        for kind in registry.kinds() {
            let def = registry.get(kind);
            if def.family() == PatternFamily::Seq {
                assert!(def.required_props().is_empty(), "{}", def.name());
                assert!(def.optional_props().is_empty(), "{}", def.name());
            }
        }
    }

    #[test]
    fn property_tables() {
        let registry = PatternRegistry::new();
        assert_eq!(
            registry.get(PatternKind::Recurse).required_props(),
            &["condition", "base", "step"]
        );
        assert_eq!(registry.get(PatternKind::Timeout).required_props(), &["duration", "body"]);
        assert_eq!(registry.get(PatternKind::Cache).optional_props(), &["ttl"]);
        assert_eq!(registry.get(PatternKind::With).optional_props(), &["release"]);
        assert!(registry.get(PatternKind::Parallel).allows_arbitrary_props());
        assert!(!registry.get(PatternKind::Spawn).allows_arbitrary_props());
    }

    #[test]
    fn intrinsic_capabilities() {
        let registry = PatternRegistry::new();
        for kind in [PatternKind::Parallel, PatternKind::Spawn, PatternKind::Timeout] {
            assert_eq!(registry.get(kind).capabilities(), &[Name::ASYNC]);
        }
        assert_eq!(registry.get(PatternKind::Cache).capabilities(), &[Name::CACHE]);
        assert!(registry.get(PatternKind::Run).capabilities().is_empty());
    }

    #[test]
    fn recurse_binds_self_in_step() {
        let registry = PatternRegistry::new();
        let bindings = registry.get(PatternKind::Recurse).scoped_bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name, Name::SELF_FN);
        assert_eq!(bindings[0].for_props, &["step"]);
    }
}
