//! Interned identifiers.

use std::fmt;

/// Interned string identifier.
///
/// A 32-bit index into a [`StringInterner`](crate::StringInterner). Equality
/// and hashing are O(1); ordering follows interning order, which is stable
/// for a given interner and is what keeps capability sets deterministic.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);
    /// `Async`: the function may suspend. Declared, never provided.
    pub const ASYNC: Name = Name(1);
    /// `FFI`: the function reaches host code. Declared, never provided.
    pub const FFI: Name = Name(2);
    /// `Cache`: the function reads or writes the runtime cache.
    pub const CACHE: Name = Name(3);
    /// Binding introduced for the result of a checked `run` body.
    pub const CHECK_RESULT: Name = Name(4);
    /// Name bound to the enclosing function inside `recurse(step: ...)`.
    pub const SELF_FN: Name = Name(5);

    /// Every interner starts with these entries, in index order.
    pub(crate) const PRE_INTERNED: [(&'static str, Name); 6] = [
        ("", Name::EMPTY),
        ("Async", Name::ASYNC),
        ("FFI", Name::FFI),
        ("Cache", Name::CACHE),
        ("__check_result", Name::CHECK_RESULT),
        ("self", Name::SELF_FN),
    ];

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}
