//! Arena indices.
//!
//! Expressions, pattern nodes, and guards are stored flat in
//! [`ExprArena`](crate::ExprArena) and referenced by 32-bit ids.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an [`Expr`](crate::Expr) in its arena.
    ExprId,
    "e"
);
define_id!(
    /// Index of a classified [`PatternNode`](crate::PatternNode).
    PatternId,
    "p"
);
define_id!(
    /// Index of a contract [`Guard`](crate::Guard).
    GuardId,
    "g"
);
define_id!(
    /// Index of a function in [`Module::functions`](crate::Module).
    FunctionId,
    "fn"
);
define_id!(
    /// Index of an extern declaration in [`Module::externs`](crate::Module).
    ExternId,
    "ext"
);

/// Convert a `Vec` length into the next id, saturating at `u32::MAX`.
#[inline]
pub(crate) fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_uses_prefix() {
        assert_eq!(format!("{:?}", ExprId::new(3)), "e3");
        assert_eq!(format!("{:?}", PatternId::new(0)), "p0");
        assert_eq!(format!("{:?}", FunctionId::new(12)), "fn12");
    }

    #[test]
    fn next_index_saturates() {
        assert_eq!(next_index(5), 5);
        assert_eq!(next_index(usize::MAX), u32::MAX);
    }
}
