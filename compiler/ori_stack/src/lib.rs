//! Stack safety for deep recursion in the checker and evaluator.
//!
//! Two tools:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand, so deeply
//!   nested trees do not overflow the thread stack.
//! - [`RecursionGuard`] bounds *logical* depth (user-level recursion such as
//!   `recurse` or a function calling itself). Hitting the limit is a
//!   runtime error, not a stack overflow.
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` grows the stack.
//! - **WASM targets**: passthrough; the depth limit still applies.

use std::cell::Cell;
use std::fmt;

/// If less than this remains, grow the stack (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack space added per growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Default for [`RecursionGuard::new`] callers that have no configuration.
pub const DEFAULT_RECURSION_LIMIT: usize = 10_000;

/// Run `f`, growing the stack first if the red zone has been reached.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// The logical depth limit was reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: usize,
}

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recursion limit of {} exceeded", self.limit)
    }
}

impl std::error::Error for DepthExceeded {}

/// Per-thread logical depth counter.
///
/// Each evaluator thread owns one guard.
#[derive(Debug)]
pub struct RecursionGuard {
    depth: Cell<usize>,
    limit: usize,
}

impl RecursionGuard {
    pub fn new(limit: usize) -> Self {
        RecursionGuard {
            depth: Cell::new(0),
            limit,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run `f` one level deeper, with stack growth.
    ///
    /// The depth is restored when `f` returns or unwinds.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> Result<R, DepthExceeded> {
        let depth = self.depth.get();
        if depth >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.depth.set(depth + 1);
        let _reset = Reset {
            cell: &self.depth,
            value: depth,
        };
        Ok(ensure_sufficient_stack(f))
    }
}

impl Default for RecursionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_RECURSION_LIMIT)
    }
}

struct Reset<'a> {
    cell: &'a Cell<usize>,
    value: usize,
}

impl Drop for Reset<'_> {
    fn drop(&mut self) {
        self.cell.set(self.value);
    }
}

#[cfg(test)]
mod tests;
