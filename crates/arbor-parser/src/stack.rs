//! Stack growth for deep recursion.
//!
//! Parenthesized expressions and call arguments recurse through
//! [`Grammar::expression`](crate::Grammar::expression), so nesting depth is
//! bounded only by the input. Recursive paths run under
//! [`ensure_sufficient_stack`], which grows the stack on demand.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
