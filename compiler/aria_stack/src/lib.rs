//! Recursion guard for the parser and code generator.
//!
//! Expression parsing, liveness analysis and emission all recurse once per
//! level of AST nesting, so a source file like `((((...))))` or a long
//! `a + b + c + ...` chain can need far more stack than the main thread
//! has. Every recursive entry point wraps its body in
//! [`ensure_sufficient_stack`], which switches to a fresh heap-allocated
//! segment when the current one runs low.
//!
//! On `wasm32` the guard is a plain call.

/// Grow when fewer than this many bytes remain (128 KiB).
const MIN_REMAINING: usize = 128 * 1024;

/// Size of each new stack segment (2 MiB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than 128 KiB remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(MIN_REMAINING, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
