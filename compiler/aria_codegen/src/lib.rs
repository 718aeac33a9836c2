//! x86-64 code generation for Aria.
//!
//! Lowers an arena-resident program to NASM assembly text. Every dynamic
//! operation becomes a call into the runtime (`dyn_*`, `list_*`,
//! `aria_obj_*`); the emitted code never inspects a tagged value itself.
//!
//! Per function:
//! 1. [`liveness::analyze`] numbers the body and builds one interval per
//!    local.
//! 2. [`regalloc::linear_scan`] maps intervals to callee-saved registers
//!    or stack slots.
//! 3. The emitter writes the prologue (with a GC safepoint poll), the
//!    body and a shared epilogue.
//!
//! Top-level `var` declarations become `.data` words registered as GC
//! roots from the generated `main`, which then calls `aria_main`.

mod emit;
mod error;
pub mod liveness;
mod program;
pub mod regalloc;

pub use error::CodegenError;
pub use liveness::LiveInterval;
pub use program::{generate, RUNTIME_SYMBOLS};
pub use regalloc::{Allocation, Location, Reg};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
