//! Platform layer: register snapshots and raw stack reads.
//!
//! This is the only part of the collector that touches thread stacks. It
//! turns them into plain word vectors; marking never reads a stack itself.

use std::mem::size_of;

/// Storage for a `jmp_buf`, oversized for every supported target.
#[repr(C, align(16))]
#[derive(Clone)]
pub(crate) struct RegisterSnapshot {
    words: [u64; 64],
}

impl RegisterSnapshot {
    pub(crate) const fn new() -> Self {
        RegisterSnapshot { words: [0; 64] }
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }
}

extern "C" {
    /// POSIX `_setjmp`: saves callee-saved registers without the signal
    /// mask. Never paired with a `longjmp` here.
    #[link_name = "_setjmp"]
    fn c_setjmp(buf: *mut RegisterSnapshot) -> i32;
}

/// Captures the calling thread's register file and stack top.
pub(crate) trait StackCapture {
    /// Spill the callee-saved registers into `snapshot` and return an
    /// address at or below every frame of the caller.
    fn capture(snapshot: &mut RegisterSnapshot) -> usize;
}

/// `_setjmp` plus the address of a local in a non-inlined frame.
pub(crate) struct Setjmp;

impl StackCapture for Setjmp {
    #[inline(never)]
    fn capture(snapshot: &mut RegisterSnapshot) -> usize {
        // SAFETY: `snapshot` is a valid, aligned buffer larger than any
        // jmp_buf; control never returns here a second time.
        unsafe {
            c_setjmp(snapshot);
        }
        let marker = 0u64;
        std::ptr::from_ref(std::hint::black_box(&marker)) as usize
    }
}

/// The capture used on this target.
pub(crate) type Platform = Setjmp;

/// Copy the words of `[low, high)` after aligning `low` down to 8 bytes.
/// The bounds may be given in either order.
///
/// # Safety
/// The whole range must be mapped and readable: a live thread stack
/// whose owner is parked, or the caller's own stack.
pub(crate) unsafe fn copy_words(a: usize, b: usize) -> Vec<u64> {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let low = low & !(size_of::<u64>() - 1);
    let count = (high - low) / size_of::<u64>();
    let mut words = Vec::with_capacity(count);
    for i in 0..count {
        let addr = (low + i * size_of::<u64>()) as *const u64;
        words.push(std::ptr::read_volatile(addr));
    }
    words
}

/// Read the word stored at `slot`.
///
/// # Safety
/// `slot` must be a registered root: aligned and valid for the life of
/// the process.
pub(crate) unsafe fn read_slot(slot: usize) -> u64 {
    std::ptr::read_volatile(slot as *const u64)
}
