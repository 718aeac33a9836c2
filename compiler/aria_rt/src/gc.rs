//! Conservative, stop-the-world mark-and-sweep collector.
//!
//! Every heap block comes from [`allocate`]. A collection starts when an
//! allocation would push the heap past [`HEAP_LIMIT`], when the system
//! allocator fails, or on an explicit `aria_gc_collect()`. Roots are:
//! - the stack and registers of every registered thread,
//! - the registered global slots,
//! - values pinned by the thread table (arguments and results).
//!
//! The collector never moves anything, so raw payload addresses stay valid
//! for as long as something refers to them.

mod bloom;
mod capture;
mod heap;
mod roots;
mod safepoint;

use std::ptr::NonNull;
use std::sync::LazyLock;

use parking_lot::Mutex;

pub use bloom::BLOOM_BITS;
pub use heap::{HeapStats, SweepStats, HEAP_LIMIT};
pub use safepoint::gc_suspend_request;

use crate::error::{OrFatal, RuntimeError};
use crate::value::Value;
use heap::Heap;

static HEAP: LazyLock<Mutex<Heap>> = LazyLock::new(|| Mutex::new(Heap::new()));

/// Allocate `size` zeroed bytes on the collected heap.
pub fn allocate(size: usize) -> Result<NonNull<u8>, RuntimeError> {
    let size = Heap::rounded(size);
    poll();

    let over_limit = HEAP.lock().would_exceed(size);
    if over_limit {
        collect();
    }

    let first = HEAP.lock().allocate(size);
    match first {
        Ok(ptr) => Ok(ptr),
        Err(_) => {
            collect();
            HEAP.lock().allocate(size)
        }
    }
}

/// Run a full collection, or wait out the one already in progress.
pub fn collect() -> Option<SweepStats> {
    safepoint::collect(&HEAP, crate::thread::pinned_roots)
}

/// Park at a safepoint if a collection is pending.
#[inline]
pub fn poll() {
    if safepoint::suspend_requested() {
        safepoint::park();
    }
}

pub fn stats() -> HeapStats {
    HEAP.lock().stats()
}

/// Make the calling thread's stack, up to `stack_bottom`, a root range.
pub fn register_current_thread(stack_bottom: usize) {
    safepoint::register(stack_bottom);
}

pub fn unregister_current_thread() {
    safepoint::unregister();
}

/// Treat the word at `slot` as a root for the rest of the process.
pub fn register_root(slot: *mut Value) {
    if !slot.is_null() {
        roots::register(slot as usize);
    }
}

// ─── C entry points ───

/// Register the main thread. Generated `main` passes its frame base.
#[no_mangle]
pub extern "C" fn aria_runtime_init(stack_bottom: *const u8) {
    register_current_thread(stack_bottom as usize);
    tracing::debug!(limit = HEAP_LIMIT, "runtime initialized");
}

#[no_mangle]
pub extern "C" fn aria_register_global_root(slot: *mut Value) {
    register_root(slot);
}

#[no_mangle]
pub extern "C" fn gc_enter_safepoint() {
    safepoint::park();
}

#[no_mangle]
pub extern "C" fn aria_alloc(size: usize) -> *mut u8 {
    allocate(size).or_fatal().as_ptr()
}

/// Builtin `aria_gc_collect()`. Returns null.
#[no_mangle]
pub extern "C" fn aria_gc_collect() -> Value {
    collect();
    Value::NULL
}

#[no_mangle]
pub extern "C" fn aria_gc_stats() -> HeapStats {
    stats()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
