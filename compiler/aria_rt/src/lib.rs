//! Aria runtime library (`libaria_rt`).
//!
//! Everything a compiled Aria program calls at run time: boxed values and
//! their operators, the garbage-collected heap, objects, lists, threads and
//! printing. Generated assembly reaches it through unmangled `extern "C"`
//! symbols; the same items are usable from Rust through the rlib.
//!
//! # Build Modes
//!
//! - **rlib**: for Rust consumers and the unit tests
//! - **staticlib**: `libaria_rt.a`, linked into every compiled program
//!
//! # Function Categories
//!
//! - **Values**: `dyn_new_int`, `dyn_new_float`, `dyn_new_str`, `dyn_new_bool`, `dyn_new_null`
//! - **Operators**: `dyn_add` .. `dyn_mod`, `dyn_neg`, `dyn_not`, `dyn_truthy`, comparisons
//! - **GC**: `aria_runtime_init`, `aria_register_global_root`, `gc_enter_safepoint`,
//!   `aria_alloc`, `aria_gc_collect`, `aria_gc_stats`
//! - **Objects**: `aria_alloc_object`, `aria_obj_get`, `aria_obj_set`
//! - **Lists**: `list_new`, `list_push`, `list_get`, `list_set`, `list_len`
//! - **Threads**: `thread_create`, `thread_join`
//! - **I/O**: `print`, `println`
//!
//! # Errors
//!
//! Runtime errors are fatal. Entry points print `Runtime Error: <message>`
//! to stderr and exit with status 1.

#![allow(
    clippy::cast_ptr_alignment,
    reason = "GC blocks are 8-byte aligned, enough for every runtime header"
)]

pub mod error;
pub mod gc;
mod lock;
pub mod list;
pub mod object;
pub mod ops;
pub mod print;
pub mod thread;
pub mod value;

pub use error::RuntimeError;
pub use gc::{HeapStats, SweepStats, HEAP_LIMIT};
pub use list::AriaList;
pub use object::AriaObject;
pub use value::{Kind, Tag, Value};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
pub(crate) mod test_support {
    use parking_lot::{const_mutex, Mutex, MutexGuard};
    use std::process::{Command, Output};

    static SERIAL: Mutex<()> = const_mutex(());

    const FATAL_CHILD: &str = "ARIA_RT_FATAL_CHILD";

    /// Tests that allocate or collect take this lock: a collection in one
    /// test would otherwise free another test's unrooted values.
    pub(crate) fn serial() -> MutexGuard<'static, ()> {
        SERIAL.lock()
    }

    /// Whether this process was started by [`run_fatal_child`].
    pub(crate) fn in_fatal_child() -> bool {
        std::env::var_os(FATAL_CHILD).is_some()
    }

    /// Re-run the single test `path` in a child process and collect its
    /// output. Used for paths that end in `process::exit(1)`.
    pub(crate) fn run_fatal_child(path: &str) -> Output {
        let exe = std::env::current_exe().unwrap();
        Command::new(exe)
            .args([path, "--exact", "--nocapture", "--test-threads=1"])
            .env(FATAL_CHILD, "1")
            .output()
            .unwrap()
    }
}
