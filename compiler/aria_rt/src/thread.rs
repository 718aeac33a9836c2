//! Native threads running Aria functions.
//!
//! Each spawned thread registers with the collector for as long as it runs
//! generated code. Its argument and, once it returns, its result are kept
//! in the handle table, which the collector scans as an extra root set.
//! Handles are boxed positive integers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{const_mutex, Mutex};

use crate::error::{OrFatal, RuntimeError};
use crate::gc;
use crate::value::Value;

/// Signature of a function a thread can run: one argument, one result.
pub type ThreadEntry = extern "C" fn(Value) -> Value;

struct Slot {
    join: Option<JoinHandle<()>>,
    arg: Value,
    result: Option<Value>,
}

static HANDLES: Mutex<BTreeMap<i32, Slot>> = const_mutex(BTreeMap::new());
static NEXT_HANDLE: AtomicI32 = AtomicI32::new(1);

const JOIN_POLL: Duration = Duration::from_micros(100);

/// Arguments and results of every thread not yet joined.
pub(crate) fn pinned_roots(out: &mut Vec<u64>) {
    let handles = HANDLES.lock();
    for slot in handles.values() {
        out.push(slot.arg.to_bits());
        if let Some(result) = slot.result {
            out.push(result.to_bits());
        }
    }
}

/// Start `func(arg)` on a new OS thread and return its handle.
pub fn spawn(func: ThreadEntry, arg: Value) -> Result<i32, RuntimeError> {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    HANDLES.lock().insert(
        handle,
        Slot {
            join: None,
            arg,
            result: None,
        },
    );

    let spawned = std::thread::Builder::new()
        .name(format!("aria-{handle}"))
        .spawn(move || run(handle, func, arg));
    let join = match spawned {
        Ok(join) => join,
        Err(err) => {
            HANDLES.lock().remove(&handle);
            return Err(RuntimeError::ThreadSpawn(err.to_string()));
        }
    };
    if let Some(slot) = HANDLES.lock().get_mut(&handle) {
        slot.join = Some(join);
    }
    tracing::debug!(handle, "thread spawned");
    Ok(handle)
}

fn run(handle: i32, func: ThreadEntry, arg: Value) {
    let anchor = 0u8;
    let stack_bottom = std::hint::black_box(std::ptr::addr_of!(anchor)) as usize;
    gc::register_current_thread(stack_bottom);

    let result = func(arg);

    if let Some(slot) = HANDLES.lock().get_mut(&handle) {
        slot.result = Some(result);
    }
    gc::unregister_current_thread();
}

/// Wait for a thread and return its result.
///
/// `None` for an unknown or already joined handle. The wait polls the
/// safepoint, so a collection started by the joined thread can proceed.
pub fn join(handle: i32) -> Option<Value> {
    let join = HANDLES.lock().get_mut(&handle)?.join.take()?;
    while !join.is_finished() {
        gc::poll();
        std::thread::sleep(JOIN_POLL);
    }
    if join.join().is_err() {
        tracing::warn!(handle, "thread panicked");
    }
    let slot = HANDLES.lock().remove(&handle)?;
    tracing::debug!(handle, "thread joined");
    slot.result
}

// ─── Entry points ───

/// Builtin `thread_create(func, arg)`. A null function yields null.
#[no_mangle]
pub extern "C" fn thread_create(func: Option<ThreadEntry>, arg: Value) -> Value {
    match func {
        Some(func) => Value::from_int(spawn(func, arg).or_fatal()),
        None => Value::NULL,
    }
}

/// Builtin `thread_join(handle)`.
#[no_mangle]
pub extern "C" fn thread_join(handle: Value) -> Value {
    handle.as_int().and_then(join).unwrap_or(Value::NULL)
}
