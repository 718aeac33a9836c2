//! Thread registry and the stop-the-world handshake.
//!
//! A collecting thread raises `gc_suspend_request` and waits until every
//! other registered thread has parked. Mutators park only at safepoints:
//! the poll in every generated prologue and loop header, inside
//! allocation, and in the runtime's blocking loops. A parked thread leaves
//! its stack top and register snapshot in the registry for the collector.

use std::sync::atomic::{AtomicI32, Ordering};
use std::thread::ThreadId;

use parking_lot::{const_mutex, Condvar, Mutex, MutexGuard};

use super::capture::{copy_words, Platform, RegisterSnapshot, StackCapture};
use super::heap::{Heap, SweepStats};
use super::roots;

/// Non-zero while a collection wants every mutator stopped. Generated code
/// reads it directly before calling `gc_enter_safepoint`.
#[no_mangle]
#[allow(non_upper_case_globals, reason = "symbol name is part of the generated-code ABI")]
pub static gc_suspend_request: AtomicI32 = AtomicI32::new(0);

struct ThreadDesc {
    id: ThreadId,
    stack_bottom: usize,
    /// Valid while the thread is parked.
    stack_top: usize,
    registers: RegisterSnapshot,
}

struct Registry {
    threads: Vec<ThreadDesc>,
    /// Registered threads currently parked.
    stopped: usize,
    collecting: bool,
}

impl Registry {
    const fn new() -> Self {
        Registry {
            threads: Vec::new(),
            stopped: 0,
            collecting: false,
        }
    }

    fn position(&self, id: ThreadId) -> Option<usize> {
        self.threads.iter().position(|t| t.id == id)
    }

    fn others(&self, id: ThreadId) -> usize {
        self.threads.iter().filter(|t| t.id != id).count()
    }
}

static THREADS: Mutex<Registry> = const_mutex(Registry::new());
static ALL_STOPPED: Condvar = Condvar::new();
static RESUME: Condvar = Condvar::new();

#[inline]
pub(crate) fn suspend_requested() -> bool {
    gc_suspend_request.load(Ordering::Acquire) != 0
}

pub(crate) fn register(stack_bottom: usize) {
    let id = std::thread::current().id();
    let mut registry = THREADS.lock();
    match registry.position(id) {
        Some(pos) => registry.threads[pos].stack_bottom = stack_bottom,
        None => registry.threads.push(ThreadDesc {
            id,
            stack_bottom,
            stack_top: stack_bottom,
            registers: RegisterSnapshot::new(),
        }),
    }
    tracing::trace!(?id, threads = registry.threads.len(), "thread registered");
}

pub(crate) fn unregister() {
    let id = std::thread::current().id();
    let mut registry = THREADS.lock();
    registry.threads.retain(|t| t.id != id);
    // A collector may be waiting for this thread.
    ALL_STOPPED.notify_all();
    tracing::trace!(?id, threads = registry.threads.len(), "thread unregistered");
}

/// Park until the pending collection finishes.
#[inline(never)]
pub(crate) fn park() {
    let mut registers = RegisterSnapshot::new();
    let top = Platform::capture(&mut registers);
    let mut registry = THREADS.lock();
    park_locked(&mut registry, top, &registers);
}

fn park_locked(registry: &mut MutexGuard<'_, Registry>, top: usize, registers: &RegisterSnapshot) {
    let id = std::thread::current().id();
    // Unregistered threads run no generated code and hold no roots.
    let Some(pos) = registry.position(id) else {
        return;
    };
    if !suspend_requested() {
        return;
    }

    let desc = &mut registry.threads[pos];
    desc.stack_top = top;
    desc.registers = registers.clone();
    registry.stopped += 1;
    ALL_STOPPED.notify_all();

    while suspend_requested() {
        RESUME.wait(registry);
    }
    registry.stopped -= 1;
}

/// Stop the world, mark from every root and sweep `heap`.
///
/// Returns `None` when another thread was already collecting; the caller
/// parked for that collection instead.
#[inline(never)]
pub(crate) fn collect(heap: &Mutex<Heap>, extra_roots: fn(&mut Vec<u64>)) -> Option<SweepStats> {
    let mut registers = RegisterSnapshot::new();
    let top = Platform::capture(&mut registers);

    let mut registry = THREADS.lock();
    if registry.collecting {
        park_locked(&mut registry, top, &registers);
        return None;
    }
    registry.collecting = true;
    gc_suspend_request.store(1, Ordering::Release);

    let me = std::thread::current().id();
    while registry.stopped < registry.others(me) {
        ALL_STOPPED.wait(&mut registry);
    }
    tracing::trace!(threads = registry.threads.len(), "world stopped");

    let mut words = Vec::new();
    for desc in &registry.threads {
        if desc.id == me {
            // SAFETY: our own stack, from below this frame to the
            // registered bottom.
            words.extend(unsafe { copy_words(top, desc.stack_bottom) });
            words.extend_from_slice(registers.words());
        } else {
            // SAFETY: the owner is parked, so its stack between the
            // captured top and its bottom is mapped and quiescent.
            words.extend(unsafe { copy_words(desc.stack_top, desc.stack_bottom) });
            words.extend_from_slice(desc.registers.words());
        }
    }
    roots::snapshot(&mut words);
    extra_roots(&mut words);

    let (swept, live) = {
        let mut heap = heap.lock();
        heap.mark(&words);
        let swept = heap.sweep();
        (swept, heap.stats())
    };
    tracing::debug!(
        root_words = words.len(),
        freed_objects = swept.freed_objects,
        freed_bytes = swept.freed_bytes,
        live_objects = live.objects,
        live_bytes = live.bytes,
        "collection finished"
    );

    registry.collecting = false;
    gc_suspend_request.store(0, Ordering::Release);
    RESUME.notify_all();
    Some(swept)
}
