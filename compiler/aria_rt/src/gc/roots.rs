//! Registered global roots: addresses of `.data` words holding values.

use parking_lot::{const_mutex, Mutex};

use super::capture::read_slot;

static ROOTS: Mutex<Vec<usize>> = const_mutex(Vec::new());

pub(crate) fn register(slot: usize) {
    let mut roots = ROOTS.lock();
    if !roots.contains(&slot) {
        roots.push(slot);
    }
    tracing::trace!(slot = format_args!("{slot:#x}"), roots = roots.len(), "root registered");
}

/// Append the current contents of every root slot to `out`.
pub(crate) fn snapshot(out: &mut Vec<u64>) {
    let roots = ROOTS.lock();
    for &slot in roots.iter() {
        // SAFETY: registered slots are static words that live as long as
        // the process.
        out.push(unsafe { read_slot(slot) });
    }
}
