//! Reader/writer lock embedded in heap objects.
//!
//! Acquisition spins on `try_lock` and polls the safepoint between
//! attempts. A thread waiting for a lock whose holder is parked for a
//! collection therefore parks too instead of stalling the collector.

use parking_lot::lock_api::RawRwLock as _;
use parking_lot::RawRwLock;

use crate::gc;

#[repr(transparent)]
pub(crate) struct SafepointRwLock(RawRwLock);

impl SafepointRwLock {
    pub(crate) const fn new() -> Self {
        SafepointRwLock(RawRwLock::INIT)
    }

    pub(crate) fn read(&self) -> ReadGuard<'_> {
        while !self.0.try_lock_shared() {
            gc::poll();
            std::thread::yield_now();
        }
        ReadGuard(&self.0)
    }

    pub(crate) fn write(&self) -> WriteGuard<'_> {
        while !self.0.try_lock_exclusive() {
            gc::poll();
            std::thread::yield_now();
        }
        WriteGuard(&self.0)
    }
}

pub(crate) struct ReadGuard<'a>(&'a RawRwLock);

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: constructed only after a successful shared acquisition.
        unsafe { self.0.unlock_shared() }
    }
}

pub(crate) struct WriteGuard<'a>(&'a RawRwLock);

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: constructed only after a successful exclusive acquisition.
        unsafe { self.0.unlock_exclusive() }
    }
}
