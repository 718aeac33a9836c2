//! `AriaList`: a growable array of values on the GC heap.

use std::cell::UnsafeCell;
use std::mem::size_of;

use crate::error::{OrFatal, RuntimeError};
use crate::gc;
use crate::lock::SafepointRwLock;
use crate::value::{Kind, Value};

/// Slots in a fresh list.
pub const INITIAL_CAPACITY: usize = 8;

struct Items {
    data: *mut Value,
    capacity: usize,
    len: usize,
}

#[repr(C)]
pub struct AriaList {
    lock: SafepointRwLock,
    items: UnsafeCell<Items>,
}

impl AriaList {
    pub fn alloc() -> Result<Value, RuntimeError> {
        let ptr = gc::allocate(size_of::<AriaList>())?.cast::<AriaList>();
        // SAFETY: a fresh, aligned block large enough for the header.
        unsafe {
            ptr.as_ptr().write(AriaList {
                lock: SafepointRwLock::new(),
                items: UnsafeCell::new(Items {
                    data: std::ptr::null_mut(),
                    capacity: 0,
                    len: 0,
                }),
            });
        }
        let data = alloc_items(INITIAL_CAPACITY)?;
        // SAFETY: not yet shared with any other thread.
        unsafe {
            let items = &mut *(*ptr.as_ptr()).items.get();
            items.data = data;
            items.capacity = INITIAL_CAPACITY;
        }
        Ok(Value::list(ptr.as_ptr() as usize))
    }

    /// # Safety
    /// A list value must point at a live `AriaList`.
    pub unsafe fn from_value<'a>(value: Value) -> Option<&'a AriaList> {
        match value.kind() {
            Kind::List(addr) if addr != 0 => Some(&*(addr as *const AriaList)),
            _ => None,
        }
    }

    /// Append, doubling the backing array when full.
    pub fn push(&self, item: Value) -> Result<(), RuntimeError> {
        let _guard = self.lock.write();
        // SAFETY: exclusive access under the write lock.
        let items = unsafe { &mut *self.items.get() };
        if items.len == items.capacity {
            let capacity = (items.capacity * 2).max(INITIAL_CAPACITY);
            let data = alloc_items(capacity)?;
            // SAFETY: both arrays are live and the new one is larger.
            unsafe { std::ptr::copy_nonoverlapping(items.data, data, items.len) };
            items.data = data;
            items.capacity = capacity;
        }
        // SAFETY: len < capacity after the growth check.
        unsafe { items.data.add(items.len).write(item) };
        items.len += 1;
        Ok(())
    }

    pub fn get(&self, index: i64) -> Result<Value, RuntimeError> {
        let _guard = self.lock.read();
        // SAFETY: shared access under the read lock.
        let items = unsafe { &*self.items.get() };
        let slot = items.check(index)?;
        // SAFETY: `check` bounds the slot.
        Ok(unsafe { items.data.add(slot).read() })
    }

    pub fn set(&self, index: i64, value: Value) -> Result<(), RuntimeError> {
        let _guard = self.lock.write();
        // SAFETY: exclusive access under the write lock.
        let items = unsafe { &mut *self.items.get() };
        let slot = items.check(index)?;
        // SAFETY: `check` bounds the slot.
        unsafe { items.data.add(slot).write(value) };
        Ok(())
    }

    pub fn len(&self) -> usize {
        let _guard = self.lock.read();
        // SAFETY: shared access under the read lock.
        unsafe { (*self.items.get()).len }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        let _guard = self.lock.read();
        // SAFETY: shared access under the read lock.
        unsafe { (*self.items.get()).capacity }
    }
}

impl Items {
    fn check(&self, index: i64) -> Result<usize, RuntimeError> {
        match usize::try_from(index) {
            Ok(slot) if slot < self.len => Ok(slot),
            _ => Err(RuntimeError::IndexOutOfBounds {
                index,
                len: self.len,
            }),
        }
    }
}

fn alloc_items(capacity: usize) -> Result<*mut Value, RuntimeError> {
    Ok(gc::allocate(capacity * size_of::<Value>())?
        .cast::<Value>()
        .as_ptr())
}

fn as_list<'a>(list: Value) -> Result<&'a AriaList, RuntimeError> {
    // SAFETY: list values reaching the runtime are live.
    unsafe { AriaList::from_value(list) }.ok_or(RuntimeError::NotAList)
}

fn as_index(index: Value) -> Result<i64, RuntimeError> {
    index
        .as_int()
        .map(i64::from)
        .ok_or(RuntimeError::NonIntegerIndex)
}

// ─── Entry points ───

pub fn list_get_checked(list: Value, index: Value) -> Result<Value, RuntimeError> {
    as_list(list)?.get(as_index(index)?)
}

pub fn list_set_checked(list: Value, index: Value, value: Value) -> Result<Value, RuntimeError> {
    as_list(list)?.set(as_index(index)?, value)?;
    Ok(value)
}

#[no_mangle]
pub extern "C" fn list_new() -> Value {
    AriaList::alloc().or_fatal()
}

#[no_mangle]
pub extern "C" fn list_push(list: Value, item: Value) {
    as_list(list).and_then(|l| l.push(item)).or_fatal();
}

#[no_mangle]
pub extern "C" fn list_get(list: Value, index: Value) -> Value {
    list_get_checked(list, index).or_fatal()
}

/// Returns `value` so an index assignment has a result.
#[no_mangle]
pub extern "C" fn list_set(list: Value, index: Value, value: Value) -> Value {
    list_set_checked(list, index, value).or_fatal()
}

/// Boxed integer length.
#[no_mangle]
pub extern "C" fn list_len(list: Value) -> Value {
    let len = as_list(list).map(AriaList::len).or_fatal();
    Value::from_int(i32::try_from(len).unwrap_or(i32::MAX))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
