//! `AriaObject`: a string-keyed open-addressing map on the GC heap.
//!
//! Both the object header and its entry array are GC blocks, so marking an
//! object reaches its entries and through them every stored value. Keys
//! are borrowed NUL-terminated strings (property names in the program's
//! data section) and are compared by content.

use std::cell::UnsafeCell;
use std::ffi::{c_char, CStr};
use std::mem::size_of;

use crate::error::{OrFatal, RuntimeError};
use crate::gc;
use crate::lock::SafepointRwLock;
use crate::value::{Kind, Value};

/// Slots in a fresh object.
pub const INITIAL_CAPACITY: usize = 8;

/// One slot. A null key marks an empty slot.
#[repr(C)]
struct Entry {
    key: *const c_char,
    value: Value,
}

struct Table {
    entries: *mut Entry,
    capacity: usize,
    count: usize,
}

#[repr(C)]
pub struct AriaObject {
    lock: SafepointRwLock,
    table: UnsafeCell<Table>,
}

impl AriaObject {
    /// Allocate an empty object and return it boxed.
    pub fn alloc() -> Result<Value, RuntimeError> {
        let ptr = gc::allocate(size_of::<AriaObject>())?.cast::<AriaObject>();
        // SAFETY: a fresh, aligned block large enough for the header.
        unsafe {
            ptr.as_ptr().write(AriaObject {
                lock: SafepointRwLock::new(),
                table: UnsafeCell::new(Table {
                    entries: std::ptr::null_mut(),
                    capacity: 0,
                    count: 0,
                }),
            });
        }
        let entries = alloc_entries(INITIAL_CAPACITY)?;
        // SAFETY: not yet shared with any other thread.
        unsafe {
            let table = &mut *(*ptr.as_ptr()).table.get();
            table.entries = entries;
            table.capacity = INITIAL_CAPACITY;
        }
        Ok(Value::object(ptr.as_ptr() as usize))
    }

    /// The object a value boxes, if it boxes one.
    ///
    /// # Safety
    /// An object value must point at a live `AriaObject`; everything the
    /// program can reach is live.
    pub unsafe fn from_value<'a>(value: Value) -> Option<&'a AriaObject> {
        match value.kind() {
            Kind::Object(addr) if addr != 0 => Some(&*(addr as *const AriaObject)),
            _ => None,
        }
    }

    /// Value stored under `key`, or null.
    pub fn get(&self, key: &CStr) -> Value {
        let _guard = self.lock.read();
        // SAFETY: shared access under the read lock.
        let table = unsafe { &*self.table.get() };
        table.find(key).unwrap_or(Value::NULL)
    }

    /// Store `value` under `key`, growing first if the insert would pass
    /// 75% occupancy.
    pub fn set(&self, key: &'static CStr, value: Value) -> Result<(), RuntimeError> {
        let _guard = self.lock.write();
        // SAFETY: exclusive access under the write lock.
        let table = unsafe { &mut *self.table.get() };
        if (table.count + 1) * 4 > table.capacity * 3 {
            table.grow()?;
        }
        table.insert(key.as_ptr(), value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        let _guard = self.lock.read();
        // SAFETY: shared access under the read lock.
        unsafe { (*self.table.get()).count }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        let _guard = self.lock.read();
        // SAFETY: shared access under the read lock.
        unsafe { (*self.table.get()).capacity }
    }
}

fn alloc_entries(capacity: usize) -> Result<*mut Entry, RuntimeError> {
    // Zeroed memory is a table of empty slots.
    Ok(gc::allocate(capacity * size_of::<Entry>())?
        .cast::<Entry>()
        .as_ptr())
}

/// FNV-1a, 32-bit.
fn hash_key(key: &[u8]) -> u32 {
    key.iter().fold(2_166_136_261u32, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(16_777_619)
    })
}

impl Table {
    fn slots(&self) -> &[Entry] {
        // SAFETY: `entries` points at `capacity` slots owned by this table.
        unsafe { std::slice::from_raw_parts(self.entries, self.capacity) }
    }

    fn slots_mut(&mut self) -> &mut [Entry] {
        // SAFETY: as in `slots`, with exclusive access through `&mut self`.
        unsafe { std::slice::from_raw_parts_mut(self.entries, self.capacity) }
    }

    fn start(&self, key: &[u8]) -> usize {
        hash_key(key) as usize % self.capacity
    }

    fn find(&self, key: &CStr) -> Option<Value> {
        let mut idx = self.start(key.to_bytes());
        let slots = self.slots();
        for _ in 0..self.capacity {
            let entry = &slots[idx];
            if entry.key.is_null() {
                return None;
            }
            // SAFETY: occupied slots hold keys that outlive the object.
            if unsafe { CStr::from_ptr(entry.key) } == key {
                return Some(entry.value);
            }
            idx = (idx + 1) % self.capacity;
        }
        None
    }

    /// Insert or overwrite. The caller guarantees a free slot exists.
    fn insert(&mut self, key: *const c_char, value: Value) {
        // SAFETY: callers pass keys that outlive the object.
        let bytes = unsafe { CStr::from_ptr(key) }.to_bytes();
        let capacity = self.capacity;
        let mut idx = self.start(bytes);
        let slots = self.slots_mut();
        loop {
            let entry = &mut slots[idx];
            if entry.key.is_null() {
                *entry = Entry { key, value };
                self.count += 1;
                return;
            }
            // SAFETY: as above.
            if unsafe { CStr::from_ptr(entry.key) }.to_bytes() == bytes {
                entry.value = value;
                return;
            }
            idx = (idx + 1) % capacity;
        }
    }

    /// Double the capacity and rehash every occupied slot.
    fn grow(&mut self) -> Result<(), RuntimeError> {
        let capacity = self.capacity * 2;
        let entries = alloc_entries(capacity)?;
        let old = std::mem::replace(
            self,
            Table {
                entries,
                capacity,
                count: 0,
            },
        );
        for entry in old.slots() {
            if !entry.key.is_null() {
                self.insert(entry.key, entry.value);
            }
        }
        tracing::trace!(capacity, count = self.count, "object table grown");
        Ok(())
    }
}

// ─── Entry points ───

pub fn object_get(object: Value, key: *const c_char) -> Result<Value, RuntimeError> {
    // SAFETY: object values reaching the runtime are live.
    let object = unsafe { AriaObject::from_value(object) }.ok_or(RuntimeError::GetOnNull)?;
    if key.is_null() {
        return Ok(Value::NULL);
    }
    // SAFETY: non-null keys are NUL-terminated property names.
    Ok(object.get(unsafe { CStr::from_ptr(key) }))
}

pub fn object_set(object: Value, key: *const c_char, value: Value) -> Result<Value, RuntimeError> {
    // SAFETY: object values reaching the runtime are live.
    let object = unsafe { AriaObject::from_value(object) }.ok_or(RuntimeError::SetOnNull)?;
    if key.is_null() {
        return Ok(value);
    }
    // SAFETY: generated code only passes property names from its data
    // section, which live for the whole process.
    object.set(unsafe { CStr::from_ptr(key) }, value)?;
    Ok(value)
}

#[no_mangle]
pub extern "C" fn aria_alloc_object() -> Value {
    AriaObject::alloc().or_fatal()
}

#[no_mangle]
pub extern "C" fn aria_obj_get(object: Value, key: *const c_char) -> Value {
    object_get(object, key).or_fatal()
}

/// Returns `value` so an assignment expression has a result.
#[no_mangle]
pub extern "C" fn aria_obj_set(object: Value, key: *const c_char, value: Value) -> Value {
    object_set(object, key, value).or_fatal()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
