//! The heap list: every block the collector owns, plus mark and sweep.
//!
//! Blocks are zeroed, 8-byte aligned allocations from the system allocator.
//! Each block's payload is scanned conservatively: every aligned word that
//! decodes to a live payload address keeps that block alive.

use std::alloc::Layout;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use super::bloom::BloomFilter;
use crate::error::RuntimeError;
use crate::value::Value;

/// Byte budget that triggers a collection before allocating further.
pub const HEAP_LIMIT: usize = 64 * 1024 * 1024;

const ALIGN: usize = 8;

/// One allocation: payload address, rounded size and mark bit.
#[derive(Debug)]
struct Block {
    addr: usize,
    size: usize,
    marked: bool,
}

/// Live objects and bytes, as reported by `aria_gc_stats`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub objects: usize,
    pub bytes: usize,
}

/// What one sweep released.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub freed_objects: usize,
    pub freed_bytes: usize,
}

pub(crate) struct Heap {
    blocks: Vec<Block>,
    /// Payload address to position in `blocks`.
    index: FxHashMap<usize, usize>,
    bytes: usize,
    bloom: BloomFilter,
}

impl Heap {
    pub(crate) fn new() -> Self {
        Heap {
            blocks: Vec::new(),
            index: FxHashMap::default(),
            bytes: 0,
            bloom: BloomFilter::new(),
        }
    }

    /// Size after rounding up to the heap alignment.
    pub(crate) fn rounded(size: usize) -> usize {
        size.max(1).next_multiple_of(ALIGN)
    }

    pub(crate) fn would_exceed(&self, size: usize) -> bool {
        self.bytes + size > HEAP_LIMIT
    }

    pub(crate) fn stats(&self) -> HeapStats {
        HeapStats {
            objects: self.blocks.len(),
            bytes: self.bytes,
        }
    }

    /// Allocate a zeroed block of `size` bytes (already rounded).
    pub(crate) fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, RuntimeError> {
        let layout =
            Layout::from_size_align(size, ALIGN).map_err(|_| RuntimeError::OutOfMemory { size })?;
        // SAFETY: `size` is non-zero after rounding.
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or(RuntimeError::OutOfMemory { size })?;

        let addr = ptr.as_ptr() as usize;
        self.index.insert(addr, self.blocks.len());
        self.blocks.push(Block {
            addr,
            size,
            marked: false,
        });
        self.bytes += size;
        self.bloom.insert(addr);
        Ok(ptr)
    }

    /// Position of the block whose payload starts exactly at the address a
    /// candidate word refers to.
    fn find(&self, word: u64) -> Option<usize> {
        let addr = candidate_address(word);
        if addr == 0 || addr % ALIGN != 0 || !self.bloom.may_contain(addr) {
            return None;
        }
        self.index.get(&addr).copied()
    }

    /// Mark everything reachable from `roots`.
    pub(crate) fn mark(&mut self, roots: &[u64]) {
        let mut worklist: Vec<usize> = Vec::new();
        for &word in roots {
            self.mark_word(word, &mut worklist);
        }
        while let Some(pos) = worklist.pop() {
            let block = &self.blocks[pos];
            // SAFETY: the block is live and owned by this heap; its payload
            // is `size` zero-initialised-or-written bytes, 8-byte aligned.
            let payload = unsafe {
                std::slice::from_raw_parts(block.addr as *const u64, block.size / ALIGN)
            };
            for &word in payload {
                self.mark_word(word, &mut worklist);
            }
        }
    }

    fn mark_word(&mut self, word: u64, worklist: &mut Vec<usize>) {
        if let Some(pos) = self.find(word) {
            let block = &mut self.blocks[pos];
            if !block.marked {
                block.marked = true;
                worklist.push(pos);
            }
        }
    }

    /// Free every unmarked block, clear marks and rebuild the index and
    /// bloom filter from the survivors.
    pub(crate) fn sweep(&mut self) -> SweepStats {
        let mut stats = SweepStats::default();
        self.bloom.clear();
        self.index.clear();

        let mut kept = Vec::with_capacity(self.blocks.len());
        for mut block in std::mem::take(&mut self.blocks) {
            if block.marked {
                block.marked = false;
                self.index.insert(block.addr, kept.len());
                self.bloom.insert(block.addr);
                kept.push(block);
            } else {
                stats.freed_objects += 1;
                stats.freed_bytes += block.size;
                self.bytes -= block.size;
                release(&block);
            }
        }
        self.blocks = kept;
        stats
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        for block in &self.blocks {
            release(block);
        }
    }
}

fn release(block: &Block) {
    if let Ok(layout) = Layout::from_size_align(block.size, ALIGN) {
        // SAFETY: allocated in `Heap::allocate` with this exact layout and
        // removed from the heap list before this call.
        unsafe { std::alloc::dealloc(block.addr as *mut u8, layout) }
    }
}

/// The address a word could refer to. Boxed strings, objects and lists
/// carry their payload in the low 48 bits; any other word is taken as a
/// raw pointer.
#[expect(clippy::cast_possible_truncation, reason = "addresses fit in usize")]
fn candidate_address(word: u64) -> usize {
    Value::from_bits(word)
        .heap_address()
        .unwrap_or(word as usize)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
