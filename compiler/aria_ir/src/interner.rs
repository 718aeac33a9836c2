//! Block-backed string interner.
//!
//! Strings are copied once into large shared blocks (NUL-terminated, so a
//! backend can hand them to C unchanged) and indexed by an open-addressing
//! table keyed on a 32-bit FNV-1a hash. Blocks are reserved up front and
//! never reallocated, so the bytes behind a [`Name`] stay at one address
//! for the lifetime of the interner, including across table growth.

use super::Name;
use std::fmt;

/// Size of one shared string block (64KB).
///
/// A string (plus its NUL terminator) must fit in a single block.
pub const STRING_BLOCK_SIZE: usize = 64 * 1024;

/// Initial slot count of the intern table.
pub const INITIAL_CAPACITY: usize = 1024;

/// Marker for an unused table slot.
const EMPTY_SLOT: u32 = u32::MAX;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a hash.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// String (with terminator) does not fit in one block.
    Oversized { len: usize },
    /// More than `u32::MAX - 1` distinct strings.
    TooManyStrings { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Oversized { len } => write!(
                f,
                "string of {len} bytes exceeds the interner block size of {} bytes",
                STRING_BLOCK_SIZE - 1
            ),
            InternError::TooManyStrings { count } => {
                write!(f, "interner exceeded capacity: {count} strings")
            }
        }
    }
}

impl std::error::Error for InternError {}

/// Location of one interned string, with its hash cached.
#[derive(Clone, Copy)]
struct Entry {
    block: u32,
    offset: u32,
    len: u32,
    hash: u32,
}

/// Interner for identifiers and string literals.
///
/// `intern(a) == intern(b)` whenever `a` and `b` have equal bytes.
pub struct StringInterner {
    blocks: Vec<String>,
    entries: Vec<Entry>,
    /// Power-of-two slot array holding entry indices.
    table: Vec<u32>,
}

impl StringInterner {
    /// Create an interner with [`INITIAL_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an interner whose table starts with at least `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let mut interner = StringInterner {
            blocks: Vec::new(),
            entries: Vec::new(),
            table: vec![EMPTY_SLOT; capacity],
        };
        // Pre-intern "" so that `Name::EMPTY` is always valid.
        let hash = fnv1a(b"");
        let entry = interner.copy_into_block("", hash);
        interner.entries.push(entry);
        interner.insert_slot(hash, Name::EMPTY.raw());
        interner
    }

    /// Try to intern a string, returning its Name.
    pub fn try_intern(&mut self, s: &str) -> Result<Name, InternError> {
        let hash = fnv1a(s.as_bytes());
        if let Some(name) = self.find(s, hash) {
            return Ok(name);
        }

        if s.len() + 1 > STRING_BLOCK_SIZE {
            return Err(InternError::Oversized { len: s.len() });
        }
        let index = u32::try_from(self.entries.len())
            .ok()
            .filter(|&i| i != EMPTY_SLOT)
            .ok_or(InternError::TooManyStrings {
                count: self.entries.len(),
            })?;

        if (self.entries.len() + 1) * 4 > self.table.len() * 3 {
            self.grow();
        }

        let entry = self.copy_into_block(s, hash);
        self.entries.push(entry);
        self.insert_slot(hash, index);
        Ok(Name::new(index))
    }

    /// Panicking `try_intern` for tests.
    #[cfg(test)]
    pub(crate) fn intern(&mut self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a Name.
    ///
    /// # Panics
    /// Panics if `name` was produced by a different interner.
    pub fn lookup(&self, name: Name) -> &str {
        let entry = self.entries[name.index()];
        let start = entry.offset as usize;
        &self.blocks[entry.block as usize][start..start + entry.len as usize]
    }

    /// Look up an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.find(s, fnv1a(s.as_bytes()))
    }

    /// Number of distinct strings, not counting the pre-interned `""`.
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    /// Whether nothing besides `""` has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current slot count of the table.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// Number of string blocks allocated so far.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.table.len() - 1
    }

    fn find(&self, s: &str, hash: u32) -> Option<Name> {
        let mask = self.mask();
        let mut slot = hash as usize & mask;
        loop {
            let index = self.table[slot];
            if index == EMPTY_SLOT {
                return None;
            }
            let name = Name::new(index);
            if self.entries[name.index()].hash == hash && self.lookup(name) == s {
                return Some(name);
            }
            slot = (slot + 1) & mask;
        }
    }

    fn insert_slot(&mut self, hash: u32, index: u32) {
        let mask = self.mask();
        let mut slot = hash as usize & mask;
        while self.table[slot] != EMPTY_SLOT {
            slot = (slot + 1) & mask;
        }
        self.table[slot] = index;
    }

    /// Double the table and reinsert every entry using the cached hashes.
    fn grow(&mut self) {
        let new_capacity = self.table.len() * 2;
        self.table = vec![EMPTY_SLOT; new_capacity];
        for index in 0..self.entries.len() {
            let hash = self.entries[index].hash;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "entry count is bounded by EMPTY_SLOT in try_intern"
            )]
            self.insert_slot(hash, index as u32);
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "offsets and lengths are bounded by STRING_BLOCK_SIZE"
    )]
    fn copy_into_block(&mut self, s: &str, hash: u32) -> Entry {
        let needs_block = match self.blocks.last() {
            Some(block) => block.len() + s.len() + 1 > STRING_BLOCK_SIZE,
            None => true,
        };
        if needs_block {
            self.blocks.push(String::with_capacity(STRING_BLOCK_SIZE));
        }
        let block_index = self.blocks.len() - 1;
        let block = &mut self.blocks[block_index];
        let offset = block.len();
        block.push_str(s);
        block.push('\0');
        Entry {
            block: block_index as u32,
            offset: offset as u32,
            len: s.len() as u32,
            hash,
        }
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("blocks", &self.block_count())
            .finish()
    }
}

#[cfg(test)]
mod tests;
