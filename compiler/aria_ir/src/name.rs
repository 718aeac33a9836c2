//! Interned string identifier.

use std::fmt;

/// Handle to a string owned by a [`StringInterner`](crate::StringInterner).
///
/// Two handles from the same interner are equal exactly when the strings
/// they stand for have equal bytes, so comparing names never touches the
/// string data.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty string, interned by every interner at construction.
    pub const EMPTY: Name = Name(0);

    /// Create from an entry index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Name(index)
    }

    /// Entry index inside the owning interner.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}
