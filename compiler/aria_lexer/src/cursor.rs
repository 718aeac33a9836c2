//! Byte cursor over the source text.
//!
//! Reads past the end yield `0`, so lookahead never needs a bounds check at
//! the call site.

#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    #[inline]
    fn byte_at(&self, index: usize) -> u8 {
        self.src.as_bytes().get(index).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Advance one byte (no-op at end of input).
    #[inline]
    pub(crate) fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += 1;
        }
    }

    /// Skip UTF-8 continuation bytes so the cursor lands on a char boundary.
    pub(crate) fn skip_continuation_bytes(&mut self) {
        self.eat_while(|b| (0x80..0xC0).contains(&b));
    }

    /// Consume `expected` if it is the current byte.
    #[inline]
    pub(crate) fn eat(&mut self, expected: u8) -> bool {
        if !self.is_eof() && self.current() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Advance while `pred` holds for the current byte.
    #[inline]
    pub(crate) fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Source text from `start` to the cursor.
    #[inline]
    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }
}
