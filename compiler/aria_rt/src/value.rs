//! NaN-boxed values.
//!
//! Every runtime value is one 64-bit word. Doubles are stored as their own
//! bit pattern. Everything else lives inside the negative quiet-NaN space:
//! the top 16 bits are `0xFFF8 | tag` and the low 48 bits carry the payload
//! (a 32-bit integer or a heap address).
//!
//! ```text
//!  63      48 47                                              0
//! ┌──────────┬─────────────────────────────────────────────────┐
//! │ FFF8|tag │ payload                                         │
//! └──────────┴─────────────────────────────────────────────────┘
//! ```
//!
//! All bit reinterpretation in the runtime goes through this module.

use std::ffi::{c_char, CStr};
use std::fmt;

const QNAN: u64 = 0x7FF8_0000_0000_0000;
const SIGN: u64 = 0x8000_0000_0000_0000;
const TAG_BASE: u64 = QNAN | SIGN;
const TAG_SHIFT: u32 = 48;
const PAYLOAD_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;

/// Type tags stored in bits 48..=50.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = 1,
    False = 2,
    True = 3,
    Int = 4,
    Str = 5,
    Object = 6,
    List = 7,
}

impl Tag {
    const fn bits(self) -> u64 {
        TAG_BASE | ((self as u64) << TAG_SHIFT)
    }

    const fn from_top(top: u16) -> Option<Tag> {
        match top {
            0xFFF9 => Some(Tag::Null),
            0xFFFA => Some(Tag::False),
            0xFFFB => Some(Tag::True),
            0xFFFC => Some(Tag::Int),
            0xFFFD => Some(Tag::Str),
            0xFFFE => Some(Tag::Object),
            0xFFFF => Some(Tag::List),
            _ => None,
        }
    }
}

/// Decoded view of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Kind {
    Float(f64),
    Null,
    Bool(bool),
    Int(i32),
    Str(usize),
    Object(usize),
    List(usize),
}

/// A NaN-boxed runtime value. Passed to and from generated code in a
/// single general-purpose register.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Value(u64);

impl Value {
    pub const NULL: Value = Value(Tag::Null.bits());
    pub const FALSE: Value = Value(Tag::False.bits());
    pub const TRUE: Value = Value(Tag::True.bits());

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Value(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Box a double. Patterns that collide with a tag collapse to the
    /// canonical quiet NaN.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        let bits = value.to_bits();
        if Tag::from_top(top_bits(bits)).is_some() {
            Value(QNAN)
        } else {
            Value(bits)
        }
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        #[expect(clippy::cast_sign_loss, reason = "two's complement payload")]
        let payload = value as u32 as u64;
        Value(Tag::Int.bits() | payload)
    }

    #[inline]
    pub const fn from_bool(value: bool) -> Self {
        if value {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }

    /// Box a pointer to a NUL-terminated string.
    #[inline]
    pub fn string(ptr: *const c_char) -> Self {
        Self::heap(Tag::Str, ptr as usize)
    }

    #[inline]
    pub(crate) fn object(addr: usize) -> Self {
        Self::heap(Tag::Object, addr)
    }

    #[inline]
    pub(crate) fn list(addr: usize) -> Self {
        Self::heap(Tag::List, addr)
    }

    fn heap(tag: Tag, addr: usize) -> Self {
        Value(tag.bits() | (addr as u64 & PAYLOAD_MASK))
    }

    /// The tag, or `None` for a double.
    #[inline]
    pub const fn tag(self) -> Option<Tag> {
        Tag::from_top(top_bits(self.0))
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        self.tag().is_none()
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == Value::NULL.0
    }

    #[expect(clippy::cast_possible_truncation, reason = "payload is 48 bits")]
    const fn payload(self) -> usize {
        (self.0 & PAYLOAD_MASK) as usize
    }

    pub fn kind(self) -> Kind {
        match self.tag() {
            None => Kind::Float(f64::from_bits(self.0)),
            Some(Tag::Null) => Kind::Null,
            Some(Tag::False) => Kind::Bool(false),
            Some(Tag::True) => Kind::Bool(true),
            Some(Tag::Int) => Kind::Int(self.int_payload()),
            Some(Tag::Str) => Kind::Str(self.payload()),
            Some(Tag::Object) => Kind::Object(self.payload()),
            Some(Tag::List) => Kind::List(self.payload()),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "the low 32 bits hold the integer"
    )]
    const fn int_payload(self) -> i32 {
        self.0 as u32 as i32
    }

    #[inline]
    pub fn as_f64(self) -> Option<f64> {
        self.is_float().then(|| f64::from_bits(self.0))
    }

    #[inline]
    pub fn as_int(self) -> Option<i32> {
        matches!(self.tag(), Some(Tag::Int)).then(|| self.int_payload())
    }

    /// Numeric value of an int or a double.
    #[inline]
    pub fn as_number(self) -> Option<f64> {
        match self.kind() {
            Kind::Float(f) => Some(f),
            Kind::Int(i) => Some(f64::from(i)),
            _ => None,
        }
    }

    /// Address carried by a string, object or list.
    #[inline]
    pub fn heap_address(self) -> Option<usize> {
        match self.tag() {
            Some(Tag::Str | Tag::Object | Tag::List) => Some(self.payload()),
            _ => None,
        }
    }

    /// Null, false, 0 and 0.0 are false; everything else is true.
    pub fn is_truthy(self) -> bool {
        match self.kind() {
            Kind::Null | Kind::Bool(false) => false,
            Kind::Float(f) => f != 0.0,
            Kind::Int(i) => i != 0,
            Kind::Bool(true) | Kind::Str(_) | Kind::Object(_) | Kind::List(_) => true,
        }
    }

    /// The bytes of a boxed string.
    ///
    /// # Safety
    /// The payload must point at a NUL-terminated string that stays alive
    /// for `'a`. Strings come from generated data sections or the GC heap.
    pub(crate) unsafe fn as_c_str<'a>(self) -> Option<&'a CStr> {
        match self.kind() {
            Kind::Str(addr) if addr != 0 => Some(CStr::from_ptr(addr as *const c_char)),
            _ => None,
        }
    }
}

#[expect(clippy::cast_possible_truncation, reason = "top 16 bits")]
const fn top_bits(bits: u64) -> u16 {
    (bits >> TAG_SHIFT) as u16
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Kind::Float(x) => write!(f, "Float({x})"),
            Kind::Null => f.write_str("Null"),
            Kind::Bool(b) => write!(f, "Bool({b})"),
            Kind::Int(i) => write!(f, "Int({i})"),
            Kind::Str(addr) => write!(f, "Str({addr:#x})"),
            Kind::Object(addr) => write!(f, "Object({addr:#x})"),
            Kind::List(addr) => write!(f, "List({addr:#x})"),
        }
    }
}

#[cfg(test)]
mod tests;
