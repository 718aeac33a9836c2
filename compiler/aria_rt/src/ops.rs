//! Dynamic operators called by generated code.
//!
//! Every operator takes and returns NaN-boxed values. Integer arithmetic
//! wraps at 32 bits; mixing an integer with a float promotes to float.
//! Operand types an operator does not support produce null.

use std::cmp::Ordering;
use std::ffi::c_char;

use crate::error::{OrFatal, RuntimeError};
use crate::gc;
use crate::value::{Kind, Value};

/// Two numeric operands after promotion.
enum Numbers {
    Ints(i32, i32),
    Floats(f64, f64),
}

fn numbers(a: Value, b: Value) -> Option<Numbers> {
    match (a.kind(), b.kind()) {
        (Kind::Int(x), Kind::Int(y)) => Some(Numbers::Ints(x, y)),
        _ => Some(Numbers::Floats(a.as_number()?, b.as_number()?)),
    }
}

fn arithmetic(
    a: Value,
    b: Value,
    int: fn(i32, i32) -> i32,
    float: fn(f64, f64) -> f64,
) -> Value {
    match numbers(a, b) {
        Some(Numbers::Ints(x, y)) => Value::from_int(int(x, y)),
        Some(Numbers::Floats(x, y)) => Value::from_f64(float(x, y)),
        None => Value::NULL,
    }
}

pub fn add(a: Value, b: Value) -> Result<Value, RuntimeError> {
    if let (Kind::Str(_), Kind::Str(_)) = (a.kind(), b.kind()) {
        return concat(a, b);
    }
    Ok(arithmetic(a, b, i32::wrapping_add, |x, y| x + y))
}

pub fn sub(a: Value, b: Value) -> Value {
    arithmetic(a, b, i32::wrapping_sub, |x, y| x - y)
}

pub fn mul(a: Value, b: Value) -> Value {
    arithmetic(a, b, i32::wrapping_mul, |x, y| x * y)
}

/// Always a float, with IEEE semantics for a zero divisor.
pub fn div(a: Value, b: Value) -> Value {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => Value::from_f64(x / y),
        _ => Value::NULL,
    }
}

pub fn rem(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match numbers(a, b) {
        Some(Numbers::Ints(_, 0)) => Err(RuntimeError::DivisionByZero),
        Some(Numbers::Ints(x, y)) => Ok(Value::from_int(x.wrapping_rem(y))),
        Some(Numbers::Floats(x, y)) => Ok(Value::from_f64(x % y)),
        None => Ok(Value::NULL),
    }
}

pub fn neg(a: Value) -> Value {
    match a.kind() {
        Kind::Int(i) => Value::from_int(i.wrapping_neg()),
        Kind::Float(f) => Value::from_f64(-f),
        _ => Value::NULL,
    }
}

/// Join two strings into a fresh GC buffer.
fn concat(a: Value, b: Value) -> Result<Value, RuntimeError> {
    // SAFETY: string operands are reachable for the whole call.
    let (left, right) = unsafe {
        (
            a.as_c_str().map_or(&[][..], |s| s.to_bytes()),
            b.as_c_str().map_or(&[][..], |s| s.to_bytes()),
        )
    };
    let len = left.len() + right.len();
    // Zeroed, so the terminator is already in place.
    let buf = gc::allocate(len + 1)?.as_ptr();
    // SAFETY: `buf` holds `len + 1` bytes and overlaps neither operand.
    unsafe {
        std::ptr::copy_nonoverlapping(left.as_ptr(), buf, left.len());
        std::ptr::copy_nonoverlapping(right.as_ptr(), buf.add(left.len()), right.len());
    }
    Ok(Value::string(buf.cast::<c_char>()))
}

/// Numbers by value, strings by content, everything else by identity.
#[allow(clippy::float_cmp, reason = "language equality is exact")]
pub fn equals(a: Value, b: Value) -> bool {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x == y;
    }
    if let (Kind::Str(_), Kind::Str(_)) = (a.kind(), b.kind()) {
        // SAFETY: string operands are reachable for the whole call.
        return unsafe { a.as_c_str() == b.as_c_str() };
    }
    a == b
}

/// Ordering of two numbers; `None` when either side is not a number.
fn compare(a: Value, b: Value) -> Option<Ordering> {
    a.as_number()?.partial_cmp(&b.as_number()?)
}

// ─── Entry points ───

#[no_mangle]
#[expect(clippy::cast_possible_truncation, reason = "Aria integers are 32-bit")]
pub extern "C" fn dyn_new_int(value: i64) -> Value {
    Value::from_int(value as i32)
}

/// Takes the IEEE bits so generated code can pass them in `rdi`.
#[no_mangle]
pub extern "C" fn dyn_new_float(bits: u64) -> Value {
    Value::from_f64(f64::from_bits(bits))
}

#[no_mangle]
pub extern "C" fn dyn_new_bool(value: i64) -> Value {
    Value::from_bool(value != 0)
}

#[no_mangle]
pub extern "C" fn dyn_new_str(text: *const c_char) -> Value {
    if text.is_null() {
        Value::NULL
    } else {
        Value::string(text)
    }
}

#[no_mangle]
pub extern "C" fn dyn_new_null() -> Value {
    Value::NULL
}

#[no_mangle]
pub extern "C" fn dyn_add(a: Value, b: Value) -> Value {
    add(a, b).or_fatal()
}

#[no_mangle]
pub extern "C" fn dyn_sub(a: Value, b: Value) -> Value {
    sub(a, b)
}

#[no_mangle]
pub extern "C" fn dyn_mul(a: Value, b: Value) -> Value {
    mul(a, b)
}

#[no_mangle]
pub extern "C" fn dyn_div(a: Value, b: Value) -> Value {
    div(a, b)
}

#[no_mangle]
pub extern "C" fn dyn_mod(a: Value, b: Value) -> Value {
    rem(a, b).or_fatal()
}

#[no_mangle]
pub extern "C" fn dyn_neg(a: Value) -> Value {
    neg(a)
}

#[no_mangle]
pub extern "C" fn dyn_not(a: Value) -> Value {
    Value::from_bool(!a.is_truthy())
}

/// Raw 0 or 1, not a boxed value.
#[no_mangle]
pub extern "C" fn dyn_truthy(a: Value) -> u64 {
    u64::from(a.is_truthy())
}

#[no_mangle]
pub extern "C" fn dyn_eq(a: Value, b: Value) -> Value {
    Value::from_bool(equals(a, b))
}

#[no_mangle]
pub extern "C" fn dyn_neq(a: Value, b: Value) -> Value {
    Value::from_bool(!equals(a, b))
}

#[no_mangle]
pub extern "C" fn dyn_lt(a: Value, b: Value) -> Value {
    Value::from_bool(compare(a, b) == Some(Ordering::Less))
}

#[no_mangle]
pub extern "C" fn dyn_le(a: Value, b: Value) -> Value {
    Value::from_bool(matches!(
        compare(a, b),
        Some(Ordering::Less | Ordering::Equal)
    ))
}

#[no_mangle]
pub extern "C" fn dyn_gt(a: Value, b: Value) -> Value {
    Value::from_bool(compare(a, b) == Some(Ordering::Greater))
}

#[no_mangle]
pub extern "C" fn dyn_ge(a: Value, b: Value) -> Value {
    Value::from_bool(matches!(
        compare(a, b),
        Some(Ordering::Greater | Ordering::Equal)
    ))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests;
