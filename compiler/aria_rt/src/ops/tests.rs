use super::*;
use crate::test_support::{in_fatal_child, run_fatal_child, serial};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn int(i: i32) -> Value {
    Value::from_int(i)
}

fn float(f: f64) -> Value {
    Value::from_f64(f)
}

fn text(value: Value) -> String {
    // SAFETY: test strings are static or freshly allocated under the serial lock.
    let s = unsafe { value.as_c_str() }.unwrap();
    s.to_str().unwrap().to_owned()
}

// ─── Constructors ───

#[test]
fn test_constructors() {
    assert_eq!(dyn_new_int(7), int(7));
    assert_eq!(dyn_new_int(0x1_0000_0005), int(5));
    assert_eq!(dyn_new_float(2.5f64.to_bits()), float(2.5));
    assert_eq!(dyn_new_bool(1), Value::TRUE);
    assert_eq!(dyn_new_bool(0), Value::FALSE);
    assert_eq!(dyn_new_null(), Value::NULL);
    assert_eq!(dyn_new_str(std::ptr::null()), Value::NULL);
    assert_eq!(text(dyn_new_str(c"abc".as_ptr())), "abc");
}

// ─── Arithmetic ───

#[test]
fn test_int_arithmetic() {
    assert_eq!(dyn_add(int(2), int(3)), int(5));
    assert_eq!(dyn_sub(int(2), int(3)), int(-1));
    assert_eq!(dyn_mul(int(4), int(-3)), int(-12));
    assert_eq!(dyn_mod(int(7), int(3)), int(1));
    assert_eq!(dyn_mod(int(-7), int(3)), int(-1));
}

#[test]
fn test_int_arithmetic_wraps() {
    assert_eq!(dyn_add(int(i32::MAX), int(1)), int(i32::MIN));
    assert_eq!(dyn_mul(int(i32::MIN), int(-1)), int(i32::MIN));
    assert_eq!(dyn_neg(int(i32::MIN)), int(i32::MIN));
    assert_eq!(dyn_mod(int(i32::MIN), int(-1)), int(0));
}

#[test]
fn test_mixed_operands_promote() {
    assert_eq!(dyn_add(int(1), float(0.5)), float(1.5));
    assert_eq!(dyn_sub(float(2.0), int(3)), float(-1.0));
    assert_eq!(dyn_mul(float(1.5), int(2)), float(3.0));
    assert_eq!(dyn_mod(float(7.5), int(2)), float(1.5));
}

#[test]
fn test_division_is_float() {
    assert_eq!(dyn_div(int(7), int(2)), float(3.5));
    assert_eq!(dyn_div(int(4), int(2)), float(2.0));
    assert_eq!(dyn_div(int(1), int(0)), float(f64::INFINITY));
    assert!(dyn_div(int(0), int(0)).as_f64().is_some_and(f64::is_nan));
}

#[test]
fn test_unsupported_operands_yield_null() {
    assert_eq!(dyn_add(int(1), Value::NULL), Value::NULL);
    assert_eq!(dyn_sub(Value::TRUE, int(1)), Value::NULL);
    assert_eq!(dyn_div(Value::string(c"x".as_ptr()), int(1)), Value::NULL);
    assert_eq!(dyn_mod(Value::NULL, int(0)), Value::NULL);
    assert_eq!(dyn_neg(Value::FALSE), Value::NULL);
}

#[test]
fn test_mod_by_zero() {
    assert_eq!(rem(int(1), int(0)), Err(RuntimeError::DivisionByZero));
    assert!(rem(float(1.0), int(0)).unwrap().as_f64().is_some_and(f64::is_nan));
}

#[test]
fn test_mod_by_zero_is_fatal() {
    if in_fatal_child() {
        dyn_mod(int(5), int(0));
        return;
    }
    let output = run_fatal_child("ops::tests::test_mod_by_zero_is_fatal");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Runtime Error: Division by zero (mod)."), "{stderr}");
}

#[test]
fn test_string_concat() {
    let _serial = serial();
    let joined = dyn_add(Value::string(c"foo".as_ptr()), Value::string(c"bar".as_ptr()));
    assert_eq!(text(joined), "foobar");
    let empty = dyn_add(Value::string(c"".as_ptr()), Value::string(c"".as_ptr()));
    assert_eq!(text(empty), "");
    assert_eq!(dyn_add(Value::string(c"n".as_ptr()), int(1)), Value::NULL);
}

// ─── Logic and comparison ───

#[test]
fn test_not_and_truthy() {
    assert_eq!(dyn_not(Value::NULL), Value::TRUE);
    assert_eq!(dyn_not(int(3)), Value::FALSE);
    assert_eq!(dyn_truthy(int(0)), 0);
    assert_eq!(dyn_truthy(float(0.5)), 1);
    assert_eq!(dyn_truthy(Value::string(c"".as_ptr())), 1);
}

#[test]
fn test_equality() {
    assert_eq!(dyn_eq(int(2), float(2.0)), Value::TRUE);
    assert_eq!(dyn_eq(Value::NULL, Value::NULL), Value::TRUE);
    assert_eq!(dyn_eq(Value::NULL, Value::FALSE), Value::FALSE);
    assert_eq!(dyn_neq(int(1), int(2)), Value::TRUE);
    assert_eq!(dyn_eq(float(f64::NAN), float(f64::NAN)), Value::FALSE);
}

#[test]
fn test_string_equality_by_content() {
    let owned = std::ffi::CString::new("same").unwrap();
    let a = Value::string(c"same".as_ptr());
    let b = Value::string(owned.as_ptr());
    assert_ne!(a.to_bits(), b.to_bits());
    assert_eq!(dyn_eq(a, b), Value::TRUE);
    assert_eq!(dyn_eq(a, Value::string(c"other".as_ptr())), Value::FALSE);
}

#[test]
fn test_heap_equality_by_identity() {
    let _serial = serial();
    let a = crate::object::aria_alloc_object();
    let b = crate::object::aria_alloc_object();
    assert_eq!(dyn_eq(a, a), Value::TRUE);
    assert_eq!(dyn_eq(a, b), Value::FALSE);
}

#[test]
fn test_ordering() {
    assert_eq!(dyn_lt(int(1), int(2)), Value::TRUE);
    assert_eq!(dyn_le(int(2), float(2.0)), Value::TRUE);
    assert_eq!(dyn_gt(float(2.5), int(2)), Value::TRUE);
    assert_eq!(dyn_ge(int(1), int(2)), Value::FALSE);
}

#[test]
fn test_ordering_non_numbers_is_false() {
    let s = Value::string(c"a".as_ptr());
    for op in [dyn_lt, dyn_le, dyn_gt, dyn_ge] {
        assert_eq!(op(s, s), Value::FALSE);
        assert_eq!(op(Value::NULL, int(1)), Value::FALSE);
    }
}

// ─── Properties ───

proptest! {
    #[test]
    fn int_ops_match_wrapping_i32(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(dyn_add(int(a), int(b)), int(a.wrapping_add(b)));
        prop_assert_eq!(dyn_sub(int(a), int(b)), int(a.wrapping_sub(b)));
        prop_assert_eq!(dyn_mul(int(a), int(b)), int(a.wrapping_mul(b)));
        prop_assert_eq!(dyn_lt(int(a), int(b)), Value::from_bool(a < b));
        prop_assert_eq!(dyn_eq(int(a), int(b)), Value::from_bool(a == b));
        if b != 0 {
            prop_assert_eq!(dyn_mod(int(a), int(b)), int(a.wrapping_rem(b)));
        }
    }
}
