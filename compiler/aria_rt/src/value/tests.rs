use super::*;
use proptest::prelude::*;

#[test]
fn test_tag_layout() {
    assert_eq!(Value::NULL.to_bits(), 0xFFF9_0000_0000_0000);
    assert_eq!(Value::FALSE.to_bits(), 0xFFFA_0000_0000_0000);
    assert_eq!(Value::TRUE.to_bits(), 0xFFFB_0000_0000_0000);
    assert_eq!(Value::from_int(1).to_bits(), 0xFFFC_0000_0000_0001);
    assert_eq!(Value::from_int(-1).to_bits(), 0xFFFC_0000_FFFF_FFFF);
    assert_eq!(Value::list(0x1000).to_bits(), 0xFFFF_0000_0000_1000);
}

#[test]
fn test_kinds() {
    assert_eq!(Value::NULL.kind(), Kind::Null);
    assert_eq!(Value::from_bool(true).kind(), Kind::Bool(true));
    assert_eq!(Value::from_int(-7).kind(), Kind::Int(-7));
    assert_eq!(Value::from_f64(2.5).kind(), Kind::Float(2.5));
    assert_eq!(Value::object(0x2000).kind(), Kind::Object(0x2000));
    assert_eq!(Value::object(0x2000).heap_address(), Some(0x2000));
    assert_eq!(Value::from_int(3).heap_address(), None);
}

#[test]
fn test_colliding_double_is_canonicalized() {
    let colliding = f64::from_bits(0xFFFC_0000_0000_0001);
    let boxed = Value::from_f64(colliding);
    assert!(boxed.is_float());
    assert_eq!(boxed.to_bits(), 0x7FF8_0000_0000_0000);
}

#[test]
fn test_ordinary_nan_and_infinity_stay_floats() {
    assert!(Value::from_f64(f64::NAN).is_float());
    assert_eq!(Value::from_f64(f64::INFINITY).as_f64(), Some(f64::INFINITY));
    assert_eq!(Value::from_f64(-0.0).as_f64().map(f64::to_bits), Some((-0.0f64).to_bits()));
}

#[test]
fn test_truthiness() {
    assert!(!Value::NULL.is_truthy());
    assert!(!Value::FALSE.is_truthy());
    assert!(Value::TRUE.is_truthy());
    assert!(!Value::from_int(0).is_truthy());
    assert!(Value::from_int(-3).is_truthy());
    assert!(!Value::from_f64(0.0).is_truthy());
    assert!(Value::from_f64(0.1).is_truthy());
    assert!(Value::string(c"".as_ptr()).is_truthy());
    assert!(Value::list(8).is_truthy());
}

#[test]
fn test_string_round_trip() {
    let text = c"hello";
    let boxed = Value::string(text.as_ptr());
    // SAFETY: `text` is a static C string.
    let back = unsafe { boxed.as_c_str() };
    assert_eq!(back, Some(text));
    // SAFETY: not a string, never dereferenced.
    assert_eq!(unsafe { Value::from_int(1).as_c_str() }, None);
}

#[test]
fn test_numeric_view() {
    assert_eq!(Value::from_int(4).as_number(), Some(4.0));
    assert_eq!(Value::from_f64(1.5).as_number(), Some(1.5));
    assert_eq!(Value::NULL.as_number(), None);
    assert_eq!(Value::from_f64(1.5).as_int(), None);
}

proptest! {
    #[test]
    fn int_round_trip(i in any::<i32>()) {
        prop_assert_eq!(Value::from_int(i).as_int(), Some(i));
    }

    #[test]
    fn double_round_trip(bits in any::<u64>()) {
        let d = f64::from_bits(bits);
        prop_assume!(Tag::from_top((bits >> 48) as u16).is_none());
        prop_assert_eq!(Value::from_f64(d).to_bits(), bits);
    }

    #[test]
    fn every_double_boxes_as_float(bits in any::<u64>()) {
        prop_assert!(Value::from_f64(f64::from_bits(bits)).is_float());
    }
}
