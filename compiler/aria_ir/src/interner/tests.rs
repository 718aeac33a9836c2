use super::*;
use proptest::prelude::*;

#[test]
fn test_intern_and_lookup() {
    let mut interner = StringInterner::new();

    let hello = interner.intern("hello");
    let world = interner.intern("world");
    let hello2 = interner.intern("hello");

    assert_eq!(hello, hello2);
    assert_ne!(hello, world);

    assert_eq!(interner.lookup(hello), "hello");
    assert_eq!(interner.lookup(world), "world");
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_empty_string() {
    let mut interner = StringInterner::new();
    assert!(interner.is_empty());
    let empty = interner.intern("");
    assert_eq!(empty, Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert!(interner.is_empty());
}

#[test]
fn test_same_bytes_same_address() {
    let mut interner = StringInterner::new();
    let a = interner.intern("point");
    let b = interner.intern("point");
    assert_eq!(interner.lookup(a).as_ptr(), interner.lookup(b).as_ptr());
}

#[test]
fn test_strings_are_nul_terminated_in_block() {
    let mut interner = StringInterner::new();
    let name = interner.intern("abc");
    let first = interner.intern("next");
    let abc = interner.lookup(name);
    let next = interner.lookup(first);
    // "abc\0next\0" laid out back to back in one block
    assert_eq!(next.as_ptr() as usize - abc.as_ptr() as usize, 4);
}

#[test]
fn test_fnv1a_reference_values() {
    assert_eq!(fnv1a(b""), 2_166_136_261);
    assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    assert_eq!(fnv1a(b"foobar"), 0xbf9c_f968);
}

#[test]
fn test_get_does_not_insert() {
    let mut interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert!(interner.is_empty());
    let name = interner.intern("present");
    assert_eq!(interner.get("present"), Some(name));
}

// ─── Growth ───

#[test]
fn test_table_grows_past_three_quarters() {
    let mut interner = StringInterner::with_capacity(8);
    assert_eq!(interner.capacity(), 8);
    // "" already holds one slot; five more make 6/8, exactly 75%.
    for i in 0..5 {
        interner.intern(&format!("s{i}"));
    }
    assert_eq!(interner.capacity(), 8);
    interner.intern("s5");
    assert_eq!(interner.capacity(), 16);
    assert!(interner.len() * 4 <= interner.capacity() * 3);
}

#[test]
fn test_identity_survives_resize() {
    let mut interner = StringInterner::with_capacity(4);
    let early = interner.intern("early");
    let addr = interner.lookup(early).as_ptr();

    for i in 0..5_000 {
        interner.intern(&format!("filler_{i}"));
    }

    assert!(interner.capacity() > 4);
    assert_eq!(interner.intern("early"), early);
    assert_eq!(interner.lookup(early).as_ptr(), addr);
}

#[test]
fn test_new_block_when_full() {
    let mut interner = StringInterner::new();
    let big = "x".repeat(STRING_BLOCK_SIZE / 2);
    let other = "y".repeat(STRING_BLOCK_SIZE / 2);
    interner.intern(&big);
    interner.intern(&other);
    assert_eq!(interner.block_count(), 2);
}

#[test]
fn test_oversized_string_rejected() {
    let mut interner = StringInterner::new();
    let huge = "z".repeat(STRING_BLOCK_SIZE);
    assert_eq!(
        interner.try_intern(&huge),
        Err(InternError::Oversized {
            len: STRING_BLOCK_SIZE
        })
    );
    // Largest accepted string leaves room for the terminator.
    let fits = "z".repeat(STRING_BLOCK_SIZE - 1);
    assert!(interner.try_intern(&fits).is_ok());
}

#[test]
#[should_panic(expected = "exceeds the interner block size")]
fn test_intern_panics_on_oversized() {
    let mut interner = StringInterner::new();
    interner.intern(&"q".repeat(STRING_BLOCK_SIZE + 10));
}

// ─── Properties ───

proptest! {
    #[test]
    fn interning_is_identity(strings in proptest::collection::vec("[a-zA-Z_0-9]{0,24}", 1..200)) {
        let mut interner = StringInterner::with_capacity(2);
        let first: Vec<Name> = strings.iter().map(|s| interner.intern(s)).collect();
        let second: Vec<Name> = strings.iter().map(|s| interner.intern(s)).collect();
        prop_assert_eq!(&first, &second);
        for (s, name) in strings.iter().zip(&first) {
            prop_assert_eq!(interner.lookup(*name), s.as_str());
        }
    }

    #[test]
    fn equal_names_iff_equal_strings(a in "[a-c]{0,4}", b in "[a-c]{0,4}") {
        let mut interner = StringInterner::new();
        let na = interner.intern(&a);
        let nb = interner.intern(&b);
        prop_assert_eq!(na == nb, a == b);
    }
}
