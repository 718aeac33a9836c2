//! `print` and `println` builtins.

use std::io::{self, Write};

use crate::value::{Kind, Value};

/// Write the display form of `value`.
pub fn render(value: Value, out: &mut impl Write) -> io::Result<()> {
    match value.kind() {
        Kind::Int(i) => write!(out, "{i}"),
        Kind::Float(f) => write!(out, "{f:.6}"),
        Kind::Bool(b) => write!(out, "{b}"),
        Kind::Null => out.write_all(b"null"),
        Kind::Str(_) => {
            // SAFETY: string values point at NUL-terminated data that is
            // reachable while we hold the value.
            match unsafe { value.as_c_str() } {
                Some(text) => out.write_all(text.to_bytes()),
                None => out.write_all(b"null"),
            }
        }
        Kind::Object(_) => out.write_all(b"<object>"),
        Kind::List(_) => out.write_all(b"<list>"),
    }
}

fn emit(value: Value, newline: bool) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = render(value, &mut out)
        .and_then(|()| if newline { out.write_all(b"\n") } else { Ok(()) })
        .and_then(|()| out.flush());
    if let Err(err) = written {
        tracing::warn!(%err, "write to stdout failed");
    }
}

/// Builtin `print(v)`. Returns null.
#[no_mangle]
pub extern "C" fn print(value: Value) -> Value {
    emit(value, false);
    Value::NULL
}

/// Builtin `println(v)`. Returns null.
#[no_mangle]
pub extern "C" fn println(value: Value) -> Value {
    emit(value, true);
    Value::NULL
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests {
    use super::*;
    use crate::test_support::serial;
    use pretty_assertions::assert_eq;

    fn rendered(value: Value) -> String {
        let mut buf = Vec::new();
        render(value, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(rendered(Value::from_int(-12)), "-12");
        assert_eq!(rendered(Value::from_f64(1.5)), "1.500000");
        assert_eq!(rendered(Value::from_f64(-0.25)), "-0.250000");
        assert_eq!(rendered(Value::TRUE), "true");
        assert_eq!(rendered(Value::FALSE), "false");
        assert_eq!(rendered(Value::NULL), "null");
    }

    #[test]
    fn test_strings_verbatim() {
        assert_eq!(rendered(Value::string(c"hi there".as_ptr())), "hi there");
        assert_eq!(rendered(Value::string(std::ptr::null())), "null");
    }

    #[test]
    fn test_heap_values() {
        let _serial = serial();
        assert_eq!(rendered(crate::object::aria_alloc_object()), "<object>");
        assert_eq!(rendered(crate::list::list_new()), "<list>");
    }

    #[test]
    fn test_builtins_return_null() {
        assert_eq!(print(Value::from_int(1)), Value::NULL);
        assert_eq!(println(Value::NULL), Value::NULL);
    }
}
