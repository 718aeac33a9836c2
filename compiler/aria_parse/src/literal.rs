//! Literal decoding: integer radixes and string escapes.

/// Parse an integer literal in decimal, `0x` hex or `0b` binary form.
pub(crate) fn parse_int(lexeme: &str) -> Option<i64> {
    let (digits, radix) = match lexeme.as_bytes() {
        [b'0', b'x' | b'X', ..] => (&lexeme[2..], 16),
        [b'0', b'b' | b'B', ..] => (&lexeme[2..], 2),
        _ => (lexeme, 10),
    };
    i64::from_str_radix(digits, radix).ok()
}

/// Strip the quotes from a string literal and decode its escapes.
///
/// `\n \r \t \\ \" \0` are recognised; any other escaped character stands
/// for itself.
pub(crate) fn unescape(lexeme: &str) -> String {
    let body = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_radixes() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0XfF"), Some(255));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("0"), Some(0));
    }

    #[test]
    fn test_parse_int_overflow() {
        assert_eq!(parse_int("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_int("9223372036854775808"), None);
        assert_eq!(parse_int("0x10000000000000000"), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#""plain""#), "plain");
        assert_eq!(unescape(r#""a\nb""#), "a\nb");
        assert_eq!(unescape(r#""tab\there""#), "tab\there");
        assert_eq!(unescape(r#""q\"q""#), "q\"q");
        assert_eq!(unescape(r#""back\\slash""#), "back\\slash");
        assert_eq!(unescape(r#""nul\0""#), "nul\0");
        assert_eq!(unescape(r#""\q""#), "q");
        assert_eq!(unescape(r#""""#), "");
    }
}
