//! Reserved keyword lookup.
//!
//! Keywords are 2-8 ASCII lowercase letters. The identifier's length is the
//! first-pass filter, then the text is matched against the keywords of that
//! length.

use aria_ir::TokenKind;

/// Look up a reserved keyword by text.
///
/// Returns `None` for ordinary identifiers.
#[inline]
pub fn lookup(text: &str) -> Option<TokenKind> {
    let bytes = text.as_bytes();
    if !(2..=8).contains(&bytes.len()) || !bytes[0].is_ascii_lowercase() {
        return None;
    }

    match bytes.len() {
        2 => match text {
            "if" => Some(TokenKind::If),
            "is" => Some(TokenKind::Is),
            _ => None,
        },
        3 => match text {
            "for" => Some(TokenKind::For),
            "new" => Some(TokenKind::New),
            "var" => Some(TokenKind::Var),
            _ => None,
        },
        4 => match text {
            "else" => Some(TokenKind::Else),
            "func" => Some(TokenKind::Func),
            "null" => Some(TokenKind::Null),
            "true" => Some(TokenKind::True),
            _ => None,
        },
        5 => match text {
            "break" => Some(TokenKind::Break),
            "class" => Some(TokenKind::Class),
            "false" => Some(TokenKind::False),
            "while" => Some(TokenKind::While),
            _ => None,
        },
        6 => match text {
            "return" => Some(TokenKind::Return),
            _ => None,
        },
        7 => match text {
            "managed" => Some(TokenKind::Managed),
            _ => None,
        },
        8 => match text {
            "continue" => Some(TokenKind::Continue),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests;
