//! Parse error type.

use std::fmt;

/// Where on the line a parse error points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorLocation {
    /// At a source token, holding its text.
    Token(String),
    /// At end of input.
    End,
    /// At a lexical error; the message already says what was wrong.
    Lexical,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLocation::Token(lexeme) => write!(f, " at '{lexeme}'"),
            ErrorLocation::End => f.write_str(" at end"),
            ErrorLocation::Lexical => Ok(()),
        }
    }
}

/// A recoverable syntax or resolution error.
///
/// Renders as `[line N] Error at 'tok': message`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub location: ErrorLocation,
    pub message: String,
}
