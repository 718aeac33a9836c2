//! Aria lexer.
//!
//! Turns source text into a lazy stream of [`Token`]s, one per call to
//! [`Lexer::scan_token`]. The scanner never fails: malformed input becomes a
//! [`TokenKind::Error`] token whose lexeme is the diagnostic, and the caller
//! decides how to report it.
//!
//! Whitespace and both comment styles are skipped before each token.
//! String literals keep their escape sequences; unescaping happens in the
//! parser.

mod cursor;
mod keywords;
mod lexer;

pub use aria_ir::{Token, TokenKind};
pub use keywords::lookup as lookup_keyword;
pub use lexer::Lexer;

/// Scan the whole source, including the trailing `Eof` token.
pub fn lex(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).collect()
}
