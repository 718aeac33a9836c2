//! The scanner proper.

use aria_ir::{Token, TokenKind};

use crate::cursor::Cursor;
use crate::keywords;

const UNTERMINATED_STRING: &str = "Unterminated string.";
const UNEXPECTED_CHARACTER: &str = "Unexpected character.";

/// Single-pass scanner over one source text.
///
/// Each call to [`scan_token`](Lexer::scan_token) skips trivia and returns
/// the next token. After the end of input every call returns `Eof`; the
/// [`Iterator`] impl yields that `Eof` exactly once.
#[derive(Clone, Debug)]
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    start: usize,
    line: u32,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
            start: 0,
            line: 1,
            finished: false,
        }
    }

    /// Scan the next token.
    pub fn scan_token(&mut self) -> Token<'src> {
        self.skip_trivia();
        self.start = self.cursor.pos();

        if self.cursor.is_eof() {
            return self.make(TokenKind::Eof);
        }

        let c = self.cursor.current();
        self.cursor.advance();

        match c {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),
            b'0'..=b'9' => self.number(c),
            b'"' => self.string(),
            b'(' => self.make(TokenKind::LParen),
            b')' => self.make(TokenKind::RParen),
            b'{' => self.make(TokenKind::LBrace),
            b'}' => self.make(TokenKind::RBrace),
            b'[' => self.make(TokenKind::LBracket),
            b']' => self.make(TokenKind::RBracket),
            b';' => self.make(TokenKind::Semicolon),
            b',' => self.make(TokenKind::Comma),
            b'.' => self.make(TokenKind::Dot),
            b':' => self.make(TokenKind::Colon),
            b'?' => self.make(TokenKind::Question),
            b'%' => self.make(TokenKind::Percent),
            b'+' => self.with_eq(TokenKind::PlusEq, TokenKind::Plus),
            b'*' => self.with_eq(TokenKind::StarEq, TokenKind::Star),
            b'/' => self.with_eq(TokenKind::SlashEq, TokenKind::Slash),
            b'=' => self.with_eq(TokenKind::EqEq, TokenKind::Eq),
            b'!' => self.with_eq(TokenKind::NotEq, TokenKind::Bang),
            b'<' => self.with_eq(TokenKind::LtEq, TokenKind::Lt),
            b'>' => self.with_eq(TokenKind::GtEq, TokenKind::Gt),
            b'-' => {
                if self.cursor.eat(b'>') {
                    self.make(TokenKind::Arrow)
                } else {
                    self.with_eq(TokenKind::MinusEq, TokenKind::Minus)
                }
            }
            b'&' => self.doubled(b'&', TokenKind::AndAnd),
            b'|' => self.doubled(b'|', TokenKind::OrOr),
            _ => {
                self.cursor.skip_continuation_bytes();
                self.error(UNEXPECTED_CHARACTER)
            }
        }
    }

    // ─── Trivia ───

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.current() {
                b' ' | b'\t' | b'\r' => self.cursor.advance(),
                b'\n' => {
                    self.line += 1;
                    self.cursor.advance();
                }
                b'/' if self.cursor.peek() == b'/' => {
                    self.cursor.eat_while(|b| b != b'\n');
                }
                b'/' if self.cursor.peek() == b'*' => self.block_comment(),
                _ => return,
            }
        }
    }

    /// Skip a `/* ... */` comment. Unterminated comments run to end of input.
    fn block_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        while !self.cursor.is_eof() {
            match self.cursor.current() {
                b'*' if self.cursor.peek() == b'/' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    return;
                }
                b'\n' => self.line += 1,
                _ => {}
            }
            self.cursor.advance();
        }
    }

    // ─── Literals ───

    fn identifier(&mut self) -> Token<'src> {
        self.cursor
            .eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        let text = self.cursor.slice_from(self.start);
        let kind = keywords::lookup(text).unwrap_or(TokenKind::Identifier);
        self.make(kind)
    }

    fn number(&mut self, first: u8) -> Token<'src> {
        if first == b'0' {
            match self.cursor.current() {
                b'x' | b'X' if self.cursor.peek().is_ascii_hexdigit() => {
                    self.cursor.advance();
                    self.cursor.eat_while(|b| b.is_ascii_hexdigit());
                    return self.make(TokenKind::Number);
                }
                b'b' | b'B' if matches!(self.cursor.peek(), b'0' | b'1') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|b| b == b'0' || b == b'1');
                    return self.make(TokenKind::Number);
                }
                _ => {}
            }
        }

        self.cursor.eat_while(|b| b.is_ascii_digit());
        if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
            return self.make(TokenKind::Float);
        }
        self.make(TokenKind::Number)
    }

    /// Scan a string literal. Escapes are kept verbatim; a backslash only
    /// protects the following character from ending the literal.
    fn string(&mut self) -> Token<'src> {
        loop {
            if self.cursor.is_eof() {
                return self.error(UNTERMINATED_STRING);
            }
            match self.cursor.current() {
                b'"' => break,
                b'\n' => self.line += 1,
                b'\\' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.line += 1;
                    }
                }
                _ => {}
            }
            self.cursor.advance();
        }
        self.cursor.advance();
        self.make(TokenKind::String)
    }

    // ─── Operators ───

    fn with_eq(&mut self, matched: TokenKind, single: TokenKind) -> Token<'src> {
        if self.cursor.eat(b'=') {
            self.make(matched)
        } else {
            self.make(single)
        }
    }

    fn doubled(&mut self, second: u8, kind: TokenKind) -> Token<'src> {
        if self.cursor.eat(second) {
            self.make(kind)
        } else {
            self.error(UNEXPECTED_CHARACTER)
        }
    }

    // ─── Token construction ───

    fn make(&self, kind: TokenKind) -> Token<'src> {
        Token::new(kind, self.cursor.slice_from(self.start), self.line)
    }

    fn error(&self, message: &'static str) -> Token<'src> {
        Token::new(TokenKind::Error, message, self.line)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        if self.finished {
            return None;
        }
        let token = self.scan_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}
