//! Token types for the Aria lexer.

use std::fmt;

/// A token: kind, the source slice it was scanned from, and its line.
///
/// Tokens borrow from the source and never own memory. For
/// [`TokenKind::Error`] the lexeme is the diagnostic message instead of
/// source text.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub line: u32,
}

impl<'src> Token<'src> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'src str, line: u32) -> Self {
        Token { kind, lexeme, line }
    }

    /// Placeholder used before the first token has been read.
    pub fn dummy(kind: TokenKind) -> Self {
        Token {
            kind,
            lexeme: "",
            line: 0,
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} @ line {}", self.kind, self.lexeme, self.line)
    }
}

/// Token kinds for Aria.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // Keywords
    Func,
    Var,
    Return,
    If,
    Else,
    While,
    For,
    Class,
    Managed,
    New,
    True,
    False,
    Null,
    Break,
    Continue,
    Is,

    // Literals
    Identifier,
    Number,
    Float,
    String,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Arrow,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,

    /// Lexical error; the token's lexeme holds the message.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable name for diagnostics.
    #[inline]
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Func => "func",
            TokenKind::Var => "var",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Class => "class",
            TokenKind::Managed => "managed",
            TokenKind::New => "new",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Is => "is",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Arrow => "->",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether this token starts a declaration or statement.
    ///
    /// Error recovery stops in front of these.
    #[inline]
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Func
                | TokenKind::Var
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Managed
                | TokenKind::Class
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
