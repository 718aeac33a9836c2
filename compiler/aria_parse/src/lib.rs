//! Parser and resolver for Aria.
//!
//! Consumes the lexer's token stream one token at a time and builds the
//! program AST directly into an [`AstArena`]. Expressions use a Pratt
//! parser driven by a rule table; statements and declarations are plain
//! recursive descent. Identifiers are resolved against a scoped symbol
//! table while parsing, so every `Var`, `Assign` and `VarDecl` node leaves
//! the parser already carrying its [`SymbolId`](aria_ir::SymbolId).
//!
//! Errors never stop the parse. The first syntax error of a statement is
//! recorded, the parser enters panic mode, and [`Parser::synchronize`]
//! skips to the next statement boundary. Resolution errors (duplicate
//! declarations, reading a local in its own initializer) are recorded
//! without entering panic mode. The caller decides what to do with [`ParseOutput::errors`].

mod error;
mod grammar;
mod literal;
mod scope;

pub use error::{ErrorLocation, ParseError};

use aria_ir::{AstArena, Name, NodeId, NodeKind, Token, TokenKind};
use aria_lexer::Lexer;
use scope::Scopes;

/// Result of parsing one source file.
#[derive(Debug)]
pub struct ParseOutput {
    pub arena: AstArena,
    /// Head of the top-level declaration list.
    pub program: Option<NodeId>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a whole program.
pub fn parse(source: &str) -> ParseOutput {
    Parser::new(source).parse_program()
}

/// Parser state for one compilation unit.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    arena: AstArena,
    errors: Vec<ParseError>,
    panic_mode: bool,
    scopes: Scopes,
    /// Class whose methods are being parsed, for name mangling.
    class: Option<Name>,
    loop_depth: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            current: Token::dummy(TokenKind::Eof),
            previous: Token::dummy(TokenKind::Eof),
            arena: AstArena::new(),
            errors: Vec::new(),
            panic_mode: false,
            scopes: Scopes::new(),
            class: None,
            loop_depth: 0,
        }
    }

    /// Parse top-level declarations until end of input.
    pub fn parse_program(mut self) -> ParseOutput {
        self.advance();
        let mut decls = Vec::new();
        while !self.check(TokenKind::Eof) {
            if let Some(decl) = self.top_level_declaration() {
                decls.push(decl);
            }
            if self.panic_mode {
                self.synchronize();
            }
        }
        let program = self.arena.link(&decls);

        tracing::debug!(
            declarations = decls.len(),
            nodes = self.arena.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        ParseOutput {
            arena: self.arena,
            program,
            errors: self.errors,
        }
    }

    // ─── Token navigation ───

    /// Move to the next non-error token, reporting any error tokens skipped.
    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.lexer.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let message = self.current.lexeme;
            self.error_at_current(message);
        }
    }

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
        } else {
            self.error_at_current(message);
        }
    }

    // ─── Diagnostics ───

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.report_at(token, message);
    }

    /// Record an error at the previous token and keep parsing normally.
    fn semantic_error(&mut self, message: &str) {
        self.report_at(self.previous, message);
    }

    fn report_at(&mut self, token: Token<'src>, message: &str) {
        let location = match token.kind {
            TokenKind::Eof => ErrorLocation::End,
            TokenKind::Error => ErrorLocation::Lexical,
            _ => ErrorLocation::Token(token.lexeme.to_owned()),
        };
        tracing::trace!(line = token.line, message, "parse error");
        self.errors.push(ParseError {
            line: token.line,
            location,
            message: message.to_owned(),
        });
    }

    /// Leave panic mode and skip to the next statement boundary.
    pub(crate) fn synchronize(&mut self) {
        self.panic_mode = false;
        while !self.check(TokenKind::Eof) {
            if self.previous.kind == TokenKind::Semicolon || self.current.kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    // ─── Arena helpers ───

    #[inline]
    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.arena.alloc(kind, self.previous.line)
    }

    /// Intern `text`, reporting a parse error if it cannot be stored.
    fn intern(&mut self, text: &str) -> Name {
        match self.arena.intern(text) {
            Ok(name) => name,
            Err(err) => {
                self.error(&err.to_string());
                Name::EMPTY
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests;
