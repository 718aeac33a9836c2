//! Declarations.

use aria_ir::{Name, NodeId, NodeKind, SymbolId, TokenKind};

use crate::Parser;

impl Parser<'_> {
    /// One top-level item. Only declarations are allowed here.
    pub(crate) fn top_level_declaration(&mut self) -> Option<NodeId> {
        match self.current.kind {
            TokenKind::Func => {
                self.advance();
                Some(self.function())
            }
            TokenKind::Class => {
                self.advance();
                Some(self.class_declaration())
            }
            TokenKind::Var => {
                self.advance();
                Some(self.var_declaration(false))
            }
            TokenKind::Managed => {
                self.advance();
                Some(self.managed_declaration())
            }
            _ => {
                self.error_at_current("Expect declaration.");
                self.advance();
                None
            }
        }
    }

    /// A statement or local variable declaration inside a block.
    pub(crate) fn local_declaration(&mut self) -> Option<NodeId> {
        match self.current.kind {
            TokenKind::Var => {
                self.advance();
                Some(self.var_declaration(false))
            }
            TokenKind::Managed => {
                self.advance();
                Some(self.managed_declaration())
            }
            TokenKind::Func | TokenKind::Class => {
                self.error_at_current("Functions and classes must be declared at top level.");
                self.advance();
                None
            }
            _ => Some(self.statement()),
        }
    }

    fn managed_declaration(&mut self) -> NodeId {
        self.consume(TokenKind::Var, "Expect 'var' after 'managed'.");
        self.var_declaration(true)
    }

    /// `var name (= init)?;` with the `var` already consumed.
    pub(crate) fn var_declaration(&mut self, managed: bool) -> NodeId {
        self.consume(TokenKind::Identifier, "Expect variable name.");
        let (name, id) = self.declare_previous();

        let init = if self.match_token(TokenKind::Eq) {
            Some(self.expression())
        } else {
            None
        };
        self.scopes.mark_initialized();
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.");
        self.alloc(NodeKind::VarDecl {
            name,
            id,
            init,
            managed,
        })
    }

    /// Declare the identifier just consumed, reporting duplicates.
    fn declare_previous(&mut self) -> (Name, SymbolId) {
        let lexeme = self.previous.lexeme;
        let name = self.intern(lexeme);
        let id = match self.scopes.declare(name) {
            Ok(id) => id,
            Err(existing) => {
                self.semantic_error(&format!("Variable '{lexeme}' already declared in this scope."));
                existing
            }
        };
        (name, id)
    }

    /// `name(params) { body }` with `func` already consumed.
    ///
    /// Inside a class the emitted name is `Class_method` and `this` is
    /// prepended to the parameters; a free `main` becomes `aria_main`.
    fn function(&mut self) -> NodeId {
        self.consume(TokenKind::Identifier, "Expect function name.");
        let source_name = self.intern(self.previous.lexeme);
        let name = match self.class {
            Some(class) => {
                let mangled = format!(
                    "{}_{}",
                    self.arena.name(class),
                    self.arena.name(source_name)
                );
                self.intern(&mangled)
            }
            None if self.previous.lexeme == "main" => self.intern("aria_main"),
            None => source_name,
        };
        tracing::trace!(name = self.arena.name(name), "parsing function");

        let enclosing_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.scopes.begin_scope();

        let mut params = Vec::new();
        if self.class.is_some() {
            let this = self.intern("this");
            let id = self.scopes.declare(this).unwrap_or_else(|existing| existing);
            self.scopes.mark_initialized();
            params.push(self.alloc(NodeKind::Var { name: this, id }));
        }

        self.consume(TokenKind::LParen, "Expect '(' after function name.");
        if !self.check(TokenKind::RParen) {
            loop {
                self.consume(TokenKind::Identifier, "Expect parameter name.");
                let (param, id) = self.declare_previous();
                self.scopes.mark_initialized();
                params.push(self.alloc(NodeKind::Var { name: param, id }));
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "Expect ')' after parameters.");
        self.consume(TokenKind::LBrace, "Expect '{' before function body.");
        let body = self.block();

        self.scopes.end_scope();
        self.loop_depth = enclosing_loops;

        let arity = u32::try_from(params.len()).unwrap_or(u32::MAX);
        let params = self.arena.link(&params);
        self.alloc(NodeKind::FuncDecl {
            name,
            source_name,
            params,
            arity,
            body,
        })
    }

    /// `Name { func method(...) {...} ... }` with `class` already consumed.
    fn class_declaration(&mut self) -> NodeId {
        self.consume(TokenKind::Identifier, "Expect class name.");
        let name = self.intern(self.previous.lexeme);
        self.consume(TokenKind::LBrace, "Expect '{' before class body.");

        let enclosing = self.class.replace(name);
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if self.match_token(TokenKind::Func) {
                methods.push(self.function());
            } else {
                self.error_at_current("Expect method declaration.");
                self.advance();
            }
            if self.panic_mode {
                self.synchronize();
            }
        }
        self.class = enclosing;
        self.consume(TokenKind::RBrace, "Expect '}' after class body.");

        let methods = self.arena.link(&methods);
        self.alloc(NodeKind::ClassDecl { name, methods })
    }
}
