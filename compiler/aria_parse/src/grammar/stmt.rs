//! Statements and blocks.

use aria_ir::{NodeId, NodeKind, TokenKind};
use aria_stack::ensure_sufficient_stack;

use crate::Parser;

impl Parser<'_> {
    pub(crate) fn statement(&mut self) -> NodeId {
        ensure_sufficient_stack(|| {
            if self.match_token(TokenKind::If) {
                self.if_statement()
            } else if self.match_token(TokenKind::While) {
                self.while_statement()
            } else if self.match_token(TokenKind::For) {
                self.for_statement()
            } else if self.match_token(TokenKind::Return) {
                self.return_statement()
            } else if self.match_token(TokenKind::Break) {
                self.loop_jump(NodeKind::Break)
            } else if self.match_token(TokenKind::Continue) {
                self.loop_jump(NodeKind::Continue)
            } else if self.match_token(TokenKind::LBrace) {
                self.block()
            } else {
                self.expression_statement()
            }
        })
    }

    /// Statements up to the closing `}`, in a fresh scope. The `{` has
    /// already been consumed.
    pub(crate) fn block(&mut self) -> NodeId {
        self.scopes.begin_scope();
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if let Some(stmt) = self.local_declaration() {
                stmts.push(stmt);
            }
            if self.panic_mode {
                self.synchronize();
            }
        }
        self.consume(TokenKind::RBrace, "Expect '}' after block.");
        self.scopes.end_scope();

        let first = self.arena.link(&stmts);
        self.alloc(NodeKind::Block { first })
    }

    fn if_statement(&mut self) -> NodeId {
        self.consume(TokenKind::LParen, "Expect '(' after 'if'.");
        let cond = self.expression();
        self.consume(TokenKind::RParen, "Expect ')' after condition.");
        let then_branch = self.statement();
        let else_branch = if self.match_token(TokenKind::Else) {
            Some(self.statement())
        } else {
            None
        };
        self.alloc(NodeKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> NodeId {
        self.consume(TokenKind::LParen, "Expect '(' after 'while'.");
        let cond = self.expression();
        self.consume(TokenKind::RParen, "Expect ')' after condition.");
        let body = self.loop_body();
        self.alloc(NodeKind::While {
            cond,
            body,
            step: None,
        })
    }

    /// `for (init; cond; step) body` becomes
    /// `{ init; while (cond) body (step) }`.
    fn for_statement(&mut self) -> NodeId {
        self.scopes.begin_scope();
        self.consume(TokenKind::LParen, "Expect '(' after 'for'.");

        let init = if self.match_token(TokenKind::Semicolon) {
            None
        } else if self.match_token(TokenKind::Var) {
            Some(self.var_declaration(false))
        } else {
            Some(self.expression_statement())
        };

        let cond = if self.check(TokenKind::Semicolon) {
            self.alloc(NodeKind::Bool(true))
        } else {
            self.expression()
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.");

        let step = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.expression())
        };
        self.consume(TokenKind::RParen, "Expect ')' after for clauses.");

        let body = self.loop_body();
        self.scopes.end_scope();

        let while_loop = self.alloc(NodeKind::While { cond, body, step });
        let stmts: Vec<NodeId> = init.into_iter().chain([while_loop]).collect();
        let first = self.arena.link(&stmts);
        self.alloc(NodeKind::Block { first })
    }

    fn loop_body(&mut self) -> NodeId {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body
    }

    fn return_statement(&mut self) -> NodeId {
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression())
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.");
        self.alloc(NodeKind::Return { value })
    }

    /// `break;` or `continue;` with the keyword already consumed.
    fn loop_jump(&mut self, kind: NodeKind) -> NodeId {
        let keyword = self.previous.lexeme;
        if self.loop_depth == 0 {
            self.error(&format!("Can't use '{keyword}' outside of a loop."));
        }
        self.consume(TokenKind::Semicolon, &format!("Expect ';' after '{keyword}'."));
        self.alloc(kind)
    }

    /// An expression evaluated for its effect. The node itself stands in
    /// statement position.
    pub(crate) fn expression_statement(&mut self) -> NodeId {
        let expr = self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        expr
    }
}
