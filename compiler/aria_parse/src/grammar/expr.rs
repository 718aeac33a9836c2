//! Expression handlers.

use aria_ir::{BinaryOp, NodeId, NodeKind, TokenKind, UnaryOp};
use aria_stack::ensure_sufficient_stack;

use super::Precedence;
use crate::literal::{parse_int, unescape};
use crate::Parser;

/// Arguments accepted by one call.
const MAX_ARGS: u32 = 255;

impl Parser<'_> {
    pub(crate) fn expression(&mut self) -> NodeId {
        self.parse_precedence(Precedence::Assignment)
    }

    /// Parse an expression whose operators bind at least as tight as
    /// `precedence`.
    pub(crate) fn parse_precedence(&mut self, precedence: Precedence) -> NodeId {
        ensure_sufficient_stack(|| {
            self.advance();
            let can_assign = precedence <= Precedence::Assignment;
            let Some(prefix) = Self::rule(self.previous.kind).prefix else {
                self.error("Expect expression.");
                return self.alloc(NodeKind::Null);
            };
            let mut expr = prefix(self, can_assign);

            while precedence <= Self::rule(self.current.kind).precedence {
                self.advance();
                let Some(infix) = Self::rule(self.previous.kind).infix else {
                    break;
                };
                expr = infix(self, expr, can_assign);
            }

            if can_assign {
                expr = self.assignment(expr);
            }
            expr
        })
    }

    /// `=` and compound assignment after a complete left-hand side.
    fn assignment(&mut self, target: NodeId) -> NodeId {
        let op = match self.current.kind {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => return target,
        };
        self.advance();
        let value = self.expression();

        let NodeKind::Var { name, id } = *self.arena.kind(target) else {
            self.error("Invalid assignment target.");
            return target;
        };
        let value = match op {
            None => value,
            Some(op) => {
                let current = self.alloc(NodeKind::Var { name, id });
                self.alloc(NodeKind::Binary {
                    op,
                    left: current,
                    right: value,
                })
            }
        };
        self.alloc(NodeKind::Assign { name, id, value })
    }

    // ─── Prefix rules ───

    pub(crate) fn grouping(&mut self, _can_assign: bool) -> NodeId {
        let expr = self.expression();
        self.consume(TokenKind::RParen, "Expect ')' after expression.");
        expr
    }

    pub(crate) fn integer(&mut self, _can_assign: bool) -> NodeId {
        let value = parse_int(self.previous.lexeme).unwrap_or_else(|| {
            self.error("Integer literal out of range.");
            0
        });
        self.alloc(NodeKind::Int(value))
    }

    pub(crate) fn float(&mut self, _can_assign: bool) -> NodeId {
        let value = self.previous.lexeme.parse::<f64>().unwrap_or_else(|_| {
            self.error("Invalid float literal.");
            0.0
        });
        self.alloc(NodeKind::Float(value))
    }

    pub(crate) fn string(&mut self, _can_assign: bool) -> NodeId {
        let text = unescape(self.previous.lexeme);
        let name = self.intern(&text);
        self.alloc(NodeKind::Str(name))
    }

    pub(crate) fn literal(&mut self, _can_assign: bool) -> NodeId {
        let kind = match self.previous.kind {
            TokenKind::True => NodeKind::Bool(true),
            TokenKind::False => NodeKind::Bool(false),
            _ => NodeKind::Null,
        };
        self.alloc(kind)
    }

    pub(crate) fn variable(&mut self, _can_assign: bool) -> NodeId {
        let name = self.intern(self.previous.lexeme);
        if self.scopes.is_uninitialized(name) {
            self.semantic_error("Can't read local variable in its own initializer.");
        }
        let id = self.scopes.resolve(name);
        self.alloc(NodeKind::Var { name, id })
    }

    pub(crate) fn unary(&mut self, _can_assign: bool) -> NodeId {
        let op = match self.previous.kind {
            TokenKind::Bang => UnaryOp::Not,
            _ => UnaryOp::Neg,
        };
        let operand = self.parse_precedence(Precedence::Unary);
        self.alloc(NodeKind::Unary { op, operand })
    }

    /// `[a, b, c]`
    pub(crate) fn array(&mut self, _can_assign: bool) -> NodeId {
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.expression());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RBracket, "Expect ']' after array elements.");
        let count = u32::try_from(elements.len()).unwrap_or(u32::MAX);
        let first = self.arena.link(&elements);
        self.alloc(NodeKind::Array {
            elements: first,
            count,
        })
    }

    /// `new Class()`
    pub(crate) fn new_instance(&mut self, _can_assign: bool) -> NodeId {
        self.consume(TokenKind::Identifier, "Expect class name after 'new'.");
        let class = self.intern(self.previous.lexeme);
        self.consume(TokenKind::LParen, "Expect '(' after class name.");
        self.consume(TokenKind::RParen, "Expect ')' after '('.");
        self.alloc(NodeKind::New { class })
    }

    // ─── Infix rules ───

    pub(crate) fn binary(&mut self, left: NodeId, _can_assign: bool) -> NodeId {
        let operator = self.previous.kind;
        let op = match operator {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::AndAnd => BinaryOp::And,
            _ => BinaryOp::Or,
        };
        let right = self.parse_precedence(Self::rule(operator).precedence.next());
        self.alloc(NodeKind::Binary { op, left, right })
    }

    /// `cond ? a : b` and `cond is a : b`
    pub(crate) fn ternary(&mut self, cond: NodeId, _can_assign: bool) -> NodeId {
        let then_expr = self.parse_precedence(Precedence::Ternary);
        self.consume(TokenKind::Colon, "Expect ':' after then branch of ternary.");
        let else_expr = self.parse_precedence(Precedence::Ternary);
        self.alloc(NodeKind::Ternary {
            cond,
            then_expr,
            else_expr,
        })
    }

    pub(crate) fn call(&mut self, callee: NodeId, _can_assign: bool) -> NodeId {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                if args.len() == MAX_ARGS as usize {
                    self.error("Can't have more than 255 arguments.");
                }
                args.push(self.expression());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "Expect ')' after arguments.");
        let argc = u32::try_from(args.len()).unwrap_or(u32::MAX);
        let first = self.arena.link(&args);
        self.alloc(NodeKind::Call {
            callee,
            args: first,
            argc,
        })
    }

    /// `object.name` or `object.name = value`
    pub(crate) fn dot(&mut self, object: NodeId, can_assign: bool) -> NodeId {
        self.consume(TokenKind::Identifier, "Expect property name after '.'.");
        let name = self.intern(self.previous.lexeme);
        if can_assign && self.match_token(TokenKind::Eq) {
            let value = self.expression();
            self.alloc(NodeKind::Set {
                object,
                name,
                value,
            })
        } else {
            self.alloc(NodeKind::Get { object, name })
        }
    }

    /// `object[index]` or `object[index] = value`
    pub(crate) fn index(&mut self, object: NodeId, can_assign: bool) -> NodeId {
        let index = self.expression();
        self.consume(TokenKind::RBracket, "Expect ']' after index.");
        if can_assign && self.match_token(TokenKind::Eq) {
            let value = self.expression();
            self.alloc(NodeKind::IndexSet {
                object,
                index,
                value,
            })
        } else {
            self.alloc(NodeKind::IndexGet { object, index })
        }
    }
}
