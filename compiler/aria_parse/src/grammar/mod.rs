//! Grammar rules.
//!
//! - `mod.rs`: precedence ladder and the Pratt rule table
//! - `expr.rs`: prefix and infix handlers, assignment
//! - `stmt.rs`: statements and blocks
//! - `decl.rs`: `var`, `func` and `class` declarations

mod decl;
mod expr;
mod stmt;

use crate::Parser;
use aria_ir::{NodeId, TokenKind};

/// Binding power, lowest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    None,
    Assignment,
    Ternary,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    /// One level tighter, for left-associative right operands.
    pub(crate) fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Ternary,
            Precedence::Ternary => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

/// Prefix handler; the flag says whether an assignment may follow.
pub(crate) type PrefixFn<'src> = fn(&mut Parser<'src>, bool) -> NodeId;
/// Infix handler, given the already-parsed left operand.
pub(crate) type InfixFn<'src> = fn(&mut Parser<'src>, NodeId, bool) -> NodeId;

pub(crate) struct ParseRule<'src> {
    pub(crate) prefix: Option<PrefixFn<'src>>,
    pub(crate) infix: Option<InfixFn<'src>>,
    pub(crate) precedence: Precedence,
}

impl<'src> Parser<'src> {
    /// Rule table lookup.
    pub(crate) fn rule(kind: TokenKind) -> ParseRule<'src> {
        let (prefix, infix, precedence): (Option<PrefixFn<'src>>, Option<InfixFn<'src>>, _) =
            match kind {
                TokenKind::LParen => (Some(Self::grouping), Some(Self::call), Precedence::Call),
                TokenKind::LBracket => (Some(Self::array), Some(Self::index), Precedence::Call),
                TokenKind::Dot => (None, Some(Self::dot), Precedence::Call),
                TokenKind::Minus => (Some(Self::unary), Some(Self::binary), Precedence::Term),
                TokenKind::Plus => (None, Some(Self::binary), Precedence::Term),
                TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
                    (None, Some(Self::binary), Precedence::Factor)
                }
                TokenKind::Bang => (Some(Self::unary), None, Precedence::None),
                TokenKind::EqEq | TokenKind::NotEq => {
                    (None, Some(Self::binary), Precedence::Equality)
                }
                TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => {
                    (None, Some(Self::binary), Precedence::Comparison)
                }
                TokenKind::AndAnd => (None, Some(Self::binary), Precedence::And),
                TokenKind::OrOr => (None, Some(Self::binary), Precedence::Or),
                TokenKind::Question | TokenKind::Is => {
                    (None, Some(Self::ternary), Precedence::Ternary)
                }
                TokenKind::Identifier => (Some(Self::variable), None, Precedence::None),
                TokenKind::Number => (Some(Self::integer), None, Precedence::None),
                TokenKind::Float => (Some(Self::float), None, Precedence::None),
                TokenKind::String => (Some(Self::string), None, Precedence::None),
                TokenKind::True | TokenKind::False | TokenKind::Null => {
                    (Some(Self::literal), None, Precedence::None)
                }
                TokenKind::New => (Some(Self::new_instance), None, Precedence::None),
                _ => (None, None, Precedence::None),
            };
        ParseRule {
            prefix,
            infix,
            precedence,
        }
    }
}
