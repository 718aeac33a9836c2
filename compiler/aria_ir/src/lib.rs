//! Aria IR - tokens, AST and arena storage.
//!
//! This crate holds the data structures shared by every compiler phase:
//! - `Token` / `TokenKind` produced by the lexer
//! - `Name` handles for interned strings
//! - `NodeId` / `NodeKind` for the arena-resident AST
//! - `AstArena`, which owns every node and every interned string of one
//!   compilation unit
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers and literals become `Name(u32)`, so
//!   name comparison is a single integer compare.
//! - **Flatten Everything**: nodes refer to each other through `NodeId`
//!   indices. Statement, argument and parameter lists are intrusive `next`
//!   chains rather than vectors.
//! - **One owner**: dropping the arena releases all nodes and strings at once.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod interner;
mod name;
mod token;

pub use arena::{AstArena, ListIter, NODES_PER_PAGE};
pub use ast::{BinaryOp, Node, NodeId, NodeKind, SymbolId, UnaryOp};
pub use interner::{fnv1a, InternError, StringInterner, INITIAL_CAPACITY, STRING_BLOCK_SIZE};
pub use name::Name;
pub use token::{Token, TokenKind};
