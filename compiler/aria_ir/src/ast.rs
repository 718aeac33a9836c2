//! AST node definitions.
//!
//! Nodes live in an [`AstArena`](crate::AstArena) and point at each other
//! with [`NodeId`] indices. Lists (block statements, call arguments,
//! parameters, array elements, class methods) are chains through
//! [`Node::next`]: the parent stores the first id and each element stores
//! its successor.

use crate::Name;
use std::fmt;

/// Index into the node arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new `NodeId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

crate::static_assert_size!(NodeId, 4);

/// Storage class of a resolved identifier.
///
/// Locals get positive ids from a per-program counter; two sentinels mark
/// globals and names the resolver could not find (functions and externs).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct SymbolId(i32);

impl SymbolId {
    /// Declared at depth 0.
    pub const GLOBAL: SymbolId = SymbolId(-2);
    /// Not found in any enclosing scope.
    pub const UNRESOLVED: SymbolId = SymbolId(-1);

    /// A local variable id (must be positive).
    #[inline]
    #[expect(
        clippy::cast_possible_wrap,
        reason = "local ids are bounded by i32::MAX"
    )]
    pub const fn local(id: u32) -> Self {
        debug_assert!(id > 0 && id <= i32::MAX as u32);
        SymbolId(id as i32)
    }

    /// The local id, if this is a local.
    #[inline]
    #[expect(clippy::cast_sign_loss, reason = "checked positive below")]
    pub const fn as_local(self) -> Option<u32> {
        if self.0 > 0 {
            Some(self.0 as u32)
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_global(self) -> bool {
        self.0 == Self::GLOBAL.0
    }

    #[inline]
    pub const fn is_unresolved(self) -> bool {
        self.0 == Self::UNRESOLVED.0
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            -2 => write!(f, "SymbolId::GLOBAL"),
            -1 => write!(f, "SymbolId::UNRESOLVED"),
            id => write!(f, "SymbolId({id})"),
        }
    }
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical (short-circuit)
    And,
    Or,
}

impl BinaryOp {
    /// Whether the right operand is evaluated only on demand.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// One AST node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: u32,
    /// Next sibling in whatever list this node belongs to.
    pub next: Option<NodeId>,
}

/// Node kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    // Literals
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Unescaped, interned string literal.
    Str(Name),
    /// `[a, b, c]`
    Array {
        elements: Option<NodeId>,
        count: u32,
    },

    // Variables
    Var {
        name: Name,
        id: SymbolId,
    },
    Assign {
        name: Name,
        id: SymbolId,
        value: NodeId,
    },

    // Operators
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Ternary {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },

    // Calls and access
    Call {
        callee: NodeId,
        args: Option<NodeId>,
        argc: u32,
    },
    /// `object.name`
    Get {
        object: NodeId,
        name: Name,
    },
    /// `object.name = value`
    Set {
        object: NodeId,
        name: Name,
        value: NodeId,
    },
    /// `object[index]`
    IndexGet {
        object: NodeId,
        index: NodeId,
    },
    /// `object[index] = value`
    IndexSet {
        object: NodeId,
        index: NodeId,
        value: NodeId,
    },
    /// `new Class()`
    New {
        class: Name,
    },

    // Statements
    VarDecl {
        name: Name,
        id: SymbolId,
        init: Option<NodeId>,
        managed: bool,
    },
    Block {
        first: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    /// `step` is the increment of a desugared `for`; `continue` runs it.
    While {
        cond: NodeId,
        body: NodeId,
        step: Option<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Break,
    Continue,

    // Declarations
    /// `name` is the emitted symbol (`aria_main`, `Class_method`);
    /// `source_name` is what the program wrote.
    FuncDecl {
        name: Name,
        source_name: Name,
        params: Option<NodeId>,
        arity: u32,
        body: NodeId,
    },
    ClassDecl {
        name: Name,
        methods: Option<NodeId>,
    },
}
