//! Code generation errors.

use std::fmt;

/// Internal or resolution failure while lowering a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    /// `new C()` where no class `C` is declared.
    #[error("unknown class '{name}'")]
    UnknownClass { name: String },

    /// Assignment to a name that is neither a local nor a global.
    #[error("assignment to undefined variable '{name}'")]
    UndefinedVariable { name: String },

    /// A function or method whose symbol is the entry point or a runtime
    /// export, such as `func print(x)` or method `add` of class `dyn`.
    #[error("'{name}' is reserved by the runtime")]
    ReservedName { name: String },

    /// Two declarations emit the same symbol.
    #[error("function '{name}' is defined more than once")]
    DuplicateFunction { name: String },

    /// A resolved local that liveness analysis never saw.
    #[error("no location allocated for local #{id}")]
    Unallocated { id: u32 },

    /// `break` or `continue` reached the emitter outside a loop.
    #[error("'{keyword}' outside of a loop")]
    StrayLoopJump { keyword: &'static str },

    #[error("failed to write assembly: {0}")]
    Format(#[from] fmt::Error),
}
