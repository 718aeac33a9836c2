//! Flat scoped symbol table.
//!
//! Symbols are pushed onto one array tagged with the depth they were
//! declared at. Leaving a scope truncates the array back to the enclosing
//! depth; nothing is freed individually.

use aria_ir::{Name, SymbolId};

#[derive(Clone, Copy, Debug)]
struct Symbol {
    name: Name,
    depth: u32,
    id: SymbolId,
    /// False between a local's declaration and the end of its initializer.
    initialized: bool,
}

#[derive(Debug)]
pub(crate) struct Scopes {
    symbols: Vec<Symbol>,
    depth: u32,
    /// Next local id. Ids are unique across the whole program.
    next_id: u32,
}

impl Scopes {
    pub(crate) fn new() -> Self {
        Scopes {
            symbols: Vec::new(),
            depth: 0,
            next_id: 1,
        }
    }

    pub(crate) fn begin_scope(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn end_scope(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        let keep = self
            .symbols
            .iter()
            .rposition(|s| s.depth <= self.depth)
            .map_or(0, |i| i + 1);
        self.symbols.truncate(keep);
    }

    /// Declare `name` in the innermost scope.
    ///
    /// Returns `Err` with the existing id when the name is already declared
    /// at this depth; the caller reports it and keeps the old binding.
    pub(crate) fn declare(&mut self, name: Name) -> Result<SymbolId, SymbolId> {
        let duplicate = self
            .symbols
            .iter()
            .rev()
            .take_while(|s| s.depth == self.depth)
            .find(|s| s.name == name);
        if let Some(existing) = duplicate {
            return Err(existing.id);
        }

        let id = if self.depth == 0 {
            SymbolId::GLOBAL
        } else {
            let id = SymbolId::local(self.next_id);
            self.next_id += 1;
            id
        };
        self.symbols.push(Symbol {
            name,
            depth: self.depth,
            id,
            initialized: self.depth == 0,
        });
        Ok(id)
    }

    /// Mark the most recent declaration readable.
    pub(crate) fn mark_initialized(&mut self) {
        if let Some(last) = self.symbols.last_mut() {
            last.initialized = true;
        }
    }

    /// Whether the innermost binding of `name` is a local still inside its
    /// own initializer.
    pub(crate) fn is_uninitialized(&self, name: Name) -> bool {
        self.symbols
            .iter()
            .rev()
            .find(|s| s.name == name)
            .is_some_and(|s| !s.initialized)
    }

    /// Innermost binding of `name`, or [`SymbolId::UNRESOLVED`].
    pub(crate) fn resolve(&self, name: Name) -> SymbolId {
        self.symbols
            .iter()
            .rev()
            .find(|s| s.name == name)
            .map_or(SymbolId::UNRESOLVED, |s| s.id)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests {
    use super::*;

    const X: Name = Name::new(1);
    const Y: Name = Name::new(2);

    #[test]
    fn test_depth_zero_is_global() {
        let mut scopes = Scopes::new();
        assert_eq!(scopes.declare(X), Ok(SymbolId::GLOBAL));
        assert_eq!(scopes.resolve(X), SymbolId::GLOBAL);
        assert_eq!(scopes.resolve(Y), SymbolId::UNRESOLVED);
    }

    #[test]
    fn test_locals_count_from_one() {
        let mut scopes = Scopes::new();
        scopes.begin_scope();
        assert_eq!(scopes.declare(X), Ok(SymbolId::local(1)));
        assert_eq!(scopes.declare(Y), Ok(SymbolId::local(2)));
        scopes.end_scope();
        scopes.begin_scope();
        // Ids keep counting after the scope closes.
        assert_eq!(scopes.declare(X), Ok(SymbolId::local(3)));
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut scopes = Scopes::new();
        scopes.begin_scope();
        let first = scopes.declare(X);
        assert_eq!(scopes.declare(X), Err(SymbolId::local(1)));
        assert_eq!(first, Ok(SymbolId::local(1)));
    }

    #[test]
    fn test_local_uninitialized_until_marked() {
        let mut scopes = Scopes::new();
        scopes.declare(Y).unwrap();
        assert!(!scopes.is_uninitialized(Y));
        scopes.begin_scope();
        scopes.declare(X).unwrap();
        assert!(scopes.is_uninitialized(X));
        scopes.mark_initialized();
        assert!(!scopes.is_uninitialized(X));
        assert!(!scopes.is_uninitialized(Name::new(9)));
    }

    #[test]
    fn test_shadowing_in_inner_scope() {
        let mut scopes = Scopes::new();
        scopes.begin_scope();
        let outer = scopes.declare(X);
        scopes.begin_scope();
        let inner = scopes.declare(X);
        assert_ne!(outer, inner);
        assert_eq!(Ok(scopes.resolve(X)), inner);
        scopes.end_scope();
        assert_eq!(Ok(scopes.resolve(X)), outer);
        scopes.end_scope();
        assert_eq!(scopes.resolve(X), SymbolId::UNRESOLVED);
    }
}
