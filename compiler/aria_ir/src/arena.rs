//! Paged AST arena with attached string interner.
//!
//! Nodes are bump-allocated into fixed-size pages. A full page is never
//! reallocated; a fresh page is pushed instead, so node storage only ever
//! grows by whole pages. The arena also owns the [`StringInterner`] for the
//! compilation unit, and dropping the arena releases both in one pass.

use crate::{InternError, Name, Node, NodeId, NodeKind, StringInterner};

/// Nodes per arena page.
pub const NODES_PER_PAGE: usize = 2048;

/// Owner of every node and interned string of one compilation unit.
pub struct AstArena {
    pages: Vec<Vec<Node>>,
    len: usize,
    interner: StringInterner,
}

impl AstArena {
    pub fn new() -> Self {
        AstArena {
            pages: Vec::new(),
            len: 0,
            interner: StringInterner::new(),
        }
    }

    /// Allocate a node with no sibling.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "a single compilation unit never holds 4 billion nodes"
    )]
    pub fn alloc(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let needs_page = match self.pages.last() {
            Some(page) => page.len() == NODES_PER_PAGE,
            None => true,
        };
        if needs_page {
            self.pages.push(Vec::with_capacity(NODES_PER_PAGE));
        }
        let id = NodeId::new(self.len as u32);
        if let Some(page) = self.pages.last_mut() {
            page.push(Node {
                kind,
                line,
                next: None,
            });
        }
        self.len += 1;
        id
    }

    /// Get a node.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        let index = id.index();
        &self.pages[index / NODES_PER_PAGE][index % NODES_PER_PAGE]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        let index = id.index();
        &mut self.pages[index / NODES_PER_PAGE][index % NODES_PER_PAGE]
    }

    /// Shorthand for `self.get(id).kind`.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    /// Set the sibling link of `id`.
    #[inline]
    pub fn set_next(&mut self, id: NodeId, next: Option<NodeId>) {
        self.get_mut(id).next = next;
    }

    /// Chain `ids` through their `next` links, returning the head.
    pub fn link(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        for pair in ids.windows(2) {
            self.set_next(pair[0], Some(pair[1]));
        }
        if let Some(&last) = ids.last() {
            self.set_next(last, None);
        }
        ids.first().copied()
    }

    /// Iterate a sibling list starting at `first`.
    #[inline]
    pub fn list(&self, first: Option<NodeId>) -> ListIter<'_> {
        ListIter {
            arena: self,
            cursor: first,
        }
    }

    /// Number of nodes allocated.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of node pages in use.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Intern a string into this arena's string storage.
    pub fn intern(&mut self, s: &str) -> Result<Name, InternError> {
        self.interner.try_intern(s)
    }

    /// Resolve an interned name.
    #[inline]
    pub fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }
}

impl Default for AstArena {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AstArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstArena")
            .field("nodes", &self.len)
            .field("pages", &self.pages.len())
            .field("interner", &self.interner)
            .finish()
    }
}

/// Iterator over a `next`-linked sibling list.
pub struct ListIter<'a> {
    arena: &'a AstArena,
    cursor: Option<NodeId>,
}

impl Iterator for ListIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.arena.get(id).next;
        Some(id)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests;
