use super::*;
use crate::{BinaryOp, SymbolId};
use pretty_assertions::assert_eq;

#[test]
fn test_alloc_and_get() {
    let mut arena = AstArena::new();
    let one = arena.alloc(NodeKind::Int(1), 1);
    let two = arena.alloc(NodeKind::Int(2), 1);
    let add = arena.alloc(
        NodeKind::Binary {
            op: BinaryOp::Add,
            left: one,
            right: two,
        },
        1,
    );

    assert_eq!(arena.len(), 3);
    assert_eq!(arena.kind(one), &NodeKind::Int(1));
    assert_eq!(
        arena.kind(add),
        &NodeKind::Binary {
            op: BinaryOp::Add,
            left: one,
            right: two
        }
    );
    assert_eq!(arena.get(add).next, None);
}

#[test]
fn test_pages_fill_before_growing() {
    let mut arena = AstArena::new();
    assert_eq!(arena.page_count(), 0);
    for _ in 0..NODES_PER_PAGE {
        arena.alloc(NodeKind::Null, 1);
    }
    assert_eq!(arena.page_count(), 1);
    let spill = arena.alloc(NodeKind::Bool(true), 9);
    assert_eq!(arena.page_count(), 2);
    assert_eq!(spill.index(), NODES_PER_PAGE);
    assert_eq!(arena.kind(spill), &NodeKind::Bool(true));
    assert_eq!(arena.get(spill).line, 9);
}

#[test]
fn test_link_and_iterate() {
    let mut arena = AstArena::new();
    let ids: Vec<NodeId> = (0..4).map(|i| arena.alloc(NodeKind::Int(i), 1)).collect();
    let head = arena.link(&ids);

    assert_eq!(head, Some(ids[0]));
    let walked: Vec<NodeId> = arena.list(head).collect();
    assert_eq!(walked, ids);
    assert_eq!(arena.list(None).count(), 0);
}

#[test]
fn test_link_empty() {
    let mut arena = AstArena::new();
    assert_eq!(arena.link(&[]), None);
}

#[test]
fn test_interned_names_resolve() {
    let mut arena = AstArena::new();
    let x = arena.intern("x").unwrap();
    let decl = arena.alloc(
        NodeKind::VarDecl {
            name: x,
            id: SymbolId::GLOBAL,
            init: None,
            managed: false,
        },
        2,
    );
    let NodeKind::VarDecl { name, .. } = arena.kind(decl) else {
        panic!("expected var decl");
    };
    assert_eq!(arena.name(*name), "x");
    assert_eq!(arena.intern("x").unwrap(), x);
}
