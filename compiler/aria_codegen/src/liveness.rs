//! Live intervals over a structural instruction numbering.
//!
//! The function body is walked in evaluation order and every node visited
//! takes the next instruction index. A local's interval runs from the
//! first to the last index at which it is declared, read or written.
//! Parameters are pinned to index 0.
//!
//! Straight-line numbering under-approximates loops: a variable defined
//! before a loop and last used inside it is still read on the next
//! iteration. Such intervals are stretched to the loop's last index, and
//! the stretch is repeated until nested loops stop changing anything.

use aria_ir::{AstArena, NodeId, NodeKind, SymbolId};
use aria_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

/// Instruction range over which a local must stay in its location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveInterval {
    pub var: u32,
    pub start: u32,
    /// Inclusive.
    pub end: u32,
}

impl LiveInterval {
    #[inline]
    pub fn overlaps(&self, other: &LiveInterval) -> bool {
        !(self.end < other.start || other.end < self.start)
    }
}

/// Compute one interval per local of a function, sorted by start.
pub fn analyze(arena: &AstArena, params: Option<NodeId>, body: NodeId) -> Vec<LiveInterval> {
    let mut walker = Liveness {
        arena,
        counter: 1,
        ranges: FxHashMap::default(),
        loops: Vec::new(),
    };
    for param in arena.list(params) {
        if let NodeKind::Var { id, .. } = arena.kind(param) {
            walker.record(*id, 0);
        }
    }
    walker.walk(Some(body));

    let mut intervals: Vec<LiveInterval> = walker
        .ranges
        .iter()
        .map(|(&var, &(start, end))| LiveInterval { var, start, end })
        .collect();
    extend_across_loops(&mut intervals, &walker.loops);
    intervals.sort_by_key(|iv| (iv.start, iv.var));
    intervals
}

/// Stretch intervals that enter a loop to the loop's end.
fn extend_across_loops(intervals: &mut [LiveInterval], loops: &[(u32, u32)]) {
    let mut changed = true;
    while changed {
        changed = false;
        for iv in intervals.iter_mut() {
            for &(loop_start, loop_end) in loops {
                if iv.start < loop_start && iv.end >= loop_start && iv.end < loop_end {
                    iv.end = loop_end;
                    changed = true;
                }
            }
        }
    }
}

struct Liveness<'a> {
    arena: &'a AstArena,
    counter: u32,
    ranges: FxHashMap<u32, (u32, u32)>,
    loops: Vec<(u32, u32)>,
}

impl Liveness<'_> {
    fn record(&mut self, id: SymbolId, index: u32) {
        let Some(var) = id.as_local() else {
            return;
        };
        self.ranges
            .entry(var)
            .and_modify(|(start, end)| {
                *start = (*start).min(index);
                *end = (*end).max(index);
            })
            .or_insert((index, index));
    }

    fn walk_list(&mut self, first: Option<NodeId>) {
        let arena = self.arena;
        for id in arena.list(first) {
            self.walk(Some(id));
        }
    }

    fn walk(&mut self, node: Option<NodeId>) {
        let Some(node) = node else {
            return;
        };
        ensure_sufficient_stack(|| {
            let index = self.counter;
            self.counter += 1;

            match *self.arena.kind(node) {
                NodeKind::Int(_)
                | NodeKind::Float(_)
                | NodeKind::Bool(_)
                | NodeKind::Null
                | NodeKind::Str(_)
                | NodeKind::New { .. }
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::FuncDecl { .. }
                | NodeKind::ClassDecl { .. } => {}
                NodeKind::Array { elements, .. } => self.walk_list(elements),
                NodeKind::Var { id, .. } => self.record(id, index),
                NodeKind::Assign { id, value, .. } => {
                    self.walk(Some(value));
                    self.record(id, index);
                }
                NodeKind::VarDecl { id, init, .. } => {
                    self.record(id, index);
                    self.walk(init);
                }
                NodeKind::Binary { left, right, .. } => {
                    self.walk(Some(left));
                    self.walk(Some(right));
                }
                NodeKind::Unary { operand, .. } => self.walk(Some(operand)),
                NodeKind::Ternary {
                    cond,
                    then_expr,
                    else_expr,
                } => {
                    self.walk(Some(cond));
                    self.walk(Some(then_expr));
                    self.walk(Some(else_expr));
                }
                NodeKind::Call { callee, args, .. } => {
                    self.walk(Some(callee));
                    self.walk_list(args);
                }
                NodeKind::Get { object, .. } => self.walk(Some(object)),
                NodeKind::Set { object, value, .. } => {
                    self.walk(Some(object));
                    self.walk(Some(value));
                }
                NodeKind::IndexGet { object, index: idx } => {
                    self.walk(Some(object));
                    self.walk(Some(idx));
                }
                NodeKind::IndexSet {
                    object,
                    index: idx,
                    value,
                } => {
                    self.walk(Some(object));
                    self.walk(Some(idx));
                    self.walk(Some(value));
                }
                NodeKind::Block { first } => self.walk_list(first),
                NodeKind::If {
                    cond,
                    then_branch,
                    else_branch,
                } => {
                    self.walk(Some(cond));
                    self.walk(Some(then_branch));
                    self.walk(else_branch);
                }
                NodeKind::While { cond, body, step } => {
                    self.walk(Some(cond));
                    self.walk(Some(body));
                    self.walk(step);
                    self.loops.push((index, self.counter - 1));
                }
                NodeKind::Return { value } => self.walk(value),
            }
        });
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
