//! Linear-scan register allocation.
//!
//! Intervals are taken in start order. Before each one, every active
//! interval that ended strictly before its start gives its register back.
//! The new interval then takes the lowest free register in pool order, or
//! a fresh stack slot if none is free. There is no spill-cost heuristic:
//! whoever arrives when the pool is empty goes to memory.
//!
//! The pool holds only callee-saved registers, so allocated values survive
//! every runtime call without caller-side saves.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::liveness::LiveInterval;

/// Allocatable machine registers, in preference order. The discriminant
/// is the index into [`Reg::POOL`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    Rbx,
    R12,
    R13,
    R14,
    R15,
}

impl Reg {
    /// The System V callee-saved registers, not the full general-purpose
    /// set. Values here survive the runtime call behind every operator,
    /// and the prologue saves exactly the ones a function uses. A sixth
    /// simultaneously live value spills.
    pub const POOL: [Reg; 5] = [Reg::Rbx, Reg::R12, Reg::R13, Reg::R14, Reg::R15];

    pub const fn name(self) -> &'static str {
        match self {
            Reg::Rbx => "rbx",
            Reg::R12 => "r12",
            Reg::R13 => "r13",
            Reg::R14 => "r14",
            Reg::R15 => "r15",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a local lives for its whole interval.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Reg(Reg),
    /// Displacement below `rbp`, in bytes.
    Stack(u32),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Reg(reg) => f.write_str(reg.name()),
            Location::Stack(offset) => write!(f, "qword [rbp-{offset}]"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Assignment {
    Reg(Reg),
    Spill(u32),
}

/// Result of allocating one function.
#[derive(Debug, Default)]
pub struct Allocation {
    locations: FxHashMap<u32, Location>,
    assigned: Vec<(LiveInterval, Location)>,
    /// Callee-saved registers the function writes, in pool order.
    saved: Vec<Reg>,
    spill_slots: u32,
}

impl Allocation {
    #[inline]
    pub fn location(&self, var: u32) -> Option<Location> {
        self.locations.get(&var).copied()
    }

    /// Every interval with the location it received.
    pub fn assigned(&self) -> &[(LiveInterval, Location)] {
        &self.assigned
    }

    pub fn saved(&self) -> &[Reg] {
        &self.saved
    }

    pub fn spill_slots(&self) -> u32 {
        self.spill_slots
    }

    /// Bytes reserved below the saved registers.
    ///
    /// Spill space is rounded to 16 with a 32-byte minimum, plus 8 when an
    /// odd number of registers was pushed so that `rsp` ends up 16-byte
    /// aligned after the prologue.
    pub fn frame_size(&self) -> u32 {
        let spill_bytes = (self.spill_slots * 8).next_multiple_of(16).max(32);
        if self.saved.len() % 2 == 1 {
            spill_bytes + 8
        } else {
            spill_bytes
        }
    }
}

/// Run linear scan over intervals sorted by start.
pub fn linear_scan(intervals: &[LiveInterval]) -> Allocation {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|iv| (iv.start, iv.var));

    let mut free = Reg::POOL.map(|_| true);
    let mut active: Vec<(LiveInterval, Reg)> = Vec::new();
    let mut assignments: Vec<(LiveInterval, Assignment)> = Vec::with_capacity(sorted.len());
    let mut spill_slots = 0;

    for iv in sorted {
        active.retain(|(other, reg)| {
            let expired = other.end < iv.start;
            if expired {
                free[*reg as usize] = true;
            }
            !expired
        });

        let assignment = match free.iter().position(|&is_free| is_free) {
            Some(slot) => {
                free[slot] = false;
                let reg = Reg::POOL[slot];
                active.push((iv, reg));
                Assignment::Reg(reg)
            }
            None => {
                spill_slots += 1;
                Assignment::Spill(spill_slots - 1)
            }
        };
        assignments.push((iv, assignment));
    }

    let mut saved: Vec<Reg> = assignments
        .iter()
        .filter_map(|(_, a)| match a {
            Assignment::Reg(reg) => Some(*reg),
            Assignment::Spill(_) => None,
        })
        .collect();
    saved.sort_unstable();
    saved.dedup();

    #[expect(
        clippy::cast_possible_truncation,
        reason = "the pool has five registers"
    )]
    let saved_bytes = saved.len() as u32 * 8;
    let assigned: Vec<(LiveInterval, Location)> = assignments
        .into_iter()
        .map(|(iv, a)| {
            let location = match a {
                Assignment::Reg(reg) => Location::Reg(reg),
                Assignment::Spill(k) => Location::Stack(saved_bytes + 8 * (k + 1)),
            };
            (iv, location)
        })
        .collect();

    tracing::trace!(
        intervals = assigned.len(),
        registers = saved.len(),
        spills = spill_slots,
        "linear scan"
    );

    Allocation {
        locations: assigned.iter().map(|(iv, loc)| (iv.var, *loc)).collect(),
        assigned,
        saved,
        spill_slots,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
