// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The two-generation collector (spec §4.3): a global heap roster plus
//! the minor (evacuation) and major (mark-sweep) phases, driven together
//! by [`Heap::collect`].

mod evacuate;
mod mark_sweep;

use std::ptr::NonNull;

use crate::config::{HEAP_ROSTER_INITIAL_CAP, ROSTER_SHRINK_DIVISOR};
use crate::containers::Vector;
use crate::diagnostics;
use crate::value::{Object, ValueRef};

pub use evacuate::Forwarding;

/// The global heap roster plus the allocation/collection bookkeeping
/// built on top of it (spec §4.3.4). Kept as a struct distinct from
/// [`crate::trampoline::Runtime`]: the trampoline owns the dispatch
/// state, this owns the allocator's.
pub struct Heap {
    roster: Vector<Option<NonNull<Object>>>,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            roster: Vector::with_capacity(HEAP_ROSTER_INITIAL_CAP),
        }
    }

    /// Registers a freshly allocated heap value in the roster. Every
    /// constructor that produces a non-stack `Object` (built-ins, and the
    /// evacuator's own heap copies) must route through this so sweep can
    /// find it later.
    pub fn register(&mut self, v: ValueRef) {
        if let Some(p) = v {
            self.roster.push(Some(p));
        }
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    /// Runs one full GC cycle: evacuates `roots` (the current thunk's
    /// closure and operands) to the heap, registers every value the
    /// evacuator copied, marks from the (now heap-resident) roots, sweeps
    /// the roster, and compacts/shrinks it.
    ///
    /// # Safety
    /// Every pointer reachable from `roots`, and every pointer already in
    /// the roster, must refer to a live `Object`.
    pub unsafe fn collect(&mut self, roots: &mut [ValueRef]) {
        let span = diagnostics::gc_cycle_span();
        let _guard = span.enter();

        let roster_before = self.roster.len();

        let forwarding = unsafe { evacuate::evacuate(roots) };
        self.absorb_evacuated(&forwarding);

        unsafe { mark_sweep::mark(roots) };
        let freed = unsafe { mark_sweep::sweep(self.roster.as_mut_slice()) };
        mark_sweep::compact(&mut self.roster);
        self.maybe_shrink(roster_before);

        diagnostics::info_gc_cycle_complete(roster_before, self.roster.len(), freed);
    }

    /// Every object the evacuator copied onto the heap needs a roster
    /// entry of its own, since sweep only ever walks the roster, never
    /// the reference graph.
    fn absorb_evacuated(&mut self, forwarding: &Forwarding) {
        for evacuated in forwarding.evacuated_values() {
            self.roster.push(Some(evacuated));
        }
    }

    fn maybe_shrink(&mut self, roster_before: usize) {
        if roster_before > 0 && self.roster.len() * ROSTER_SHRINK_DIVISOR <= roster_before {
            self.roster.shrink_to_fit();
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
