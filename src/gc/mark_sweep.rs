// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Major-phase mark & sweep (spec §4.3.3). Runs after evacuation, when
//! every reachable object is already heap-resident: marks from the
//! thunk's roots, drains a FIFO grey queue, then walks the global heap
//! roster freeing anything still White.
//!
//! Ported from `gc.c`'s `gc_mark_obj`/`mark_closure`/`mark_env` and the
//! second loop of `gc_run`. The original enqueues recursively through a
//! fixed-size native stack of grey pointers; this crate drives the same
//! tri-colour contract off a [`Queue`] so the mark phase's depth is
//! bounded only by heap size, not host stack depth.

use std::ptr::NonNull;

use crate::containers::{Queue, Vector};
use crate::error::FatalError;
use crate::value::{HeapData, MarkColor, Object, Tag, ValueRef};

/// Marks every value transitively reachable from `roots`, leaving every
/// visited object Black and every unreached heap object White.
///
/// # Safety
/// Every pointer in `roots` and every pointer stored in the heap roster
/// must refer to a live `Object`.
pub unsafe fn mark(roots: &[ValueRef]) {
    let mut grey: Queue<NonNull<Object>> = Queue::new();

    for root in roots {
        if let Some(p) = root {
            blacken(*p, &mut grey);
        }
    }

    while let Some(p) = grey.dequeue() {
        blacken(p, &mut grey);
    }
}

/// Sets `p` Black and enqueues its White children as Grey. A value is
/// only ever enqueued once: the White check at the enqueue site is what
/// guards against cycles and duplicate work, mirroring spec §4.3.3 step 2
/// rather than checking colour again when popped.
fn blacken(p: NonNull<Object>, grey: &mut Queue<NonNull<Object>>) {
    let obj = unsafe { p.as_ref() };
    obj.header.mark.set(MarkColor::Black);

    let mut enqueue = |child: ValueRef| {
        if let Some(c) = child {
            let child_obj = unsafe { c.as_ref() };
            if child_obj.header.mark.get() == MarkColor::White {
                child_obj.header.mark.set(MarkColor::Grey);
                grey.enqueue(c);
            }
        }
    };

    match (obj.tag(), &obj.data) {
        (Tag::Closure, HeapData::Closure { env, .. }) => enqueue(env.get()),
        (Tag::Env, HeapData::Env(slots)) => {
            for slot in slots.iter() {
                enqueue(slot.get());
            }
        }
        (Tag::Cons, HeapData::Cons { car, cdr }) => {
            enqueue(car.get());
            enqueue(cdr.get());
        }
        (Tag::Cell, HeapData::Cell(interior)) => enqueue(interior.get()),
        (Tag::HashTable, HeapData::HashTable(table)) => {
            for (k, v) in table.borrow().iter() {
                enqueue(*k);
                enqueue(*v);
            }
        }
        (Tag::Int, HeapData::Int(_)) | (Tag::Str, HeapData::Str(_)) => {}
        _ => FatalError::GCInvariant {
            detail: "blacken: tag/payload mismatch",
        }
        .abort(),
    }
}

/// Walks `roster`, freeing every White entry (invoking its free hook
/// first) and resetting every Black survivor to White. Returns the
/// number of entries freed.
///
/// # Safety
/// Every `Some` entry in `roster` must refer to a live `Object` owned via
/// `Box` by this roster (i.e. originally produced by `gc_malloc`).
pub unsafe fn sweep(roster: &mut [Option<NonNull<Object>>]) -> usize {
    let mut freed = 0;
    for slot in roster.iter_mut() {
        let Some(p) = *slot else { continue };
        let obj = unsafe { p.as_ref() };
        match obj.header.mark.get() {
            MarkColor::White => {
                free_hook(obj);
                drop(unsafe { Box::from_raw(p.as_ptr()) });
                *slot = None;
                freed += 1;
            }
            MarkColor::Grey => FatalError::GCInvariant {
                detail: "sweep: grey object at sweep time",
            }
            .abort(),
            MarkColor::Black => obj.header.mark.set(MarkColor::White),
        }
    }
    freed
}

/// Releases any out-of-line memory a value owns beyond its primary
/// allocation, before that allocation itself is freed. Per spec §4.3.6,
/// only `HashTable` has one (its interior robin-hood table); every other
/// tag's payload is either inline or a non-owning reference.
fn free_hook(obj: &Object) {
    if let HeapData::HashTable(table) = &obj.data {
        table.borrow_mut().clear();
    }
}

/// Compacts `roster` in place: shifts every non-null entry to the front
/// and truncates. The caller decides separately whether to shrink the
/// backing allocation (spec §4.3.3 step 4: shrink if the post-sweep
/// length is at most half the pre-sweep capacity).
pub fn compact(roster: &mut Vector<Option<NonNull<Object>>>) {
    roster.retain(|slot| slot.is_some());
}

#[cfg(test)]
#[path = "mark_sweep_test.rs"]
mod mark_sweep_test;
