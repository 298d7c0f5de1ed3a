// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Minor-phase evacuation: copy every stack-resident value reachable from
//! the GC roots onto the heap and rewrite every pointer that referred to
//! it (spec §4.3.2).
//!
//! Ported from `gc.c`'s `gc_toheap`/`gc_run`'s first loop: a FIFO of
//! pointer-update requests drained against a forwarding table, rather
//! than the original's per-tag recursive dispatch — the iterative queue
//! is exactly what keeps this from recursing as deep as the structure
//! being copied (the original already queues instead of recursing for
//! the same reason; this crate just doesn't also recurse one level
//! inside `toheap`).

use std::collections::HashMap;
use std::ptr::NonNull;

use crate::containers::Queue;
use crate::error::FatalError;
use crate::value::{HeapData, Object, Tag, ValueRef};

/// A request to rewrite `*slot` once `original`'s evacuated heap copy is
/// known. `slot` is the address of the reference field itself — always
/// inside an already-evacuated (heap-resident) object, since evacuation
/// proceeds breadth-first from the roots inward.
struct UpdateRequest {
    slot: *const std::cell::Cell<ValueRef>,
    original: NonNull<Object>,
}

/// Per-GC-cycle map from an original pointer's numeric address to its
/// evacuated heap counterpart (spec §3.2, "forwarding table"). Also
/// tracks which evacuated pointers are freshly allocated heap copies (as
/// opposed to objects that were already heap-resident), so the caller
/// can register exactly the new allocations in the heap roster.
pub struct Forwarding {
    map: HashMap<usize, ValueRef>,
    fresh: Vec<NonNull<Object>>,
}

impl Forwarding {
    fn new() -> Self {
        Forwarding {
            map: HashMap::new(),
            fresh: Vec::new(),
        }
    }

    fn get(&self, original: NonNull<Object>) -> Option<ValueRef> {
        self.map.get(&(original.as_ptr() as usize)).copied()
    }

    /// Records a mapping for an object that was already heap-resident:
    /// no new allocation occurred, so nothing is added to `fresh`.
    fn insert_identity(&mut self, original: NonNull<Object>) {
        self.map.insert(original.as_ptr() as usize, Some(original));
    }

    /// Records a mapping for a freshly allocated heap copy.
    fn insert_fresh(&mut self, original: NonNull<Object>, evacuated: NonNull<Object>) {
        self.map
            .insert(original.as_ptr() as usize, Some(evacuated));
        self.fresh.push(evacuated);
    }

    /// Every new heap allocation this evacuation pass produced, in the
    /// order they were evacuated.
    pub fn evacuated_values(&self) -> impl Iterator<Item = NonNull<Object>> + '_ {
        self.fresh.iter().copied()
    }
}

/// Drives one minor GC pass: evacuates the thunk's roots, then drains the
/// pointer-update queue until every reachable value is heap-resident and
/// every rewritten slot names a heap address.
///
/// # Safety
/// Every `ValueRef` reachable from `roots` must point to a live `Object`.
pub unsafe fn evacuate(roots: &mut [ValueRef]) -> Forwarding {
    let mut forwarding = Forwarding::new();
    let mut queue: Queue<UpdateRequest> = Queue::new();

    for root in roots.iter_mut() {
        if let Some(original) = *root {
            *root = unsafe { to_heap(original, &mut queue, &mut forwarding) };
        }
    }

    while let Some(request) = queue.dequeue() {
        // SAFETY: `slot` was the address of a field inside an object this
        // function already evacuated (hence still live) earlier in this
        // same cycle.
        let slot = unsafe { &*request.slot };
        let evacuated = unsafe { to_heap(request.original, &mut queue, &mut forwarding) };
        slot.set(evacuated);
    }

    forwarding
}

/// Evacuates a single object: if it's already forwarded or already on the
/// heap, returns the existing heap pointer unchanged (idempotent);
/// otherwise allocates a heap copy, flips `on_stack`, records the
/// original→evacuated mapping, and enqueues an update request for every
/// outgoing reference field.
///
/// # Safety
/// `original` must point to a live `Object`.
unsafe fn to_heap(
    original: NonNull<Object>,
    queue: &mut Queue<UpdateRequest>,
    forwarding: &mut Forwarding,
) -> ValueRef {
    if let Some(existing) = forwarding.get(original) {
        return existing;
    }

    let obj = unsafe { original.as_ref() };
    if !obj.on_stack() {
        // Idempotence holds trivially for objects already on the heap:
        // record the identity mapping so a later lookup short-circuits.
        forwarding.insert_identity(original);
        return Some(original);
    }

    let heap_ref = match obj.tag() {
        Tag::Closure => {
            let HeapData::Closure { func, env } = &obj.data else {
                unreachable!("tag checked")
            };
            let copy = Object::new_closure(*func, env.get(), false);
            enqueue_slot(copy, Tag::Closure, queue);
            copy
        }
        Tag::Env => {
            let HeapData::Env(slots) = &obj.data else {
                unreachable!("tag checked")
            };
            let copy = Object::new_env(slots.len(), false);
            let HeapData::Env(copy_slots) = &deref(copy).data else {
                unreachable!()
            };
            for (src, dst) in slots.iter().zip(copy_slots.iter()) {
                dst.set(src.get());
            }
            enqueue_slot(copy, Tag::Env, queue);
            copy
        }
        Tag::Int => {
            let HeapData::Int(n) = &obj.data else {
                unreachable!("tag checked")
            };
            Object::new_int(*n, false)
        }
        Tag::Str => {
            let HeapData::Str(bytes) = &obj.data else {
                unreachable!("tag checked")
            };
            Object::new_str(bytes, false)
        }
        Tag::Cons => {
            let HeapData::Cons { car, cdr } = &obj.data else {
                unreachable!("tag checked")
            };
            let copy = Object::new_cons(car.get(), cdr.get(), false);
            enqueue_slot(copy, Tag::Cons, queue);
            copy
        }
        Tag::Cell => {
            let HeapData::Cell(interior) = &obj.data else {
                unreachable!("tag checked")
            };
            let copy = Object::new_cell(interior.get(), false);
            enqueue_slot(copy, Tag::Cell, queue);
            copy
        }
        Tag::HashTable => {
            let HeapData::HashTable(table) = &obj.data else {
                unreachable!("tag checked")
            };
            let copy = Object::new_hash_table(false);
            // A HashTable's keys/values aren't reached through a
            // `Cell<ValueRef>` slot the way every other tag's references
            // are — they live inside the interior robin-hood table's own
            // storage, keyed by hash. We evacuate them eagerly (through
            // the same shared forwarding table, so sharing with other
            // roots is preserved) and rebuild the table rather than
            // queuing per-entry update requests.
            //
            // Unlike every other arm, this one must record its own
            // original→copy mapping *before* recursing into its entries:
            // a table that (directly or transitively) holds itself as a
            // key or value would otherwise see `on_stack() == true` again
            // on the way back in and recurse through this arm forever.
            let copy_ptr = copy.expect("fresh heap copy is never null");
            forwarding.insert_fresh(original, copy_ptr);

            let pairs: Vec<(ValueRef, ValueRef)> = {
                let t = table.borrow();
                t.iter().map(|(k, v)| (*k, *v)).collect()
            };
            let mut rebuilt = crate::containers::RobinHoodTable::new();
            for (k, v) in pairs {
                let k_heap = match k {
                    Some(p) => unsafe { to_heap(p, queue, forwarding) },
                    None => None,
                };
                let v_heap = match v {
                    Some(p) => unsafe { to_heap(p, queue, forwarding) },
                    None => None,
                };
                rebuilt.insert(k_heap, v_heap);
            }
            let HeapData::HashTable(copy_table) = &deref(copy).data else {
                unreachable!()
            };
            *copy_table.borrow_mut() = rebuilt;
            return copy;
        }
    };

    forwarding.insert_fresh(original, heap_ref.expect("fresh heap copy is never null"));
    heap_ref
}

/// Enqueues the pointer-update requests for a freshly copied object's
/// outgoing reference fields, per the per-tag table in spec §4.3.6.
fn enqueue_slot(copy: ValueRef, tag: Tag, queue: &mut Queue<UpdateRequest>) {
    let obj = unsafe { deref(copy) };
    match (tag, &obj.data) {
        (Tag::Closure, HeapData::Closure { env, .. }) => {
            if let Some(original) = env.get() {
                queue.enqueue(UpdateRequest {
                    slot: env as *const _,
                    original,
                });
            }
        }
        (Tag::Env, HeapData::Env(slots)) => {
            for slot in slots.iter() {
                if let Some(original) = slot.get() {
                    queue.enqueue(UpdateRequest {
                        slot: slot as *const _,
                        original,
                    });
                }
            }
        }
        (Tag::Cons, HeapData::Cons { car, cdr }) => {
            if let Some(original) = car.get() {
                queue.enqueue(UpdateRequest {
                    slot: car as *const _,
                    original,
                });
            }
            if let Some(original) = cdr.get() {
                queue.enqueue(UpdateRequest {
                    slot: cdr as *const _,
                    original,
                });
            }
        }
        (Tag::Cell, HeapData::Cell(interior)) => {
            if let Some(original) = interior.get() {
                queue.enqueue(UpdateRequest {
                    slot: interior as *const _,
                    original,
                });
            }
        }
        _ => FatalError::GCInvariant {
            detail: "enqueue_slot: tag/payload mismatch",
        }
        .abort(),
    }
}

unsafe fn deref(v: ValueRef) -> &'static Object {
    unsafe { crate::value::deref(v).expect("deref of null in evacuate") }
}

#[cfg(test)]
#[path = "evacuate_test.rs"]
mod evacuate_test;
