// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The external interface a CPS compiler's emitted code calls against
//! (spec §6). Everything below is a thin wrapper over `value`/`env`/
//! `trampoline`; this module exists so the compiled-code boundary has a
//! single, stable set of names independent of how the implementation is
//! internally organized.

use crate::trampoline::{Runtime, Thunk, scheme_start};
use crate::value::{ClosureFn, Object, ValueRef};

/// Starts the runtime with an initial One-arity call `(closure rand)`.
/// Never returns.
pub fn start_one(rator: ValueRef, rand: ValueRef) -> ! {
    let mut rt = Runtime::new();
    scheme_start(
        &mut rt,
        Thunk::One {
            closure: rator,
            rand,
        },
    )
}

/// Starts the runtime with an initial Two-arity call `(closure rand
/// cont)`. Never returns.
pub fn start_two(rator: ValueRef, rand: ValueRef, cont: ValueRef) -> ! {
    let mut rt = Runtime::new();
    scheme_start(
        &mut rt,
        Thunk::Two {
            closure: rator,
            rand,
            cont,
        },
    )
}

/// Stack-constructs a One-arity closure (continuation-shaped).
pub fn make_closure_one(
    func: fn(&mut Runtime, ValueRef, ValueRef),
    env: ValueRef,
) -> ValueRef {
    Object::new_closure(ClosureFn::One(func), env, true)
}

/// Stack-constructs a Two-arity closure (user-function-shaped).
pub fn make_closure_two(
    func: fn(&mut Runtime, ValueRef, ValueRef, ValueRef),
    env: ValueRef,
) -> ValueRef {
    Object::new_closure(ClosureFn::Two(func), env, true)
}

/// Performs the stack probe and either direct-invokes `rator` or bounces.
///
/// # Safety
/// `rator` and `rand` must be live values.
pub unsafe fn call(rt: &mut Runtime, rator: ValueRef, rand: ValueRef) -> ! {
    unsafe { rt.call_one(rator, rand) }
}

/// Three-operand form of [`call`].
///
/// # Safety
/// `rator`, `rand`, and `cont` must be live values.
pub unsafe fn call_two(rt: &mut Runtime, rator: ValueRef, rand: ValueRef, cont: ValueRef) -> ! {
    unsafe { rt.call_two(rator, rand, cont) }
}

/// Stack-constructs an environment block of `len` slots, all null.
pub fn make_env(len: usize) -> ValueRef {
    Object::new_env(len, true)
}

/// Heap-constructs an environment block directly, registering it with
/// `rt`'s roster. For built-ins that construct an Env without going
/// through a GC cycle's evacuation.
pub fn make_env_on_heap(rt: &mut Runtime, len: usize) -> ValueRef {
    let v = Object::new_env(len, false);
    rt.heap.register(v);
    v
}

pub fn make_int(value: i64) -> ValueRef {
    Object::new_int(value, true)
}

pub fn make_int_on_heap(rt: &mut Runtime, value: i64) -> ValueRef {
    let v = Object::new_int(value, false);
    rt.heap.register(v);
    v
}

pub fn make_str(bytes: &[u8]) -> ValueRef {
    Object::new_str(bytes, true)
}

pub fn make_str_on_heap(rt: &mut Runtime, bytes: &[u8]) -> ValueRef {
    let v = Object::new_str(bytes, false);
    rt.heap.register(v);
    v
}

pub fn make_cons(car: ValueRef, cdr: ValueRef) -> ValueRef {
    Object::new_cons(car, cdr, true)
}

pub fn make_cons_on_heap(rt: &mut Runtime, car: ValueRef, cdr: ValueRef) -> ValueRef {
    let v = Object::new_cons(car, cdr, false);
    rt.heap.register(v);
    v
}

pub fn make_cell(interior: ValueRef) -> ValueRef {
    Object::new_cell(interior, true)
}

pub fn make_cell_on_heap(rt: &mut Runtime, interior: ValueRef) -> ValueRef {
    let v = Object::new_cell(interior, false);
    rt.heap.register(v);
    v
}

pub fn make_hash_table() -> ValueRef {
    Object::new_hash_table(true)
}

pub fn make_hash_table_on_heap(rt: &mut Runtime) -> ValueRef {
    let v = Object::new_hash_table(false);
    rt.heap.register(v);
    v
}

/// The `run_minor_gc(thunk*)` entry point (spec §6): forces a minor+major
/// GC cycle over `thunk`'s roots right now instead of waiting for the next
/// stack-probe failure, then bounces back to the dispatch loop the same
/// way a failed probe would — this never returns.
pub fn run_minor_gc(rt: &mut Runtime, thunk: Thunk) -> ! {
    rt.run_minor_gc(thunk)
}

/// Runs a minor+major GC cycle over `roots` directly and returns normally,
/// without touching `current_thunk` or bouncing back to the dispatch
/// loop. Exposed for built-ins and tests that want to force a collection
/// outside the thunk/bounce protocol `run_minor_gc` assumes — e.g. to
/// reclaim memory eagerly before a large allocation without abandoning
/// the native frames currently on the stack.
///
/// # Safety
/// Every value reachable from `roots` must be live.
pub unsafe fn collect_roots(rt: &mut Runtime, roots: &mut [ValueRef]) {
    unsafe { rt.heap.collect(roots) };
}

#[cfg(test)]
#[path = "abi_test.rs"]
mod abi_test;
