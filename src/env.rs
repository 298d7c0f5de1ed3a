// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Closure calling convention and environment-slot access.
//!
//! Everything here is a thin, typed façade over [`crate::value::HeapData`];
//! the representation itself lives in `value.rs`. This module exists to keep
//! the "how do I read/write slot `i`" and "how do I call this closure"
//! concerns separate from the raw tagged-union definitions.

use crate::error::FatalError;
use crate::value::{Arity, ClosureFn, HeapData, Object, Tag, ValueRef};

/// Reads env slot `i` of `env_ref`. Per spec §4.1.3, compiled code only ever
/// reads by a constant index burned in at compile time; an out-of-range
/// index is a host bug, not a user-reachable error, hence the `unsafe`
/// dereference below and a plain panic rather than a `FatalError` variant
/// (there is no taxonomy entry for it — see spec §7).
///
/// # Safety
/// `env_ref` must point to a live `Env` object and `i` must be in range.
pub unsafe fn env_get(env_ref: ValueRef, i: usize) -> ValueRef {
    let obj = env_ref.expect("env_get on null env").as_ref();
    match &obj.data {
        HeapData::Env(slots) => slots[i].get(),
        _ => panic!("env_get: not an Env"),
    }
}

/// Replaces env slot `i` with `value`. Only used by the runtime while
/// constructing a fresh Env block (before it's handed to a closure); once a
/// closure captures an Env, compiled code mutates bindings exclusively by
/// storing `Cell`s into slots and mutating the Cell's interior (spec §3.2).
///
/// # Safety
/// `env_ref` must point to a live `Env` object and `i` must be in range.
pub unsafe fn env_set_slot(env_ref: ValueRef, i: usize, value: ValueRef) {
    let obj = env_ref.expect("env_set_slot on null env").as_ref();
    match &obj.data {
        HeapData::Env(slots) => slots[i].set(value),
        _ => panic!("env_set_slot: not an Env"),
    }
}

/// Mutates the interior of a `Cell` value. This is the *only* sanctioned way
/// to change a lexical binding's observed value after construction (spec §9,
/// Open Question #2: there is no `env_set` in this runtime at all).
///
/// # Safety
/// `cell_ref` must point to a live `Cell` object.
pub unsafe fn cell_set(cell_ref: ValueRef, value: ValueRef) {
    let obj = cell_ref.expect("cell_set on null cell").as_ref();
    match &obj.data {
        HeapData::Cell(slot) => slot.set(value),
        _ => panic!("cell_set: not a Cell"),
    }
}

/// # Safety
/// `cell_ref` must point to a live `Cell` object.
pub unsafe fn cell_get(cell_ref: ValueRef) -> ValueRef {
    let obj = cell_ref.expect("cell_get on null cell").as_ref();
    match &obj.data {
        HeapData::Cell(slot) => slot.get(),
        _ => panic!("cell_get: not a Cell"),
    }
}

/// Asserts `rator` is a One-arity closure and returns its function pointer
/// and captured env, per spec §4.1.2. Arity mismatch is fatal (§7).
///
/// # Safety
/// `rator` must point to a live `Object`.
pub unsafe fn expect_closure_one(rator: ValueRef) -> (fn(&mut crate::trampoline::Runtime, ValueRef, ValueRef), ValueRef) {
    let obj = match rator {
        Some(p) => p.as_ref(),
        None => FatalError::TypeError {
            expected: Tag::Closure,
            detail: "call on null",
        }
        .abort(),
    };
    if obj.tag() != Tag::Closure {
        FatalError::TypeError {
            expected: Tag::Closure,
            detail: "call target is not a closure",
        }
        .abort();
    }
    match &obj.data {
        HeapData::Closure { func, env } => match func {
            ClosureFn::One(f) => (*f, env.get()),
            ClosureFn::Two(_) => FatalError::ArityMismatch {
                expected: Arity::One,
                got: Arity::Two,
            }
            .abort(),
        },
        _ => unreachable!("tag checked above"),
    }
}

/// Asserts `rator` is a Two-arity closure and returns its function pointer
/// and captured env, per spec §4.1.2.
///
/// # Safety
/// `rator` must point to a live `Object`.
pub unsafe fn expect_closure_two(
    rator: ValueRef,
) -> (fn(&mut crate::trampoline::Runtime, ValueRef, ValueRef, ValueRef), ValueRef) {
    let obj = match rator {
        Some(p) => p.as_ref(),
        None => FatalError::TypeError {
            expected: Tag::Closure,
            detail: "call on null",
        }
        .abort(),
    };
    if obj.tag() != Tag::Closure {
        FatalError::TypeError {
            expected: Tag::Closure,
            detail: "call target is not a closure",
        }
        .abort();
    }
    match &obj.data {
        HeapData::Closure { func, env } => match func {
            ClosureFn::Two(f) => (*f, env.get()),
            ClosureFn::One(_) => FatalError::ArityMismatch {
                expected: Arity::Two,
                got: Arity::One,
            }
            .abort(),
        },
        _ => unreachable!("tag checked above"),
    }
}

pub fn env_len(env_ref: ValueRef) -> usize {
    let obj = unsafe { env_ref.expect("env_len on null env").as_ref() };
    match &obj.data {
        HeapData::Env(slots) => slots.len(),
        _ => panic!("env_len: not an Env"),
    }
}

/// A helper retained for symmetry with the original source's
/// `env_table_entry`: the compiler is expected to know, per closure, the
/// number of captured variables. This crate does not validate that the Env
/// handed to a closure matches its *declared* length beyond this debug
/// assertion; the check is the compiler's responsibility (spec §3.3
/// invariant 4 is a compile-time contract, not a runtime one once `std`
/// isn't compiled with debug assertions disabled).
pub fn debug_assert_env_len(env_ref: ValueRef, expected: usize) {
    debug_assert_eq!(env_len(env_ref), expected, "env length mismatch");
}

#[cfg(test)]
#[path = "env_test.rs"]
mod env_test;
