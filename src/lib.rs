// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Scheme Core
//!
//! Core runtime for a Scheme-like language compiled via continuation-
//! passing style (CPS) into native code. This crate provides:
//! - a tagged value representation (closures, environments, ints,
//!   strings, cons cells, mutable cells, hash tables)
//! - a trampoline that simulates an unbounded call stack on the host's
//!   finite stack, bouncing through a heap-allocated thunk when the
//!   stack probe runs low
//! - a two-generation garbage collector (minor evacuation, major
//!   mark-sweep) that promotes values from the stack to a managed heap
//!   on GC triggers
//! - the support containers (`Vector`, `Queue`, `BitSet`,
//!   `RobinHoodTable`) the above are built from
//!
//! The runtime has no end-user protocol; its boundary is the ABI a CPS
//! compiler emits calls against (see [`abi`]).

pub mod abi;
pub mod config;
pub mod containers;
pub mod diagnostics;
pub mod env;
pub mod equality;
pub mod error;
pub mod gc;
pub mod trampoline;
pub mod value;

// Re-exported for compiled code linking against this runtime, so the
// common entry points don't require reaching through `abi::`/`value::`.
pub use abi::{
    call, call_two, collect_roots, make_cell, make_cell_on_heap, make_closure_one,
    make_closure_two, make_cons, make_cons_on_heap, make_env, make_env_on_heap, make_hash_table,
    make_hash_table_on_heap, make_int, make_int_on_heap, make_str, make_str_on_heap,
    run_minor_gc, start_one, start_two,
};
pub use error::FatalError;
pub use trampoline::{Runtime, Thunk, scheme_start};
pub use value::{Arity, ClosureFn, Object, Tag, ValueRef};
