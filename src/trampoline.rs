// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The trampoline: stack-depth probe, bounce mechanism, and dispatch loop
//! (spec §4.2). Every compiled procedure tail-calls through
//! [`Runtime::call_one`]/[`Runtime::call_two`] instead of returning; when
//! the probe finds the host stack nearly exhausted, the call is deferred
//! into a heap-allocated [`Thunk`], a minor+major GC cycle runs, and
//! control returns to [`scheme_start`]'s dispatch point via a panic-based
//! non-local jump rather than a native `longjmp`.

use std::panic::AssertUnwindSafe;

use crate::config::{DEFAULT_STACK_RLIMIT_FALLBACK, RuntimeConfig};
use crate::diagnostics;
use crate::env::{expect_closure_one, expect_closure_two};
use crate::error::FatalError;
use crate::gc::Heap;
use crate::value::ValueRef;

/// A deferred call, heap-allocated by the indirect path so its operands
/// survive a GC cycle and the non-local jump back to [`scheme_start`].
/// Mirrors `base.h`'s `struct thunk`'s `one`/`two` union arms.
pub enum Thunk {
    /// Continuation-shaped call: `(closure rand)`.
    One { closure: ValueRef, rand: ValueRef },
    /// User-function-shaped call: `(closure rand cont)`.
    Two {
        closure: ValueRef,
        rand: ValueRef,
        cont: ValueRef,
    },
}

impl Thunk {
    /// The GC root set for this thunk (spec §4.3.1): the closure
    /// reference plus its operand(s).
    fn roots(&self) -> Vec<ValueRef> {
        match self {
            Thunk::One { closure, rand } => vec![*closure, *rand],
            Thunk::Two { closure, rand, cont } => vec![*closure, *rand, *cont],
        }
    }

    fn apply_roots(&mut self, roots: &[ValueRef]) {
        match self {
            Thunk::One { closure, rand } => {
                *closure = roots[0];
                *rand = roots[1];
            }
            Thunk::Two { closure, rand, cont } => {
                *closure = roots[0];
                *rand = roots[1];
                *cont = roots[2];
            }
        }
    }
}

/// Panic payload used exclusively to unwind back to [`scheme_start`]'s
/// dispatch point after a bounce. Never meant to be observed as a real
/// panic by a caller of this crate; `scheme_start` is the sole catcher.
struct Bounce;

/// Runtime-wide trampoline and GC state. Single-threaded by construction:
/// holds raw pointers (transitively, via [`Heap`]) with no `Send`/`Sync`
/// impl, so the type system itself forbids moving it across threads.
pub struct Runtime {
    pub heap: Heap,
    config: RuntimeConfig,
    stack_base: usize,
    current_thunk: Option<Thunk>,
    bounce_count: u64,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Runtime {
            heap: Heap::new(),
            config,
            stack_base: Self::current_stack_address(),
            current_thunk: None,
            bounce_count: 0,
        }
    }

    pub fn bounce_count(&self) -> u64 {
        self.bounce_count
    }

    fn current_stack_address() -> usize {
        let probe = 0u8;
        &probe as *const u8 as usize
    }

    fn stack_rlimit() -> usize {
        let mut rl: libc::rlimit = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_STACK, &mut rl) };
        if rc != 0 || rl.rlim_cur == libc::RLIM_INFINITY {
            DEFAULT_STACK_RLIMIT_FALLBACK
        } else {
            rl.rlim_cur as usize
        }
    }

    /// True if the current frame is above `base − rlimit_cur +
    /// safety_margin` (spec §4.2.1) — i.e. there's ample stack left for a
    /// direct call.
    fn stack_probe_ok(&self) -> bool {
        let current = Self::current_stack_address();
        let bound = self
            .stack_base
            .saturating_sub(Self::stack_rlimit())
            .saturating_add(self.config.stack_safety_margin);
        current > bound
    }

    /// Calls a One-arity closure `(rator rand)`. Never returns: either the
    /// callee itself never returns (the compiled-code contract), or the
    /// probe bounces and unwinds back to [`scheme_start`].
    ///
    /// # Safety
    /// `rator` and `rand` must be live values.
    pub unsafe fn call_one(&mut self, rator: ValueRef, rand: ValueRef) -> ! {
        if self.stack_probe_ok() {
            diagnostics::trace_direct_call();
            let (f, env) = unsafe { expect_closure_one(rator) };
            f(self, rand, env);
            FatalError::FellThrough.abort();
        } else {
            self.bounce(Thunk::One {
                closure: rator,
                rand,
            })
        }
    }

    /// Calls a Two-arity closure `(rator rand cont)`.
    ///
    /// # Safety
    /// `rator`, `rand`, and `cont` must be live values.
    pub unsafe fn call_two(&mut self, rator: ValueRef, rand: ValueRef, cont: ValueRef) -> ! {
        if self.stack_probe_ok() {
            diagnostics::trace_direct_call();
            let (f, env) = unsafe { expect_closure_two(rator) };
            f(self, rand, cont, env);
            FatalError::FellThrough.abort();
        } else {
            self.bounce(Thunk::Two {
                closure: rator,
                rand,
                cont,
            })
        }
    }

    /// The indirect path: stashes `thunk` as `current_thunk`, runs a full
    /// GC cycle over its roots, then unwinds back to `scheme_start`'s
    /// dispatch loop via [`Bounce`].
    fn bounce(&mut self, mut thunk: Thunk) -> ! {
        self.bounce_count += 1;
        diagnostics::debug_bounce(self.bounce_count);

        let mut roots = thunk.roots();
        unsafe { self.heap.collect(&mut roots) };
        thunk.apply_roots(&roots);

        self.current_thunk = Some(thunk);
        std::panic::panic_any(Bounce);
    }

    /// The ABI's `run_minor_gc` entry point (spec §6): forces a GC cycle
    /// over `thunk`'s roots right now, rather than waiting on the next
    /// stack-probe failure, then bounces back to [`scheme_start`]'s
    /// dispatch point exactly the way an exhausted probe would. Never
    /// returns.
    pub fn run_minor_gc(&mut self, thunk: Thunk) -> ! {
        self.bounce(thunk)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point for the dispatch loop (spec §4.2.2). Establishes the
/// bounce label (a `catch_unwind` around one dispatch) and loops forever:
/// every bounce re-enters here with `current_thunk` already populated by
/// [`Runtime::bounce`]. A direct fall-through from a dispatched closure is
/// a fatal error, since every compiled procedure is contractually a tail
/// call or a process exit.
pub fn scheme_start(rt: &mut Runtime, initial: Thunk) -> ! {
    rt.current_thunk = Some(initial);
    loop {
        let thunk = rt
            .current_thunk
            .take()
            .expect("current_thunk populated before dispatch");
        let rt_cell = AssertUnwindSafe(&mut *rt);
        let result = std::panic::catch_unwind(move || {
            let rt = rt_cell;
            match thunk {
                Thunk::One { closure, rand } => unsafe { rt.0.call_one(closure, rand) },
                Thunk::Two { closure, rand, cont } => unsafe { rt.0.call_two(closure, rand, cont) },
            }
        });
        match result {
            Ok(_) => FatalError::FellThrough.abort(),
            Err(payload) => {
                if payload.downcast_ref::<Bounce>().is_none() {
                    std::panic::resume_unwind(payload);
                }
                // `current_thunk` was set by `Runtime::bounce`; loop again.
            }
        }
    }
}

#[cfg(test)]
#[path = "trampoline_test.rs"]
mod trampoline_test;
