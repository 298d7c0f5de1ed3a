// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tunable constants for the trampoline, heap, and containers.
//!
//! The core consumes no environment variables, CLI flags, or files (spec
//! §6): every knob here is a compiled-in default, in the style of
//! `lona_vm::process::{X_REG_COUNT, MAX_CALL_DEPTH}`. [`RuntimeConfig`]
//! exists only so an embedder (or a test harness that wants to force a
//! bounce without looping a million times) can override the stack safety
//! margin without touching the probe itself.

/// Safety margin subtracted from `rlimit_cur` when the stack probe decides
/// whether a call site has ample remaining stack (spec §4.2.1).
pub const STACK_SAFETY_MARGIN: usize = 256 * 1024;

/// Assumed stack size when `getrlimit(RLIMIT_STACK)` reports an unlimited
/// or unreadable limit. Most hosts report a large but finite soft limit in
/// practice (commonly 8 MiB); this is that common default, used only as a
/// fallback so the probe always has a finite bound to compare against.
pub const DEFAULT_STACK_RLIMIT_FALLBACK: usize = 8 * 1024 * 1024;

/// Initial capacity of a freshly constructed [`crate::containers::Vector`].
pub const VECTOR_INITIAL_CAP: usize = 8;

/// Growth numerator/denominator applied to `Vector`/`Queue` capacity,
/// taken from `queue.h`'s `1 + len + (len >> 2)` formula (~1.25x).
pub const GROWTH_SHIFT: u32 = 2;

/// Initial capacity of a freshly constructed [`crate::containers::Queue`].
pub const QUEUE_INITIAL_CAP: usize = 8;

/// Initial capacity of a freshly constructed
/// [`crate::containers::RobinHoodTable`], from `hash_table.h`'s
/// `hash_table_initial_cap`.
pub const HASH_TABLE_INITIAL_CAP: usize = 64;

/// Load factor (percent) at which the hash table grows, from
/// `hash_table.h`'s `hash_table_load_factor_to_grow`.
pub const HASH_TABLE_LOAD_FACTOR_PERCENT: u64 = 90;

/// Initial capacity of the GC's global heap roster.
pub const HEAP_ROSTER_INITIAL_CAP: usize = 256;

/// Fraction (as a divisor) of original roster length below which a
/// post-sweep roster is shrunk to fit (spec §4.3.3: "if the post-sweep
/// length is ≤ ½ of the original, shrink capacity").
pub const ROSTER_SHRINK_DIVISOR: usize = 2;

/// Runtime-overridable knobs. Everything else in this module is a fixed
/// compiled-in constant; this struct exists solely for the one value a
/// test harness legitimately wants to vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Overrides [`STACK_SAFETY_MARGIN`] for this runtime instance.
    pub stack_safety_margin: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_safety_margin: STACK_SAFETY_MARGIN,
        }
    }
}
