// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Structured logging around the dispatch loop and GC cycles, built on
//! `tracing`. Purely observational: nothing here affects control flow,
//! and the crate functions identically with no subscriber installed.
//!
//! Mirrors `lonala-lsp`'s habit of wrapping each `tracing` call site in a
//! small named function rather than scattering `trace!`/`debug!` macros
//! inline at every call site, so the event names and fields stay
//! consistent between the trampoline and the collector.

use tracing::{debug, info, trace};

/// One direct (non-bouncing) trampoline call.
pub fn trace_direct_call() {
    trace!(target: "scheme_core::trampoline", "direct call");
}

/// A trampoline bounce: the stack probe found insufficient headroom and
/// the call was deferred through a heap-allocated thunk. `bounce_count`
/// is the runtime's running total, which scenario tests assert against.
pub fn debug_bounce(bounce_count: u64) {
    debug!(target: "scheme_core::trampoline", bounce_count, "bounce");
}

/// Opens a span around one full (minor + major) GC cycle. The caller
/// records roster sizes into it as the cycle progresses.
pub fn gc_cycle_span() -> tracing::Span {
    tracing::info_span!("gc_cycle")
}

/// Logged once per GC cycle after sweep and compaction complete.
pub fn info_gc_cycle_complete(roster_before: usize, roster_after: usize, freed: usize) {
    info!(
        target: "scheme_core::gc",
        roster_before,
        roster_after,
        freed,
        "gc cycle complete"
    );
}

/// Installs a `tracing-subscriber` reading `RUST_LOG` (default `warn`).
/// Intended for binaries embedding this crate and for scenario tests;
/// the library itself never installs a subscriber on its own.
pub fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
