// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The fatal error taxonomy (spec §7).
//!
//! This language is compiled CPS: there is no user-level exception
//! mechanism, so every error here terminates the process. `FatalError`
//! exists to give each termination a name and a diagnostic line rather
//! than an ad-hoc `panic!`.

use std::fmt;

use crate::value::{Arity, Tag};

/// A fatal, unrecoverable runtime condition. Every variant is reported to
/// stderr and ends the process with a non-zero exit code; see
/// [`FatalError::abort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// Calling a closure with the wrong arity (spec §4.1.2).
    ArityMismatch { expected: Arity, got: Arity },
    /// A built-in received a value whose tag it cannot handle.
    TypeError {
        expected: Tag,
        detail: &'static str,
    },
    /// Hashing a value whose tag has no hash (spec §4.1.4).
    Unhashable { tag: Tag },
    /// A tag byte fell outside the closed set (debug builds only).
    CorruptTag { byte: u8 },
    /// A grey object survived into sweep, or an evacuated object is still
    /// flagged on-stack at the end of a GC cycle (spec §3.3, §4.3.3).
    GCInvariant { detail: &'static str },
    /// The dispatch loop was re-entered after a compiled procedure
    /// returned instead of tail-calling or bouncing (spec §4.2.2).
    FellThrough,
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::ArityMismatch { expected, got } => {
                write!(f, "arity mismatch: expected {expected:?}, got {got:?}")
            }
            FatalError::TypeError { expected, detail } => {
                write!(f, "type error: expected {expected:?}: {detail}")
            }
            FatalError::Unhashable { tag } => write!(f, "unhashable value of tag {tag:?}"),
            FatalError::CorruptTag { byte } => write!(f, "corrupt tag byte: {byte}"),
            FatalError::GCInvariant { detail } => write!(f, "GC invariant violated: {detail}"),
            FatalError::FellThrough => {
                write!(f, "dispatch loop fell through: a compiled procedure returned")
            }
        }
    }
}

impl std::error::Error for FatalError {}

impl FatalError {
    /// Prints a two-line diagnostic (caller location, then message) and
    /// terminates the process with exit code 1, matching `base.h`'s
    /// `RUNTIME_ERROR` macro shape (`__func__`/`__LINE__` there,
    /// `Location::caller()` here).
    #[track_caller]
    pub fn abort(&self) -> ! {
        let loc = std::panic::Location::caller();
        eprintln!("Runtime Error ({}:{}): {}", loc.file(), loc.line(), self);
        std::process::exit(1);
    }
}
