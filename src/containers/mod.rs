// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Support containers used throughout the collector and value model
//! (spec §4.4): a growable [`Vector`], a ring-buffer [`Queue`], a packed
//! [`BitSet`], and a [`RobinHoodTable`]. Each is monomorphised per element
//! type via Rust generics rather than the source's macro instantiation
//! (spec §9 explicitly permits either).

mod bitset;
mod hashtable;
mod queue;
mod vector;

pub use bitset::BitSet;
pub use hashtable::RobinHoodTable;
pub use queue::Queue;
pub use vector::Vector;
