// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Open-addressing robin-hood hash table, ported from `hash_table.h`'s
//! macro-generated implementation: initial capacity 64, grow at ≥90%
//! load by doubling, empty-slot marker is "never written" (modelled here
//! as `None` rather than a zero hash, since Rust gives us a real option
//! type instead of the original's sentinel value), tombstone deletion via
//! a [`super::BitSet`], and the same splitmix-style mixer with a
//! zero-result rewritten to 1.
//!
//! Unlike the original (whose keys are raw `size_t`s the caller has
//! already reduced to an identity), this table is generic over `K`/`V`
//! and takes its hashing and equality functions as plain function
//! pointers rather than a trait bound — the same "concrete fn pointer
//! over `dyn`" preference the calling convention in `env.rs` follows.
//! This lets the value-level `HashTable` (§4.1.4) key on full structural
//! equality (`equality::equal`) rather than raw identity, which a
//! `size_t`-keyed table cannot express.

use crate::config::{HASH_TABLE_INITIAL_CAP, HASH_TABLE_LOAD_FACTOR_PERCENT};
use crate::containers::BitSet;
use crate::value::ValueRef;

struct Slot<K, V> {
    hash: u64,
    key: K,
    value: V,
}

pub struct RobinHoodTable<K = ValueRef, V = ValueRef> {
    slots: Vec<Option<Slot<K, V>>>,
    deleted: BitSet,
    num_elems: usize,
    cap: usize,
    mask: u64,
    resize_thresh: usize,
    hash_fn: unsafe fn(&K) -> u64,
    eq_fn: unsafe fn(&K, &K) -> bool,
}

impl<K, V> RobinHoodTable<K, V> {
    pub fn with_hasher(hash_fn: unsafe fn(&K) -> u64, eq_fn: unsafe fn(&K, &K) -> bool) -> Self {
        Self::with_hasher_capacity(HASH_TABLE_INITIAL_CAP, hash_fn, eq_fn)
    }

    pub fn with_hasher_capacity(
        capacity: usize,
        hash_fn: unsafe fn(&K) -> u64,
        eq_fn: unsafe fn(&K, &K) -> bool,
    ) -> Self {
        let cap = capacity.next_power_of_two().max(1);
        let mut slots = Vec::with_capacity(cap);
        slots.resize_with(cap, || None);
        RobinHoodTable {
            slots,
            deleted: BitSet::new(cap),
            num_elems: 0,
            cap,
            mask: (cap - 1) as u64,
            resize_thresh: ((cap as u64) * HASH_TABLE_LOAD_FACTOR_PERCENT / 100) as usize,
            hash_fn,
            eq_fn,
        }
    }

    pub fn len(&self) -> usize {
        self.num_elems
    }

    pub fn is_empty(&self) -> bool {
        self.num_elems == 0
    }

    /// Current slot count (power of two). Exposed so callers (and tests)
    /// can observe whether an insert sequence triggered [`Self::grow`]
    /// without reaching into private fields.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    fn splitmix(mut k: u64) -> u64 {
        k = ((k >> 30) ^ k).wrapping_mul(0xbf58476d1ce4e5b9);
        k = ((k >> 27) ^ k).wrapping_mul(0xbf58476d1ce4e5b9);
        k = (k >> 31) ^ k;
        k
    }

    fn fix_hash(h: u64) -> u64 {
        if h == 0 { 1 } else { h }
    }

    fn mix_hash(&self, key: &K) -> u64 {
        let raw = unsafe { (self.hash_fn)(key) };
        Self::fix_hash(Self::splitmix(raw))
    }

    fn hash_idx(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    fn max_probes(&self, hash: u64, idx: usize) -> usize {
        let hidx = self.hash_idx(hash) as u64;
        ((self.cap as u64 + idx as u64 - hidx) & self.mask) as usize
    }

    /// Inserts `(key, value)`, growing first if this insert would push the
    /// table past its load-factor threshold (matches `hash_table.h`:
    /// increment, check, grow, *then* insert into the possibly-grown
    /// table).
    pub fn insert(&mut self, key: K, value: V) {
        self.num_elems += 1;
        if self.num_elems >= self.resize_thresh {
            self.grow();
        }
        let hash = self.mix_hash(&key);
        self.raw_insert(Slot { hash, key, value });
    }

    fn raw_insert(&mut self, mut e: Slot<K, V>) {
        let mut idx = self.hash_idx(e.hash);
        let mut to_insert_probes = 0usize;

        loop {
            if self.slots[idx].is_none() {
                self.slots[idx] = Some(e);
                return;
            }

            let current_hash = self.slots[idx].as_ref().unwrap().hash;

            if self.deleted.get(idx) {
                self.deleted.set(idx, false);
                self.slots[idx] = Some(e);
                return;
            }

            // steal from the rich, give to the poor
            let current_probes = self.max_probes(current_hash, idx);
            if current_probes < to_insert_probes {
                std::mem::swap(self.slots[idx].as_mut().unwrap(), &mut e);
                to_insert_probes = current_probes;
            }

            idx = (idx + 1) & (self.mask as usize);
            to_insert_probes += 1;
        }
    }

    fn grow(&mut self) {
        let new_cap = self.cap * 2;
        let old_slots = std::mem::take(&mut self.slots);
        let old_deleted = std::mem::replace(&mut self.deleted, BitSet::new(new_cap));

        self.cap = new_cap;
        self.mask = (new_cap - 1) as u64;
        self.resize_thresh = ((new_cap as u64) * HASH_TABLE_LOAD_FACTOR_PERCENT / 100) as usize;
        self.slots = Vec::with_capacity(new_cap);
        self.slots.resize_with(new_cap, || None);

        for (i, slot) in old_slots.into_iter().enumerate() {
            if let Some(e) = slot {
                if !old_deleted.get(i) {
                    self.raw_insert(e);
                }
            }
        }
    }

    fn find_index(&self, key: &K) -> Option<usize> {
        let hash = self.mix_hash(key);
        let mut idx = self.hash_idx(hash);
        let mut num_probes = 0usize;

        loop {
            let slot = self.slots[idx].as_ref()?;
            let current_hash = slot.hash;

            if num_probes > self.max_probes(current_hash, idx) {
                return None;
            }

            if !self.deleted.get(idx) && current_hash == hash && unsafe { (self.eq_fn)(&slot.key, key) } {
                return Some(idx);
            }

            idx = (idx + 1) & (self.mask as usize);
            num_probes += 1;
        }
    }

    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.find_index(key)
            .map(|idx| &self.slots[idx].as_ref().unwrap().value)
    }

    pub fn lookup_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find_index(key)?;
        Some(&mut self.slots[idx].as_mut().unwrap().value)
    }

    pub fn delete(&mut self, key: &K) -> bool {
        match self.find_index(key) {
            Some(idx) => {
                self.deleted.set(idx, true);
                self.num_elems -= 1;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.deleted.clear();
        self.num_elems = 0;
    }

    /// Ordered iteration over every live (non-tombstoned) slot.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().enumerate().filter_map(move |(i, slot)| {
            if self.deleted.get(i) {
                return None;
            }
            slot.as_ref().map(|e| (&e.key, &e.value))
        })
    }
}

/// # Safety
/// `k` must be a `ValueRef` whose reachable objects are all live.
unsafe fn hash_value_ref(k: &ValueRef) -> u64 {
    unsafe { crate::equality::hash(*k) }
}

/// # Safety
/// `a` and `b` must be `ValueRef`s whose reachable objects are all live.
unsafe fn eq_value_ref(a: &ValueRef, b: &ValueRef) -> bool {
    unsafe { crate::equality::equal(*a, *b) }
}

impl RobinHoodTable<ValueRef, ValueRef> {
    /// The value-level `HashTable`'s table: keyed and compared by
    /// structural `equal?`/`hash` (spec §4.1.4), not pointer identity.
    pub fn new() -> Self {
        Self::with_hasher(hash_value_ref, eq_value_ref)
    }
}

impl Default for RobinHoodTable<ValueRef, ValueRef> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "hashtable_test.rs"]
mod hashtable_test;
