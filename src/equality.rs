// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Structural `equal?`/`hash` over tagged values (spec §4.1.4).
//!
//! These are the only two functions in the crate that interpret a value's
//! *contents* rather than just its tag; every other module treats values
//! opaquely. The mixing constants are the same splitmix-style multiply-
//! xor-shift used by `hash_table.h`'s internal probe hashing, reused here
//! so a value's identity hash and the table's bucket hash agree.

use crate::value::{HeapData, Tag, ValueRef};

/// Reflexive on nulls; tag mismatch is always unequal; `Cons`/`Cell` recurse
/// structurally; `HashTable` compares as a bijective multimap of keys and
/// values (both directions checked); every other tag compares its payload
/// directly.
///
/// # Safety
/// Every non-null `ValueRef` reachable from `a` or `b` must point to a live
/// `Object`.
pub unsafe fn equal(a: ValueRef, b: ValueRef) -> bool {
    match (a, b) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(pa), Some(pb)) => {
            let oa = unsafe { pa.as_ref() };
            let ob = unsafe { pb.as_ref() };
            if oa.tag() != ob.tag() {
                return false;
            }
            match (&oa.data, &ob.data) {
                (HeapData::Int(x), HeapData::Int(y)) => x == y,
                (HeapData::Str(x), HeapData::Str(y)) => x == y,
                (
                    HeapData::Cons { car: ca, cdr: da },
                    HeapData::Cons { car: cb, cdr: db },
                ) => unsafe { equal(ca.get(), cb.get()) && equal(da.get(), db.get()) },
                (HeapData::Cell(x), HeapData::Cell(y)) => unsafe { equal(x.get(), y.get()) },
                (HeapData::HashTable(x), HeapData::HashTable(y)) => unsafe {
                    hash_tables_equal(x, y)
                },
                // Closure and Env have no scheme-level structural equality:
                // two distinct closures are never `equal?`, even if they
                // happen to share a function pointer and env.
                _ => false,
            }
        }
    }
}

/// Two hash tables are `equal?` iff every key/value pair in one has a
/// structurally-equal counterpart in the other and the sizes match (a
/// bijective multimap comparison, per spec §4.1.4).
unsafe fn hash_tables_equal(
    a: &std::cell::RefCell<crate::containers::RobinHoodTable>,
    b: &std::cell::RefCell<crate::containers::RobinHoodTable>,
) -> bool {
    let ta = a.borrow();
    let tb = b.borrow();
    if ta.len() != tb.len() {
        return false;
    }
    unsafe {
        ta.iter().all(|(k, v)| match tb.lookup(k) {
            Some(bv) => equal(*v, *bv),
            None => false,
        })
    }
}

/// FNV-1a style 64-bit mix over a value's structure. `Int`'s hash is its
/// payload; `Str` hashes its bytes; `Cons` combines car/cdr with a
/// multiplicative mixer; `Cell` delegates to its interior; `HashTable`
/// folds the hashes of every key and value with an order-independent
/// combine (so two bijective-equal tables hash equal regardless of
/// iteration order); every other tag is unhashable and aborts (spec §7
/// `Unhashable`).
///
/// # Safety
/// Every non-null `ValueRef` reachable from `v` must point to a live
/// `Object`.
pub unsafe fn hash(v: ValueRef) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    match v {
        None => FNV_OFFSET,
        Some(p) => {
            let obj = unsafe { p.as_ref() };
            match &obj.data {
                HeapData::Int(n) => *n as u64,
                HeapData::Str(bytes) => {
                    let mut h = FNV_OFFSET;
                    for &b in bytes.iter() {
                        h ^= b as u64;
                        h = h.wrapping_mul(FNV_PRIME);
                    }
                    h
                }
                HeapData::Cons { car, cdr } => unsafe {
                    mix(hash(car.get()), hash(cdr.get()))
                },
                HeapData::Cell(interior) => unsafe { hash(interior.get()) },
                HeapData::HashTable(table) => unsafe {
                    let t = table.borrow();
                    let mut acc = 0u64;
                    for (k, val) in t.iter() {
                        // XOR-fold: order-independent so bijective-equal
                        // tables always agree.
                        acc ^= mix(hash(*k), hash(*val));
                    }
                    acc
                },
                HeapData::Closure { .. } | HeapData::Env(_) => {
                    crate::error::FatalError::Unhashable { tag: obj.tag() }.abort()
                }
            }
        }
    }
}

/// Splitmix-style multiplicative mixer combining two sub-hashes, matching
/// `hash_table.h`'s internal probe-hash mixer so the value-level hash and
/// the table's bucket hash use one consistent family of constants.
fn mix(a: u64, b: u64) -> u64 {
    let mut k = a ^ b.rotate_left(17);
    k = (k >> 30) ^ k;
    k = k.wrapping_mul(0xbf58476d1ce4e5b9);
    k = (k >> 27) ^ k;
    k = k.wrapping_mul(0xbf58476d1ce4e5b9);
    k = (k >> 31) ^ k;
    k
}

/// Unsafe tag check used by [`crate::value::Tag`] debug assertions; kept
/// here rather than on `Tag` itself since only this module inspects tag
/// bytes raw (spec §7 `CorruptTag`, debug builds only).
pub fn check_tag_byte(byte: u8) -> Tag {
    match byte {
        0 => Tag::Closure,
        1 => Tag::Env,
        2 => Tag::Int,
        3 => Tag::Str,
        4 => Tag::Cons,
        5 => Tag::Cell,
        6 => Tag::HashTable,
        other => crate::error::FatalError::CorruptTag { byte: other }.abort(),
    }
}

#[cfg(test)]
#[path = "equality_test.rs"]
mod equality_test;
