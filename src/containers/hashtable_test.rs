// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

unsafe fn hash_i64(k: &i64) -> u64 {
    *k as u64
}

unsafe fn eq_i64(a: &i64, b: &i64) -> bool {
    a == b
}

fn fresh_table() -> RobinHoodTable<i64, i64> {
    RobinHoodTable::with_hasher(hash_i64, eq_i64)
}

#[test]
fn insert_then_lookup_round_trips() {
    let mut t = fresh_table();
    for k in 0..10_000i64 {
        t.insert(k, k * 2);
    }
    for k in 0..10_000i64 {
        assert_eq!(t.lookup(&k), Some(&(k * 2)));
    }
}

#[test]
fn delete_then_lookup_misses_and_reinsert_succeeds() {
    let mut t = fresh_table();
    for k in 0..10_000i64 {
        t.insert(k, k * 2);
    }
    for k in (1..10_000i64).step_by(2) {
        assert!(t.delete(&k));
    }
    for k in 0..10_000i64 {
        if k % 2 == 0 {
            assert_eq!(t.lookup(&k), Some(&(k * 2)));
        } else {
            assert_eq!(t.lookup(&k), None);
        }
    }
    t.insert(1, 999);
    assert_eq!(t.lookup(&1), Some(&999));
}

#[test]
fn tombstone_slots_are_reused_on_insert() {
    let mut t = fresh_table();
    for k in 0..100i64 {
        t.insert(k, k);
    }
    for k in 0..50i64 {
        t.delete(&k);
    }
    for k in 100..150i64 {
        t.insert(k, k);
    }
    assert_eq!(t.len(), 100);
    for k in 50..150i64 {
        assert_eq!(t.lookup(&k), Some(&k));
    }
}

#[test]
fn grows_past_load_factor_without_losing_entries() {
    let mut t = RobinHoodTable::with_hasher_capacity(4, hash_i64, eq_i64);
    for k in 0..1000i64 {
        t.insert(k, k);
    }
    assert_eq!(t.len(), 1000);
    for k in 0..1000i64 {
        assert_eq!(t.lookup(&k), Some(&k));
    }
}

#[test]
fn clear_empties_the_table() {
    let mut t = fresh_table();
    for k in 0..10i64 {
        t.insert(k, k);
    }
    t.clear();
    assert_eq!(t.len(), 0);
    assert_eq!(t.lookup(&0), None);
}

#[test]
fn iter_visits_every_live_entry() {
    let mut t = fresh_table();
    for k in 0..50i64 {
        t.insert(k, k * 10);
    }
    for k in (0..50i64).step_by(2) {
        t.delete(&k);
    }
    let mut seen: Vec<i64> = t.iter().map(|(k, _)| *k).collect();
    seen.sort_unstable();
    let expected: Vec<i64> = (0..50).filter(|k| k % 2 != 0).collect();
    assert_eq!(seen, expected);
}

proptest::proptest! {
    #[test]
    fn insert_then_lookup_holds_for_arbitrary_keys(keys: Vec<i64>) {
        let mut t = fresh_table();
        for &k in &keys {
            t.insert(k, k);
        }
        for &k in &keys {
            proptest::prop_assert_eq!(t.lookup(&k), Some(&k));
        }
    }
}
