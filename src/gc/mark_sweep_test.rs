// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use crate::value::{MarkColor, Object};

#[test]
fn unreachable_heap_value_is_swept_and_nulled() {
    let live = Object::new_int(1, false);
    let dead = Object::new_int(2, false);
    let mut roster = vec![live, dead];

    unsafe {
        mark(&[live]);
        let freed = sweep(&mut roster);
        assert_eq!(freed, 1);
    }

    assert_eq!(roster[0], live);
    assert_eq!(roster[1], None);
}

#[test]
fn marked_objects_reset_to_white_after_sweep() {
    let live = Object::new_int(1, false);
    let mut roster = vec![live];

    unsafe {
        mark(&[live]);
        assert_eq!(live.unwrap().as_ref().header.mark.get(), MarkColor::Black);
        sweep(&mut roster);
        assert_eq!(live.unwrap().as_ref().header.mark.get(), MarkColor::White);
    }
}

#[test]
fn cyclic_cons_cells_are_marked_exactly_once_and_survive() {
    let a = Object::new_cons(None, None, false);
    let b = Object::new_cons(a, None, false);
    unsafe {
        let crate::value::HeapData::Cons { cdr, .. } = &a.unwrap().as_ref().data else {
            panic!("expected cons")
        };
        cdr.set(b);
    }
    let mut roster = vec![a, b];
    unsafe {
        mark(&[a]);
        let freed = sweep(&mut roster);
        assert_eq!(freed, 0);
    }
}

#[test]
fn unreachable_hash_table_frees_its_interior_table() {
    let key = Object::new_int(1, false);
    let table = Object::new_hash_table(false);
    unsafe {
        let crate::value::HeapData::HashTable(t) = &table.unwrap().as_ref().data else {
            panic!("expected hash table")
        };
        t.borrow_mut().insert(key, key);
    }
    let mut roster = vec![key, table];
    unsafe {
        // neither is reachable from an empty root set.
        mark(&[]);
        let freed = sweep(&mut roster);
        assert_eq!(freed, 2);
    }
}

#[test]
fn compact_drops_null_slots_and_preserves_order() {
    let a = Object::new_int(1, false);
    let c = Object::new_int(3, false);
    let mut roster = crate::containers::Vector::new();
    roster.push(a);
    roster.push(None);
    roster.push(c);
    compact(&mut roster);
    assert_eq!(roster.as_slice(), vec![a, c].as_slice());
}
