// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

unsafe fn tag_of(v: ValueRef) -> Tag {
    deref(v).unwrap().tag()
}

#[test]
fn int_round_trips_payload() {
    let v = Object::new_int(42, true);
    unsafe {
        assert_eq!(tag_of(v), Tag::Int);
        match &deref(v).unwrap().data {
            HeapData::Int(n) => assert_eq!(*n, 42),
            _ => panic!("expected Int"),
        }
    }
}

#[test]
fn fresh_values_are_white_and_on_stack() {
    let v = Object::new_cons(None, None, true);
    unsafe {
        let obj = deref(v).unwrap();
        assert_eq!(obj.header.mark.get(), MarkColor::White);
        assert!(obj.header.on_stack.get());
    }
}

#[test]
fn env_slots_start_null_and_are_indexable() {
    let v = Object::new_env(3, true);
    unsafe {
        match &deref(v).unwrap().data {
            HeapData::Env(slots) => {
                assert_eq!(slots.len(), 3);
                assert!(slots.iter().all(|c| c.get().is_none()));
            }
            _ => panic!("expected Env"),
        }
    }
}

#[test]
fn closure_arity_matches_constructor() {
    fn body_one(_rt: &mut crate::trampoline::Runtime, _rand: ValueRef, _env: ValueRef) {}
    let env = Object::new_env(0, true);
    let v = Object::new_closure(ClosureFn::One(body_one), env, true);
    unsafe {
        match &deref(v).unwrap().data {
            HeapData::Closure { func, .. } => assert_eq!(func.arity(), Arity::One),
            _ => panic!("expected Closure"),
        }
    }
}

#[test]
fn cell_mutation_does_not_change_identity() {
    let interior = Object::new_int(1, true);
    let cell = Object::new_cell(interior, true);
    let new_interior = Object::new_int(2, true);
    unsafe {
        match &deref(cell).unwrap().data {
            HeapData::Cell(slot) => {
                slot.set(new_interior);
                assert_eq!(slot.get(), new_interior);
            }
            _ => panic!("expected Cell"),
        }
    }
    // the cell's own address is unchanged by mutating its interior
    assert_eq!(cell, cell);
}
