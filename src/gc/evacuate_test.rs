// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use crate::value::{ClosureFn, Object, Tag};

fn noop_one(_rt: &mut crate::trampoline::Runtime, _v: ValueRef, _env: ValueRef) {}

#[test]
fn stack_int_is_copied_and_flagged_heap_resident() {
    let v = Object::new_int(42, true);
    let mut roots = [v];
    unsafe {
        evacuate(&mut roots);
    }
    let evacuated = roots[0].unwrap();
    unsafe {
        assert!(!evacuated.as_ref().on_stack());
        assert_eq!(evacuated.as_ref().tag(), Tag::Int);
    }
    // the original is untouched; evacuation always produces a fresh copy.
    unsafe {
        assert!(v.unwrap().as_ref().on_stack());
    }
}

#[test]
fn heap_resident_root_is_returned_unchanged() {
    let v = Object::new_int(7, false);
    let mut roots = [v];
    unsafe {
        evacuate(&mut roots);
    }
    assert_eq!(roots[0], v);
}

#[test]
fn shared_cons_tail_is_evacuated_exactly_once() {
    let tail = Object::new_int(1, true);
    let a = Object::new_cons(tail, None, true);
    let b = Object::new_cons(tail, None, true);
    let mut roots = [a, b];
    unsafe {
        evacuate(&mut roots);
    }
    let a_car = unsafe {
        let Object { data: crate::value::HeapData::Cons { car, .. }, .. } = roots[0].unwrap().as_ref() else {
            panic!("expected cons")
        };
        car.get()
    };
    let b_car = unsafe {
        let Object { data: crate::value::HeapData::Cons { car, .. }, .. } = roots[1].unwrap().as_ref() else {
            panic!("expected cons")
        };
        car.get()
    };
    assert_eq!(a_car, b_car, "both cons cells must point at the same evacuated tail");
}

#[test]
fn nested_env_slots_are_rewritten_to_heap_pointers() {
    let inner = Object::new_int(99, true);
    let env = Object::new_env(2, true);
    unsafe {
        let Object { data: crate::value::HeapData::Env(slots), .. } = env.unwrap().as_ref() else {
            panic!("expected env")
        };
        slots[0].set(inner);
    }
    let mut roots = [env];
    unsafe {
        evacuate(&mut roots);
    }
    unsafe {
        let Object { data: crate::value::HeapData::Env(slots), .. } = roots[0].unwrap().as_ref() else {
            panic!("expected env")
        };
        let evacuated_inner = slots[0].get().unwrap();
        assert!(!evacuated_inner.as_ref().on_stack());
    }
}

#[test]
fn closure_env_pointer_is_rewritten() {
    let env = Object::new_env(0, true);
    let clos = Object::new_closure(ClosureFn::One(noop_one), env, true);
    let mut roots = [clos];
    unsafe {
        evacuate(&mut roots);
    }
    unsafe {
        let Object { data: crate::value::HeapData::Closure { env, .. }, .. } = roots[0].unwrap().as_ref() else {
            panic!("expected closure")
        };
        assert!(!env.get().unwrap().as_ref().on_stack());
    }
}

#[test]
fn hash_table_keys_and_values_survive_with_shared_identity_preserved() {
    let shared_key = Object::new_int(5, true);
    let val_a = Object::new_int(10, true);
    let val_b = Object::new_int(20, true);

    let table = Object::new_hash_table(true);
    unsafe {
        let Object { data: crate::value::HeapData::HashTable(t), .. } = table.unwrap().as_ref() else {
            panic!("expected hash table")
        };
        t.borrow_mut().insert(shared_key, val_a);
    }
    // A second root referencing the same key, to confirm it's forwarded once.
    let cons_with_same_key = Object::new_cons(shared_key, val_b, true);

    let mut roots = [table, cons_with_same_key];
    unsafe {
        evacuate(&mut roots);
    }

    let evac_key_via_cons = unsafe {
        let Object { data: crate::value::HeapData::Cons { car, .. }, .. } = roots[1].unwrap().as_ref() else {
            panic!("expected cons")
        };
        car.get().unwrap()
    };

    unsafe {
        let Object { data: crate::value::HeapData::HashTable(t), .. } = roots[0].unwrap().as_ref() else {
            panic!("expected hash table")
        };
        let table_ref = t.borrow();
        let (evac_key_via_table, evac_val) = table_ref.iter().next().expect("one entry");
        assert_eq!(*evac_key_via_table, Some(evac_key_via_cons), "shared key must forward to the same heap copy");
        assert_eq!(evac_val.unwrap().as_ref().tag(), Tag::Int);
    }
}

#[test]
fn self_referential_hash_table_evacuates_without_infinite_recursion() {
    let key = Object::new_int(1, true);
    let table = Object::new_hash_table(true);
    unsafe {
        let Object { data: crate::value::HeapData::HashTable(t), .. } = table.unwrap().as_ref() else {
            panic!("expected hash table")
        };
        t.borrow_mut().insert(key, table);
    }

    let mut roots = [table];
    unsafe {
        evacuate(&mut roots);
    }

    let evacuated = roots[0].unwrap();
    unsafe {
        assert!(!evacuated.as_ref().on_stack());
        let Object { data: crate::value::HeapData::HashTable(t), .. } = evacuated.as_ref() else {
            panic!("expected hash table")
        };
        let (_, v) = t.borrow().iter().next().expect("one entry");
        assert_eq!(*v, Some(evacuated), "self-reference must forward to the table's own heap copy");
    }
}

#[test]
fn null_root_is_left_alone() {
    let mut roots: [ValueRef; 1] = [None];
    unsafe {
        evacuate(&mut roots);
    }
    assert_eq!(roots[0], None);
}
