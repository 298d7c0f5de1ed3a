// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

#[test]
fn fresh_bits_are_unset() {
    let b = BitSet::new(100);
    for i in 0..100 {
        assert!(!b.get(i));
    }
}

#[test]
fn set_returns_previous_value() {
    let mut b = BitSet::new(16);
    assert_eq!(b.set(3, true), false);
    assert_eq!(b.set(3, true), true);
    assert_eq!(b.set(3, false), true);
    assert!(!b.get(3));
}

#[test]
fn bits_are_independently_addressable() {
    let mut b = BitSet::new(32);
    b.set(0, true);
    b.set(31, true);
    for i in 1..31 {
        assert!(!b.get(i));
    }
    assert!(b.get(0));
    assert!(b.get(31));
}

#[test]
fn clear_resets_every_bit() {
    let mut b = BitSet::new(20);
    for i in 0..20 {
        b.set(i, true);
    }
    b.clear();
    for i in 0..20 {
        assert!(!b.get(i));
    }
}
