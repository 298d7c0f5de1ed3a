// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use crate::config::RuntimeConfig;
use crate::value::Object;

#[test]
fn probe_reports_ample_room_under_default_margin() {
    let rt = Runtime::new();
    assert!(rt.stack_probe_ok());
}

#[test]
fn probe_reports_exhaustion_under_an_oversized_margin() {
    // An artificially huge safety margin pushes the bound above any real
    // frame address, forcing the indirect path deterministically instead
    // of recursing toward real exhaustion.
    let rt = Runtime::with_config(RuntimeConfig {
        stack_safety_margin: usize::MAX / 2,
    });
    assert!(!rt.stack_probe_ok());
}

#[test]
fn bounce_evacuates_roots_and_unwinds_with_the_bounce_marker() {
    let mut rt = Runtime::new();
    let closure_env = Object::new_env(0, true);
    let rand = Object::new_int(5, true);

    let thunk = Thunk::One {
        closure: closure_env, // placeholder value; bounce doesn't tag-check
        rand,
    };

    let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        rt.bounce(thunk);
    }));
    assert!(caught.is_err());

    assert_eq!(rt.bounce_count(), 1);
    match rt.current_thunk.as_ref().unwrap() {
        Thunk::One { closure, rand } => {
            assert!(closure.is_some());
            unsafe {
                assert!(!closure.unwrap().as_ref().on_stack());
                assert!(!rand.unwrap().as_ref().on_stack());
            }
        }
        Thunk::Two { .. } => panic!("expected One"),
    }
}

#[test]
fn repeated_bounces_increment_the_counter() {
    let mut rt = Runtime::new();
    for expected in 1..=3u64 {
        let rand = Object::new_int(expected as i64, true);
        let thunk = Thunk::Two {
            closure: None,
            rand,
            cont: None,
        };
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            rt.bounce(thunk);
        }));
        assert_eq!(rt.bounce_count(), expected);
    }
}
