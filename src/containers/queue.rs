// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Contiguous ring-buffer queue, ported from `queue.h` almost verbatim:
//! head/tail indices mod capacity, the same `1 + len + (len >> 2)` growth
//! formula, and tail-segment relocation on grow so the existing tail
//! segment stays contiguous after resize.
//!
//! One slot is always kept free by construction: `enqueue` grows the
//! buffer the instant `head` would catch up to `tail`, so `head == tail`
//! unambiguously means empty.

use crate::config::{GROWTH_SHIFT, QUEUE_INITIAL_CAP};

pub struct Queue<T> {
    data: Vec<Option<T>>,
    head: usize,
    tail: usize,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self::with_capacity(QUEUE_INITIAL_CAP)
    }

    pub fn with_capacity(initial: usize) -> Self {
        let initial = initial.max(1);
        let mut data = Vec::with_capacity(initial);
        data.resize_with(initial, || None);
        Queue {
            data,
            head: 0,
            tail: 0,
        }
    }

    pub fn len(&self) -> usize {
        use std::cmp::Ordering;
        match self.head.cmp(&self.tail) {
            Ordering::Greater => self.head - self.tail,
            Ordering::Less => self.head + self.data.len() - self.tail,
            Ordering::Equal => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn enqueue(&mut self, value: T) {
        let cap = self.data.len();
        self.data[self.head] = Some(value);
        self.head = (self.head + 1) % cap;
        if self.head == self.tail {
            self.grow();
        }
    }

    fn grow(&mut self) {
        let old_size = self.data.len();
        let new_size = 1 + old_size + (old_size >> GROWTH_SHIFT);
        let delta = new_size - old_size;
        self.data.resize_with(new_size, || None);
        for i in (self.tail..old_size).rev() {
            self.data[i + delta] = self.data[i].take();
        }
        self.tail += delta;
    }

    pub fn dequeue(&mut self) -> Option<T> {
        if self.tail == self.head {
            return None;
        }
        let cap = self.data.len();
        let result = self.data[self.tail].take();
        self.tail = (self.tail + 1) % cap;
        result
    }

    pub fn clear(&mut self) {
        for slot in self.data.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod queue_test;
