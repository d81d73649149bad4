//! Key Order Module
//!
//! Tracks the insertion order of live keys for stats output.

use std::collections::VecDeque;

// == Key Order ==
/// Tracks keys in insertion order.
///
/// Front = oldest insertion, back = newest. Re-inserting a key that is
/// already tracked keeps its original position.
#[derive(Debug, Default)]
pub struct KeyOrder {
    order: VecDeque<String>,
}

impl KeyOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Insert ==
    /// Appends a key unless it is already tracked.
    pub fn insert(&mut self, key: &str) {
        if !self.contains(key) {
            self.order.push_back(key.to_string());
        }
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Retain ==
    /// Keeps only the keys for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.order.retain(|k| keep(k));
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Keys ==
    /// Returns the tracked keys, oldest first.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
