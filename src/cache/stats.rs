//! Cache Statistics Module
//!
//! Snapshot of cache contents plus read counters.

use serde::Serialize;

// == Cache Stats ==
/// Introspection snapshot of the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the store
    pub size: usize,
    /// Live keys in insertion order
    pub keys: Vec<String>,
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries evicted because they were observed expired (read or sweep)
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expirations ==
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}
