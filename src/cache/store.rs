//! Cache Store Module
//!
//! Main cache engine: HashMap storage with per-entry TTL, expiry-on-read and
//! insertion-order tracking.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, KeyOrder};

// == Cache Store ==
/// Key → entry map with TTL expiry.
///
/// None of the operations can fail. Expired entries are logically absent and
/// are physically removed the first time a read observes them.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Insertion order for stats
    order: KeyOrder,
    /// Read counters
    stats: CacheStats,
    /// TTL applied when `set` receives no TTL or a zero TTL
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: KeyOrder::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    /// Returns the TTL used when callers don't provide one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Set ==
    /// Stores a value under `key`, unconditionally replacing any existing entry.
    ///
    /// A missing or zero `ttl` falls back to the default TTL.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        self.set_at(key, value, ttl, Instant::now());
    }

    pub(crate) fn set_at(
        &mut self,
        key: impl Into<String>,
        value: Value,
        ttl: Option<Duration>,
        now: Instant,
    ) {
        let key = key.into();
        let ttl = match ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.default_ttl,
        };

        self.order.insert(&key);
        self.entries.insert(key, CacheEntry::stored_at(value, ttl, now));
    }

    // == Get ==
    /// Returns the stored value if present and fresh.
    ///
    /// An expired entry is removed as a side effect and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<Value> {
        if self.evict_if_expired(key, now) {
            self.stats.record_miss();
            return None;
        }

        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.data.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Like `get`, but leaves the hit and miss counters untouched.
    ///
    /// For inspection that is not consumer traffic.
    pub fn peek(&mut self, key: &str) -> Option<Value> {
        self.peek_at(key, Instant::now())
    }

    pub(crate) fn peek_at(&mut self, key: &str, now: Instant) -> Option<Value> {
        if self.evict_if_expired(key, now) {
            return None;
        }
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Has ==
    /// Presence check with the same expiry side effect as `get`.
    pub fn has(&mut self, key: &str) -> bool {
        self.has_at(key, Instant::now())
    }

    pub(crate) fn has_at(&mut self, key: &str, now: Instant) -> bool {
        !self.evict_if_expired(key, now) && self.entries.contains_key(key)
    }

    // == Delete ==
    /// Removes an entry. Returns whether something was removed; absent keys
    /// are a no-op.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        count
    }

    // == Cleanup ==
    /// Removes all expired entries, read or not.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        self.cleanup_at(Instant::now())
    }

    pub(crate) fn cleanup_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the store. No side effects.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.size = self.entries.len();
        stats.keys = self.order.keys();
        stats
    }

    // == Length ==
    /// Returns the number of physically stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops `key` if it is stored and stale at `now`.
    fn evict_if_expired(&mut self, key: &str, now: Instant) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now));

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            self.stats.record_expirations(1);
            debug!(key, "evicted expired entry on read");
        }
        expired
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(crate::cache::ttl::DEFAULT)
    }
}
