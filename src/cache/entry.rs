//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with its payload and freshness metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload, opaque to the cache
    pub data: Value,
    /// Insertion instant
    pub stored_at: Instant,
    /// Time after which the entry is stale
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current instant.
    pub fn new(data: Value, ttl: Duration) -> Self {
        Self::stored_at(data, ttl, Instant::now())
    }

    /// Creates a cache entry stamped with an explicit insertion instant.
    pub fn stored_at(data: Value, ttl: Duration, stored_at: Instant) -> Self {
        Self {
            data,
            stored_at,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a given instant.
    ///
    /// Boundary condition: an entry is still valid when exactly `ttl` has
    /// elapsed, and expires strictly after that.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, `Duration::ZERO` once elapsed.
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl
            .saturating_sub(Instant::now().saturating_duration_since(self.stored_at))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"items": [1, 2, 3]}), Duration::from_secs(30));

        assert_eq!(entry.data, json!({"items": [1, 2, 3]}));
        assert_eq!(entry.ttl, Duration::from_secs(30));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::stored_at(json!("v"), Duration::from_millis(500), now);

        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::from_millis(500)));
        assert!(entry.is_expired_at(now + Duration::from_millis(501)));
    }

    #[test]
    fn test_zero_ttl_expires_after_any_elapsed_time() {
        let now = Instant::now();
        let entry = CacheEntry::stored_at(json!(1), Duration::ZERO, now);

        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_millis(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new(json!(null), Duration::from_secs(10));
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
        assert!(entry.is_expired());
    }
}
