//! Shared Cache Handle
//!
//! `DataCache` is the instance the application constructs once and hands to
//! every consumer. Clones share the same store and the same refresh bus.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{keys, CacheStats, CacheStore};
use crate::config::Config;
use crate::events::{RefreshBus, RefreshEvent, Subscription};

// == Data Cache ==
/// Cloneable handle over a store and its refresh bus.
#[derive(Debug, Clone)]
pub struct DataCache {
    store: Arc<RwLock<CacheStore>>,
    bus: RefreshBus,
}

impl DataCache {
    /// Wraps a store with a refresh bus of the given capacity.
    pub fn new(store: CacheStore, event_capacity: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            bus: RefreshBus::new(event_capacity),
        }
    }

    /// Builds the cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CacheStore::new(Duration::from_secs(config.default_ttl)),
            config.event_capacity,
        )
    }

    // == Store Operations ==
    // Reads take the write lock: an expired entry is evicted on observation.

    pub async fn get(&self, key: &str) -> Option<Value> {
        let value = self.store.write().await.get(key);
        debug!(key, hit = value.is_some(), "cache lookup");
        value
    }

    /// Reads without touching the hit and miss counters.
    pub async fn peek(&self, key: &str) -> Option<Value> {
        self.store.write().await.peek(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        self.store.write().await.set(key, value, ttl);
    }

    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.has(key)
    }

    /// Alias of `has` for callers asking whether a resource is cached.
    pub async fn is_cached(&self, key: &str) -> bool {
        self.has(key).await
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    pub async fn clear(&self) -> usize {
        let removed = self.store.write().await.clear();
        info!(removed, "cache cleared");
        removed
    }

    /// Removes every expired entry. Returns how many were dropped.
    pub async fn cleanup(&self) -> usize {
        self.store.write().await.cleanup()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    // == Maintenance Helpers ==

    /// Deletes every customer-scoped entry for `customer_id`.
    pub async fn clear_account_cache(&self, customer_id: &str) -> usize {
        let mut store = self.store.write().await;
        keys::customer_keys(customer_id)
            .iter()
            .filter(|key| store.delete(key))
            .count()
    }

    /// Deletes the cached PDF for an invoice.
    pub async fn clear_invoice_pdf_cache(&self, invoice_id: &str) -> bool {
        self.delete(&keys::invoice_pdf(invoice_id)).await
    }

    // == Invalidation ==

    /// Deletes the entries an event covers, then broadcasts it.
    ///
    /// Returns the number of subscribers the event reached.
    pub async fn invalidate(&self, event: RefreshEvent) -> usize {
        let removed = match &event {
            RefreshEvent::Account { entity_id } => self.clear_account_cache(entity_id).await,
            RefreshEvent::Alerts { entity_id } => {
                usize::from(self.delete(&keys::alert_rules(entity_id)).await)
            }
            RefreshEvent::All => self.clear().await,
        };
        debug!(?event, removed, "invalidated cache entries");
        self.bus.publish(event)
    }

    /// Forces every consumer of `customer_id` to refetch.
    pub async fn refresh_account(&self, customer_id: &str) -> usize {
        self.invalidate(RefreshEvent::account(customer_id)).await
    }

    /// Forces every consumer to refetch.
    pub async fn refresh_all(&self) -> usize {
        self.invalidate(RefreshEvent::All).await
    }

    /// Broadcasts an event without touching the store.
    pub fn publish(&self, event: RefreshEvent) -> usize {
        self.bus.publish(event)
    }

    /// Subscribes to refresh events for one entity, or to all with `None`.
    pub fn subscribe(&self, entity_id: Option<String>) -> Subscription {
        self.bus.subscribe(entity_id)
    }

    pub fn bus(&self) -> &RefreshBus {
        &self.bus
    }
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(CacheStore::default(), 64)
    }
}
