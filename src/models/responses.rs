//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub key: String,
    pub value: Value,
}

impl EntryResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the delete, clear and cleanup operations
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(message: impl Into<String>, removed: usize) -> Self {
        Self {
            message: message.into(),
            removed,
        }
    }
}

/// Response body for POST /refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    /// Subscribers the event reached
    pub delivered: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Current number of entries
    pub size: usize,
    /// Keys in insertion order
    pub keys: Vec<String>,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Live refresh subscribers
    pub subscribers: usize,
}

impl StatsResponse {
    pub fn new(stats: CacheStats, subscribers: usize) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            size: stats.size,
            keys: stats.keys,
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            subscribers,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
