//! Cached fetch: check cache, GET on miss, populate on success.
//!
//! Only for idempotent reads. Failures are never cached.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::DataCache;
use crate::error::{FetchError, Result};
use crate::fetch::{HttpRequest, HttpTransport};

/// Returns the payload cached under `cache_key`, or GETs `url`, caches the
/// decoded body for `ttl` and returns it.
///
/// Concurrent misses on the same key each go to the network; whichever
/// completes last owns the cache slot.
pub async fn cached_fetch<T: DeserializeOwned>(
    cache: &DataCache,
    transport: &dyn HttpTransport,
    url: &str,
    cache_key: &str,
    ttl: Duration,
) -> Result<T> {
    if let Some(cached) = cache.get(cache_key).await {
        debug!(cache_key, "serving from cache");
        return Ok(serde_json::from_value(cached)?);
    }

    let response = transport.send(HttpRequest::get(url)).await?;
    if !response.is_success() {
        warn!(url, status = response.status, "fetch failed");
        return Err(FetchError::Status {
            status: response.status,
            status_text: response.status_text,
        });
    }

    // Decode fully before caching so a bad body leaves nothing behind.
    let body: Value = response.json()?;
    let data = T::deserialize(&body)?;
    cache.set(cache_key, body, Some(ttl)).await;

    Ok(data)
}
