//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints and the billing
//! read-through route.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::warn;

use crate::cache::DataCache;
use crate::config::Config;
use crate::error::ApiError;
use crate::fetch::{PaidClient, PaidEndpoint, PaidRequest};
use crate::models::{
    EntryResponse, HealthResponse, RefreshRequest, RefreshResponse, RemovedResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache handle, the same one the client reads through
    pub cache: DataCache,
    /// Billing backend client
    pub client: PaidClient,
}

impl AppState {
    /// Creates a new AppState around `client`, sharing its cache.
    pub fn new(client: PaidClient) -> Self {
        Self {
            cache: client.cache().clone(),
            client,
        }
    }

    /// Creates the cache and the reqwest-backed client from configuration.
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let cache = DataCache::from_config(config);
        Ok(Self::new(PaidClient::from_config(cache, config)?))
    }
}

/// Handler for GET /paid/:endpoint/:id
///
/// Reads a billing resource through the cache. `id` is the customer
/// external id, or the invoice id for `invoice-pdf`. The `x-cache` header
/// tells whether the backend was contacted.
pub async fn paid_handler(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let endpoint: PaidEndpoint = name
        .parse()
        .map_err(|_| ApiError::InvalidRequest(format!("unknown endpoint '{}'", name)))?;

    let request = match endpoint {
        PaidEndpoint::PayInvoice => {
            return Err(ApiError::InvalidRequest(
                "pay-invoice cannot be read".to_string(),
            ))
        }
        PaidEndpoint::InvoicePdf => PaidRequest::invoice_pdf(id),
        _ => PaidRequest::customer(endpoint, id),
    };

    let response = state.client.fetch_paid_data(&request).await.map_err(|e| {
        warn!(%endpoint, error = %e, "read-through fetch failed");
        ApiError::Upstream(format!("Failed to fetch {} data", endpoint))
    })?;

    let cache_status = if response.is_cache_hit() { "HIT" } else { "MISS" };
    Ok(([("x-cache", cache_status)], Json(response.into_data())))
}

/// Handler for GET /cache/:key
///
/// Returns the fresh value under `key`; absent and expired keys are 404.
/// Inspection does not count as a hit or miss.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryResponse>, ApiError> {
    let value = state
        .cache
        .peek(&key)
        .await
        .ok_or_else(|| ApiError::NotFound(key.clone()))?;

    Ok(Json(EntryResponse::new(key, value)))
}

/// Handler for DELETE /cache/:key
///
/// Deleting an absent key is not an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<RemovedResponse> {
    let removed = usize::from(state.cache.delete(&key).await);
    Json(RemovedResponse::new(format!("Key '{}' deleted", key), removed))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.clear().await;
    Json(RemovedResponse::new("Cache cleared", removed))
}

/// Handler for DELETE /cache/pdf/:invoice_id
pub async fn clear_pdf_handler(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Json<RemovedResponse> {
    let removed = usize::from(state.cache.clear_invoice_pdf_cache(&invoice_id).await);
    Json(RemovedResponse::new(
        format!("PDF cache for invoice '{}' cleared", invoice_id),
        removed,
    ))
}

/// Handler for POST /cache/cleanup
///
/// Runs the expiry sweep immediately.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.cleanup().await;
    Json(RemovedResponse::new("Expired entries removed", removed))
}

/// Handler for POST /refresh
///
/// Drops the entries the event covers and broadcasts it.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let delivered = state.cache.invalidate(req.event).await;
    Ok(Json(RefreshResponse { delivered }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let subscribers = state.cache.bus().subscriber_count();
    Json(StatsResponse::new(stats, subscribers))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
