//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, clear_pdf_handler, delete_handler, get_handler,
    health_handler, paid_handler, refresh_handler, stats_handler, AppState,
};

/// Creates the admin router.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /stats` - Size, keys and counters
/// - `GET /cache/:key` - Read a fresh entry
/// - `DELETE /cache/:key` - Delete an entry
/// - `DELETE /cache` - Clear everything
/// - `DELETE /cache/pdf/:invoice_id` - Drop a cached invoice PDF
/// - `POST /cache/cleanup` - Sweep expired entries now
/// - `POST /refresh` - Invalidate and broadcast a refresh event
/// - `GET /paid/:endpoint/:id` - Read a billing resource through the cache
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/cache/pdf/:invoice_id", delete(clear_pdf_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/refresh", post(refresh_handler))
        .route("/paid/:endpoint/:id", get(paid_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
