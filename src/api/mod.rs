//! API Module
//!
//! Admin and debugging surface over the shared cache.
//!
//! # Endpoints
//! - `GET /health`, `GET /stats`
//! - `GET|DELETE /cache/:key`, `DELETE /cache`, `DELETE /cache/pdf/:invoice_id`
//! - `POST /cache/cleanup`, `POST /refresh`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
