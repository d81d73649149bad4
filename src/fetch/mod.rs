//! Fetch Module
//!
//! Cache-aware wrappers over the billing backend.
//!
//! # Wrappers
//! - `cached_fetch` - raw payload, GET only
//! - `PaidClient::fetch_paid_data` - response-shaped result per endpoint
//! - `PaidClient::run_query` - query proxy, never cached
//! - `ResourceWatcher` - refetches a resource whenever it is invalidated

mod cached;
mod client;
mod query;
mod transport;
mod watcher;

pub use cached::cached_fetch;
pub use client::{ClientOptions, PaidClient, PaidEndpoint, PaidRequest, PaidResponse};
pub use query::QueryFilters;
pub use transport::{HttpRequest, HttpTransport, RawResponse, ReqwestTransport};
pub use watcher::{ResourceWatcher, WatchState};
