//! Paid cache - client-side caching for Paid billing data
//!
//! Provides a TTL cache keyed per customer and data kind, cache-through fetch
//! wrappers over the Paid API, and a refresh signal that invalidates entries
//! and notifies subscribers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{ttl, DataCache};
pub use config::Config;
pub use error::{FetchError, Result};
pub use events::RefreshEvent;
pub use fetch::{cached_fetch, PaidClient, PaidRequest, PaidResponse};
pub use tasks::spawn_cleanup_task;
