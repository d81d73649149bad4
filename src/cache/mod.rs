//! Cache Module
//!
//! In-memory TTL cache for billing data, its key scheme and the shared
//! handle consumers hold.

mod entry;
mod handle;
pub mod keys;
mod order;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use handle::DataCache;
pub use order::KeyOrder;
pub use stats::CacheStats;
pub use store::CacheStore;

// == TTL Constants ==
/// Lifetimes callers pick per resource kind.
pub mod ttl {
    use std::time::Duration;

    /// Customer data lists (invoices, payments, usage, ...)
    pub const DATA: Duration = Duration::from_secs(30);
    /// Invoice PDFs
    pub const PDF: Duration = Duration::from_secs(30 * 60);
    /// Frequently changing data
    pub const SHORT: Duration = Duration::from_secs(2 * 60);
    /// Stable data
    pub const LONG: Duration = Duration::from_secs(15 * 60);
    /// Fallback when `set` receives no TTL
    pub const DEFAULT: Duration = Duration::from_secs(5 * 60);
}

/// Default period of the background sweep.
pub const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10 * 60);
