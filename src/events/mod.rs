//! Events Module
//!
//! Cross-consumer invalidation signal.

mod bus;

pub use bus::{RefreshBus, RefreshEvent, Subscription};
