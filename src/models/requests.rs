//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::events::RefreshEvent;

/// Request body for POST /refresh
///
/// `{"type": "account" | "alerts", "entity_id": "..."}` or `{"type": "all"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct RefreshRequest {
    pub event: RefreshEvent,
}

impl RefreshRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.event.entity_id() {
            Some(id) if id.trim().is_empty() => Some("entity_id cannot be empty".to_string()),
            _ => None,
        }
    }
}
