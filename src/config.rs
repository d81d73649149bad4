//! Configuration Module
//!
//! Loads cache, upstream and admin-surface settings from environment variables.

use std::env;

use crate::cache::{ttl, CLEANUP_INTERVAL};

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds for entries stored without one
    pub default_ttl: u64,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Admin HTTP server port
    pub server_port: u16,
    /// Custom billing backend base URL; proxy route layout when unset
    pub base_url: Option<String>,
    /// Origin serving the `/api/...` proxy routes
    pub proxy_origin: String,
    /// Bearer token forwarded to the backend
    pub api_key: Option<String>,
    /// Upstream request timeout in seconds
    pub request_timeout: u64,
    /// Refresh bus buffer per subscriber
    pub event_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 600)
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    /// - `PAID_BASE_URL` - Custom backend base URL (default: unset)
    /// - `PAID_PROXY_ORIGIN` - Proxy origin (default: http://localhost:3000)
    /// - `PAID_API_KEY` - Bearer token (default: unset)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 30)
    /// - `EVENT_CAPACITY` - Refresh bus buffer (default: 64)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            base_url: non_empty_var("PAID_BASE_URL"),
            proxy_origin: non_empty_var("PAID_PROXY_ORIGIN").unwrap_or(defaults.proxy_origin),
            api_key: non_empty_var("PAID_API_KEY"),
            request_timeout: parse_var("REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
            event_capacity: parse_var("EVENT_CAPACITY").unwrap_or(defaults.event_capacity),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: ttl::DEFAULT.as_secs(),
            cleanup_interval: CLEANUP_INTERVAL.as_secs(),
            server_port: 3000,
            base_url: None,
            proxy_origin: "http://localhost:3000".to_string(),
            api_key: None,
            request_timeout: 30,
            event_capacity: 64,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
