//! Configuration structures
//!
//! Deserialized from TOML files or assembled from environment variables by
//! the infra loader. Defaults mirror production values; tests override the
//! resilience knobs for speed.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOOKUP_TIMEOUT_MS;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub user_service: UserServiceConfig,
    #[serde(default)]
    pub resilience: ResilienceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "verity.db".into(), pool_size: default_pool_size() }
    }
}

/// Remote user-service endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserServiceConfig {
    pub base_url: String,
    #[serde(default = "default_lookup_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8081".into(), timeout_ms: default_lookup_timeout_ms() }
    }
}

/// Retry and circuit-breaker tuning for the user-service dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Total attempts per verification, initial call included.
    pub retry_max_attempts: u32,
    pub retry_initial_backoff_ms: u64,
    pub retry_max_backoff_ms: u64,
    /// Consecutive failures before the breaker opens.
    pub breaker_failure_threshold: u64,
    /// Probe successes required to close a half-open breaker.
    pub breaker_success_threshold: u64,
    /// Time the breaker stays open before admitting probes.
    pub breaker_cool_down_ms: u64,
    /// Concurrent probes admitted while half-open.
    pub breaker_half_open_max_probes: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry_max_attempts: 3,
            retry_initial_backoff_ms: 100,
            retry_max_backoff_ms: 2_000,
            breaker_failure_threshold: 5,
            breaker_success_threshold: 2,
            breaker_cool_down_ms: 30_000,
            breaker_half_open_max_probes: 1,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "127.0.0.1:8080".into() }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_lookup_timeout_ms() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_MS
}
