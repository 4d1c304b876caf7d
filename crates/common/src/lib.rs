//! Shared utilities for Verity crates.
//!
//! Currently this crate hosts the resilience primitives (circuit breaker and
//! retry executor) that guard calls to remote dependencies. The primitives
//! are generic over error types and carry no domain knowledge; the
//! translation into domain outcomes lives in `verity-core`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

// Re-export commonly used types for convenience
pub use resilience::{
    Attempt, BackoffStrategy, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot,
    CircuitState, Clock, ConfigError, Jitter, MockClock, RetryConfig, RetryDecision, RetryError,
    RetryExecutor, RetryPolicy, SystemClock,
};
