//! Resilience patterns for fault tolerance
//!
//! This module provides generic, reusable resilience patterns:
//! - **Circuit Breaker**: stops calling a failing dependency for a cool-down
//!   period instead of hammering it
//! - **Retry**: bounded re-execution with backoff and jitter for transient
//!   failures
//!
//! Both are generic over error types and use a [`Clock`] abstraction so that
//! timeout behavior is testable without real delays. The breaker hands out
//! per-call [`Attempt`] permits: a permit that is dropped without an outcome
//! recorded (a cancelled call) counts as neither success nor failure.

pub mod circuit_breaker;
pub mod retry;

// Re-export circuit breaker types
pub use circuit_breaker::{
    Attempt, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot, CircuitState, Clock,
    ConfigError, MockClock, SystemClock,
};
// Re-export retry types
pub use retry::{
    BackoffStrategy, Jitter, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
};
