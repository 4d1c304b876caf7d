//! Bounded retry with backoff and jitter
//!
//! A retry executor re-runs a fallible async operation until it succeeds,
//! a [`RetryPolicy`] decides the error is not worth retrying, or the
//! configured attempt budget is exhausted. The executor never invents an
//! outcome: the terminal error always carries the last error the operation
//! produced, so callers can classify it.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors produced by a retry execution
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed; `source` is the last error observed
    #[error("All {attempts} attempts exhausted")]
    Exhausted { attempts: u32, source: E },

    /// The policy classified the error as non-retriable
    #[error("Operation failed with non-retriable error")]
    NonRetriable { source: E },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// The underlying operation error, if one was observed.
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::NonRetriable { source } => {
                Some(source)
            }
            RetryError::InvalidConfiguration { .. } => None,
        }
    }
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the backoff delay
    Retry,
    /// The error is terminal; stop immediately
    Stop,
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E>: Send + Sync {
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Backoff strategy for calculating the delay before the next attempt
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between attempts
    Fixed(Duration),
    /// Exponential backoff: `initial_delay * base^attempt`, capped
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the delay after the given (0-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let millis = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                Duration::from_millis(millis.min(max_delay.as_millis() as f64) as u64)
            }
        }
    }
}

/// Jitter applied to calculated delays to avoid retry storms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// No jitter
    None,
    /// 0 to the calculated delay
    Full,
    /// Half the calculated delay to the full delay
    Equal,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(random_below(delay.as_millis() as u64)),
            Jitter::Equal => {
                let half = delay.as_millis() as u64 / 2;
                Duration::from_millis(half + random_below(half))
            }
        }
    }
}

/// Pseudo-random value below `max` from a timing-based seed.
///
/// Good enough distribution for jitter without pulling in a RNG dependency.
fn random_below(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    let seed = nanos.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223) % max
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, the initial call included
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(2),
            },
            jitter: Jitter::Equal,
        }
    }
}

impl RetryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        if let BackoffStrategy::Exponential { base, .. } = self.backoff {
            if base <= 0.0 {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The retry executor
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        loop {
            debug!(attempt = attempt + 1, max = self.config.max_attempts, "executing operation");
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if self.policy.should_retry(&error, attempt) == RetryDecision::Stop {
                debug!(error = ?error, "retry policy stopped retrying");
                return Err(RetryError::NonRetriable { source: error });
            }

            attempt += 1;
            if attempt >= self.config.max_attempts {
                warn!(attempts = attempt, error = ?error, "all retry attempts exhausted");
                return Err(RetryError::Exhausted { attempts: attempt, source: error });
            }

            let delay = self.config.jitter.apply(self.config.backoff.delay_for(attempt - 1));
            warn!(attempt, delay = ?delay, "operation failed, retrying after backoff");
            tokio::time::sleep(delay).await;
        }
    }
}
