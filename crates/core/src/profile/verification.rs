//! Verification gate for the remote identity dependency
//!
//! The gate is the single translation point between remote-call failure
//! semantics and domain-level outcomes. It wraps an [`IdentityLookup`] with
//! the retry executor and circuit breaker from `verity-common` and returns
//! exactly one of three outcomes; no other component interprets raw
//! transport errors.

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use verity_common::resilience::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, Clock, SystemClock,
};
use verity_common::resilience::retry::{
    BackoffStrategy, Jitter, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
};
use verity_domain::{Identity, ProfileError, ResilienceConfig, Result};

use super::ports::{IdentityLookup, LookupError};

/// Outcome of verifying a user id against the remote authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The user exists; the live identity snapshot is attached
    Verified(Identity),
    /// The remote authority definitively reports no such user
    Rejected,
    /// The remote authority could not be consulted after the retry and
    /// breaker policy ran its course
    Unavailable { cause: String },
}

/// Error of one gated attempt, as seen by the retry policy.
///
/// Distinguishes a lookup outcome from the breaker short-circuiting the
/// attempt; the latter must stop the retry loop immediately.
#[derive(Debug)]
enum AttemptError {
    Lookup(LookupError),
    CircuitOpen,
}

/// Retries transport faults only; NotFound is a valid terminal answer and
/// an open breaker means the dependency should be left alone.
struct TransientOnly;

impl RetryPolicy<AttemptError> for TransientOnly {
    fn should_retry(&self, error: &AttemptError, _attempt: u32) -> RetryDecision {
        match error {
            AttemptError::Lookup(LookupError::Transport { .. }) => RetryDecision::Retry,
            AttemptError::Lookup(LookupError::NotFound) | AttemptError::CircuitOpen => {
                RetryDecision::Stop
            }
        }
    }
}

/// Resilience-wrapped identity verification.
///
/// One gate (and therefore one breaker) exists per remote dependency and is
/// shared across all concurrent requests.
pub struct VerificationGate<C: Clock = SystemClock> {
    client: Arc<dyn IdentityLookup>,
    breaker: CircuitBreaker<C>,
    retry: RetryExecutor<TransientOnly>,
}

impl VerificationGate<SystemClock> {
    /// Build a gate from the application resilience configuration
    pub fn new(client: Arc<dyn IdentityLookup>, config: &ResilienceConfig) -> Result<Self> {
        Self::with_clock(client, config, SystemClock)
    }
}

impl<C: Clock> VerificationGate<C> {
    /// Build a gate with a custom clock (useful for testing breaker timing)
    pub fn with_clock(
        client: Arc<dyn IdentityLookup>,
        config: &ResilienceConfig,
        clock: C,
    ) -> Result<Self> {
        let breaker_config = CircuitBreakerConfig {
            failure_threshold: config.breaker_failure_threshold,
            success_threshold: config.breaker_success_threshold,
            cool_down: std::time::Duration::from_millis(config.breaker_cool_down_ms),
            half_open_max_probes: config.breaker_half_open_max_probes,
        };
        let breaker = CircuitBreaker::with_clock(breaker_config, clock)
            .map_err(|e| ProfileError::Config(e.to_string()))?;

        let retry_config = RetryConfig {
            max_attempts: config.retry_max_attempts,
            backoff: BackoffStrategy::Exponential {
                initial_delay: std::time::Duration::from_millis(config.retry_initial_backoff_ms),
                base: 2.0,
                max_delay: std::time::Duration::from_millis(config.retry_max_backoff_ms),
            },
            jitter: Jitter::Equal,
        };
        retry_config.validate().map_err(|e| ProfileError::Config(e.to_string()))?;

        Ok(Self { client, breaker, retry: RetryExecutor::new(retry_config, TransientOnly) })
    }

    /// Verify that `user_id` currently resolves in the remote authority.
    ///
    /// Every attempt (retries included) is recorded against the breaker: a
    /// successful lookup *and* a definitive NotFound both count as breaker
    /// successes (the dependency answered), only transport faults count as
    /// failures. When the breaker is open the transport is not contacted at
    /// all.
    #[instrument(skip(self))]
    pub async fn verify(&self, user_id: i64) -> Verification {
        let outcome = self
            .retry
            .execute(|| {
                let client = Arc::clone(&self.client);
                let breaker = self.breaker.clone();
                async move {
                    let Some(attempt) = breaker.try_acquire() else {
                        return Err(AttemptError::CircuitOpen);
                    };
                    match client.find_user(user_id).await {
                        Ok(identity) => {
                            attempt.succeed();
                            Ok(identity)
                        }
                        Err(LookupError::NotFound) => {
                            // The dependency answered; only the answer is
                            // negative.
                            attempt.succeed();
                            Err(AttemptError::Lookup(LookupError::NotFound))
                        }
                        Err(err) => {
                            attempt.fail();
                            Err(AttemptError::Lookup(err))
                        }
                    }
                }
            })
            .await;

        match outcome {
            Ok(identity) => {
                debug!(user_id, "user verified");
                Verification::Verified(identity)
            }
            Err(cause) => Self::fallback(user_id, cause),
        }
    }

    /// Terminal classification when the primary path could not complete.
    ///
    /// A previously-classified domain rejection (NotFound) is preserved
    /// unchanged; every other cause becomes Unavailable. Never invents
    /// success.
    fn fallback(user_id: i64, cause: RetryError<AttemptError>) -> Verification {
        match cause {
            RetryError::NonRetriable { source: AttemptError::Lookup(LookupError::NotFound) } => {
                debug!(user_id, "user rejected by remote authority");
                Verification::Rejected
            }
            RetryError::NonRetriable { source: AttemptError::CircuitOpen } => {
                warn!(user_id, "verification short-circuited, circuit breaker open");
                Verification::Unavailable { cause: "circuit breaker open".to_string() }
            }
            RetryError::Exhausted {
                attempts,
                source: AttemptError::Lookup(LookupError::Transport { cause }),
            } => {
                warn!(user_id, attempts, cause = %cause, "verification exhausted retries");
                Verification::Unavailable { cause }
            }
            other => {
                // Unexpected shapes are wrapped, never allowed to escape
                // untyped.
                warn!(user_id, cause = ?other, "verification failed");
                Verification::Unavailable { cause: format!("{other:?}") }
            }
        }
    }

    /// The breaker guarding this dependency (exposed for health reporting)
    pub fn breaker(&self) -> &CircuitBreaker<C> {
        &self.breaker
    }
}
