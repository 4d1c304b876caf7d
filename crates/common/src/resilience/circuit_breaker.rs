//! Circuit breaker with permit-based attempt accounting
//!
//! The breaker is shared process-wide per remote dependency. Callers acquire
//! an [`Attempt`] permit before each outbound call and record the outcome on
//! it. All state lives behind a single mutex so that simultaneous failures
//! are never undercounted and at most a bounded number of half-open probes
//! run concurrently.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Time Abstraction for Testability
// =============================================================================

/// Trait for time operations to enable deterministic testing
pub trait Clock: Send + Sync + 'static {
    /// Get the current instant (monotonic time)
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Mock clock for deterministic testing
///
/// Allows tests to control time progression without actual delays.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO);
        self.start + elapsed
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration validation error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through; consecutive failures are counted
    Closed,
    /// Calls are rejected without contacting the dependency
    Open,
    /// A bounded number of probe calls are allowed through to test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit
    pub failure_threshold: u64,
    /// Probe successes needed to close the circuit from half-open
    pub success_threshold: u64,
    /// Time to wait in open state before admitting probes
    pub cool_down: Duration,
    /// Maximum number of concurrent probe calls in half-open state
    pub half_open_max_probes: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            cool_down: Duration::from_secs(30),
            half_open_max_probes: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (value, name) in [
            (self.failure_threshold, "failure_threshold"),
            (self.success_threshold, "success_threshold"),
            (self.half_open_max_probes, "half_open_max_probes"),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be greater than 0"),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Circuit Breaker
// =============================================================================

/// Snapshot of breaker state for logging and monitoring
#[derive(Debug, Clone)]
pub struct CircuitBreakerSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u64,
    pub probe_successes: u64,
    pub probes_in_flight: u64,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    consecutive_failures: u64,
    probe_successes: u64,
    probes_in_flight: u64,
    opened_at: Option<Instant>,
}

/// Circuit breaker guarding a single remote dependency.
///
/// Cloning shares the underlying state; one breaker instance exists per
/// dependency and is shared across all call sites.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<Inner>>,
    clock: Arc<C>,
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &snapshot.state)
            .field("consecutive_failures", &snapshot.consecutive_failures)
            .finish()
    }
}

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker using the system clock
    pub fn new(config: CircuitBreakerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a new circuit breaker with a custom clock (useful for testing)
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                probe_successes: 0,
                probes_in_flight: 0,
                opened_at: None,
            })),
            clock: Arc::new(clock),
        })
    }

    /// Try to acquire a permit for one outbound call.
    ///
    /// Returns `None` when the circuit is open (and the cool-down has not
    /// elapsed) or when half-open and all probe slots are taken. An open
    /// circuit whose cool-down has elapsed transitions to half-open here and
    /// the first caller gets a probe permit.
    pub fn try_acquire(&self) -> Option<Attempt<C>> {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => Some(self.permit(&mut inner, false)),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| self.clock.now().saturating_duration_since(at))
                    .unwrap_or(Duration::ZERO);
                if elapsed < self.config.cool_down {
                    debug!(state = %inner.state, "circuit breaker rejecting call");
                    return None;
                }
                inner.state = CircuitState::HalfOpen;
                inner.probe_successes = 0;
                inner.probes_in_flight = 0;
                info!("circuit breaker half-open, admitting probes");
                Some(self.permit(&mut inner, true))
            }
            CircuitState::HalfOpen => {
                if inner.probes_in_flight >= self.config.half_open_max_probes {
                    debug!("circuit breaker half-open, probe slots exhausted");
                    return None;
                }
                Some(self.permit(&mut inner, true))
            }
        }
    }

    /// Get the current state of the circuit breaker
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Get a snapshot of the breaker counters
    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let inner = self.lock();
        CircuitBreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            probe_successes: inner.probe_successes,
            probes_in_flight: inner.probes_in_flight,
        }
    }

    fn permit(&self, inner: &mut Inner, is_probe: bool) -> Attempt<C> {
        if is_probe {
            inner.probes_in_flight += 1;
        }
        Attempt { breaker: self.clone(), is_probe, recorded: false }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("circuit breaker state lock poisoned");
                poisoned.into_inner()
            }
        }
    }

    fn record(&self, is_probe: bool, success: bool) {
        let mut inner = self.lock();
        if is_probe && inner.probes_in_flight > 0 {
            inner.probes_in_flight -= 1;
        }

        match (inner.state, success) {
            (CircuitState::Closed, true) => {
                inner.consecutive_failures = 0;
            }
            (CircuitState::Closed, false) => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(self.clock.now());
                    warn!(
                        failures = inner.consecutive_failures,
                        "circuit breaker opened after consecutive failures"
                    );
                }
            }
            (CircuitState::HalfOpen, true) => {
                inner.probe_successes += 1;
                if inner.probe_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    info!(successes = inner.probe_successes, "circuit breaker closed");
                }
            }
            (CircuitState::HalfOpen, false) => {
                // Any probe failure re-opens the circuit and re-arms the
                // cool-down.
                inner.state = CircuitState::Open;
                inner.opened_at = Some(self.clock.now());
                warn!("circuit breaker re-opened by probe failure");
            }
            (CircuitState::Open, _) => {
                // A call that was admitted earlier finished after the circuit
                // opened; its outcome no longer changes the state.
            }
        }
    }
}

/// RAII permit for one guarded call.
///
/// Call [`Attempt::succeed`] or [`Attempt::fail`] when the outcome is known.
/// Dropping the permit without recording (the caller abandoned the call)
/// releases the probe slot but counts as neither success nor failure.
pub struct Attempt<C: Clock = SystemClock> {
    breaker: CircuitBreaker<C>,
    is_probe: bool,
    recorded: bool,
}

impl<C: Clock> Attempt<C> {
    /// Record the guarded call as successful
    pub fn succeed(mut self) {
        self.recorded = true;
        self.breaker.record(self.is_probe, true);
    }

    /// Record the guarded call as failed
    pub fn fail(mut self) {
        self.recorded = true;
        self.breaker.record(self.is_probe, false);
    }
}

impl<C: Clock> Drop for Attempt<C> {
    fn drop(&mut self) {
        if self.recorded {
            return;
        }
        // Cancelled attempt: release the probe slot, record no outcome.
        if self.is_probe {
            let mut inner = self.breaker.lock();
            if inner.probes_in_flight > 0 {
                inner.probes_in_flight -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(config: CircuitBreakerConfig) -> (CircuitBreaker<MockClock>, MockClock) {
        let clock = MockClock::new();
        let cb = CircuitBreaker::with_clock(config, clock.clone()).expect("valid config");
        (cb, clock)
    }

    fn fail_times<C: Clock>(cb: &CircuitBreaker<C>, n: u64) {
        for _ in 0..n {
            cb.try_acquire().expect("permit while closed").fail();
        }
    }

    #[test]
    fn config_validation_rejects_zero_thresholds() {
        let mut config = CircuitBreakerConfig::default();
        assert!(config.validate().is_ok());

        config.failure_threshold = 0;
        assert!(config.validate().is_err());

        config.failure_threshold = 5;
        config.half_open_max_probes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn starts_closed_and_allows_calls() {
        let (cb, _clock) = breaker(CircuitBreakerConfig::default());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.try_acquire().is_some());
    }

    #[test]
    fn opens_at_failure_threshold() {
        let config = CircuitBreakerConfig { failure_threshold: 3, ..Default::default() };
        let (cb, _clock) = breaker(config);

        fail_times(&cb, 2);
        assert_eq!(cb.state(), CircuitState::Closed);

        fail_times(&cb, 1);
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(cb.try_acquire().is_none(), "open circuit must reject calls");
    }

    #[test]
    fn success_resets_consecutive_failures() {
        let config = CircuitBreakerConfig { failure_threshold: 3, ..Default::default() };
        let (cb, _clock) = breaker(config);

        fail_times(&cb, 2);
        cb.try_acquire().expect("permit").succeed();
        assert_eq!(cb.snapshot().consecutive_failures, 0);

        // Two more failures alone must not open the circuit again.
        fail_times(&cb, 2);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn cool_down_admits_probe_and_probe_success_closes() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            cool_down: Duration::from_secs(30),
            half_open_max_probes: 1,
        };
        let (cb, clock) = breaker(config);

        fail_times(&cb, 1);
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(cb.try_acquire().is_none());

        clock.advance(Duration::from_secs(31));
        let probe = cb.try_acquire().expect("probe after cool-down");
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        probe.succeed();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn probe_failure_reopens_and_rearms_cool_down() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            cool_down: Duration::from_secs(10),
            ..Default::default()
        };
        let (cb, clock) = breaker(config);

        fail_times(&cb, 1);
        clock.advance(Duration::from_secs(11));
        cb.try_acquire().expect("probe").fail();
        assert_eq!(cb.state(), CircuitState::Open);

        // Cool-down restarts from the probe failure.
        clock.advance(Duration::from_secs(5));
        assert!(cb.try_acquire().is_none());
        clock.advance(Duration::from_secs(6));
        assert!(cb.try_acquire().is_some());
    }

    #[test]
    fn half_open_bounds_concurrent_probes() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            cool_down: Duration::from_secs(1),
            half_open_max_probes: 2,
            ..Default::default()
        };
        let (cb, clock) = breaker(config);

        fail_times(&cb, 1);
        clock.advance(Duration::from_secs(2));

        let first = cb.try_acquire().expect("first probe");
        let second = cb.try_acquire().expect("second probe");
        assert!(cb.try_acquire().is_none(), "third concurrent probe must be rejected");

        drop(first);
        drop(second);
    }

    #[test]
    fn dropped_permit_counts_as_neither_success_nor_failure() {
        let config = CircuitBreakerConfig { failure_threshold: 2, ..Default::default() };
        let (cb, _clock) = breaker(config);

        fail_times(&cb, 1);
        let before = cb.snapshot().consecutive_failures;

        // Abandoned call: permit dropped without an outcome.
        drop(cb.try_acquire().expect("permit"));

        let after = cb.snapshot();
        assert_eq!(after.consecutive_failures, before);
        assert_eq!(after.state, CircuitState::Closed);
    }

    #[test]
    fn dropped_probe_releases_its_slot() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            cool_down: Duration::from_secs(1),
            half_open_max_probes: 1,
            ..Default::default()
        };
        let (cb, clock) = breaker(config);

        fail_times(&cb, 1);
        clock.advance(Duration::from_secs(2));

        let probe = cb.try_acquire().expect("probe");
        assert!(cb.try_acquire().is_none());
        drop(probe);

        assert!(cb.try_acquire().is_some(), "slot must be free after abandoned probe");
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn success_threshold_requires_multiple_probes() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 2,
            cool_down: Duration::from_secs(1),
            half_open_max_probes: 2,
            ..Default::default()
        };
        let (cb, clock) = breaker(config);

        fail_times(&cb, 1);
        clock.advance(Duration::from_secs(2));

        cb.try_acquire().expect("probe one").succeed();
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.try_acquire().expect("probe two").succeed();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn late_outcome_after_open_does_not_flip_state() {
        let config = CircuitBreakerConfig { failure_threshold: 1, ..Default::default() };
        let (cb, _clock) = breaker(config);

        let in_flight = cb.try_acquire().expect("permit while closed");
        fail_times(&cb, 1);
        assert_eq!(cb.state(), CircuitState::Open);

        // The earlier call finishing now must not close or re-open anything.
        in_flight.succeed();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn concurrent_failures_are_not_undercounted() {
        let config = CircuitBreakerConfig { failure_threshold: 10, ..Default::default() };
        let cb = CircuitBreaker::new(config).expect("valid config");

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cb = cb.clone();
            handles.push(tokio::spawn(async move {
                cb.try_acquire().map(Attempt::fail);
            }));
        }
        for handle in handles {
            handle.await.expect("task join");
        }

        assert_eq!(cb.state(), CircuitState::Open);
    }
}
