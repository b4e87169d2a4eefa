//! # Circuit Breaker Module
//!
//! This module implements the circuit breaker pattern for outbound provider
//! calls (TheMealDB, Gemini). When a provider fails repeatedly the breaker
//! opens and further calls fail fast until the reset timeout has elapsed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker guarding one provider
///
/// # State Machine
///
/// - **Closed**: Normal operation, requests pass through
/// - **Open**: Failure threshold reached, requests fail fast
/// - **Closed again**: Reset timeout elapsed since the last failure
///
/// # Configuration
///
/// Uses `RecoveryConfig` for:
/// - `circuit_breaker_threshold`: Consecutive failures before opening (default: 5)
/// - `circuit_breaker_reset_secs`: Time before closing again (default: 60s)
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    state: Mutex<BreakerState>,
    threshold: u32,
    reset_after: Duration,
}

impl CircuitBreaker {
    /// Create a closed circuit breaker for the named provider
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cookify::circuit_breaker::CircuitBreaker;
    /// use cookify::config::RecoveryConfig;
    ///
    /// let breaker = CircuitBreaker::new("mealdb", &RecoveryConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(name: &str, config: &RecoveryConfig) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(BreakerState::default()),
            threshold: config.circuit_breaker_threshold,
            reset_after: Duration::from_secs(config.circuit_breaker_reset_secs),
        }
    }

    /// Provider name used in logs and errors
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // A poisoned lock only means another caller panicked mid-update; the counters stay usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if the circuit is open (blocking requests)
    ///
    /// Resets to closed when the reset timeout has elapsed since the last failure.
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();

        if state.failure_count < self.threshold {
            return false;
        }

        match state.last_failure {
            Some(last) if last.elapsed() < self.reset_after => true,
            _ => {
                log::info!("Circuit breaker for {} reset after timeout", self.name);
                *state = BreakerState::default();
                false
            }
        }
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count += 1;
        state.last_failure = Some(Instant::now());

        if state.failure_count == self.threshold {
            log::warn!(
                "Circuit breaker for {} opened after {} consecutive failures",
                self.name,
                state.failure_count
            );
        }
    }

    /// Record a successful call, closing the circuit
    pub fn record_success(&self) {
        *self.lock() = BreakerState::default();
    }

    /// Current consecutive failure count
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }
}
