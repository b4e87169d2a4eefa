//! # Retry Module
//!
//! Retries outbound provider calls with exponential backoff and random jitter,
//! behind a [`CircuitBreaker`].

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::RecoveryConfig;
use crate::errors::ProviderError;

/// Backoff before retry number `attempt` (0-based), without jitter
///
/// Doubles from `base_retry_delay_ms` and is capped at `max_retry_delay_ms`.
pub fn backoff_delay(config: &RecoveryConfig, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    let delay_ms = config
        .base_retry_delay_ms
        .saturating_mul(factor)
        .min(config.max_retry_delay_ms);
    Duration::from_millis(delay_ms)
}

/// Backoff plus up to 10% random jitter
pub fn retry_delay(config: &RecoveryConfig, attempt: u32) -> Duration {
    let base = backoff_delay(config, attempt);
    let max_jitter_ms = base.as_millis() as u64 / 10;
    let jitter_ms = if max_jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=max_jitter_ms)
    };
    base + Duration::from_millis(jitter_ms)
}

/// Run `operation` with circuit breaker protection and retries
///
/// Non-retryable errors (see [`ProviderError::is_retryable`]) are returned
/// immediately and leave the breaker untouched. When the breaker opens in the
/// middle of the retry loop, the last provider error is returned instead of
/// [`ProviderError::CircuitOpen`].
pub async fn call_with_recovery<T, F, Fut>(
    breaker: &CircuitBreaker,
    config: &RecoveryConfig,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    let mut last_error = None;

    loop {
        if breaker.is_open() {
            warn!(provider = breaker.name(), attempt, "Circuit breaker open, failing fast");
            return Err(last_error
                .unwrap_or_else(|| ProviderError::CircuitOpen(breaker.name().to_string())));
        }

        match operation().await {
            Ok(value) => {
                breaker.record_success();
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                warn!(
                    provider = breaker.name(),
                    attempt,
                    error = %err,
                    "Provider call failed"
                );
                return Err(err);
            }
            Err(err) => {
                breaker.record_failure();

                if attempt >= config.max_retries {
                    warn!(
                        provider = breaker.name(),
                        attempt,
                        error = %err,
                        "Provider call failed, retries exhausted"
                    );
                    return Err(err);
                }

                let delay = retry_delay(config, attempt);
                debug!(
                    provider = breaker.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying provider call"
                );
                last_error = Some(err);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
