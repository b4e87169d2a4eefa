//! # Error Types Module
//!
//! This module defines the error types used throughout the crate. The pure
//! ranking and ordering core only ever fails on a broken caller contract;
//! everything that talks to the network reports through `ProviderError`.

use thiserror::Error;

/// Errors raised by the pure ranking core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The caller broke an input contract (e.g. an empty ingredient list)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised by the recipe and AI provider clients
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider answered with a non-success status code
    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The circuit breaker is open and the call was not attempted
    #[error("Circuit breaker open for {0}")]
    CircuitOpen(String),
    /// The provider needs configuration that is missing (e.g. an API key)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
    /// The provider answered but the body could not be understood
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    /// Propagated caller contract violation
    #[error(transparent)]
    InvalidInput(#[from] CoreError),
}

impl ProviderError {
    /// Whether retrying the same request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::CircuitOpen(_)
            | ProviderError::NotConfigured(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::InvalidInput(_) => false,
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(err.to_string())
    }
}
