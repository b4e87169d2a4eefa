//! # Configuration Module
//!
//! This module defines the application configuration: provider endpoints,
//! the AI key, recovery settings for outbound calls and the pantry expiry
//! thresholds. Values come from the environment (a `.env` file is honored by
//! the binary) and fall back to defaults.

use anyhow::{Context, Result};
use log::{info, warn};
use std::env;
use std::str::FromStr;

use crate::pantry::{ExpiryPolicy, DEFAULT_EXPIRY_GRACE_DAYS, DEFAULT_NEAR_EXPIRY_DAYS};

// Constants for provider configuration
pub const DEFAULT_MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

/// Recovery configuration for outbound provider calls
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single provider request in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 30, // 30 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Log output format for the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TheMealDB API root
    pub mealdb_base_url: String,
    /// Gemini API root
    pub gemini_base_url: String,
    /// Gemini model name
    pub gemini_model: String,
    /// Gemini API key; AI generation is disabled without it
    pub gemini_api_key: Option<String>,
    pub log_format: LogFormat,
    pub expiry: ExpiryPolicy,
    pub recovery: RecoveryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mealdb_base_url: DEFAULT_MEALDB_BASE_URL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_key: None,
            log_format: LogFormat::Pretty,
            expiry: ExpiryPolicy::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl LogFormat {
    /// Read `COOKIFY_LOG_FORMAT` alone, so logging can start before the rest of the config
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        parse_or(&lookup, "COOKIFY_LOG_FORMAT", LogFormat::Pretty)
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unset keys use defaults; set but malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let recovery_defaults = RecoveryConfig::default();

        let config = Self {
            mealdb_base_url: lookup("MEALDB_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.mealdb_base_url),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty()),
            log_format: LogFormat::from_lookup(&lookup)?,
            expiry: ExpiryPolicy {
                grace_days: parse_or(&lookup, "COOKIFY_EXPIRY_GRACE_DAYS", DEFAULT_EXPIRY_GRACE_DAYS)?,
                near_days: parse_or(&lookup, "COOKIFY_NEAR_EXPIRY_DAYS", DEFAULT_NEAR_EXPIRY_DAYS)?,
            },
            recovery: RecoveryConfig {
                max_retries: parse_or(&lookup, "COOKIFY_MAX_RETRIES", recovery_defaults.max_retries)?,
                operation_timeout_secs: parse_or(
                    &lookup,
                    "COOKIFY_REQUEST_TIMEOUT_SECS",
                    recovery_defaults.operation_timeout_secs,
                )?,
                ..recovery_defaults
            },
        };

        if config.gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not set, AI recipe generation is disabled");
        }
        info!(
            "Configuration loaded: mealdb={}, gemini_model={}, max_retries={}",
            config.mealdb_base_url, config.gemini_model, config.recovery.max_retries
        );

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}
