//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `DATABASE_URL` - `PostgreSQL` connection string. When absent or empty
//!   the catalog runs demo-only and never attempts a connection.
//! - `CATALOG_CONNECT_TIMEOUT_SECS` - Ceiling for a single connection
//!   attempt (default: 5)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog core configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `PostgreSQL` connection URL (contains password). `None` means the
    /// catalog intentionally runs demo-only.
    pub database_url: Option<SecretString>,
    /// Ceiling for a single connection attempt.
    pub connect_timeout: Duration,
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `CATALOG_CONNECT_TIMEOUT_SECS` is present
    /// but not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_optional_env("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .map(SecretString::from);

        let connect_timeout = match get_optional_env("CATALOG_CONNECT_TIMEOUT_SECS") {
            Some(raw) => parse_timeout_secs(&raw)?,
            None => Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            database_url,
            connect_timeout,
        })
    }

    /// Configuration for intentional demo-only operation.
    #[must_use]
    pub const fn demo_only() -> Self {
        Self {
            database_url: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Whether a durable store is expected at all.
    #[must_use]
    pub const fn prefers_durable(&self) -> bool {
        self.database_url.is_some()
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse a connect timeout. Zero is rejected: a zero ceiling would fail
/// every attempt, which is what unsetting `DATABASE_URL` is for.
fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw.trim().parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("CATALOG_CONNECT_TIMEOUT_SECS".to_owned(), e.to_string())
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "CATALOG_CONNECT_TIMEOUT_SECS".to_owned(),
            "must be at least 1".to_owned(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
