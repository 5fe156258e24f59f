//! Configuration module
//!
//! Runtime configuration for the booking engine, read from the environment.

use std::env;

use crate::error::AppError;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
/// Upper bound for the optimistic-concurrency retry loop on booking writes.
/// When exhausted the operation surfaces `Conflict` to the caller.
const BOOKING_WRITE_RETRY_ATTEMPTS: u32 = 3;

/// Engine configuration shared by services and binaries
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub booking_write_retry_attempts: u32,
    pub environment: String,
}

impl Config {
    /// Load configuration from the environment (reads `.env` when present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Internal("DATABASE_URL is not set".to_string()))?;

        Ok(Self {
            database_url,
            db_max_connections: parse_env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
            booking_write_retry_attempts: parse_env_or(
                "BOOKING_WRITE_RETRY_ATTEMPTS",
                BOOKING_WRITE_RETRY_ATTEMPTS,
            )?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::Internal(format!("{} must be a valid number", key))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_or_uses_default_when_unset() {
        let value: u32 = parse_env_or("REZERVO_TEST_UNSET_KEY", 7).unwrap();
        assert_eq!(value, 7);
    }
}
