//! User service configuration.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

use common::{DatabaseConfig, HashingConfig, RetryConfig};

/// User service configuration.
#[derive(Debug, Clone, Default)]
pub struct UserServiceConfig {
    /// Document database connection settings
    pub database: DatabaseConfig,
    /// Retry policy for reads
    pub retry: RetryConfig,
    /// Password hashing cost
    pub hashing: HashingConfig,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_defaults = DatabaseConfig::default();
        let retry_defaults = RetryConfig::default();
        let hashing_defaults = HashingConfig::default();

        Self {
            database: DatabaseConfig {
                uri: env::var("USER_SERVICE_MONGODB_URI")
                    .or_else(|_| env::var("MONGODB_URI"))
                    .unwrap_or(database_defaults.uri),
                database: env::var("USER_SERVICE_DATABASE")
                    .or_else(|_| env::var("MONGODB_DATABASE"))
                    .unwrap_or(database_defaults.database),
                max_pool_size: parse_env("MONGODB_MAX_POOL_SIZE")
                    .unwrap_or(database_defaults.max_pool_size),
                connect_timeout_ms: parse_timeout_env("MONGODB_CONNECT_TIMEOUT_MS")
                    .unwrap_or(database_defaults.connect_timeout_ms),
                operation_timeout_ms: parse_timeout_env("MONGODB_OPERATION_TIMEOUT_MS")
                    .unwrap_or(database_defaults.operation_timeout_ms),
            },
            retry: RetryConfig {
                max_retries: parse_env("MONGODB_READ_RETRIES").unwrap_or(retry_defaults.max_retries),
                initial_backoff_ms: parse_env("MONGODB_RETRY_BACKOFF_MS")
                    .unwrap_or(retry_defaults.initial_backoff_ms),
            },
            hashing: HashingConfig {
                memory_kib: parse_env("ARGON2_MEMORY_KIB").unwrap_or(hashing_defaults.memory_kib),
                iterations: parse_env("ARGON2_ITERATIONS").unwrap_or(hashing_defaults.iterations),
                parallelism: parse_env("ARGON2_PARALLELISM").unwrap_or(hashing_defaults.parallelism),
            },
        }
    }
}

fn parse_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).ok()?;
    parse_value(key, &raw)
}

/// Malformed values are logged and fall back to the default.
fn parse_value<T>(key: &str, raw: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

fn parse_timeout_env(key: &str) -> Option<u64> {
    parse_env(key).and_then(|ms| positive_ms(key, ms))
}

/// A zero deadline would fail every call, so it is rejected.
fn positive_ms(key: &str, ms: u64) -> Option<u64> {
    if ms == 0 {
        warn!("Ignoring {}=0: timeout must be positive", key);
        None
    } else {
        Some(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_numbers() {
        assert_eq!(parse_value::<u32>("MONGODB_MAX_POOL_SIZE", "25"), Some(25));
        assert_eq!(parse_value::<u64>("MONGODB_RETRY_BACKOFF_MS", " 75 "), Some(75));
    }

    #[test]
    fn test_parse_value_rejects_malformed() {
        assert_eq!(parse_value::<u32>("MONGODB_MAX_POOL_SIZE", "ten"), None);
        assert_eq!(parse_value::<u32>("MONGODB_READ_RETRIES", "-1"), None);
        assert_eq!(parse_value::<u64>("MONGODB_OPERATION_TIMEOUT_MS", ""), None);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert_eq!(positive_ms("MONGODB_OPERATION_TIMEOUT_MS", 0), None);
        assert_eq!(positive_ms("MONGODB_OPERATION_TIMEOUT_MS", 250), Some(250));
    }

    #[test]
    fn test_missing_timeout_uses_default() {
        let config = UserServiceConfig::default();
        assert_eq!(
            parse_timeout_env("USER_SERVICE_UNSET_TIMEOUT_MS")
                .unwrap_or(config.database.operation_timeout_ms),
            config.database.operation_timeout_ms
        );
    }
}
