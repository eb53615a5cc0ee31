//! Shared configuration structures.

use std::time::Duration;

use domain::HashCost;
use serde::{Deserialize, Serialize};

/// Document database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`
    pub uri: String,
    /// Logical database name
    pub database: String,
    /// Upper bound on pooled connections
    pub max_pool_size: u32,
    /// Connection establishment timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Deadline applied to every store call in milliseconds
    pub operation_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "hot-res".to_string(),
            max_pool_size: 10,
            connect_timeout_ms: 5000,
            operation_timeout_ms: 10000,
        }
    }
}

/// Retry policy for idempotent reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry
    pub initial_backoff_ms: u64,
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (starting at 0)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }

    /// Never retry
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 50,
        }
    }
}

/// Password hashing cost.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&HashingConfig> for HashCost {
    fn from(config: &HashingConfig) -> Self {
        HashCost {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        let cost = HashCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}
