//! Settings tables and their checks
//!
//! Every table is `#[serde(default)]`, so a file only has to name the keys
//! it changes.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::LoggerConfig;

const DATABASE_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

/// Argon2 caps lanes at 2^24 - 1
const MAX_LANES: u32 = 0x00FF_FFFF;

/// Everything `init_services` needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logger: LoggerConfig,
    pub password: PasswordConfig,
}

impl Settings {
    /// Checks the tables in order: database, logger, password.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.logger
            .validate()
            .map_err(|e| ConfigError::invalid("logger", e.to_string()))?;
        self.password.validate()
    }
}

/// PostgreSQL pool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Idle connections bb8 keeps open
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !DATABASE_SCHEMES.iter().any(|s| self.url.starts_with(s)) {
            return Err(ConfigError::invalid(
                "database.url",
                "expected postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.min_connections == 0 || self.min_connections > self.max_connections {
            return Err(ConfigError::invalid(
                "database.min_connections",
                format!(
                    "must be between 1 and max_connections ({})",
                    self.max_connections
                ),
            ));
        }

        Ok(())
    }
}

/// Argon2id costs; the defaults are the OWASP minimums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::invalid("password.iterations", "must be at least 1"));
        }

        if !(1..=MAX_LANES).contains(&self.parallelism) {
            return Err(ConfigError::invalid(
                "password.parallelism",
                format!("must be between 1 and {MAX_LANES}"),
            ));
        }

        // 8 KiB per lane
        if self.memory_kib < 8 * self.parallelism {
            return Err(ConfigError::invalid(
                "password.memory_kib",
                format!("must be at least {} for {} lanes", 8 * self.parallelism, self.parallelism),
            ));
        }

        Ok(())
    }
}
