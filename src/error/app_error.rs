use crate::error::DatabaseErrorConverter;
use thiserror::Error;

/// Crate-wide error type returned by services and repositories.
///
/// Display strings are safe to hand to an end user: none of them embed the
/// underlying `source`, which stays reachable through `Error::source` and
/// the logs only.
#[derive(Error, Debug)]
pub enum AppError {
    /// Record absent, or a read that could not be answered for a single id
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Missing or zero actor id on an attributed mutation
    #[error("Invalid actor: the acting user could not be identified")]
    InvalidActor,

    /// Credential required but empty
    #[error("Credential must not be empty")]
    EmptyCredential,

    /// Hashing a credential failed
    #[error("Credential could not be processed")]
    CredentialHash {
        #[source]
        source: anyhow::Error,
    },

    /// Listing records failed; detail is logged, never returned
    #[error("Failed to fetch {entity} records")]
    RepositoryRead { entity: String },

    /// Duplicate entry error for unique constraint violations
    #[error("Duplicate entry: {entity}.{field} = '{value}' already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connection pool error
    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for the common `NotFound` by id.
    pub fn not_found(entity: &str, id: u64) -> Self {
        AppError::NotFound {
            entity: entity.to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(error: crate::config::ConfigError) -> Self {
        AppError::Configuration {
            key: error.key().to_string(),
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_hides_source() {
        let err = AppError::Database {
            operation: "insert users".to_string(),
            source: anyhow::anyhow!("connection reset by peer at 10.0.0.3"),
        };
        let message = err.to_string();
        assert_eq!(message, "Database operation failed: insert users");
        assert!(!message.contains("10.0.0.3"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_not_found_shorthand() {
        match AppError::not_found("user", 42) {
            AppError::NotFound { entity, field, value } => {
                assert_eq!(entity, "user");
                assert_eq!(field, "id");
                assert_eq!(value, "42");
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_repository_read_message_is_generic() {
        let err = AppError::RepositoryRead {
            entity: "user".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch user records");
    }

    #[test]
    fn test_config_error_keeps_field_as_key() {
        let err: AppError = crate::config::ConfigError::invalid("database.url", "missing").into();
        match err {
            AppError::Configuration { key, .. } => assert_eq!(key, "database.url"),
            other => panic!("Expected Configuration, got {:?}", other),
        }
    }
}
