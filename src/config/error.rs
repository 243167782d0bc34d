//! Errors raised while loading or checking settings

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("setting `{key}` is invalid: {reason}")]
    Invalid { key: String, reason: String },

    #[error("settings file {} does not exist", .0.display())]
    MissingFile(PathBuf),

    #[error("set either CRUDKIT_CONFIG_DIR or CRUDKIT_CONFIG_FILE, not both")]
    ConflictingSources,

    #[error("settings could not be read")]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Dotted settings key the error points at, `settings` when none applies.
    pub fn key(&self) -> &str {
        match self {
            ConfigError::Invalid { key, .. } => key,
            _ => "settings",
        }
    }
}
