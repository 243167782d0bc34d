//! Error types for the logger

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file could not be opened")]
    Io(#[from] std::io::Error),

    #[error("unknown log level `{0}`")]
    UnknownLevel(String),

    #[error("file output is enabled without a path")]
    MissingFilePath,

    #[error("console and file output are both disabled")]
    NoOutput,
}
