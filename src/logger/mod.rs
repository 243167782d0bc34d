//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for console
//! output with color control and file output in Full, Compact or JSON format.

pub mod config;
pub mod error;
mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber with the given configuration
pub fn init_logger(config: &LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let use_ansi = config.console.colored && std::io::stdout().is_terminal();

    match (config.console.enabled, config.file.enabled) {
        (true, true) => init_both(config, filter, use_ansi)?,
        (true, false) => tracing_subscriber::registry()
            .with(filter)
            .with(console_layer(use_ansi))
            .try_init()?,
        (false, true) => init_file_only(&config.file, filter)?,
        (false, false) => return Err(LoggerError::NoOutput.into()),
    }

    Ok(())
}

/// Console layer; generic so each registry stack infers its own `S`.
fn console_layer<S>(use_ansi: bool) -> fmt::Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
}

fn init_file_only(config: &FileConfig, filter: EnvFilter) -> anyhow::Result<()> {
    let writer = writer::open_log_file(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Full => registry
            .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .try_init()?,
    }

    Ok(())
}

fn init_both(config: &LoggerConfig, filter: EnvFilter, use_ansi: bool) -> anyhow::Result<()> {
    let writer = writer::open_log_file(&config.file)?;

    // The file layer goes first so ANSI span formatting from the console
    // layer does not leak into the file (tokio-rs/tracing#1817).
    let registry = tracing_subscriber::registry().with(filter);
    match config.file.format {
        LogFormat::Full => registry
            .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
            .with(console_layer(use_ansi))
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .with(console_layer(use_ansi))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .with(console_layer(use_ansi))
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_logger_rejects_invalid_config() {
        let config = LoggerConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        let err = init_logger(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoggerError>(),
            Some(LoggerError::UnknownLevel(_))
        ));
    }

    // The only test in the crate that installs the global subscriber.
    #[test]
    fn test_init_logger_writes_json_to_file() {
        let dir = TempDir::new().unwrap();
        let config = LoggerConfig {
            level: "info".to_string(),
            console: ConsoleConfig {
                enabled: true,
                colored: false,
            },
            file: FileConfig {
                enabled: true,
                path: dir.path().join("logs").join("crudkit.log"),
                append: false,
                format: LogFormat::Json,
            },
        };

        init_logger(&config).unwrap();
        tracing::info!(entity = "user", id = 7u64, "logger smoke line");

        let content = std::fs::read_to_string(&config.file.path).unwrap();
        let line = content
            .lines()
            .find(|line| line.contains("logger smoke line"))
            .expect("event should reach the file");
        let event: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["entity"], "user");
        assert_eq!(event["fields"]["id"], 7);
    }
}
