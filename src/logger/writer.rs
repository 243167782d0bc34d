//! Log file opening for the file output layer

use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use crate::logger::LoggerError;
use crate::logger::config::FileConfig;

/// Opens the configured log file, creating missing parent directories.
///
/// The returned `Mutex<File>` is used directly as a `MakeWriter`.
pub(crate) fn open_log_file(config: &FileConfig) -> Result<Mutex<File>, LoggerError> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.create(true);
    if config.append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }

    Ok(Mutex::new(options.open(&config.path)?))
}
