//! Settings for crudkit-rs
//!
//! TOML files layered under `CRUDKIT_*` environment variables, see
//! [`ConfigLoader`] for the order.

pub mod error;
pub mod loader;
pub mod settings;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{DatabaseConfig, PasswordConfig, Settings};
