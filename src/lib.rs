//! crudkit-rs Library
//!
//! A generic CRUD service layer: services generic over a `Repository`,
//! actor-attributed updates, pagination, and a user service with hashed
//! credentials, backed by PostgreSQL or an in-memory store.

pub mod actor;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod schema;
pub mod services;
pub mod utils;

pub use actor::ActorId;
pub use error::{AppError, AppResult};
pub use pagination::{ListParams, PaginatedResult, PaginationMeta, SortOrder};
pub use repositories::{InMemoryRepository, Repositories, Repository};
pub use services::{BaseService, Services, UserService};

use crate::config::{ConfigLoader, Settings};
use crate::utils::Argon2Hasher;

/// Wires the PostgreSQL-backed services from validated settings.
///
/// Applies pending migrations, opens the connection pool and builds the
/// credential hasher from `settings.password`.
pub async fn init_services(settings: &Settings) -> AppResult<Services> {
    settings.validate()?;

    db::run_migrations(&settings.database.url).await?;
    let pool = db::establish_async_connection_pool(&settings.database).await?;
    let hasher = Argon2Hasher::new(&settings.password)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Services initialized");

    Ok(Services::new(Repositories::new(pool), hasher))
}

/// Loads settings from the `CRUDKIT_*` sources, installs the global logger
/// and initializes the services.
pub async fn bootstrap() -> AppResult<(Settings, Services)> {
    let settings = ConfigLoader::from_env()?.load()?;
    logger::init_logger(&settings.logger)?;
    let services = init_services(&settings).await?;
    Ok((settings, services))
}
