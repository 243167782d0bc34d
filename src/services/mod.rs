//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and callers.

mod base_service;
mod user_service;

pub use base_service::BaseService;
pub use user_service::UserService;

use crate::repositories::{PgUserRepository, Repositories};
use crate::utils::Argon2Hasher;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since underlying pools use `Arc` internally.
#[derive(Clone)]
pub struct Services {
    pub users: UserService<PgUserRepository, Argon2Hasher>,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories, hasher: Argon2Hasher) -> Self {
        Self {
            users: UserService::new(repos.users, hasher),
        }
    }
}
