//! Repository layer for data access operations.
//!
//! `Repository` is the persistence contract the services are generic over.
//! Two implementations ship with the crate: a PostgreSQL one for users and a
//! generic in-memory one.

mod memory;
#[cfg(test)]
pub(crate) mod test_support;
mod traits;
mod user_repo;

pub use memory::InMemoryRepository;
pub use traits::Repository;
pub use user_repo::PgUserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
}

impl Repositories {
    /// Creates a new Repositories instance with all repositories initialized.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool),
        }
    }
}
