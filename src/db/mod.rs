//! Database connection pool and migrations.
//!
//! Provides async PostgreSQL connection pooling using diesel_async with bb8.

mod migrations;
mod pool;

pub use migrations::{MIGRATIONS, run_migrations};
pub use pool::{AsyncDbPool, establish_async_connection_pool};
