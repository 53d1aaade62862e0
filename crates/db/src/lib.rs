//! Storage for projects and their files.
//!
//! [`ProjectStore`] is the seam between the registry and persistence. Two
//! implementations ship: [`MemoryStore`] (process-lifetime, also the test
//! double) and [`PgStore`] (PostgreSQL JSONB documents).

pub mod memory;
pub mod postgres;
pub mod registry;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use registry::{ProjectRegistry, RegistryError, RegistryResult};
pub use store::{ProjectStore, StoreError};

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
