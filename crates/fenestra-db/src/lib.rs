//! # fenestra-db
//!
//! PostgreSQL database layer for fenestra.
//!
//! This crate provides:
//! - Connection pool management
//! - The `PgWindowRepository` implementation of `WindowRepository`
//! - Embedded schema migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use fenestra_db::Database;
//!
//! let db = Database::connect("postgres://localhost/fenestra").await?;
//! let record = db.windows.fetch(id).await?;
//! ```

pub mod pool;
pub mod windows;

// Re-export core types
pub use fenestra_core::*;

pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use windows::PgWindowRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Aggregate handle over the connection pool and repositories.
///
/// Constructed once at startup and passed into the API layer; there is no
/// process-wide connection state.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Window catalog repository.
    pub windows: PgWindowRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            windows: PgWindowRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }
}

/// Apply embedded schema migrations.
#[cfg(feature = "migrations")]
pub async fn run_migrations(pool: &sqlx::Pool<sqlx::Postgres>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Database(e.into()))
}
