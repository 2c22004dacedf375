//! Database layer for Cash Lens
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Connection pool management
//! - Schema bootstrap

pub mod models;
mod repository;

pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::db::models::FileEntity;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
///
/// Cloning is cheap; every request borrows connections from the shared pool
/// and hands them back when its query or transaction finishes.
#[derive(Clone)]
pub struct DbPool {
    primary: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let primary = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e)
            })?;

        info!("Database connection established");

        Ok(Self { primary })
    }

    /// Wrap an existing connection
    pub fn from_connection(primary: DatabaseConnection) -> Self {
        Self { primary }
    }

    /// Get the pooled connection
    pub fn conn(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Create the `files` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        let backend = self.primary.get_database_backend();
        let schema = Schema::new(backend);

        let mut stmt = schema.create_table_from_entity(FileEntity);
        stmt.if_not_exists();

        self.primary.execute(backend.build(&stmt)).await?;
        info!(table = "files", "Schema ready");
        Ok(())
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }
}

/// In-memory SQLite pool with the schema applied, for tests across the workspace
#[cfg(any(test, feature = "test-util"))]
pub async fn memory_pool() -> Result<DbPool> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    // A second connection would open a second, empty in-memory database
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let conn = Database::connect(opts).await?;
    let pool = DbPool::from_connection(conn);
    pool.ensure_schema().await?;
    Ok(pool)
}
