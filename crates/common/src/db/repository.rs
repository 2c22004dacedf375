//! Repository pattern for database operations
//!
//! All writes run inside a transaction that is rolled back when it is
//! dropped without a commit, so a failed insert never leaves a partial row.

use crate::errors::{AppError, Result};
use crate::db::DbPool;
use crate::db::models::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};

/// Repository for file record access
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // File Operations
    // ========================================================================

    /// Record a newly uploaded file.
    ///
    /// Name uniqueness is left to the table's unique constraint; a violation
    /// comes back as [`AppError::DuplicateName`].
    pub async fn create_file(
        &self,
        name: &str,
        parser_name: &str,
        progress: Option<i32>,
    ) -> Result<FileRecord> {
        let txn = self.conn().begin().await?;

        let record = FileActiveModel {
            name: Set(name.to_string()),
            parser_name: Set(parser_name.to_string()),
            progress: Set(progress),
            ..Default::default()
        };

        let inserted = match record.insert(&txn).await {
            Ok(model) => model,
            Err(err) => {
                txn.rollback().await?;
                return Err(classify_insert_error(name, err));
            }
        };

        txn.commit().await?;
        Ok(inserted)
    }

    /// Find a file record by its name
    pub async fn find_file_by_name(&self, name: &str) -> Result<Option<FileRecord>> {
        FileEntity::find()
            .filter(FileColumn::Name.eq(name))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Count all file records
    pub async fn count_files(&self) -> Result<u64> {
        FileEntity::find()
            .count(self.conn())
            .await
            .map_err(Into::into)
    }
}

fn classify_insert_error(name: &str, err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateName {
            name: name.to_string(),
        },
        _ => AppError::Database(err),
    }
}
