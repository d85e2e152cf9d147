use async_trait::async_trait;
use burrow_core::repository::{AliasRecord, NewAlias, Repository, Result};
use burrow_core::{ShortCode, StorageError};
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const SCHEMA: &str = include_str!("../ddl/mysql/aliases.sql");

/// MySQL implementation of the repository contract.
///
/// Records live in the `aliases` table with timestamps stored as Unix
/// milliseconds. The primary key on `code` rejects duplicate inserts, and
/// usage counts are bumped with a single `UPDATE` so concurrent increments
/// never lose updates.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `aliases` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_timestamp(column: &str, millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{millis}': {e}"))
    })
}

fn decode_row(code: &ShortCode, row: MySqlRow) -> Result<AliasRecord> {
    let target: String = row.try_get("target").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let expires_at: i64 = row.try_get("expires_at").map_err(map_sqlx_error)?;
    let usage_count: u64 = row.try_get("usage_count").map_err(map_sqlx_error)?;

    Ok(AliasRecord {
        code: code.clone(),
        target,
        created_at: parse_timestamp("created_at", created_at)?,
        expires_at: parse_timestamp("expires_at", expires_at)?,
        usage_count,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn save(&self, code: &ShortCode, alias: NewAlias) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO aliases (code, target, created_at, expires_at, usage_count)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(code.as_str())
        .bind(alias.target)
        .bind(alias.created_at.as_millisecond())
        .bind(alias.expires_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<AliasRecord>> {
        let row = sqlx::query(
            r#"
            SELECT target, created_at, expires_at, usage_count
            FROM aliases
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| decode_row(code, row)).transpose()
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query("DELETE FROM aliases WHERE code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_usage(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query("UPDATE aliases SET usage_count = usage_count + 1 WHERE code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64> {
        let result = sqlx::query("DELETE FROM aliases WHERE expires_at <= ?")
            .bind(cutoff.as_millisecond())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
