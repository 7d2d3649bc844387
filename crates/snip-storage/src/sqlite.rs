use async_trait::async_trait;
use jiff::Timestamp;
use snip_core::repository::{ReadRepository, Repository, Result, UrlMapping, UrlRecord};
use snip_core::{ShortKey, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../ddl/sqlite/short_urls.sql");

/// SQLite implementation of the repository contract.
///
/// Reservations are rows whose `long_url` is still `NULL`; they count
/// towards the keyspace but are never returned by reads. The allocator
/// key length lives in the single-row `allocator_state` table.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a repository from an existing SQLite connection pool.
    ///
    /// The schema is expected to exist; see [`SqliteRepository::migrate`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url` and applies the schema.
    ///
    /// In-memory databases (`sqlite::memory:`) are private to a connection,
    /// so they get a single-connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            // The database lives and dies with its only connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        info!(database_url, "connected to sqlite");
        Ok(repository)
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("sqlite schema applied");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn claim(&self, key: &ShortKey, long_url: Option<String>, created_at: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (short_key, long_url, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (short_key) DO NOTHING
            "#,
        )
        .bind(key.as_str())
        .bind(long_url)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
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
        sqlx::Error::Configuration(_) => StorageError::Operation(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for SqliteRepository {
    async fn get(&self, key: &ShortKey) -> Result<Option<UrlRecord>> {
        let row = sqlx::query(
            r#"
            SELECT long_url, created_at
            FROM short_urls
            WHERE short_key = ?
              AND long_url IS NOT NULL
            LIMIT 1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

        Ok(Some(UrlRecord {
            long_url,
            created_at: parse_created_at(created_at)?,
        }))
    }

    async fn exists(&self, key: &ShortKey) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM short_urls
            WHERE short_key = ?
            LIMIT 1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        u64::try_from(count)
            .map_err(|_| StorageError::InvalidData(format!("negative row count {count}")))
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        let rows = sqlx::query(
            r#"
            SELECT short_key, long_url, created_at
            FROM short_urls
            WHERE long_url IS NOT NULL
            ORDER BY created_at, short_key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                let short_key: String = row.try_get("short_key").map_err(map_sqlx_error)?;
                let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
                let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
                Ok(UrlMapping {
                    short_key: ShortKey::new_unchecked(short_key),
                    long_url,
                    created_at: parse_created_at(created_at)?,
                })
            })
            .collect()
    }

    async fn key_length(&self) -> Result<Option<usize>> {
        let length: Option<i64> =
            sqlx::query_scalar("SELECT key_length FROM allocator_state WHERE id = 0")
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        length
            .map(|value| {
                usize::try_from(value).map_err(|_| {
                    StorageError::InvalidData(format!("invalid stored key length {value}"))
                })
            })
            .transpose()
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn insert_if_absent(&self, key: &ShortKey, record: UrlRecord) -> Result<bool> {
        self.claim(key, Some(record.long_url), record.created_at.as_second())
            .await
    }

    async fn reserve(&self, key: &ShortKey) -> Result<bool> {
        self.claim(key, None, Timestamp::now().as_second()).await
    }

    async fn finalize(&self, key: &ShortKey, long_url: String) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET long_url = ?
            WHERE short_key = ?
              AND long_url IS NULL
            "#,
        )
        .bind(long_url)
        .bind(key.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        if self.exists(key).await? {
            Err(StorageError::Conflict(key.to_string()))
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    async fn raise_key_length(&self, length: usize) -> Result<()> {
        let length = i64::try_from(length)
            .map_err(|_| StorageError::InvalidData(format!("key length {length} out of range")))?;

        sqlx::query(
            r#"
            INSERT INTO allocator_state (id, key_length)
            VALUES (0, ?)
            ON CONFLICT (id) DO UPDATE
            SET key_length = MAX(key_length, excluded.key_length)
            "#,
        )
        .bind(length)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
