//! Opens the cache database and brings its schema up to date.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::entity_cache::SqliteEntityCache;
use crate::error::StorageError;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 4;

/// Where the entity cache lives.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` URL, e.g. `sqlite:homesync.db?mode=rwc` or `sqlite::memory:`.
    pub database_url: String,
}

impl Config {
    /// Open the database, creating the file when missing, and run pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is invalid, the database cannot be
    /// opened, or a migration fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::open(&self.database_url).await
    }
}

/// An open cache database.
///
/// A file database uses WAL so readers never wait on the cache writer. An
/// in-memory database is private to its connection, so the pool is held to
/// one connection and every caller sees the same data.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn open(database_url: &str) -> Result<Self, StorageError> {
        let in_memory = database_url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { MAX_CONNECTIONS })
            // an in-memory database dies with its last connection
            .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(database_url, in_memory, "entity cache database ready");

        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Entity cache sharing this database's pool.
    #[must_use]
    pub fn entity_cache(&self) -> SqliteEntityCache {
        SqliteEntityCache::new(self.pool.clone())
    }
}
