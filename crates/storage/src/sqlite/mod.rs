//! `SQLite` backend for the project library and profile.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{ProfileRepository, ProjectRepository, Storage};

mod mapping;
mod migrate;
mod profile_repo;
mod project_repo;

const POOL_SIZE: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("schema migration {version} failed: {source}")]
    Migration {
        version: i64,
        #[source]
        source: sqlx::Error,
    },
}

/// Pool-backed repository implementing every storage trait.
#[derive(Clone, Debug)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if needed) the database at `database_url`.
    ///
    /// Connections use WAL journaling and a busy timeout so concurrent
    /// readers do not fail while a write is in progress.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError::Sqlx` for malformed URLs or connection
    /// failures.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(POOL_SIZE)
            .acquire_timeout(BUSY_TIMEOUT)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError::Migration` naming the step that failed.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::apply_pending(&self.pool).await
    }
}

impl Storage {
    /// Connect, migrate and wrap a `SqliteRepository`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let repo = Arc::new(repo);
        Ok(Self {
            projects: Arc::clone(&repo) as Arc<dyn ProjectRepository>,
            profiles: repo as Arc<dyn ProfileRepository>,
        })
    }
}
