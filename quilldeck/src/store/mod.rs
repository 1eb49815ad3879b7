// In quilldeck/src/store/mod.rs

// SQLite-backed storage for documents and summaries, plus the store traits
// the document service depends on.

pub mod documents;
pub mod migrations;
pub mod summaries;

use crate::config::DatabaseConfig;
use crate::models::{Document, Summary};
use crate::DbPool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{types::Type, Connection, Row};
use std::str::FromStr;
use uuid::Uuid;

// Custom error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Pool(#[from] r2d2::Error),
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
    #[error(transparent)]
    Migration(#[from] rusqlite_migration::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no {table} row with id {id}")]
    MissingRow { table: &'static str, id: Uuid },
}

/// Document persistence. `get_by_id` reports absence as `Ok(None)`.
pub trait DocumentStore: Send + Sync {
    fn create(&self, document: &Document) -> Result<(), StoreError>;
    fn get_by_id(&self, id: Uuid) -> Result<Option<Document>, StoreError>;
    fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<Document>, StoreError>;
    fn update(&self, document: &Document) -> Result<(), StoreError>;
    /// Returns whether a row was removed.
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Summary persistence. `get_by_id` reports absence as `Ok(None)`.
pub trait SummaryStore: Send + Sync {
    fn create(&self, summary: &Summary) -> Result<(), StoreError>;
    fn get_by_id(&self, id: Uuid) -> Result<Option<Summary>, StoreError>;
    fn get_by_document_id(&self, document_id: Uuid) -> Result<Vec<Summary>, StoreError>;
    fn update(&self, summary: &Summary) -> Result<(), StoreError>;
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

fn enable_foreign_keys(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Opens a file-backed pool, creating the parent directory when needed.
pub fn open_pool(config: &DatabaseConfig) -> Result<DbPool, StoreError> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.path).with_init(enable_foreign_keys);
    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections.max(1))
        .build(manager)?;
    Ok(pool)
}

/// A single-connection in-memory pool; every checkout sees the same database.
pub fn memory_pool() -> Result<DbPool, StoreError> {
    let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);
    let pool = r2d2::Pool::builder().max_size(1).build(manager)?;
    Ok(pool)
}

// Brings the schema up to the latest migration.
pub fn migrate_db(conn: &mut Connection) -> Result<(), StoreError> {
    migrations::runner().to_latest(conn)?;
    tracing::debug!(version = migrations::latest_version(), "database schema up to date");
    Ok(())
}

/// Reads a text column through `FromStr`, reporting parse failures as conversion errors.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Both store traits over one connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        migrate_db(&mut conn)
    }
}

impl DocumentStore for SqliteStore {
    fn create(&self, document: &Document) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        documents::insert(&conn, document)
    }

    fn get_by_id(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let conn = self.pool.get()?;
        documents::get(&conn, id)
    }

    fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<Document>, StoreError> {
        let conn = self.pool.get()?;
        documents::list_by_user(&conn, user_id)
    }

    fn update(&self, document: &Document) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        documents::update(&conn, document)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        documents::delete(&conn, id)
    }
}

impl SummaryStore for SqliteStore {
    fn create(&self, summary: &Summary) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        summaries::insert(&conn, summary)
    }

    fn get_by_id(&self, id: Uuid) -> Result<Option<Summary>, StoreError> {
        let conn = self.pool.get()?;
        summaries::get(&conn, id)
    }

    fn get_by_document_id(&self, document_id: Uuid) -> Result<Vec<Summary>, StoreError> {
        let conn = self.pool.get()?;
        summaries::list_by_document(&conn, document_id)
    }

    fn update(&self, summary: &Summary) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        summaries::update(&conn, summary)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        summaries::delete(&conn, id)
    }
}
