//! SQLite storage implementation.
//!
//! The connection is opened once at start-up and shared behind a mutex.
//! Statements run on tokio's blocking pool so a slow disk never stalls
//! command handling. `close` takes the connection out, so later calls report
//! a closed store instead of touching a dropped handle.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use tokio::task;

use crate::error::{AppError, Result};
use crate::models::{DATE_FORMAT, ReleaseRecord};
use crate::storage::ReleaseRepository;
use crate::utils::parse_date;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS releases (
    code         TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    release_date TEXT,
    preview_date TEXT,
    source_link  TEXT NOT NULL
);
"#;

/// SQLite-backed release repository.
pub struct SqliteRepository {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteRepository {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        log::info!("Opened release database at {}", path.display());
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Run `f` against the open connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let guard = lock(&shared)?;
            let conn = guard
                .as_ref()
                .ok_or_else(|| AppError::storage("release database is closed"))?;
            f(conn)
        })
        .await
        .map_err(|e| AppError::storage(format!("database task failed: {e}")))?
    }
}

fn lock(conn: &Mutex<Option<Connection>>) -> Result<MutexGuard<'_, Option<Connection>>> {
    conn.lock()
        .map_err(|_| AppError::storage("release database lock poisoned"))
}

#[async_trait]
impl ReleaseRepository for SqliteRepository {
    async fn insert(&self, record: &ReleaseRecord) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| {
            let result = conn.execute(
                "INSERT INTO releases (code, name, release_date, preview_date, source_link)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.code,
                    record.name,
                    to_column(record.release_date),
                    to_column(record.preview_date),
                    record.source_link,
                ],
            );

            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(AppError::duplicate(&record.code))
                }
                Err(e) => Err(AppError::Database(e)),
            }
        })
        .await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ReleaseRecord>> {
        let code = code.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT code, name, release_date, preview_date, source_link
                     FROM releases WHERE code = ?1",
                    params![code],
                    map_row,
                )
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<ReleaseRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT code, name, release_date, preview_date, source_link
                 FROM releases ORDER BY code",
            )?;
            let rows = stmt.query_map([], map_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn delete_by_code(&self, code: &str) -> Result<bool> {
        let code = code.to_string();
        self.with_conn(move |conn| {
            let removed = conn.execute("DELETE FROM releases WHERE code = ?1", params![code])?;
            Ok(removed > 0)
        })
        .await
    }

    async fn delete_expired(&self, cutoff: NaiveDate) -> Result<usize> {
        // ISO dates compare correctly as text.
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM releases WHERE release_date IS NOT NULL AND release_date <= ?1",
                params![cutoff.format(DATE_FORMAT).to_string()],
            )?;
            Ok(removed)
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        let taken = lock(&self.conn)?.take();
        let Some(conn) = taken else {
            return Ok(());
        };
        task::spawn_blocking(move || conn.close().map_err(|(_, e)| AppError::Database(e)))
            .await
            .map_err(|e| AppError::storage(format!("database task failed: {e}")))??;
        log::info!("Closed release database");
        Ok(())
    }
}

fn to_column(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn from_column(index: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(text) => parse_date(&text).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                format!("invalid date '{text}'").into(),
            )
        }),
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReleaseRecord> {
    Ok(ReleaseRecord {
        code: row.get(0)?,
        name: row.get(1)?,
        release_date: from_column(2, row.get(2)?)?,
        preview_date: from_column(3, row.get(3)?)?,
        source_link: row.get(4)?,
    })
}
