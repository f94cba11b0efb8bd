//! Storage abstractions for release persistence.
//!
//! One keyed collection of [`ReleaseRecord`]s. The SQLite backend keeps the
//! catalog on disk in a single `releases` table:
//!
//! ```text
//! releases
//! ├── code          TEXT PRIMARY KEY
//! ├── name          TEXT NOT NULL
//! ├── release_date  TEXT  (YYYY-MM-DD or NULL)
//! ├── preview_date  TEXT  (YYYY-MM-DD or NULL)
//! └── source_link   TEXT NOT NULL
//! ```
//!
//! Every operation is a single statement. There is no atomic
//! insert-if-absent: callers check `find_by_code` first, and a racing
//! duplicate still fails with `DuplicateKey`.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::ReleaseRecord;

// Re-export for convenience
pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// Trait for release storage backends.
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    /// Insert a new record. Fails with `DuplicateKey` if the code exists.
    async fn insert(&self, record: &ReleaseRecord) -> Result<()>;

    /// Look up a record by its (already normalized) code.
    async fn find_by_code(&self, code: &str) -> Result<Option<ReleaseRecord>>;

    /// All stored records, in no guaranteed order.
    async fn list_all(&self) -> Result<Vec<ReleaseRecord>>;

    /// Remove a record. Returns `true` if one was removed.
    async fn delete_by_code(&self, code: &str) -> Result<bool>;

    /// Remove every record whose release date is on or before `cutoff`.
    ///
    /// Records without a release date are kept. Returns the number removed.
    async fn delete_expired(&self, cutoff: NaiveDate) -> Result<usize>;

    /// End the store's lifecycle. Later calls fail with a storage error.
    async fn close(&self) -> Result<()>;
}
