//! In-memory storage implementation.
//!
//! Used by tests and `--in-memory` runs; nothing survives the process.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::ReleaseRecord;
use crate::storage::ReleaseRepository;

/// In-memory release repository keyed by set code.
#[derive(Debug)]
pub struct MemoryRepository {
    records: Mutex<Option<BTreeMap<String, ReleaseRecord>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Some(BTreeMap::new())),
        }
    }

    fn with_records<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, ReleaseRecord>) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.lock()?;
        let records = guard
            .as_mut()
            .ok_or_else(|| AppError::storage("release store is closed"))?;
        f(records)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<BTreeMap<String, ReleaseRecord>>>> {
        self.records
            .lock()
            .map_err(|_| AppError::storage("release store lock poisoned"))
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseRepository for MemoryRepository {
    async fn insert(&self, record: &ReleaseRecord) -> Result<()> {
        self.with_records(|records| {
            if records.contains_key(&record.code) {
                return Err(AppError::duplicate(&record.code));
            }
            records.insert(record.code.clone(), record.clone());
            Ok(())
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ReleaseRecord>> {
        self.with_records(|records| Ok(records.get(code).cloned()))
    }

    async fn list_all(&self) -> Result<Vec<ReleaseRecord>> {
        self.with_records(|records| Ok(records.values().cloned().collect()))
    }

    async fn delete_by_code(&self, code: &str) -> Result<bool> {
        self.with_records(|records| Ok(records.remove(code).is_some()))
    }

    async fn delete_expired(&self, cutoff: NaiveDate) -> Result<usize> {
        self.with_records(|records| {
            let before = records.len();
            records.retain(|_, record| !record.is_expired(cutoff));
            Ok(before - records.len())
        })
    }

    async fn close(&self) -> Result<()> {
        self.lock()?.take();
        Ok(())
    }
}
