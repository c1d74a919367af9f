//! # Storage Layer
//!
//! Records and categories are persisted behind the [`DataStore`] trait so
//! commands never touch the filesystem directly.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON files in a data directory.
//! - [`memory::InMemoryStore`]: no persistence, used by tests.
//!
//! ## Storage Format
//!
//! ```text
//! <data dir>/
//! ├── records.json      # Stored records (JSON array, insertion order)
//! ├── categories.json   # Category registry keyed by id
//! └── config.json       # MergeConfig
//! ```
//!
//! Implementations provide the primitive row operations; searching, merging
//! updates and bulk import are built on top of them here.

use crate::category::CategoryRegistry;
use crate::error::{MergeError, Result};
use crate::model::{data_from_json, RecordData, StoredRecord};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// A row that bulk import could not store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: String,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub count: usize,
    pub skipped: Vec<SkippedRow>,
    #[serde(skip)]
    pub created: Vec<Uuid>,
}

pub trait DataStore {
    /// Insert or replace a record by id.
    fn save_record(&mut self, record: &StoredRecord) -> Result<()>;

    fn get_record(&self, id: &Uuid) -> Result<StoredRecord>;

    /// All records in insertion order.
    fn list_records(&self) -> Result<Vec<StoredRecord>>;

    fn delete_record(&mut self, id: &Uuid) -> Result<()>;

    fn load_categories(&self) -> Result<CategoryRegistry>;

    fn save_categories(&mut self, categories: &CategoryRegistry) -> Result<()>;

    /// Saves many records at once. Stores that rewrite a whole file per save
    /// should override this.
    fn save_records(&mut self, records: &[StoredRecord]) -> Result<()> {
        for record in records {
            self.save_record(record)?;
        }
        Ok(())
    }

    /// Deletes many records at once, returning how many existed. Missing ids
    /// are skipped; any other failure aborts.
    fn delete_records(&mut self, ids: &[Uuid]) -> Result<usize> {
        let mut removed = 0;
        for id in ids {
            match self.delete_record(id) {
                Ok(()) => removed += 1,
                Err(MergeError::RecordNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    /// Records newest first, optionally narrowed to those whose serialized
    /// data contains `search` (case-insensitive). Keys count as data.
    fn list(&self, search: Option<&str>) -> Result<Vec<StoredRecord>> {
        let mut records = self.list_records()?;
        if let Some(needle) = search.map(str::to_lowercase).filter(|s| !s.is_empty()) {
            let mut kept = Vec::with_capacity(records.len());
            for record in records {
                let text = serde_json::to_string(&record.data)?.to_lowercase();
                if text.contains(&needle) {
                    kept.push(record);
                }
            }
            records = kept;
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn create(&mut self, data: RecordData) -> Result<StoredRecord> {
        let record = StoredRecord::new(data);
        self.save_record(&record)?;
        tracing::info!(id = %record.id, fields = record.data.len(), "record created");
        Ok(record)
    }

    /// Merges `data` into an existing record.
    fn update(&mut self, id: &Uuid, data: RecordData) -> Result<StoredRecord> {
        let mut record = self.get_record(id)?;
        record.merge(data);
        self.save_record(&record)?;
        tracing::info!(id = %record.id, "record updated");
        Ok(record)
    }

    fn delete(&mut self, id: &Uuid) -> Result<()> {
        self.delete_record(id)?;
        tracing::info!(id = %id, "record deleted");
        Ok(())
    }

    /// Stores every JSON object in `rows`; anything else is skipped and
    /// reported with its index.
    fn bulk_create(&mut self, rows: Vec<Value>) -> Result<BulkReport> {
        let mut report = BulkReport::default();
        let mut batch = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            match data_from_json(row) {
                Ok(data) => batch.push(StoredRecord::new(data)),
                Err(reason) => {
                    tracing::warn!(index, %reason, "skipping row");
                    report.skipped.push(SkippedRow { index, reason });
                }
            }
        }

        self.save_records(&batch)?;
        report.count = batch.len();
        report.created = batch.iter().map(|r| r.id).collect();
        tracing::info!(
            count = report.count,
            skipped = report.skipped.len(),
            "bulk import finished"
        );
        Ok(report)
    }
}
