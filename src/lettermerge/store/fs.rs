use super::DataStore;
use crate::category::CategoryRegistry;
use crate::error::{MergeError, Result};
use crate::model::StoredRecord;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const RECORDS_FILENAME: &str = "records.json";
const CATEGORIES_FILENAME: &str = "categories.json";

/// JSON-file storage rooted at a data directory. Every mutation rewrites the
/// whole file.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(MergeError::Io)?;
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<StoredRecord>> {
        let path = self.root.join(RECORDS_FILENAME);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(MergeError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            MergeError::Store(format!("{} is corrupt: {}", path.display(), e))
        })
    }

    fn save_all(&self, records: &[StoredRecord]) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(records).map_err(MergeError::Serialization)?;
        fs::write(self.root.join(RECORDS_FILENAME), content).map_err(MergeError::Io)?;
        Ok(())
    }

    fn upsert(records: &mut Vec<StoredRecord>, record: &StoredRecord) {
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
    }
}

impl DataStore for FileStore {
    fn save_record(&mut self, record: &StoredRecord) -> Result<()> {
        let mut records = self.load_all()?;
        Self::upsert(&mut records, record);
        self.save_all(&records)
    }

    fn save_records(&mut self, batch: &[StoredRecord]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut records = self.load_all()?;
        for record in batch {
            Self::upsert(&mut records, record);
        }
        self.save_all(&records)
    }

    fn get_record(&self, id: &Uuid) -> Result<StoredRecord> {
        self.load_all()?
            .into_iter()
            .find(|r| r.id == *id)
            .ok_or(MergeError::RecordNotFound(*id))
    }

    fn list_records(&self) -> Result<Vec<StoredRecord>> {
        self.load_all()
    }

    fn delete_record(&mut self, id: &Uuid) -> Result<()> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|r| r.id != *id);
        if records.len() == before {
            return Err(MergeError::RecordNotFound(*id));
        }
        self.save_all(&records)
    }

    fn delete_records(&mut self, ids: &[Uuid]) -> Result<usize> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        let removed = before - records.len();
        if removed > 0 {
            self.save_all(&records)?;
        }
        Ok(removed)
    }

    fn load_categories(&self) -> Result<CategoryRegistry> {
        let path = self.root.join(CATEGORIES_FILENAME);
        if !path.exists() {
            return Ok(CategoryRegistry::default());
        }
        let content = fs::read_to_string(&path).map_err(MergeError::Io)?;
        match serde_json::from_str(&content) {
            Ok(registry) => Ok(registry),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable categories, using defaults");
                Ok(CategoryRegistry::default())
            }
        }
    }

    fn save_categories(&mut self, categories: &CategoryRegistry) -> Result<()> {
        self.ensure_dir()?;
        let content =
            serde_json::to_string_pretty(categories).map_err(MergeError::Serialization)?;
        fs::write(self.root.join(CATEGORIES_FILENAME), content).map_err(MergeError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordData;
    use tempfile::TempDir;

    fn data(name: &str) -> RecordData {
        let mut data = RecordData::new();
        data.insert("Full Name".into(), Some(name.into()));
        data
    }

    #[test]
    fn empty_dir_has_no_records_and_default_categories() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("missing"));
        assert!(store.list_records().unwrap().is_empty());
        assert_eq!(store.load_categories().unwrap(), CategoryRegistry::default());
    }

    #[test]
    fn records_survive_a_new_store_instance() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());
        let created = store.create(data("Asha")).unwrap();

        let reopened = FileStore::new(temp.path());
        let loaded = reopened.get_record(&created.id).unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn save_replaces_existing_and_keeps_order() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());
        let a = store.create(data("A")).unwrap();
        let b = store.create(data("B")).unwrap();

        store.update(&a.id, data("A2")).unwrap();
        let ids: Vec<_> = store.list_records().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn batch_delete_rewrites_once() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());
        let batch: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|n| StoredRecord::new(data(n)))
            .collect();
        store.save_records(&batch).unwrap();

        let removed = store
            .delete_records(&[batch[0].id, batch[2].id, Uuid::new_v4()])
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.list_records().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_records_file_is_a_store_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(RECORDS_FILENAME), "{not json").unwrap();
        let store = FileStore::new(temp.path());
        assert!(matches!(store.list_records(), Err(MergeError::Store(_))));
    }

    #[test]
    fn categories_round_trip_through_disk() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());
        let mut registry = store.load_categories().unwrap();
        let id = registry.add("Colleges", None);
        store.save_categories(&registry).unwrap();

        let loaded = FileStore::new(temp.path()).load_categories().unwrap();
        assert_eq!(loaded.get(&id).unwrap().name, "Colleges");
    }
}
