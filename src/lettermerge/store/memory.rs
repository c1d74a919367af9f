use super::DataStore;
use crate::category::CategoryRegistry;
use crate::error::{MergeError, Result};
use crate::model::StoredRecord;
use indexmap::IndexMap;
use uuid::Uuid;

/// In-memory storage for tests. Nothing is persisted.
#[derive(Default)]
pub struct InMemoryStore {
    records: IndexMap<Uuid, StoredRecord>,
    categories: Option<CategoryRegistry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn save_record(&mut self, record: &StoredRecord) -> Result<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    fn get_record(&self, id: &Uuid) -> Result<StoredRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or(MergeError::RecordNotFound(*id))
    }

    fn list_records(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn delete_record(&mut self, id: &Uuid) -> Result<()> {
        if self.records.shift_remove(id).is_none() {
            return Err(MergeError::RecordNotFound(*id));
        }
        Ok(())
    }

    fn load_categories(&self) -> Result<CategoryRegistry> {
        Ok(self.categories.clone().unwrap_or_default())
    }

    fn save_categories(&mut self, categories: &CategoryRegistry) -> Result<()> {
        self.categories = Some(categories.clone());
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{RecordData, CATEGORY_ID_KEY, CATEGORY_NAME_KEY};
    use chrono::{Duration, Utc};

    pub struct StoreFixture {
        pub store: InMemoryStore,
        next: usize,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
                next: 0,
            }
        }

        /// Adds a record built from `pairs`. Each record is created one
        /// second after the previous one so listing order is predictable.
        pub fn with_record(mut self, pairs: &[(&str, &str)]) -> Self {
            let data: RecordData = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect();
            let mut record = StoredRecord::new(data);
            let at = Utc::now() - Duration::seconds(1000) + Duration::seconds(self.next as i64);
            record.created_at = at;
            record.updated_at = at;
            self.next += 1;
            self.store.save_record(&record).unwrap();
            self
        }

        /// Adds a record assigned to `category_id`, snapshotting the name
        /// from the registry when it exists.
        pub fn with_categorized(self, category_id: &str, pairs: &[(&str, &str)]) -> Self {
            let name = self
                .store
                .load_categories()
                .unwrap()
                .get(category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            let mut all: Vec<(&str, &str)> = pairs.to_vec();
            all.push((CATEGORY_ID_KEY, category_id));
            all.push((CATEGORY_NAME_KEY, name.as_str()));
            self.with_record(&all)
        }

        /// A small directory of faculty records across two categories.
        pub fn with_faculty(self) -> Self {
            self.with_categorized(
                "states",
                &[
                    ("Full Name", "Asha Rao"),
                    ("University Name", "Kerala University"),
                    ("State / UT", "Kerala"),
                    ("Year Established", "1937"),
                    ("Official Email", "asha@ku.example"),
                ],
            )
            .with_categorized(
                "universities",
                &[
                    ("Full Name", "Bimal Sen"),
                    ("University Name", "Goa University"),
                    ("State / UT", "Goa"),
                    ("Year Established", "1985"),
                    ("Official Email", "bimal@gu.example"),
                ],
            )
            .with_record(&[
                ("Full Name", "Chitra Iyer"),
                ("University Name", "Madras University"),
                ("State / UT", "Tamil Nadu"),
                ("Year Established", "1857"),
                ("Official Email", ""),
            ])
        }

        pub fn ids(&self) -> Vec<Uuid> {
            self.store
                .list_records()
                .unwrap()
                .into_iter()
                .map(|r| r.id)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;

    #[test]
    fn delete_missing_record_fails() {
        let mut store = InMemoryStore::new();
        assert!(matches!(
            store.delete_record(&Uuid::new_v4()),
            Err(MergeError::RecordNotFound(_))
        ));
    }

    #[test]
    fn categories_default_until_saved() {
        let mut store = InMemoryStore::new();
        let mut registry = store.load_categories().unwrap();
        assert_eq!(registry.len(), 4);

        registry.add("Colleges", None);
        store.save_categories(&registry).unwrap();
        assert_eq!(store.load_categories().unwrap().len(), 5);
    }

    #[test]
    fn fixture_records_are_listed_newest_first() {
        let fixture = StoreFixture::new().with_faculty();
        let listed = fixture.store.list(None).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].data["Full Name"], Some("Chitra Iyer".into()));
        assert_eq!(listed[2].data["_categoryName"], Some("Indian States".into()));
    }
}
