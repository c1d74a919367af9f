use crate::commands::DisplayRecord;
use crate::error::{MergeError, Result};
use crate::model::{Record, StoredRecord};
use crate::store::DataStore;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Shortest id prefix accepted when selecting a record by id.
const MIN_ID_PREFIX: usize = 4;

/// How the user points at a record: its 1-based position in the listing, or
/// its id (a unique prefix is enough).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSelector {
    Index(usize),
    Id(String),
}

impl FromStr for RecordSelector {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            if n == 0 {
                return Err(MergeError::Api("Indexes start at 1".to_string()));
            }
            return Ok(RecordSelector::Index(n));
        }
        if s.len() < MIN_ID_PREFIX {
            return Err(MergeError::Api(format!(
                "Invalid record selector: '{}' (use an index or at least {} id characters)",
                s, MIN_ID_PREFIX
            )));
        }
        Ok(RecordSelector::Id(s.to_lowercase()))
    }
}

impl fmt::Display for RecordSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSelector::Index(n) => write!(f, "{}", n),
            RecordSelector::Id(id) => write!(f, "{}", id),
        }
    }
}

pub fn parse_selectors<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<RecordSelector>> {
    inputs.iter().map(|s| s.as_ref().parse()).collect()
}

fn to_display(stored: Vec<StoredRecord>) -> Vec<DisplayRecord> {
    stored
        .into_iter()
        .enumerate()
        .map(|(i, r)| DisplayRecord {
            index: i + 1,
            record: r.to_record(),
            created_at: r.created_at,
        })
        .collect()
}

/// Every record, newest first, numbered from 1.
pub fn indexed_records<S: DataStore>(store: &S) -> Result<Vec<DisplayRecord>> {
    Ok(to_display(store.list(None)?))
}

/// The flattened, newest-first snapshot a filter pass runs over.
pub fn snapshot<S: DataStore>(store: &S) -> Result<Vec<Record>> {
    Ok(store.list(None)?.iter().map(StoredRecord::to_record).collect())
}

pub fn resolve_selectors<S: DataStore>(
    store: &S,
    selectors: &[RecordSelector],
) -> Result<Vec<(usize, Uuid)>> {
    let listed = store.list(None)?;

    selectors
        .iter()
        .map(|selector| match selector {
            RecordSelector::Index(n) => n
                .checked_sub(1)
                .and_then(|i| listed.get(i))
                .map(|r| (*n, r.id))
                .ok_or_else(|| MergeError::Api(format!("Index {} not found", n))),
            RecordSelector::Id(prefix) => {
                let mut matches = listed
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.id.to_string().starts_with(prefix.as_str()));
                match (matches.next(), matches.next()) {
                    (Some((i, r)), None) => Ok((i + 1, r.id)),
                    (None, _) => Err(MergeError::Api(format!("No record matches '{}'", prefix))),
                    (Some(_), Some(_)) => Err(MergeError::Api(format!(
                        "Id prefix '{}' matches more than one record",
                        prefix
                    ))),
                }
            }
        })
        .collect()
}

pub fn records_by_selectors<S: DataStore>(
    store: &S,
    selectors: &[RecordSelector],
) -> Result<Vec<DisplayRecord>> {
    let resolved = resolve_selectors(store, selectors)?;
    let mut records = Vec::with_capacity(resolved.len());
    for (index, id) in resolved {
        let stored = store.get_record(&id)?;
        records.push(DisplayRecord {
            index,
            record: stored.to_record(),
            created_at: stored.created_at,
        });
    }
    Ok(records)
}

/// Points `record` at a category, given by id or by name, and snapshots the
/// name alongside.
pub fn assign_category<S: DataStore>(
    store: &S,
    record: &mut StoredRecord,
    id_or_name: &str,
) -> Result<()> {
    let registry = store.load_categories()?;
    let (id, category) = registry.resolve(id_or_name)?;
    record.assign_category(id, &category.name);
    Ok(())
}

/// Short form of an id for messages.
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// A readable label for a record in messages.
pub fn label(record: &Record) -> String {
    ["Full Name", "University Name", "Organization Name"]
        .iter()
        .find_map(|key| record.get(key).filter(|v| !v.trim().is_empty()))
        .map(str::to_string)
        .or_else(|| record.id().map(|id| id.chars().take(8).collect()))
        .unwrap_or_else(|| "(unnamed)".to_string())
}
