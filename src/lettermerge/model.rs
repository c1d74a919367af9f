use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "createdAt";
pub const UPDATED_AT_KEY: &str = "updatedAt";
pub const CATEGORY_ID_KEY: &str = "_categoryId";
pub const CATEGORY_NAME_KEY: &str = "_categoryName";

/// Keys owned by the store. They are stripped from incoming data and
/// re-added when a stored row is flattened into a [`Record`].
pub const RESERVED_KEYS: &[&str] = &[ID_KEY, CREATED_AT_KEY, UPDATED_AT_KEY];

pub type FieldValue = Option<String>;

/// Field name to value, in insertion order.
pub type RecordData = IndexMap<String, FieldValue>;

/// Internal bookkeeping fields start with an underscore and are never
/// substituted into templates.
pub fn is_internal_key(key: &str) -> bool {
    key.starts_with('_')
}

/// A flat, ordered mapping of field name to an optional text value.
///
/// Everything is text until it is filtered: numeric interpretation happens
/// only inside the condition evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: RecordData,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(fields: RecordData) -> Self {
        Self { fields }
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), Some(value.into()));
        self
    }

    /// Builder-style insert of an explicit null.
    pub fn with_null(mut self, key: impl Into<String>) -> Self {
        self.fields.insert(key.into(), None);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    /// The value of a field, or `None` when missing or null.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_deref())
    }

    /// The value of a field with missing and null both read as "".
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &RecordData {
        &self.fields
    }

    pub fn into_fields(self) -> RecordData {
        self.fields
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID_KEY)
    }

    /// The assigned category id. An empty string counts as unassigned.
    pub fn category_id(&self) -> Option<&str> {
        self.get(CATEGORY_ID_KEY).filter(|id| !id.is_empty())
    }

    /// Display snapshot of the category name taken at assignment time.
    pub fn category_name(&self) -> Option<&str> {
        self.get(CATEGORY_NAME_KEY)
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category_id().is_none()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A row as persisted by the record store: store-owned bookkeeping plus the
/// user data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: RecordData,
}

impl StoredRecord {
    pub fn new(data: RecordData) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            data: strip_reserved(data),
        }
    }

    /// Merges `updates` into the stored data: existing keys are overwritten
    /// in place, new keys are appended.
    pub fn merge(&mut self, updates: RecordData) {
        for (key, value) in strip_reserved(updates) {
            self.data.insert(key, value);
        }
        self.updated_at = Utc::now();
    }

    /// Writes the category id together with a snapshot of its name.
    pub fn assign_category(&mut self, category_id: &str, category_name: &str) {
        self.data
            .insert(CATEGORY_ID_KEY.to_string(), Some(category_id.to_string()));
        self.data.insert(
            CATEGORY_NAME_KEY.to_string(),
            Some(category_name.to_string()),
        );
        self.updated_at = Utc::now();
    }

    /// Flattens into the shape the engine works on: `id`, the data fields,
    /// then `createdAt` and `updatedAt`.
    pub fn to_record(&self) -> Record {
        let mut fields = RecordData::with_capacity(self.data.len() + 3);
        fields.insert(ID_KEY.to_string(), Some(self.id.to_string()));
        for (key, value) in &self.data {
            fields.insert(key.clone(), value.clone());
        }
        fields.insert(
            CREATED_AT_KEY.to_string(),
            Some(self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        fields.insert(
            UPDATED_AT_KEY.to_string(),
            Some(self.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        Record::from_data(fields)
    }
}

fn strip_reserved(mut data: RecordData) -> RecordData {
    for key in RESERVED_KEYS {
        data.shift_remove(*key);
    }
    data
}

/// Converts one JSON row into record data.
///
/// Scalars become text, `null` stays null, nested values are kept as their
/// JSON text. Anything but an object is rejected with a reason.
pub fn data_from_json(value: Value) -> std::result::Result<RecordData, String> {
    let Value::Object(map) = value else {
        return Err("Invalid record format".to_string());
    };

    Ok(map
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                other => Some(other.to_string()),
            };
            (key, text)
        })
        .collect())
}

/// Parses `key=value` pairs as typed on the command line. A bare `key=`
/// stores an empty string.
pub fn data_from_pairs<I: AsRef<str>>(pairs: &[I]) -> std::result::Result<RecordData, String> {
    pairs
        .iter()
        .map(|pair| {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Ok((key.trim().to_string(), Some(value.to_string())))
                }
                _ => Err(format!("Expected key=value, got '{}'", pair)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattened_record_puts_id_first_and_timestamps_last() {
        let mut data = RecordData::new();
        data.insert("Full Name".into(), Some("Asha Rao".into()));
        data.insert("District".into(), None);
        let stored = StoredRecord::new(data);

        let record = stored.to_record();
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(
            keys,
            vec!["id", "Full Name", "District", "createdAt", "updatedAt"]
        );
        assert_eq!(record.id(), Some(stored.id.to_string().as_str()));
        assert_eq!(record.get("District"), None);
        assert_eq!(record.text("District"), "");
    }

    #[test]
    fn new_strips_store_owned_keys() {
        let mut data = RecordData::new();
        data.insert("id".into(), Some("42".into()));
        data.insert("createdAt".into(), Some("yesterday".into()));
        data.insert("Name".into(), Some("A".into()));

        let stored = StoredRecord::new(data);
        assert_eq!(stored.data.len(), 1);
        assert!(stored.data.contains_key("Name"));
    }

    #[test]
    fn merge_overwrites_in_place_and_appends_new_keys() {
        let mut data = RecordData::new();
        data.insert("A".into(), Some("1".into()));
        data.insert("B".into(), Some("2".into()));
        let mut stored = StoredRecord::new(data);

        let mut updates = RecordData::new();
        updates.insert("C".into(), Some("3".into()));
        updates.insert("A".into(), Some("one".into()));
        stored.merge(updates);

        let keys: Vec<_> = stored.data.keys().cloned().collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(stored.data["A"], Some("one".into()));
    }

    #[test]
    fn empty_category_id_counts_as_uncategorized() {
        let record = Record::new().with(CATEGORY_ID_KEY, "");
        assert!(record.is_uncategorized());

        let record = Record::new().with(CATEGORY_ID_KEY, "states");
        assert_eq!(record.category_id(), Some("states"));
    }

    #[test]
    fn json_rows_become_text() {
        let data = data_from_json(json!({
            "Name": "Kerala University",
            "Year Established": 1937,
            "Verified": true,
            "Notes": null
        }))
        .unwrap();

        assert_eq!(data["Year Established"], Some("1937".into()));
        assert_eq!(data["Verified"], Some("true".into()));
        assert_eq!(data["Notes"], None);
    }

    #[test]
    fn json_non_objects_are_rejected() {
        assert!(data_from_json(json!(["a", "b"])).is_err());
        assert!(data_from_json(json!("row")).is_err());
    }

    #[test]
    fn pairs_parse_and_reject_missing_equals() {
        let data = data_from_pairs(&["Full Name=Asha Rao", "Notes="]).unwrap();
        assert_eq!(data["Full Name"], Some("Asha Rao".into()));
        assert_eq!(data["Notes"], Some("".into()));

        assert!(data_from_pairs(&["broken"]).is_err());
        assert!(data_from_pairs(&["=value"]).is_err());
    }
}
