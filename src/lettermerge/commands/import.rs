use crate::category::DEFAULT_CATEGORY_ID;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MergeError, Result};
use crate::model::{CATEGORY_ID_KEY, CATEGORY_NAME_KEY};
use crate::normalize::{missing_columns, REQUIRED_COLUMNS};
use crate::store::DataStore;
use serde_json::Value;
use std::fs;
use std::path::Path;

const MISSING_PREVIEW: usize = 5;

/// Imports rows from a JSON file holding either an array of objects or an
/// object with a `records` array.
///
/// With `category` set every row is assigned to it. Otherwise rows that carry
/// no category of their own land in the default category.
pub fn run<S: DataStore>(store: &mut S, path: &Path, category: Option<&str>) -> Result<CmdResult> {
    let content = fs::read_to_string(path)?;
    let parsed: Value = serde_json::from_str(&content)?;
    run_rows(store, parsed, category)
}

pub fn run_rows<S: DataStore>(
    store: &mut S,
    parsed: Value,
    category: Option<&str>,
) -> Result<CmdResult> {
    let mut rows = match parsed {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(MergeError::Api(
                    "Expected a JSON array of records or an object with a \"records\" array"
                        .to_string(),
                ))
            }
        },
        _ => {
            return Err(MergeError::Api(
                "Expected a JSON array of records".to_string(),
            ))
        }
    };

    let registry = store.load_categories()?;
    let (explicit, target_id, target_name) = match category {
        Some(id_or_name) => {
            let (id, c) = registry.resolve(id_or_name)?;
            (true, id.to_string(), c.name.clone())
        }
        None => {
            let name = registry
                .get(DEFAULT_CATEGORY_ID)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            (false, DEFAULT_CATEGORY_ID.to_string(), name)
        }
    };

    let mut headers: Vec<String> = Vec::new();
    for row in rows.iter_mut() {
        let Value::Object(map) = row else {
            continue;
        };
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        let has_own = map
            .get(CATEGORY_ID_KEY)
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if explicit || !has_own {
            map.insert(CATEGORY_ID_KEY.to_string(), Value::String(target_id.clone()));
            map.insert(
                CATEGORY_NAME_KEY.to_string(),
                Value::String(target_name.clone()),
            );
        }
    }

    let total = rows.len();
    let report = store.bulk_create(rows)?;

    let mut result = CmdResult::default();
    let summary = if explicit {
        format!(
            "Imported {} of {} row(s) into '{}'.",
            report.count, total, target_name
        )
    } else {
        format!(
            "Imported {} of {} row(s); rows without a category went to '{}'.",
            report.count, total, target_name
        )
    };
    result.add_message(CmdMessage::success(summary));
    for skipped in &report.skipped {
        result.add_message(CmdMessage::warning(format!(
            "Row {} skipped: {}",
            skipped.index + 1,
            skipped.reason
        )));
    }

    let missing = missing_columns(&headers, REQUIRED_COLUMNS);
    if !missing.is_empty() && report.count > 0 {
        let preview: Vec<_> = missing.iter().take(MISSING_PREVIEW).copied().collect();
        let more = missing.len().saturating_sub(MISSING_PREVIEW);
        let suffix = if more > 0 {
            format!(" and {} more", more)
        } else {
            String::new()
        };
        result.add_message(CmdMessage::info(format!(
            "{} standard column(s) not present: {}{}",
            missing.len(),
            preview.join(", "),
            suffix
        )));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    #[test]
    fn imports_rows_into_default_category() {
        let mut store = InMemoryStore::new();
        let result = run_rows(
            &mut store,
            json!([{"Full Name": "A"}, {"Full Name": "B"}]),
            None,
        )
        .unwrap();

        let records = store.list_records().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.to_record().category_id() == Some("default")));
        assert!(result.messages[0].content.contains("Imported 2 of 2"));
    }

    #[test]
    fn explicit_category_overrides_row_category() {
        let mut store = InMemoryStore::new();
        run_rows(
            &mut store,
            json!({"records": [{"Full Name": "A", "_categoryId": "states"}]}),
            Some("Complete Mails"),
        )
        .unwrap();

        let record = store.list_records().unwrap()[0].to_record();
        assert_eq!(record.category_id(), Some("emails"));
        assert_eq!(record.category_name(), Some("Complete Mails"));
    }

    #[test]
    fn rows_keep_their_own_category_without_override() {
        let mut store = InMemoryStore::new();
        run_rows(
            &mut store,
            json!([{"Full Name": "A", "_categoryId": "states", "_categoryName": "Indian States"}]),
            None,
        )
        .unwrap();

        let record = store.list_records().unwrap()[0].to_record();
        assert_eq!(record.category_id(), Some("states"));
    }

    #[test]
    fn summary_names_default_only_as_fallback() {
        let mut store = InMemoryStore::new();
        let result = run_rows(
            &mut store,
            json!([{"Full Name": "A", "_categoryId": "states"}, {"Full Name": "B"}]),
            None,
        )
        .unwrap();

        assert_eq!(
            result.messages[0].content,
            "Imported 2 of 2 row(s); rows without a category went to 'Default'."
        );
    }

    #[test]
    fn summary_names_the_explicit_category() {
        let mut store = InMemoryStore::new();
        let result = run_rows(&mut store, json!([{"Full Name": "A"}]), Some("states")).unwrap();
        assert_eq!(
            result.messages[0].content,
            "Imported 1 of 1 row(s) into 'Indian States'."
        );
    }

    #[test]
    fn invalid_rows_are_reported_not_fatal() {
        let mut store = InMemoryStore::new();
        let result = run_rows(&mut store, json!([{"a": "1"}, 42, "x"]), None).unwrap();

        assert_eq!(store.list_records().unwrap().len(), 1);
        let warnings: Vec<_> = result
            .messages
            .iter()
            .filter(|m| m.content.starts_with("Row"))
            .collect();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].content, "Row 2 skipped: Invalid record format");
    }

    #[test]
    fn non_array_input_is_rejected() {
        let mut store = InMemoryStore::new();
        assert!(run_rows(&mut store, json!({"rows": []}), None).is_err());
        assert!(run_rows(&mut store, json!("x"), None).is_err());
    }

    #[test]
    fn unknown_category_aborts_import() {
        let mut store = InMemoryStore::new();
        assert!(run_rows(&mut store, json!([{"a": "1"}]), Some("nope")).is_err());
        assert!(store.list_records().unwrap().is_empty());
    }
}
