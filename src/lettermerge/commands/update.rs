use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MergeError, Result};
use crate::model::RecordData;
use crate::store::DataStore;

use super::helpers::{assign_category, label, resolve_selectors, RecordSelector};

/// Merges `data` into each selected record and optionally re-assigns its
/// category. Fields not mentioned are kept.
pub fn run<S: DataStore>(
    store: &mut S,
    selectors: &[RecordSelector],
    data: RecordData,
    category: Option<&str>,
) -> Result<CmdResult> {
    if data.is_empty() && category.is_none() {
        return Err(MergeError::Api(
            "Nothing to update: give key=value pairs or a category".to_string(),
        ));
    }

    let resolved = resolve_selectors(store, selectors)?;
    let mut result = CmdResult::default();

    for (index, id) in resolved {
        let mut record = store.get_record(&id)?;
        record.merge(data.clone());
        if let Some(category) = category {
            assign_category(store, &mut record, category)?;
        }
        store.save_record(&record)?;
        tracing::info!(id = %id, "record updated");

        let flat = record.to_record();
        result.add_message(CmdMessage::success(format!(
            "Record updated ({}): {}",
            index,
            label(&flat)
        )));
        result.affected_records.push(flat);
    }

    Ok(result)
}
