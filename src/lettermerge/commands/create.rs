use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MergeError, Result};
use crate::model::{RecordData, StoredRecord};
use crate::store::DataStore;

use super::helpers::{assign_category, label, short_id};

pub fn run<S: DataStore>(
    store: &mut S,
    data: RecordData,
    category: Option<&str>,
) -> Result<CmdResult> {
    if data.is_empty() {
        return Err(MergeError::Api("A record needs at least one field".to_string()));
    }

    let mut record = StoredRecord::new(data);
    if let Some(category) = category {
        assign_category(store, &mut record, category)?;
    }
    store.save_record(&record)?;
    tracing::info!(id = %record.id, "record created");

    let flat = record.to_record();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Record created ({}): {}",
        short_id(&record.id),
        label(&flat)
    )));
    Ok(result.with_affected_records(vec![flat]))
}
