use crate::commands::{CmdMessage, CmdResult, DisplayRecord};
use crate::error::Result;
use crate::filter::{apply_refs, FilterContext};
use crate::model::Record;
use crate::store::DataStore;
use std::collections::HashSet;
use std::path::Path;

use super::helpers::indexed_records;

/// Reads a filter context saved as JSON. Unknown operators fail here rather
/// than silently matching.
pub fn load_context(path: &Path) -> Result<FilterContext> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Records that pass `ctx`, newest first, with their listing indexes.
pub fn matching<S: DataStore>(store: &S, ctx: &FilterContext) -> Result<Vec<DisplayRecord>> {
    let indexed = indexed_records(store)?;
    let records: Vec<Record> = indexed.iter().map(|dr| dr.record.clone()).collect();

    let kept: HashSet<&str> = apply_refs(&records, ctx)
        .into_iter()
        .filter_map(Record::id)
        .collect();

    let matched: Vec<DisplayRecord> = indexed
        .iter()
        .filter(|dr| dr.record.id().is_some_and(|id| kept.contains(id)))
        .cloned()
        .collect();
    Ok(matched)
}

/// Preview of the records a filter selects.
pub fn run<S: DataStore>(store: &S, ctx: &FilterContext) -> Result<CmdResult> {
    let total = store.list_records()?.len();
    let matched = matching(store, ctx)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "{} of {} record(s) match.",
        matched.len(),
        total
    )));
    Ok(result.with_listed_records(matched))
}
