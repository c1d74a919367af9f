use crate::commands::CmdResult;
use crate::error::Result;
use crate::normalize::{normalize, REQUIRED_COLUMNS};
use crate::store::DataStore;

use super::helpers::{records_by_selectors, RecordSelector};

/// Full records for the selected entries, with fields in canonical order.
pub fn run<S: DataStore>(store: &S, selectors: &[RecordSelector]) -> Result<CmdResult> {
    let mut records = records_by_selectors(store, selectors)?;
    for dr in &mut records {
        dr.record = normalize(&dr.record, REQUIRED_COLUMNS);
    }
    Ok(CmdResult::default().with_listed_records(records))
}
