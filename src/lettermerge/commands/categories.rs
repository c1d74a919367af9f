use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;

use super::helpers::snapshot;

/// Categories with their record counts.
pub fn list<S: DataStore>(store: &S) -> Result<CmdResult> {
    let registry = store.load_categories()?;
    let records = snapshot(store)?;
    let counts = registry.counts(&records);

    let mut result = CmdResult::default();
    if counts.dangling > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} record(s) point at a deleted category.",
            counts.dangling
        )));
    }
    result.category_counts = Some(counts);
    Ok(result)
}

pub fn add<S: DataStore>(store: &mut S, name: &str, kind: Option<&str>) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::error::MergeError::Api(
            "Category name cannot be empty".to_string(),
        ));
    }

    let mut registry = store.load_categories()?;
    let id = registry.add(name, kind);
    store.save_categories(&registry)?;
    tracing::info!(%id, name, "category added");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Category created: {} ({})",
        name, id
    )));
    Ok(result)
}

/// Renames a category. Records keep the name they were assigned with.
pub fn rename<S: DataStore>(store: &mut S, id_or_name: &str, new_name: &str) -> Result<CmdResult> {
    let mut registry = store.load_categories()?;
    let id = registry.resolve(id_or_name)?.0.to_string();
    registry.rename(&id, new_name.trim())?;
    store.save_categories(&registry)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Category {} renamed to {}",
        id,
        new_name.trim()
    )));
    Ok(result)
}

/// Deletes a category. Its records are not touched and keep pointing at
/// the removed id.
pub fn delete<S: DataStore>(store: &mut S, id_or_name: &str) -> Result<CmdResult> {
    let mut registry = store.load_categories()?;
    let id = registry.resolve(id_or_name)?.0.to_string();
    let removed = registry.delete(&id)?;
    store.save_categories(&registry)?;
    tracing::info!(%id, "category deleted");

    let still_pointing = snapshot(store)?
        .iter()
        .filter(|r| r.category_id() == Some(id.as_str()))
        .count();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Category deleted: {}",
        removed.name
    )));
    if still_pointing > 0 {
        result.add_message(CmdMessage::info(format!(
            "{} record(s) still reference it; use `delete --category {}` to remove them.",
            still_pointing, id
        )));
    }
    Ok(result)
}
