use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::CategorySelection;
use crate::store::DataStore;
use uuid::Uuid;

use super::helpers::{label, records_by_selectors, RecordSelector};

pub fn run<S: DataStore>(store: &mut S, selectors: &[RecordSelector]) -> Result<CmdResult> {
    let records = records_by_selectors(store, selectors)?;
    let mut result = CmdResult::default();

    for dr in records {
        let Some(id) = dr.record.id().and_then(|id| Uuid::parse_str(id).ok()) else {
            continue;
        };
        store.delete(&id)?;
        result.add_message(CmdMessage::success(format!(
            "Record deleted ({}): {}",
            dr.index,
            label(&dr.record)
        )));
        result.affected_records.push(dr.record);
    }

    Ok(result)
}

/// Deletes every record in a category, or every uncategorized record.
pub fn run_category<S: DataStore>(store: &mut S, selection: &CategorySelection) -> Result<CmdResult> {
    let ids: Vec<Uuid> = store
        .list_records()?
        .into_iter()
        .filter(|r| selection.matches(&r.to_record()))
        .map(|r| r.id)
        .collect();

    let removed = store.delete_records(&ids)?;
    tracing::info!(removed, category = selection.as_str(), "bulk delete");

    let what = match selection {
        CategorySelection::Uncategorized => "uncategorized".to_string(),
        CategorySelection::Id(id) => {
            let registry = store.load_categories()?;
            registry
                .get(id)
                .map(|c| format!("'{}'", c.name))
                .unwrap_or_else(|| format!("'{}'", id))
        }
    };

    let mut result = CmdResult::default();
    if removed == 0 {
        result.add_message(CmdMessage::info(format!("No {} records to delete.", what)));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Deleted {} {} record(s).",
            removed, what
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn deletes_selected_records() {
        let mut fixture = StoreFixture::new().with_faculty();
        let result = run(
            &mut fixture.store,
            &[RecordSelector::Index(1), RecordSelector::Index(3)],
        )
        .unwrap();

        assert_eq!(result.affected_records.len(), 2);
        let left = fixture.store.list_records().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].data["Full Name"], Some("Bimal Sen".into()));
    }

    #[test]
    fn deletes_a_whole_category() {
        let mut fixture = StoreFixture::new().with_faculty();
        let result = run_category(
            &mut fixture.store,
            &CategorySelection::Id("states".into()),
        )
        .unwrap();

        assert_eq!(fixture.store.list_records().unwrap().len(), 2);
        assert!(result.messages[0].content.contains("Indian States"));
    }

    #[test]
    fn deletes_uncategorized_only() {
        let mut fixture = StoreFixture::new().with_faculty();
        run_category(&mut fixture.store, &CategorySelection::Uncategorized).unwrap();

        let left = fixture.store.list_records().unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|r| !r.to_record().is_uncategorized()));
    }

    #[test]
    fn empty_category_reports_nothing_deleted() {
        let mut fixture = StoreFixture::new().with_faculty();
        let result =
            run_category(&mut fixture.store, &CategorySelection::Id("emails".into())).unwrap();
        assert!(result.messages[0].content.starts_with("No"));
        assert_eq!(fixture.store.list_records().unwrap().len(), 3);
    }
}
