use crate::commands::{CmdMessage, CmdResult, DisplayRecord};
use crate::error::Result;
use crate::filter::CategorySelection;
use crate::store::DataStore;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::helpers::indexed_records;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    /// Parses `field` or `field:desc` / `field:asc`.
    pub fn parse(input: &str) -> Self {
        match input.rsplit_once(':') {
            Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => Self {
                field: field.to_string(),
                descending: true,
            },
            Some((field, dir)) if dir.eq_ignore_ascii_case("asc") => Self {
                field: field.to_string(),
                descending: false,
            },
            _ => Self {
                field: input.to_string(),
                descending: false,
            },
        }
    }
}

/// Directory listing options. Everything is optional; an empty query lists
/// all records newest first.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Free text matched against the whole serialized record.
    pub search: Option<String>,
    pub category: Option<CategorySelection>,
    /// `(field, text)` pairs; each keeps records whose field contains the
    /// text, ignoring case.
    pub column_filters: Vec<(String, String)>,
    pub sort: Option<SortSpec>,
}

pub fn run<S: DataStore>(store: &S, query: &ListQuery) -> Result<CmdResult> {
    let mut records = indexed_records(store)?;
    let total = records.len();

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let hits: HashSet<String> = store
            .list(Some(search))?
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        records.retain(|dr| dr.record.id().is_some_and(|id| hits.contains(id)));
    }

    if let Some(selection) = &query.category {
        records.retain(|dr| selection.matches(&dr.record));
    }

    for (field, text) in &query.column_filters {
        let needle = text.to_lowercase();
        if needle.is_empty() {
            continue;
        }
        records.retain(|dr| dr.record.text(field).to_lowercase().contains(&needle));
    }

    if let Some(sort) = &query.sort {
        sort_records(&mut records, sort);
    }

    tracing::debug!(total, shown = records.len(), "listing records");

    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info(if total == 0 {
            "No records yet."
        } else {
            "No records match."
        }));
    }
    Ok(result.with_listed_records(records))
}

fn sort_records(records: &mut [DisplayRecord], sort: &SortSpec) {
    records.sort_by(|a, b| {
        let ordering = compare_text(a.record.text(&sort.field), b.record.text(&sort.field));
        if sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Case-insensitive first, then exact, so "apple" sorts next to "Apple".
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
