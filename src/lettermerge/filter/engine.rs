use super::FilterGroup;
use crate::model::Record;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Pseudo category id that selects records without a category.
pub const UNCATEGORIZED: &str = "_uncategorized";

/// Columns searched when picking recipients for a letter.
pub const LETTER_SEARCH_COLUMNS: &[&str] = &[
    "University Name",
    "Full Name",
    "Department",
    "Subjects Taught",
    "Specialization",
    "Research Area",
    "City / Campus",
    "District",
    "State / UT",
];

/// Columns searched when browsing the record directory.
pub const DIRECTORY_SEARCH_COLUMNS: &[&str] = &[
    "Organization Name",
    "University Name",
    "Full Name",
    "Department",
    "Subjects Taught",
    "Specialization",
    "Research Area",
    "City / Campus",
    "District",
    "State / UT",
];

/// Which fixed column set the global search looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchColumns {
    #[default]
    Letters,
    Directory,
}

impl SearchColumns {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            SearchColumns::Letters => LETTER_SEARCH_COLUMNS,
            SearchColumns::Directory => DIRECTORY_SEARCH_COLUMNS,
        }
    }
}

/// A single-category selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection {
    /// Records with no `_categoryId`.
    Uncategorized,
    /// Records whose `_categoryId` equals this id exactly.
    Id(String),
}

impl CategorySelection {
    pub fn parse(id: &str) -> Self {
        if id == UNCATEGORIZED {
            CategorySelection::Uncategorized
        } else {
            CategorySelection::Id(id.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategorySelection::Uncategorized => UNCATEGORIZED,
            CategorySelection::Id(id) => id,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            CategorySelection::Uncategorized => record.is_uncategorized(),
            CategorySelection::Id(id) => record.category_id() == Some(id.as_str()),
        }
    }
}

impl Serialize for CategorySelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategorySelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(CategorySelection::parse(&id))
    }
}

/// Everything a filter pass needs, passed by value instead of living in
/// UI state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterContext {
    #[serde(default, deserialize_with = "blank_selection")]
    pub selected_category: Option<CategorySelection>,

    /// Multi-select; wins over `selected_category` when non-empty.
    #[serde(default)]
    pub selected_categories: Vec<String>,

    #[serde(default)]
    pub global_search: String,

    #[serde(default)]
    pub search_columns: SearchColumns,

    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, selection: CategorySelection) -> Self {
        self.selected_category = Some(selection);
        self
    }

    pub fn with_categories<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_categories = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.global_search = search.into();
        self
    }

    pub fn with_search_columns(mut self, columns: SearchColumns) -> Self {
        self.search_columns = columns;
        self
    }

    pub fn with_group(mut self, group: FilterGroup) -> Self {
        self.filter_groups.push(group);
        self
    }

    /// Whether any stage would narrow the record set.
    pub fn is_active(&self) -> bool {
        !self.selected_categories.is_empty()
            || self.selected_category.is_some()
            || !self.global_search.trim().is_empty()
            || self.groups_active()
    }

    fn groups_active(&self) -> bool {
        self.filter_groups.iter().any(FilterGroup::has_field)
    }

    fn category_matches(&self, record: &Record) -> bool {
        if !self.selected_categories.is_empty() {
            return record
                .category_id()
                .is_some_and(|id| self.selected_categories.iter().any(|s| s == id));
        }
        match &self.selected_category {
            Some(selection) => selection.matches(record),
            None => true,
        }
    }

    fn search_matches(&self, record: &Record, needle: &str) -> bool {
        self.search_columns
            .columns()
            .iter()
            .any(|col| record.text(col).to_lowercase().contains(needle))
    }

    fn groups_match(&self, record: &Record) -> bool {
        self.filter_groups.iter().all(|g| g.matches(record))
    }
}

/// Runs the category, search and group stages over `records`, in that
/// order, keeping the input order of the survivors.
pub fn apply(records: &[Record], ctx: &FilterContext) -> Vec<Record> {
    apply_refs(records, ctx).into_iter().cloned().collect()
}

/// Like [`apply`], borrowing instead of cloning.
pub fn apply_refs<'a>(records: &'a [Record], ctx: &FilterContext) -> Vec<&'a Record> {
    let mut result: Vec<&Record> = records
        .iter()
        .filter(|r| ctx.category_matches(r))
        .collect();
    tracing::debug!(
        input = records.len(),
        kept = result.len(),
        "category stage"
    );

    if !ctx.global_search.trim().is_empty() {
        let needle = ctx.global_search.to_lowercase();
        result.retain(|r| ctx.search_matches(r, &needle));
        tracing::debug!(kept = result.len(), search = %ctx.global_search, "search stage");
    }

    if ctx.groups_active() {
        result.retain(|r| ctx.groups_match(r));
        tracing::debug!(
            kept = result.len(),
            groups = ctx.filter_groups.len(),
            "group stage"
        );
    }

    result
}

fn blank_selection<'de, D>(deserializer: D) -> Result<Option<CategorySelection>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|id| !id.is_empty())
        .map(|id| CategorySelection::parse(&id)))
}
