use crate::error::{MergeError, Result};
use crate::model::Record;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY_ID: &str = "default";

/// Built-in categories. They can be renamed but never deleted.
pub const BUILTIN_CATEGORIES: &[(&str, &str)] = &[
    ("default", "Default"),
    ("states", "Indian States"),
    ("universities", "Universities"),
    ("emails", "Complete Mails"),
];

const CUSTOM_KIND: &str = "custom";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(rename = "type", default = "custom_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn custom_kind() -> String {
    CUSTOM_KIND.to_string()
}

impl Category {
    fn builtin(id: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: id.to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

pub fn is_builtin(id: &str) -> bool {
    BUILTIN_CATEGORIES.iter().any(|(builtin, _)| *builtin == id)
}

/// Record counts per category, as shown on the category dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    /// `(id, name, count)` in registry order.
    pub categories: Vec<(String, String, usize)>,
    pub uncategorized: usize,
    /// Records pointing at an id the registry no longer has.
    pub dangling: usize,
}

/// Category id to category, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRegistry {
    categories: IndexMap<String, Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            categories: BUILTIN_CATEGORIES
                .iter()
                .map(|(id, name)| (id.to_string(), Category::builtin(id, name)))
                .collect(),
        }
    }
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.categories.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(id, c)| (id.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Looks up a category by id, or failing that by exact name.
    pub fn resolve(&self, id_or_name: &str) -> Result<(&str, &Category)> {
        if let Some((_, id, category)) = self.categories.get_full(id_or_name) {
            return Ok((id.as_str(), category));
        }
        self.iter()
            .find(|(_, c)| c.name == id_or_name)
            .ok_or_else(|| MergeError::CategoryNotFound(id_or_name.to_string()))
    }

    /// Adds a custom category and returns its generated id.
    pub fn add(&mut self, name: &str, kind: Option<&str>) -> String {
        let now = Utc::now();
        let mut millis = now.timestamp_millis();
        let mut id = format!("custom_{}", millis);
        while self.categories.contains_key(&id) {
            millis += 1;
            id = format!("custom_{}", millis);
        }

        self.categories.insert(
            id.clone(),
            Category {
                name: name.to_string(),
                kind: kind.unwrap_or(CUSTOM_KIND).to_string(),
                created_at: Some(now),
                updated_at: None,
            },
        );
        id
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        let category = self
            .categories
            .get_mut(id)
            .ok_or_else(|| MergeError::CategoryNotFound(id.to_string()))?;
        category.name = name.to_string();
        category.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Removes a category. Records that point at it are left alone.
    pub fn delete(&mut self, id: &str) -> Result<Category> {
        if is_builtin(id) {
            return Err(MergeError::ProtectedCategory(id.to_string()));
        }
        self.categories
            .shift_remove(id)
            .ok_or_else(|| MergeError::CategoryNotFound(id.to_string()))
    }

    pub fn counts(&self, records: &[Record]) -> CategoryCounts {
        let mut per: IndexMap<&str, usize> = self.categories.keys().map(|id| (id.as_str(), 0)).collect();
        let mut counts = CategoryCounts::default();

        for record in records {
            match record.category_id() {
                None => counts.uncategorized += 1,
                Some(id) => match per.get_mut(id) {
                    Some(n) => *n += 1,
                    None => counts.dangling += 1,
                },
            }
        }

        counts.categories = per
            .into_iter()
            .map(|(id, n)| {
                let name = self.categories[id].name.clone();
                (id.to_string(), name, n)
            })
            .collect();
        counts
    }
}
