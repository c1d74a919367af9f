//! Letter templates and `{{field}}` substitution.
//!
//! A [`Template`] has three parts (subject, recipient, body), each of which
//! may contain `{{Field Name}}` placeholders. Resolving a template against a
//! record yields a [`Letter`], which the renderers in [`render`] turn into
//! files.

pub mod render;

use crate::error::{MergeError, Result};
use crate::model::{is_internal_key, Record};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Replaces `{{key}}` with the record's value for every non-internal key.
///
/// Keys are visited in record order and every occurrence is replaced. Null
/// and missing values become the empty string. Placeholders naming fields
/// the record lacks are left as they are. Matching is exact: no trimming, no
/// case folding.
pub fn interpolate(template: &str, record: &Record) -> String {
    let mut result = template.to_string();
    for (key, value) in record.iter() {
        if is_internal_key(key) {
            continue;
        }
        let placeholder = format!("{{{{{}}}}}", key);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, value.unwrap_or(""));
        }
    }
    result
}

/// Placeholder names used in `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = &after[..end];
        if name.contains("{{") {
            rest = after;
            continue;
        }
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &after[end + 2..];
    }
    names
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub body: String,
}

/// A template resolved against one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Letter {
    pub subject: String,
    pub to: String,
    pub body: String,
}

impl Template {
    pub fn new(
        subject: impl Into<String>,
        to: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            to: to.into(),
            body: body.into(),
        }
    }

    /// Reads a template from a JSON file with `subject`, `to` and `body`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// A template with a blank body can't produce anything useful.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(MergeError::Api("Template body is empty".to_string()));
        }
        Ok(())
    }

    pub fn resolve(&self, record: &Record) -> Letter {
        Letter {
            subject: interpolate(&self.subject, record),
            to: interpolate(&self.to, record),
            body: interpolate(&self.body, record),
        }
    }

    /// Placeholders across all three parts that `record` can't fill.
    pub fn unresolved(&self, record: &Record) -> Vec<String> {
        let mut names = placeholders(&self.subject);
        for part in [&self.to, &self.body] {
            for name in placeholders(part) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names.retain(|name| is_internal_key(name) || !record.contains_key(name));
        names
    }
}
