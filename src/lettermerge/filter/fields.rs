//! Field typing and discovery.
//!
//! Records carry no schema. A field's type is derived from its name, and the
//! set of known fields is whatever the loaded records happen to contain.

use super::OperatorKind;
use crate::model::{is_internal_key, Record, CREATED_AT_KEY, ID_KEY, UPDATED_AT_KEY};
use std::collections::BTreeSet;

/// Field names that hold numbers. Matched case-insensitively as substrings,
/// so "Postal Code (Campus)" is numeric too.
pub const NUMERIC_FIELDS: &[&str] = &["Year Established", "Experience (Years)", "Postal Code"];

const TEXT_OPERATORS: &[OperatorKind] = &[
    OperatorKind::Equals,
    OperatorKind::Contains,
    OperatorKind::StartsWith,
    OperatorKind::EndsWith,
    OperatorKind::InList,
];

const NUMBER_OPERATORS: &[OperatorKind] = &[
    OperatorKind::Equals,
    OperatorKind::GreaterThan,
    OperatorKind::LessThan,
    OperatorKind::GreaterThanOrEqual,
    OperatorKind::LessThanOrEqual,
    OperatorKind::Between,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Number,
}

impl FieldType {
    /// Classifies a field by name. Unknown fields are text.
    pub fn classify(field_name: &str) -> Self {
        let lower = field_name.to_lowercase();
        if NUMERIC_FIELDS
            .iter()
            .any(|numeric| lower.contains(&numeric.to_lowercase()))
        {
            FieldType::Number
        } else {
            FieldType::Text
        }
    }

    /// Operators offered for this field type, in display order.
    pub fn operators(self) -> &'static [OperatorKind] {
        match self {
            FieldType::Text => TEXT_OPERATORS,
            FieldType::Number => NUMBER_OPERATORS,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Number => write!(f, "number"),
        }
    }
}

/// All user-visible field names across `records`, in first-seen order.
///
/// Store bookkeeping (`id`, timestamps) and internal `_` fields are left out.
pub fn field_names(records: &[Record]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::new();
    for record in records {
        for key in record.keys() {
            if key == ID_KEY || key == CREATED_AT_KEY || key == UPDATED_AT_KEY {
                continue;
            }
            if is_internal_key(key) {
                continue;
            }
            if seen.insert(key) {
                names.push(key.to_string());
            }
        }
    }
    names
}

/// Distinct non-blank values of `field`, trimmed and sorted. These are the
/// candidates offered for an `inList` condition.
pub fn unique_values(records: &[Record], field: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get(field))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_numeric_fields_by_substring() {
        assert_eq!(FieldType::classify("Year Established"), FieldType::Number);
        assert_eq!(FieldType::classify("postal code"), FieldType::Number);
        assert_eq!(
            FieldType::classify("Campus Postal Code (Main)"),
            FieldType::Number
        );
        assert_eq!(FieldType::classify("Experience (Years)"), FieldType::Number);
    }

    #[test]
    fn unknown_fields_are_text() {
        assert_eq!(FieldType::classify("Full Name"), FieldType::Text);
        assert_eq!(FieldType::classify(""), FieldType::Text);
        assert_eq!(FieldType::classify("Experience"), FieldType::Text);
    }

    #[test]
    fn operator_sets_differ_by_type() {
        assert!(FieldType::Text.operators().contains(&OperatorKind::InList));
        assert!(!FieldType::Text.operators().contains(&OperatorKind::Between));
        assert!(FieldType::Number
            .operators()
            .contains(&OperatorKind::Between));
        assert!(FieldType::Number.operators().contains(&OperatorKind::Equals));
    }

    #[test]
    fn field_names_skip_bookkeeping_and_keep_first_seen_order() {
        let records = vec![
            Record::new()
                .with("id", "1")
                .with("Full Name", "A")
                .with("_categoryId", "states"),
            Record::new()
                .with("District", "Ernakulam")
                .with("Full Name", "B")
                .with("createdAt", "2024-01-01T00:00:00Z"),
        ];

        assert_eq!(field_names(&records), vec!["Full Name", "District"]);
    }

    #[test]
    fn unique_values_are_trimmed_sorted_and_distinct() {
        let records = vec![
            Record::new().with("State / UT", " Kerala "),
            Record::new().with("State / UT", "Karnataka"),
            Record::new().with("State / UT", "Kerala"),
            Record::new().with("State / UT", "  "),
            Record::new().with_null("State / UT"),
            Record::new(),
        ];

        assert_eq!(
            unique_values(&records, "State / UT"),
            vec!["Karnataka", "Kerala"]
        );
    }
}
