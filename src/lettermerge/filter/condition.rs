//! Single-field conditions.
//!
//! A [`Condition`] is one `field operator value` predicate. Text operators
//! compare case-insensitively after trimming. Ordered operators parse both
//! sides as numbers and fail the predicate when either side is not a number.

use crate::model::Record;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorKind {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    InList,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Between,
}

impl OperatorKind {
    pub const ALL: &'static [OperatorKind] = &[
        OperatorKind::Equals,
        OperatorKind::Contains,
        OperatorKind::StartsWith,
        OperatorKind::EndsWith,
        OperatorKind::InList,
        OperatorKind::GreaterThan,
        OperatorKind::LessThan,
        OperatorKind::GreaterThanOrEqual,
        OperatorKind::LessThanOrEqual,
        OperatorKind::Between,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Equals => "equals",
            OperatorKind::Contains => "contains",
            OperatorKind::StartsWith => "startsWith",
            OperatorKind::EndsWith => "endsWith",
            OperatorKind::InList => "inList",
            OperatorKind::GreaterThan => "greaterThan",
            OperatorKind::LessThan => "lessThan",
            OperatorKind::GreaterThanOrEqual => "greaterThanOrEqual",
            OperatorKind::LessThanOrEqual => "lessThanOrEqual",
            OperatorKind::Between => "between",
        }
    }

    /// Human label, as offered in operator pickers.
    pub fn label(self) -> &'static str {
        match self {
            OperatorKind::Equals => "Equals",
            OperatorKind::Contains => "Contains",
            OperatorKind::StartsWith => "Starts With",
            OperatorKind::EndsWith => "Ends With",
            OperatorKind::InList => "In List",
            OperatorKind::GreaterThan => "Greater Than",
            OperatorKind::LessThan => "Less Than",
            OperatorKind::GreaterThanOrEqual => "Greater Than Or Equal",
            OperatorKind::LessThanOrEqual => "Less Than Or Equal",
            OperatorKind::Between => "Between",
        }
    }

    /// Whether the operator compares numerically.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            OperatorKind::GreaterThan
                | OperatorKind::LessThan
                | OperatorKind::GreaterThanOrEqual
                | OperatorKind::LessThanOrEqual
                | OperatorKind::Between
        )
    }
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorKind::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("Unknown operator: {}", s))
    }
}

/// One predicate on one field.
///
/// A condition without a field or without an operator matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub field: String,

    #[serde(default, deserialize_with = "blank_operator")]
    pub operator: Option<OperatorKind>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub value: String,

    /// Upper bound for `between`. Falls back to `value` when absent or empty.
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub value2: Option<String>,

    /// Accepted values for `inList`.
    #[serde(
        default,
        deserialize_with = "lenient_text_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub value_list: Vec<String>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: OperatorKind, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: Some(operator),
            value: value.into(),
            value2: None,
            value_list: Vec::new(),
        }
    }

    pub fn between(field: impl Into<String>, low: impl Into<String>, high: impl Into<String>) -> Self {
        Self {
            value2: Some(high.into()),
            ..Self::new(field, OperatorKind::Between, low)
        }
    }

    pub fn in_list<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            value_list: values.into_iter().map(Into::into).collect(),
            ..Self::new(field, OperatorKind::InList, "")
        }
    }

    /// True when the condition has no field or no operator and therefore
    /// filters nothing.
    pub fn is_blank(&self) -> bool {
        self.field.is_empty() || self.operator.is_none()
    }

    /// Evaluates this condition against one record.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(operator) = self.operator else {
            return true;
        };
        if self.field.is_empty() {
            return true;
        }

        let actual = record.text(&self.field).trim();
        let expected = self.value.trim().to_lowercase();

        match operator {
            OperatorKind::Equals => actual.to_lowercase() == expected,
            OperatorKind::Contains => actual.to_lowercase().contains(&expected),
            OperatorKind::StartsWith => actual.to_lowercase().starts_with(&expected),
            OperatorKind::EndsWith => actual.to_lowercase().ends_with(&expected),
            OperatorKind::InList => self.list_contains(actual),
            OperatorKind::GreaterThan => self.compare(actual, |a, b| a > b),
            OperatorKind::LessThan => self.compare(actual, |a, b| a < b),
            OperatorKind::GreaterThanOrEqual => self.compare(actual, |a, b| a >= b),
            OperatorKind::LessThanOrEqual => self.compare(actual, |a, b| a <= b),
            OperatorKind::Between => self.in_range(actual),
        }
    }

    fn list_contains(&self, actual: &str) -> bool {
        if self.value_list.is_empty() {
            return true;
        }
        let actual = actual.to_lowercase();
        self.value_list
            .iter()
            .any(|candidate| candidate.trim().to_lowercase() == actual)
    }

    fn compare(&self, actual: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
        match (parse_number(actual), parse_number(&self.value)) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => false,
        }
    }

    fn in_range(&self, actual: &str) -> bool {
        let upper = match self.value2.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => self.value.as_str(),
        };
        match (
            parse_number(actual),
            parse_number(&self.value),
            parse_number(upper),
        ) {
            (Some(n), Some(low), Some(high)) => n >= low && n <= high,
            _ => false,
        }
    }
}

/// Parses the leading number of `input` the way spreadsheet-sourced text
/// expects: leading whitespace is skipped and trailing text is ignored, so
/// `"2010 (approx.)"` reads as 2010. Returns `None` when no digits lead.
pub fn parse_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    if s[pos..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &s[frac_start..frac_end];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            pos = frac_end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut exponent = "";
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_end = pos + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            exponent = &s[pos + 1..exp_end];
        }
    }

    let mut normalized = String::with_capacity(pos + 4);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_digits);
    }
    if !exponent.is_empty() {
        normalized.push('e');
        normalized.push_str(exponent);
    }
    normalized.parse().ok()
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn blank_operator<'de, D>(deserializer: D) -> Result<Option<OperatorKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => OperatorKind::from_str(name)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(value_to_text)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(field: &str, value: &str) -> Record {
        Record::new().with(field, value)
    }

    #[test]
    fn blank_condition_matches_everything() {
        let blank = Condition::default();
        assert!(blank.matches(&Record::new()));
        assert!(blank.matches(&record("Full Name", "Asha Rao")));

        let no_operator = Condition {
            field: "Full Name".into(),
            value: "nobody".into(),
            ..Default::default()
        };
        assert!(no_operator.matches(&record("Full Name", "Asha Rao")));

        let no_field = Condition {
            operator: Some(OperatorKind::Equals),
            value: "nobody".into(),
            ..Default::default()
        };
        assert!(no_field.matches(&record("Full Name", "Asha Rao")));
    }

    #[test]
    fn text_operators_ignore_case_and_padding() {
        let r = record("Department", "  Computer Science ");

        assert!(Condition::new("Department", OperatorKind::Equals, "computer science ").matches(&r));
        assert!(Condition::new("Department", OperatorKind::Contains, "PUTER").matches(&r));
        assert!(Condition::new("Department", OperatorKind::StartsWith, "comp").matches(&r));
        assert!(Condition::new("Department", OperatorKind::EndsWith, "SCIENCE").matches(&r));
        assert!(!Condition::new("Department", OperatorKind::Equals, "computer").matches(&r));
    }

    #[test]
    fn missing_and_null_values_read_as_empty() {
        let empty_equals = Condition::new("District", OperatorKind::Equals, "");
        assert!(empty_equals.matches(&Record::new()));
        assert!(empty_equals.matches(&Record::new().with_null("District")));

        let contains = Condition::new("District", OperatorKind::Contains, "x");
        assert!(!contains.matches(&Record::new()));
    }

    #[test]
    fn in_list_is_case_insensitive_with_padded_entries() {
        let cond = Condition::in_list("State / UT", ["Kerala", " karnataka "]);

        assert!(cond.matches(&record("State / UT", "KARNATAKA")));
        assert!(cond.matches(&record("State / UT", " kerala")));
        assert!(!cond.matches(&record("State / UT", "Goa")));
    }

    #[test]
    fn empty_in_list_matches_everything() {
        let cond = Condition::in_list("State / UT", Vec::<String>::new());
        assert!(cond.matches(&record("State / UT", "Goa")));
        assert!(cond.matches(&Record::new()));
    }

    #[test]
    fn between_is_inclusive() {
        let cond = Condition::between("Year Established", "2000", "2020");

        assert!(cond.matches(&record("Year Established", "2010")));
        assert!(cond.matches(&record("Year Established", "2000")));
        assert!(cond.matches(&record("Year Established", "2020")));
        assert!(!cond.matches(&record("Year Established", "1999")));
        assert!(!cond.matches(&record("Year Established", "2021")));
    }

    #[test]
    fn between_without_upper_bound_is_a_single_point() {
        let mut cond = Condition::new("Year Established", OperatorKind::Between, "2010");
        assert!(cond.matches(&record("Year Established", "2010")));
        assert!(!cond.matches(&record("Year Established", "2011")));

        cond.value2 = Some(String::new());
        assert!(cond.matches(&record("Year Established", "2010")));
        assert!(!cond.matches(&record("Year Established", "2009")));
    }

    #[test]
    fn non_numeric_values_fail_every_numeric_operator() {
        let r = record("Year Established", "abc");
        for op in [
            OperatorKind::GreaterThan,
            OperatorKind::LessThan,
            OperatorKind::GreaterThanOrEqual,
            OperatorKind::LessThanOrEqual,
        ] {
            assert!(!Condition::new("Year Established", op, "2000").matches(&r));
        }
        assert!(!Condition::between("Year Established", "0", "9999").matches(&r));

        // Non-numeric condition value fails too.
        let bad_bound = Condition::new("Year Established", OperatorKind::GreaterThan, "soon");
        assert!(!bad_bound.matches(&record("Year Established", "2010")));
    }

    #[test]
    fn ordered_comparisons() {
        let r = record("Experience (Years)", "12");
        let cond = |op, v: &str| Condition::new("Experience (Years)", op, v).matches(&r);

        assert!(cond(OperatorKind::GreaterThan, "10"));
        assert!(!cond(OperatorKind::GreaterThan, "12"));
        assert!(cond(OperatorKind::GreaterThanOrEqual, "12"));
        assert!(cond(OperatorKind::LessThan, "12.5"));
        assert!(cond(OperatorKind::LessThanOrEqual, "12"));
        assert!(!cond(OperatorKind::LessThanOrEqual, "11.99"));
    }

    #[test]
    fn equals_on_a_numeric_field_compares_text() {
        let cond = Condition::new("Postal Code", OperatorKind::Equals, "682001");
        assert!(cond.matches(&record("Postal Code", " 682001 ")));
        assert!(!cond.matches(&record("Postal Code", "682001.0")));
    }

    #[test]
    fn parse_number_reads_the_leading_number() {
        assert_eq!(parse_number("2010"), Some(2010.0));
        assert_eq!(parse_number("  42.5kg"), Some(42.5));
        assert_eq!(parse_number("2010 (approx.)"), Some(2010.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("+7"), Some(7.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("1e"), Some(1.0));
        assert_eq!(parse_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn parse_number_rejects_non_numbers() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("approx 2010"), None);
    }

    #[test]
    fn deserializes_ui_shaped_json() {
        let cond: Condition = serde_json::from_str(
            r#"{"id": 3, "field": "Year Established", "operator": "between", "value": 2000, "value2": "2020"}"#,
        )
        .unwrap();
        assert_eq!(cond.operator, Some(OperatorKind::Between));
        assert_eq!(cond.value, "2000");
        assert_eq!(cond.value2.as_deref(), Some("2020"));

        let cond: Condition = serde_json::from_str(
            r#"{"field": "State / UT", "operator": "inList", "value": "", "valueList": ["Kerala", 7]}"#,
        )
        .unwrap();
        assert_eq!(cond.value_list, vec!["Kerala", "7"]);
    }

    #[test]
    fn blank_operator_deserializes_as_none() {
        let cond: Condition =
            serde_json::from_str(r#"{"field": "", "operator": "", "value": ""}"#).unwrap();
        assert!(cond.is_blank());
        assert!(cond.operator.is_none());
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = serde_json::from_str::<Condition>(
            r#"{"field": "Full Name", "operator": "containz", "value": "a"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown operator"));
    }

    #[test]
    fn operator_names_round_trip_through_from_str() {
        for op in OperatorKind::ALL {
            assert_eq!(OperatorKind::from_str(op.as_str()).unwrap(), *op);
        }
    }
}
