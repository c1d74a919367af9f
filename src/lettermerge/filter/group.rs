use super::Condition;
use crate::model::Record;
use serde::{Deserialize, Serialize};

/// How the conditions inside one group combine.
///
/// Only the exact string `"AND"` selects conjunction; every other value is
/// read as `OR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GroupLogic {
    #[default]
    And,
    Or,
}

impl From<String> for GroupLogic {
    fn from(value: String) -> Self {
        if value == "AND" {
            GroupLogic::And
        } else {
            GroupLogic::Or
        }
    }
}

impl From<GroupLogic> for String {
    fn from(logic: GroupLogic) -> Self {
        logic.to_string()
    }
}

impl std::fmt::Display for GroupLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupLogic::And => write!(f, "AND"),
            GroupLogic::Or => write!(f, "OR"),
        }
    }
}

/// A set of conditions joined by one logic operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub logic: GroupLogic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl FilterGroup {
    pub fn new(logic: GroupLogic) -> Self {
        Self {
            id: 0,
            logic,
            conditions: Vec::new(),
        }
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            ..Self::new(GroupLogic::And)
        }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            ..Self::new(GroupLogic::Or)
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// True when at least one condition names a field.
    pub fn has_field(&self) -> bool {
        self.conditions.iter().any(|c| !c.field.is_empty())
    }

    /// Evaluates the group against one record. An empty group matches.
    pub fn matches(&self, record: &Record) -> bool {
        if self.conditions.is_empty() {
            return true;
        }

        let mut results = self.conditions.iter().map(|c| c.matches(record));
        match self.logic {
            GroupLogic::And => results.all(|matched| matched),
            GroupLogic::Or => results.any(|matched| matched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::OperatorKind;

    fn asha() -> Record {
        Record::new()
            .with("Full Name", "Asha Rao")
            .with("State / UT", "Kerala")
    }

    fn hit() -> Condition {
        Condition::new("Full Name", OperatorKind::Contains, "asha")
    }

    fn miss() -> Condition {
        Condition::new("State / UT", OperatorKind::Equals, "Goa")
    }

    #[test]
    fn empty_group_matches() {
        assert!(FilterGroup::and(vec![]).matches(&asha()));
        assert!(FilterGroup::or(vec![]).matches(&asha()));
    }

    #[test]
    fn and_requires_every_condition() {
        let r = asha();
        for (a, b) in [(hit(), hit()), (hit(), miss()), (miss(), hit()), (miss(), miss())] {
            let expected = a.matches(&r) && b.matches(&r);
            assert_eq!(FilterGroup::and(vec![a, b]).matches(&r), expected);
        }
    }

    #[test]
    fn or_requires_any_condition() {
        let r = asha();
        for (a, b) in [(hit(), hit()), (hit(), miss()), (miss(), hit()), (miss(), miss())] {
            let expected = a.matches(&r) || b.matches(&r);
            assert_eq!(FilterGroup::or(vec![a, b]).matches(&r), expected);
        }
    }

    #[test]
    fn blank_condition_inside_and_group_is_neutral() {
        let group = FilterGroup::and(vec![hit(), Condition::default()]);
        assert!(group.matches(&asha()));
    }

    #[test]
    fn blank_condition_inside_or_group_matches_everything() {
        let group = FilterGroup::or(vec![miss(), Condition::default()]);
        assert!(group.matches(&asha()));
    }

    #[test]
    fn anything_but_and_is_or() {
        let group: FilterGroup = serde_json::from_str(
            r#"{"id": 1, "logic": "and", "conditions": []}"#,
        )
        .unwrap();
        assert_eq!(group.logic, GroupLogic::Or);

        let group: FilterGroup =
            serde_json::from_str(r#"{"id": 2, "logic": "AND"}"#).unwrap();
        assert_eq!(group.logic, GroupLogic::And);
    }

    #[test]
    fn has_field_ignores_blank_conditions() {
        assert!(!FilterGroup::and(vec![Condition::default()]).has_field());
        assert!(FilterGroup::and(vec![Condition::default(), miss()]).has_field());
    }
}
