use crate::commands::{CmdMessage, CmdResult, FieldInfo};
use crate::error::Result;
use crate::filter::{field_names, unique_values, FieldType};
use crate::store::DataStore;

use super::helpers::snapshot;

/// Without a field: every known field name and its type. With a field: the
/// distinct values it takes, as offered for an `inList` condition.
pub fn run<S: DataStore>(store: &S, field: Option<&str>) -> Result<CmdResult> {
    let records = snapshot(store)?;
    let mut result = CmdResult::default();

    match field {
        None => {
            result.fields = field_names(&records)
                .into_iter()
                .map(|name| FieldInfo {
                    field_type: FieldType::classify(&name),
                    name,
                })
                .collect();
            if result.fields.is_empty() {
                result.add_message(CmdMessage::info("No fields yet. Import some records first."));
            }
        }
        Some(field) => {
            result.values = unique_values(&records, field);
            if result.values.is_empty() {
                result.add_message(CmdMessage::info(format!("No values for '{}'.", field)));
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn lists_fields_with_types() {
        let fixture = StoreFixture::new().with_faculty();
        let result = run(&fixture.store, None).unwrap();

        let year = result
            .fields
            .iter()
            .find(|f| f.name == "Year Established")
            .unwrap();
        assert_eq!(year.field_type, FieldType::Number);
        assert!(result.fields.iter().all(|f| !f.name.starts_with('_')));
        assert!(result.fields.iter().all(|f| f.name != "id"));
    }

    #[test]
    fn lists_unique_values_for_a_field() {
        let fixture = StoreFixture::new().with_faculty();
        let result = run(&fixture.store, Some("State / UT")).unwrap();
        assert_eq!(result.values, vec!["Goa", "Kerala", "Tamil Nadu"]);
    }

    #[test]
    fn blank_values_are_left_out() {
        let fixture = StoreFixture::new().with_faculty();
        let result = run(&fixture.store, Some("Official Email")).unwrap();
        assert_eq!(result.values.len(), 2);
    }

    #[test]
    fn empty_store_has_no_fields() {
        let fixture = StoreFixture::new();
        let result = run(&fixture.store, None).unwrap();
        assert!(result.fields.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
