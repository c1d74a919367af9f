//! Canonical field ordering for display and export.

use crate::model::{is_internal_key, Record, RecordData};
use std::collections::HashSet;

/// The house column order. `Specialization` appears twice; the second
/// occurrence is a no-op when normalizing.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Main Category",
    "Ownership Type",
    "Management Type",
    "Subcategory",
    "Specialization",
    "University Name",
    "University",
    "University Code / Short Code",
    "Address-1",
    "Adddress-2",
    "Address-3",
    "Landmark",
    "City / Campus",
    "District",
    "State / UT",
    "Postal Code",
    "Country",
    "Google Map Link",
    "GeoCoordinates",
    "Year Established",
    "Accreditation",
    "Approval",
    "Website",
    "Contact Email-1",
    "Contact Email-2",
    "Contact Phone-1",
    "Contact Phone-2",
    "Contact Mobile",
    "Contact Whatsapp",
    "Contact Fax-2",
    "Affiliated Colleges",
    "Mode",
    "Notes",
    "Faculty ID",
    "honorific",
    "Full Name",
    "Gender",
    "Department",
    "Office Address (Room, Block, Floor)",
    "School / Division",
    "Subjects Taught",
    "Specialization",
    "Research Area",
    "Experience (Years)",
    "Designation",
    "Designation-Category",
    "Highest Qualification",
    "Qualified From",
    "Certifications",
    "Official Email",
    "Personal Email",
    "Mobile",
    "WhatsApp",
    "Office Extension",
    "Office Address",
    "Profile Link",
    "Google Scholar",
    "ResearchGate",
    "LinkedIn",
    "ORCID",
    "Committees",
    "Additional Roles",
    "ID Proof",
    "Certificates",
    "Status",
    "File Name",
];

/// Reorders `record`: keys named in `required_order` first (in that order,
/// each once), then the remaining user keys, then the remaining `_` keys.
/// The key set and values are unchanged.
pub fn normalize(record: &Record, required_order: &[&str]) -> Record {
    Record::from_data(normalize_data(record.fields(), required_order))
}

/// [`normalize`] on raw record data.
pub fn normalize_data(data: &RecordData, required_order: &[&str]) -> RecordData {
    let mut out = RecordData::with_capacity(data.len());

    for key in required_order {
        if out.contains_key(*key) {
            continue;
        }
        if let Some(value) = data.get(*key) {
            out.insert((*key).to_string(), value.clone());
        }
    }

    let (internal, user): (Vec<_>, Vec<_>) = data
        .iter()
        .filter(|(key, _)| !out.contains_key(key.as_str()))
        .partition(|(key, _)| is_internal_key(key));

    for (key, value) in user.into_iter().chain(internal) {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Orders a header list the same way: required headers first, then the rest
/// in their original order.
pub fn order_headers(headers: &[String], required_order: &[&str]) -> Vec<String> {
    let mut remaining: Vec<&String> = headers.iter().collect();
    let mut ordered = Vec::with_capacity(headers.len());
    for key in required_order {
        if let Some(pos) = remaining.iter().position(|h| h.as_str() == *key) {
            ordered.push(remaining.remove(pos).clone());
        }
    }
    ordered.extend(remaining.into_iter().cloned());
    ordered
}

/// Required columns with no matching header. Headers match when they are
/// equal ignoring case and whitespace.
pub fn missing_columns<'a>(headers: &[String], required_order: &[&'a str]) -> Vec<&'a str> {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let present: HashSet<String> = headers.iter().map(|h| squash(h)).collect();

    let mut seen = HashSet::new();
    required_order
        .iter()
        .filter(|col| seen.insert(**col))
        .filter(|col| !present.contains(&squash(col)))
        .copied()
        .collect()
}
