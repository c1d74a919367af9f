use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::{apply, FilterContext};
use crate::normalize::{normalize, REQUIRED_COLUMNS};
use crate::store::DataStore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::helpers::snapshot;

/// Writes the records that pass `ctx` to `path` as a JSON array, fields in
/// canonical order.
pub fn run<S: DataStore>(store: &S, ctx: &FilterContext, path: &Path) -> Result<CmdResult> {
    let records = apply(&snapshot(store)?, ctx);

    if records.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No records to export."));
        return Ok(res);
    }

    let file = File::create(path)?;
    write_records(BufWriter::new(file), &records)?;
    tracing::info!(count = records.len(), path = %path.display(), "exported records");

    let mut result = CmdResult::default().with_output_path(path.to_path_buf());
    result.add_message(CmdMessage::success(format!(
        "Exported {} record(s) to {}",
        records.len(),
        path.display()
    )));
    Ok(result)
}

fn write_records<W: Write>(mut writer: W, records: &[crate::model::Record]) -> Result<()> {
    let normalized: Vec<_> = records
        .iter()
        .map(|r| normalize(r, REQUIRED_COLUMNS))
        .collect();
    serde_json::to_writer_pretty(&mut writer, &normalized)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CategorySelection;
    use crate::store::memory::fixtures::StoreFixture;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn exports_filtered_records_in_canonical_order() {
        let fixture = StoreFixture::new().with_faculty();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");

        let ctx = FilterContext::new().with_category(CategorySelection::Id("states".into()));
        let result = run(&fixture.store, &ctx, &path).unwrap();
        assert_eq!(result.output_path.as_deref(), Some(path.as_path()));

        let text = std::fs::read_to_string(&path).unwrap();
        let written: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 1);

        let pos = |key: &str| text.find(&format!("\"{}\"", key)).unwrap();
        assert!(pos("University Name") < pos("Full Name"));
        assert!(pos("Full Name") < pos("id"));
        assert!(pos("updatedAt") < pos("_categoryId"));
    }

    #[test]
    fn nothing_to_export_writes_nothing() {
        let fixture = StoreFixture::new();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");

        let result = run(&fixture.store, &FilterContext::new(), &path).unwrap();
        assert!(result.output_path.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn write_records_keeps_nulls() {
        let records = vec![crate::model::Record::new().with_null("District")];
        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert!(value[0]["District"].is_null());
    }
}
