use crate::commands::{CmdMessage, CmdResult, GenerateOutcome};
use crate::error::{MergeError, Result};
use crate::filter::FilterContext;
use crate::model::Record;
use crate::store::DataStore;
use crate::template::render::{output_file_name, DocumentRenderer, OutputFormat, RenderOptions};
use crate::template::Template;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use super::filter::matching;
use super::helpers::{label, resolve_selectors, RecordSelector};

const ARCHIVE_DIR: &str = "letters";

/// Everything needed for one batch run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Selects the candidate records.
    pub ctx: FilterContext,
    /// Candidates the user did not approve.
    pub exclude: Vec<RecordSelector>,
    pub template: Template,
    pub format: OutputFormat,
    pub options: RenderOptions,
    /// Where the `.tar.gz` goes.
    pub output: PathBuf,
}

/// A rendered document waiting to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content: String,
}

pub fn run<S: DataStore>(store: &S, request: &GenerateRequest) -> Result<CmdResult> {
    request.template.validate()?;

    let excluded: HashSet<String> = resolve_selectors(store, &request.exclude)?
        .into_iter()
        .map(|(_, id)| id.to_string())
        .collect();
    let approved: Vec<Record> = matching(store, &request.ctx)?
        .into_iter()
        .map(|dr| dr.record)
        .filter(|r| r.id().map_or(true, |id| !excluded.contains(id)))
        .collect();

    if approved.is_empty() {
        return Err(MergeError::Api(
            "No approved records: nothing to generate".to_string(),
        ));
    }

    let mut result = CmdResult::default();
    for name in unresolved_placeholders(&request.template, &approved) {
        result.add_message(CmdMessage::warning(format!(
            "Placeholder {{{{{}}}}} has no matching field and will be left as is",
            name
        )));
    }

    let renderer = request.format.renderer();
    let (outcomes, artifacts) =
        render_batch(&approved, &request.template, renderer.as_ref(), &request.options);

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    for (outcome, record) in outcomes.iter().zip(&approved) {
        if let Err(reason) = &outcome.result {
            result.add_message(CmdMessage::error(format!(
                "{}: {}",
                label(record),
                reason
            )));
        }
    }

    if artifacts.is_empty() {
        result.add_message(CmdMessage::error("Every record failed; no archive written."));
        result.outcomes = outcomes;
        return Ok(result);
    }

    let file = File::create(&request.output)?;
    write_archive(file, &artifacts)?;
    tracing::info!(
        generated = artifacts.len(),
        failed,
        path = %request.output.display(),
        "batch generation finished"
    );

    result.add_message(CmdMessage::success(format!(
        "Generated {} {} document(s) into {}",
        artifacts.len(),
        request.format,
        request.output.display()
    )));
    result.outcomes = outcomes;
    Ok(result.with_output_path(request.output.clone()))
}

/// Renders every record in order. A failing record is recorded and the
/// batch carries on.
pub fn render_batch(
    records: &[Record],
    template: &Template,
    renderer: &dyn DocumentRenderer,
    options: &RenderOptions,
) -> (Vec<GenerateOutcome>, Vec<Artifact>) {
    let mut outcomes = Vec::with_capacity(records.len());
    let mut artifacts = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let record_id = record.id().unwrap_or_default().to_string();
        let letter = template.resolve(record);

        match renderer.render(&letter, options) {
            Ok(content) => {
                let file_name = output_file_name(record, i + 1, renderer.extension());
                tracing::debug!(record = %record_id, file = %file_name, "rendered");
                outcomes.push(GenerateOutcome {
                    record_id,
                    result: Ok(file_name.clone()),
                });
                artifacts.push(Artifact { file_name, content });
            }
            Err(e) => {
                let reason = match e {
                    MergeError::Render(reason) => reason,
                    other => other.to_string(),
                };
                tracing::warn!(record = %record_id, %reason, "render failed");
                outcomes.push(GenerateOutcome {
                    record_id,
                    result: Err(reason),
                });
            }
        }
    }

    (outcomes, artifacts)
}

fn unresolved_placeholders(template: &Template, records: &[Record]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for name in template.unresolved(record) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn write_archive<W: Write>(writer: W, artifacts: &[Artifact]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for artifact in artifacts {
        let entry_name = format!("{}/{}", ARCHIVE_DIR, artifact.file_name);

        let mut header = tar::Header::new_gnu();
        header.set_size(artifact.content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar.append_data(&mut header, entry_name, artifact.content.as_bytes())
            .map_err(MergeError::Io)?;
    }

    tar.into_inner()
        .map_err(MergeError::Io)?
        .finish()
        .map_err(MergeError::Io)?;
    Ok(())
}
