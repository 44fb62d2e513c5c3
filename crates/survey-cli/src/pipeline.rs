//! Export pipeline stages driven by the CLI: load, export, write.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use survey_report::{ExportOutcome, ExportRequest, RenderedDocument, export};
use tracing::{info, info_span};

use crate::config::ExportSettings;
use crate::input::{load_rows, load_schema};

/// Load both inputs and render one export.
pub fn run_export(
    schema_path: &Path,
    rows_path: &Path,
    settings: &ExportSettings,
) -> Result<ExportOutcome> {
    let started = Instant::now();
    let schema = load_schema(schema_path)?;
    let span = info_span!("render", campaign = schema.campaign_urn());
    let _guard = span.enter();

    let rows = load_rows(rows_path)?;
    let request = ExportRequest::new(settings.format, settings.columns.clone())
        .with_options(settings.options.clone());
    let outcome = export(&schema, &rows, &request).context("export failed")?;
    info!(
        format = %settings.format,
        records = outcome.document.record_count,
        elapsed_ms = started.elapsed().as_millis(),
        "export complete"
    );
    Ok(outcome)
}

/// Write a document to a file, or to stdout when no path is given.
pub fn write_document(document: &RenderedDocument, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create output directory {}", parent.display()))?;
            }
            fs::write(path, &document.text)
                .with_context(|| format!("write output {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(document.text.as_bytes())
                .context("write output to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }
    Ok(())
}
