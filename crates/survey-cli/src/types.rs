use std::path::PathBuf;

use survey_report::{ExportOutcome, OutputFormat};

#[derive(Debug)]
pub struct RenderResult {
    pub format: OutputFormat,
    /// None when the document went to stdout.
    pub output: Option<PathBuf>,
    pub outcome: ExportOutcome,
}
