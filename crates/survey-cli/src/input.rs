//! Loading campaign definitions and response rows from disk.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result, bail};
use survey_model::{CampaignSchema, ResponseRow};
use tracing::{debug, trace};

use crate::logging::redact_value;

/// Row file layouts, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFileKind {
    Json,
    Csv,
}

impl RowFileKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(RowFileKind::Json),
            Some("csv") => Ok(RowFileKind::Csv),
            _ => bail!(
                "cannot tell the row file layout of {} (expected .json or .csv)",
                path.display()
            ),
        }
    }
}

pub fn load_schema(path: &Path) -> Result<CampaignSchema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read campaign definition {}", path.display()))?;
    let schema = CampaignSchema::from_json(&text)
        .with_context(|| format!("invalid campaign definition {}", path.display()))?;
    debug!(
        campaign = schema.campaign_urn(),
        surveys = schema.surveys().count(),
        "loaded campaign schema"
    );
    Ok(schema)
}

pub fn load_rows(path: &Path) -> Result<Vec<ResponseRow>> {
    let rows = match RowFileKind::from_path(path)? {
        RowFileKind::Json => {
            let file =
                File::open(path).with_context(|| format!("open row file {}", path.display()))?;
            serde_json::from_reader(std::io::BufReader::new(file))
                .with_context(|| format!("parse rows {}", path.display()))?
        }
        RowFileKind::Csv => read_csv_rows(path)?,
    };
    for (index, row) in rows.iter().enumerate() {
        trace!(
            row = index,
            survey_id = %row.survey_id,
            prompt_id = %row.prompt_id,
            response = redact_value(&row.response),
            "loaded row"
        );
    }
    debug!(rows = rows.len(), path = %path.display(), "loaded response rows");
    Ok(rows)
}

fn read_csv_rows(path: &Path) -> Result<Vec<ResponseRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("open row file {}", path.display()))?;
    reader
        .deserialize::<ResponseRow>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parse rows {}", path.display()))
}
