//! Survey export rendering.
//!
//! This crate turns aggregated survey records into export documents:
//!
//! - **plan**: canonical column ordering shared by every format
//! - **json_rows**: one JSON object per survey instance
//! - **json_columns**: one JSON entry per column with parallel value arrays
//! - **delimited**: CSV with abbreviated headers and optional comment framing
//! - **export**: resolve, aggregate, plan and render in one call

mod common;
mod delimited;
mod export;
mod json_columns;
mod json_rows;
pub mod plan;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use survey_model::ColumnId;
use survey_transform::AggregatedRecord;
use thiserror::Error;

pub use common::{clean_and_quote, delimited_cell, sha256_hex};
pub use delimited::DelimitedRenderer;
pub use export::{ExportError, ExportOutcome, ExportRequest, export};
pub use json_columns::ColumnDocumentRenderer;
pub use json_rows::RowDocumentRenderer;
pub use plan::{CANONICAL_PREFIX, ColumnPlanError, ColumnPlanner, parse_columns, plan};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cell value cannot be embedded on a single line: {cell}")]
    Unembeddable { cell: String },
}

/// Export document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    #[default]
    JsonRows,
    JsonColumns,
    Csv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::JsonRows,
        OutputFormat::JsonColumns,
        OutputFormat::Csv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::JsonRows => "json-rows",
            OutputFormat::JsonColumns => "json-columns",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            OutputFormat::JsonRows | OutputFormat::JsonColumns => "json",
            OutputFormat::Csv => "csv",
        }
    }

    /// The renderer strategy for this format.
    pub fn renderer(self) -> Box<dyn OutputRenderer> {
        match self {
            OutputFormat::JsonRows => Box::new(RowDocumentRenderer),
            OutputFormat::JsonColumns => Box::new(ColumnDocumentRenderer),
            OutputFormat::Csv => Box::new(DelimitedRenderer),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "json-rows" | "rows" => Ok(OutputFormat::JsonRows),
            "json-columns" | "columns" => Ok(OutputFormat::JsonColumns),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "unknown output format '{s}' (expected json-rows, json-columns or csv)"
            )),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputFormat> for String {
    fn from(value: OutputFormat) -> Self {
        value.as_str().to_string()
    }
}

/// Options shared by every renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub campaign_urn: String,
    /// Omit metadata and framing; delimited output keeps only header and data lines.
    pub suppress_metadata: bool,
    /// Indent JSON documents.
    pub pretty: bool,
    /// Include the storage key of each survey response in row documents.
    pub return_id: bool,
}

impl RenderOptions {
    pub fn new(campaign_urn: impl Into<String>) -> Self {
        Self {
            campaign_urn: campaign_urn.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_suppress_metadata(mut self, suppress: bool) -> Self {
        self.suppress_metadata = suppress;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn with_return_id(mut self, return_id: bool) -> Self {
        self.return_id = return_id;
        self
    }
}

/// A rendered export and its size metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub format: OutputFormat,
    pub text: String,
    pub record_count: usize,
    pub column_count: usize,
}

impl RenderedDocument {
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    pub fn sha256(&self) -> String {
        sha256_hex(self.text.as_bytes())
    }
}

/// One export format.
///
/// `columns` must already be in canonical order, as produced by
/// [`ColumnPlanner`]. Rendering the same records and columns twice yields
/// byte-identical text.
pub trait OutputRenderer {
    fn format(&self) -> OutputFormat;

    fn render_many(
        &self,
        records: &[AggregatedRecord],
        columns: &[ColumnId],
        options: &RenderOptions,
    ) -> Result<RenderedDocument, RenderError>;

    /// Header-only document for a request that matched no records.
    fn render_empty(
        &self,
        columns: &[ColumnId],
        options: &RenderOptions,
    ) -> Result<RenderedDocument, RenderError> {
        self.render_many(&[], columns, options)
    }
}

/// Counts reported in document metadata.
#[derive(Debug, Clone, Serialize)]
struct Metadata<'a> {
    campaign_urn: &'a str,
    number_of_prompts: usize,
    number_of_surveys: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Vec<String>>,
}

impl<'a> Metadata<'a> {
    fn new(records: &[AggregatedRecord], options: &'a RenderOptions) -> Self {
        Self {
            campaign_urn: &options.campaign_urn,
            number_of_prompts: records.iter().map(AggregatedRecord::answer_count).sum(),
            number_of_surveys: records.len(),
            items: None,
        }
    }

    fn with_items(mut self, columns: &[ColumnId]) -> Self {
        self.items = Some(columns.iter().map(ColumnId::token).collect());
        self
    }
}

/// Top level of both JSON documents.
#[derive(Serialize)]
struct JsonDocument<'a, D: Serialize> {
    result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata<'a>>,
    data: D,
}

fn to_json_text<T: Serialize>(value: &T, pretty: bool) -> Result<String, RenderError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        for format in OutputFormat::ALL {
            assert_eq!(format.as_str().parse::<OutputFormat>(), Ok(format));
        }
        assert_eq!("JSON_COLUMNS".parse::<OutputFormat>(), Ok(OutputFormat::JsonColumns));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn options_builders() {
        let options = RenderOptions::new("urn:c")
            .with_pretty(true)
            .with_return_id(true);
        assert_eq!(options.campaign_urn, "urn:c");
        assert!(options.pretty && options.return_id && !options.suppress_metadata);
    }
}
