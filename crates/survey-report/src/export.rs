use survey_model::{CampaignSchema, ColumnId, ResponseRow};
use survey_transform::{RowResolutionWarning, aggregate};
use thiserror::Error;
use tracing::{info, info_span};

use crate::plan::{ColumnPlanError, plan};
use crate::{OutputFormat, RenderError, RenderOptions, RenderedDocument};

/// Fatal failures of one export request.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Plan(#[from] ColumnPlanError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: OutputFormat,
    pub columns: Vec<ColumnId>,
    /// An empty campaign URN is filled in from the schema.
    pub options: RenderOptions,
}

impl ExportRequest {
    pub fn new(format: OutputFormat, columns: Vec<ColumnId>) -> Self {
        Self {
            format,
            columns,
            options: RenderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub document: RenderedDocument,
    /// Planned columns in canonical order.
    pub columns: Vec<ColumnId>,
    pub warnings: Vec<RowResolutionWarning>,
    pub rows_seen: usize,
}

/// Resolve, aggregate, plan and render one export request.
pub fn export(
    schema: &CampaignSchema,
    rows: &[ResponseRow],
    request: &ExportRequest,
) -> Result<ExportOutcome, ExportError> {
    let span = info_span!(
        "export",
        campaign = schema.campaign_urn(),
        format = %request.format
    );
    let _guard = span.enter();

    let aggregation = aggregate(schema, rows);
    let columns = plan(&request.columns, &aggregation.present_prompt_ids(), schema)?;

    let mut options = request.options.clone();
    if options.campaign_urn.is_empty() {
        options.campaign_urn = schema.campaign_urn().to_string();
    }
    let renderer = request.format.renderer();
    let document = if aggregation.records.is_empty() {
        renderer.render_empty(&columns, &options)?
    } else {
        renderer.render_many(&aggregation.records, &columns, &options)?
    };

    info!(
        rows = aggregation.rows_seen,
        records = document.record_count,
        columns = document.column_count,
        bytes = document.byte_len(),
        warnings = aggregation.warnings.len(),
        "export rendered"
    );
    Ok(ExportOutcome {
        document,
        columns,
        warnings: aggregation.warnings,
        rows_seen: aggregation.rows_seen,
    })
}
