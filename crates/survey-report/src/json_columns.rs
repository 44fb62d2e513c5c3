//! Column-document JSON: one entry per column holding a value per record.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use survey_model::ColumnId;
use survey_transform::AggregatedRecord;
use tracing::debug;

use crate::common::{ContextBody, cell_value, prompt_context};
use crate::{
    JsonDocument, Metadata, OutputFormat, OutputRenderer, RenderError, RenderOptions,
    RenderedDocument, to_json_text,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnDocumentRenderer;

impl OutputRenderer for ColumnDocumentRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::JsonColumns
    }

    fn render_many(
        &self,
        records: &[AggregatedRecord],
        columns: &[ColumnId],
        options: &RenderOptions,
    ) -> Result<RenderedDocument, RenderError> {
        let metadata = (!options.suppress_metadata)
            .then(|| Metadata::new(records, options).with_items(columns));
        let document = JsonDocument {
            result: "success",
            metadata,
            data: Columns { records, columns },
        };
        let text = to_json_text(&document, options.pretty)?;
        debug!(
            records = records.len(),
            columns = columns.len(),
            bytes = text.len(),
            "rendered column document"
        );
        Ok(RenderedDocument {
            format: OutputFormat::JsonColumns,
            text,
            record_count: records.len(),
            column_count: columns.len(),
        })
    }
}

struct Columns<'a> {
    records: &'a [AggregatedRecord],
    columns: &'a [ColumnId],
}

impl Serialize for Columns<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(
                &column.token(),
                &ColumnEntry {
                    records: self.records,
                    column,
                },
            )?;
        }
        map.end()
    }
}

struct ColumnEntry<'a> {
    records: &'a [AggregatedRecord],
    column: &'a ColumnId,
}

impl Serialize for ColumnEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(prompt_id) = self.column.prompt_id() {
            // Unobserved slots have no context to report.
            let context = prompt_context(self.records, prompt_id).map(ContextBody::new);
            map.serialize_entry("context", &context)?;
        }
        let values: Vec<Value> = self
            .records
            .iter()
            .map(|record| cell_value(record, self.column))
            .collect();
        map.serialize_entry("values", &values)?;
        map.end()
    }
}
