//! Row-document JSON: one object per survey instance.

use serde::ser::{Serialize, SerializeMap, Serializer};
use survey_model::{ColumnId, StructuralColumn};
use survey_transform::{AggregatedRecord, DisplayValue, ResolvedAnswer};
use tracing::debug;

use crate::common::{GlossaryMap, cell_value};
use crate::{
    JsonDocument, Metadata, OutputFormat, OutputRenderer, RenderError, RenderOptions,
    RenderedDocument, to_json_text,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RowDocumentRenderer;

impl OutputRenderer for RowDocumentRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::JsonRows
    }

    fn render_many(
        &self,
        records: &[AggregatedRecord],
        columns: &[ColumnId],
        options: &RenderOptions,
    ) -> Result<RenderedDocument, RenderError> {
        let rows: Vec<RowEntry<'_>> = records
            .iter()
            .map(|record| RowEntry {
                record,
                columns,
                return_id: options.return_id,
            })
            .collect();
        let metadata = (!options.suppress_metadata)
            .then(|| Metadata::new(records, options).with_items(columns));
        let document = JsonDocument {
            result: "success",
            metadata,
            data: rows,
        };
        let text = to_json_text(&document, options.pretty)?;
        debug!(
            records = records.len(),
            columns = columns.len(),
            bytes = text.len(),
            "rendered row document"
        );
        Ok(RenderedDocument {
            format: OutputFormat::JsonRows,
            text,
            record_count: records.len(),
            column_count: columns.len(),
        })
    }
}

struct RowEntry<'a> {
    record: &'a AggregatedRecord,
    columns: &'a [ColumnId],
    return_id: bool,
}

impl Serialize for RowEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for column in self.columns {
            if let ColumnId::Structural(structural) = column {
                map.serialize_entry(
                    structural.row_field_name(),
                    &cell_value(self.record, column),
                )?;
            }
        }
        if self.columns.iter().any(ColumnId::is_prompt) {
            map.serialize_entry(
                "responses",
                &Responses {
                    record: self.record,
                    columns: self.columns,
                },
            )?;
        }
        let planned_id = self
            .columns
            .contains(&ColumnId::Structural(StructuralColumn::SurveyResponseId));
        if self.return_id && !planned_id {
            map.serialize_entry("survey_key", &self.record.survey_key())?;
        }
        map.end()
    }
}

/// Answers to planned prompt columns, in column order.
struct Responses<'a> {
    record: &'a AggregatedRecord,
    columns: &'a [ColumnId],
}

impl Serialize for Responses<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for prompt_id in self.columns.iter().filter_map(ColumnId::prompt_id) {
            if let Some(answer) = self.record.answer(prompt_id) {
                map.serialize_entry(prompt_id, &PromptAnswer::new(answer))?;
            }
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct PromptAnswer<'a> {
    prompt_response: &'a DisplayValue,
    prompt_display_type: Option<&'a str>,
    prompt_unit: Option<&'a str>,
    prompt_type: &'a str,
    prompt_text: Option<&'a str>,
    prompt_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_choice_glossary: Option<GlossaryMap<'a>>,
}

impl<'a> PromptAnswer<'a> {
    fn new(answer: &'a ResolvedAnswer) -> Self {
        let context = &answer.context;
        Self {
            prompt_response: &answer.value,
            prompt_display_type: context.display_type.as_deref(),
            prompt_unit: context.unit.as_deref(),
            prompt_type: context.prompt_type.as_str(),
            prompt_text: context.text.as_deref(),
            prompt_index: context.index,
            prompt_choice_glossary: context.choice_glossary.as_ref().map(GlossaryMap),
        }
    }
}
