//! Delimited text (CSV) output.
//!
//! Layout with metadata enabled:
//!
//! ```text
//! ## begin metadata
//! #{"result":"success";"campaign_urn":...}
//! ## end metadata
//! ## begin prompt contexts
//! #{"<prompt id>":{...}}
//! ## end prompt contexts
//! ## begin data
//! <header>
//! <one line per record>
//! ## end data
//! ```
//!
//! With metadata suppressed only the header and data lines remain.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use survey_model::ColumnId;
use survey_transform::AggregatedRecord;
use tracing::debug;

use crate::common::{
    ContextBody, FIELD_SEPARATOR, LINE_SEPARATOR, cell_value, delimited_cell, embed_structured,
    is_free_text, prompt_context,
};
use crate::{Metadata, OutputFormat, OutputRenderer, RenderError, RenderOptions, RenderedDocument};

#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedRenderer;

#[derive(Serialize)]
struct MetadataLine<'a> {
    result: &'static str,
    #[serde(flatten)]
    metadata: Metadata<'a>,
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(LINE_SEPARATOR);
}

fn join_fields(fields: &[String]) -> String {
    fields.join(&FIELD_SEPARATOR.to_string())
}

impl DelimitedRenderer {
    fn push_preamble(
        out: &mut String,
        records: &[AggregatedRecord],
        columns: &[ColumnId],
        options: &RenderOptions,
    ) -> Result<(), RenderError> {
        push_line(out, "## begin metadata");
        let metadata = MetadataLine {
            result: "success",
            metadata: Metadata::new(records, options),
        };
        push_line(out, &format!("#{}", embed_structured(&metadata)?));
        push_line(out, "## end metadata");

        push_line(out, "## begin prompt contexts");
        for prompt_id in columns.iter().filter_map(ColumnId::prompt_id) {
            if let Some(context) = prompt_context(records, prompt_id) {
                let entry = BTreeMap::from([(prompt_id, ContextBody::new(context))]);
                push_line(out, &format!("#{}", embed_structured(&entry)?));
            }
        }
        push_line(out, "## end prompt contexts");
        push_line(out, "## begin data");
        Ok(())
    }
}

impl OutputRenderer for DelimitedRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn render_many(
        &self,
        records: &[AggregatedRecord],
        columns: &[ColumnId],
        options: &RenderOptions,
    ) -> Result<RenderedDocument, RenderError> {
        let mut out = String::new();
        if !options.suppress_metadata {
            Self::push_preamble(&mut out, records, columns, options)?;
        }

        let header = columns
            .iter()
            .map(|column| delimited_cell(&Value::String(column.short_header()), false))
            .collect::<Result<Vec<_>, _>>()?;
        push_line(&mut out, &join_fields(&header));

        for record in records {
            let cells = columns
                .iter()
                .map(|column| {
                    delimited_cell(&cell_value(record, column), is_free_text(record, column))
                })
                .collect::<Result<Vec<_>, _>>()?;
            push_line(&mut out, &join_fields(&cells));
        }

        if !options.suppress_metadata {
            push_line(&mut out, "## end data");
        }
        debug!(
            records = records.len(),
            columns = columns.len(),
            bytes = out.len(),
            "rendered delimited document"
        );
        Ok(RenderedDocument {
            format: OutputFormat::Csv,
            text: out,
            record_count: records.len(),
            column_count: columns.len(),
        })
    }
}
