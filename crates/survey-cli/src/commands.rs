use anyhow::Result;
use comfy_table::Table;
use survey_cli::config::{ExportOverrides, ExportProfile, ExportSettings};
use survey_cli::pipeline::{run_export, write_document};
use survey_model::{ColumnId, StructuralColumn};

use crate::cli::RenderArgs;
use crate::summary::apply_table_style;
use crate::types::RenderResult;

pub fn run_columns() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Column", "Header", "Row field"]);
    apply_table_style(&mut table);
    for column in StructuralColumn::ALL {
        let id = ColumnId::from(column);
        table.add_row(vec![
            id.token(),
            id.short_header(),
            column.row_field_name().to_string(),
        ]);
    }
    table.add_row(vec![
        "prompt:id:<id>".to_string(),
        "<id>".to_string(),
        "responses.<id>".to_string(),
    ]);
    table.add_row(vec![
        ColumnId::AllPrompts.token(),
        "every prompt column".to_string(),
        "-".to_string(),
    ]);
    table.add_row(vec![
        ColumnId::AllColumns.token(),
        "every column".to_string(),
        "-".to_string(),
    ]);
    println!("{table}");
    Ok(())
}

pub fn run_render(args: &RenderArgs) -> Result<RenderResult> {
    let profile = match &args.config {
        Some(path) => ExportProfile::load(path)?,
        None => ExportProfile::default(),
    };
    let overrides = ExportOverrides {
        format: args.format.map(Into::into),
        columns: args.columns.clone(),
        suppress_metadata: args.suppress_metadata,
        pretty: args.pretty,
        return_id: args.return_id,
    };
    let settings = ExportSettings::resolve(&profile, &overrides)?;

    let outcome = run_export(&args.schema, &args.rows, &settings)?;
    write_document(&outcome.document, args.output.as_deref())?;
    Ok(RenderResult {
        format: settings.format,
        output: args.output.clone(),
        outcome,
    })
}
