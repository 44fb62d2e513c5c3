//! Integration tests for file loading and the export pipeline.

use std::fs;
use std::path::PathBuf;

use survey_cli::config::{ExportOverrides, ExportProfile, ExportSettings};
use survey_cli::input::{RowFileKind, load_rows, load_schema};
use survey_cli::pipeline::{run_export, write_document};
use survey_model::PromptType;
use survey_report::OutputFormat;
use tempfile::TempDir;

const CAMPAIGN: &str = r#"{
    "campaign_urn": "urn:campaign:study:sleep",
    "surveys": [{ "id": "sleep", "title": "Sleep", "items": ["hours", "quality"] }],
    "prompts": [
        { "id": "hours", "type": "number", "display_label": "Hours", "unit": "h" },
        {
            "id": "quality",
            "type": "single_choice",
            "display_label": "Quality",
            "choices": [
                { "key": "0", "value": "poor", "label": "Poor" },
                { "key": "1", "value": "good", "label": "Good" }
            ]
        }
    ]
}"#;

const ROWS_CSV: &str = "\
username,timestamp,timezone,survey_id,prompt_id,prompt_type,response,survey_key
bob,2024-05-02 07:30:00,UTC,sleep,quality,single_choice,1,
bob,2024-05-02 07:30:00,UTC,sleep,hours,number,7.5,42
";

const ROWS_JSON: &str = r#"[
    {
        "username": "bob",
        "timestamp": "2024-05-02 07:30:00",
        "timezone": "UTC",
        "survey_id": "sleep",
        "prompt_id": "hours",
        "prompt_type": "number",
        "response": "7.5"
    }
]"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn row_file_kind_follows_extension() {
    assert_eq!(
        RowFileKind::from_path(&PathBuf::from("rows.JSON")).unwrap(),
        RowFileKind::Json
    );
    assert_eq!(
        RowFileKind::from_path(&PathBuf::from("rows.csv")).unwrap(),
        RowFileKind::Csv
    );
    assert!(RowFileKind::from_path(&PathBuf::from("rows.txt")).is_err());
}

#[test]
fn loads_schema_and_rows() {
    let dir = TempDir::new().unwrap();
    let schema = load_schema(&write(&dir, "campaign.json", CAMPAIGN)).unwrap();
    assert_eq!(schema.campaign_urn(), "urn:campaign:study:sleep");

    let csv_rows = load_rows(&write(&dir, "rows.csv", ROWS_CSV)).unwrap();
    assert_eq!(csv_rows.len(), 2);
    assert_eq!(csv_rows[0].prompt_type, PromptType::SingleChoice);
    assert_eq!(csv_rows[0].survey_key, None);
    assert_eq!(csv_rows[1].survey_key, Some(42));
    assert_eq!(csv_rows[1].timezone.as_deref(), Some("UTC"));
    assert!(csv_rows[1].location.is_none());

    let json_rows = load_rows(&write(&dir, "rows.json", ROWS_JSON)).unwrap();
    assert_eq!(json_rows.len(), 1);
    assert_eq!(json_rows[0].response, "7.5");
}

#[test]
fn invalid_schema_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", r#"{ "surveys": [] }"#);
    let error = load_schema(&path).unwrap_err();
    assert!(format!("{error:#}").contains("broken.json"));
}

#[test]
fn runs_export_from_profile() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "campaign.json", CAMPAIGN);
    let rows = write(&dir, "rows.csv", ROWS_CSV);
    let profile = ExportProfile::load(&write(
        &dir,
        "export.toml",
        "format = \"csv\"\ncolumns = [\"user:id\", \"prompt:response\"]\nsuppress_metadata = true\n",
    ))
    .unwrap();
    let settings = ExportSettings::resolve(&profile, &ExportOverrides::default()).unwrap();
    assert_eq!(settings.format, OutputFormat::Csv);

    let outcome = run_export(&schema, &rows, &settings).unwrap();
    assert_eq!(outcome.document.text, "user_id,hours,quality\nbob,7.5,good\n");
    assert!(outcome.warnings.is_empty());

    let output = dir.path().join("out").join("sleep.csv");
    write_document(&outcome.document, Some(output.as_path())).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), outcome.document.text);
}

#[test]
fn campaign_urn_defaults_to_schema() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "campaign.json", CAMPAIGN);
    let rows = write(&dir, "rows.json", ROWS_JSON);
    let overrides = ExportOverrides {
        format: Some(OutputFormat::JsonRows),
        columns: vec!["user:id".to_string()],
        ..ExportOverrides::default()
    };
    let settings = ExportSettings::resolve(&ExportProfile::default(), &overrides).unwrap();
    let outcome = run_export(&schema, &rows, &settings).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&outcome.document.text).unwrap();
    assert_eq!(
        parsed["metadata"]["campaign_urn"],
        serde_json::json!("urn:campaign:study:sleep")
    );
    assert_eq!(parsed["data"][0]["user"], serde_json::json!("bob"));
}
