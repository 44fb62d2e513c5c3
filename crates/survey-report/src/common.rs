//! Cell values, prompt context serialization and the delimited escaping policy.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};
use sha2::Digest;

use survey_model::{ChoiceGlossary, ColumnId, StructuralColumn};
use survey_transform::{AggregatedRecord, PromptContext};

use crate::RenderError;

/// Field separator of delimited output.
pub const FIELD_SEPARATOR: char = ',';
/// Replacement for the field separator inside embedded structured values.
pub const SEPARATOR_SUBSTITUTE: &str = ";";
pub const LINE_SEPARATOR: &str = "\n";

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

fn float(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |value| Value::String(value.to_string()))
}

/// Value of one column for one record.
pub fn cell_value(record: &AggregatedRecord, column: &ColumnId) -> Value {
    match column {
        ColumnId::Structural(structural) => structural_value(record, *structural),
        ColumnId::Prompt(prompt_id) => record
            .answer(prompt_id)
            .map_or(Value::Null, |answer| answer.value.to_json()),
        ColumnId::AllColumns | ColumnId::AllPrompts => Value::Null,
    }
}

fn structural_value(record: &AggregatedRecord, column: StructuralColumn) -> Value {
    let location = record.location();
    match column {
        StructuralColumn::UserId => text(Some(record.username())),
        StructuralColumn::Client => text(record.client()),
        StructuralColumn::Timestamp => text(Some(record.timestamp())),
        StructuralColumn::Timezone => text(record.timezone()),
        StructuralColumn::UtcTimestamp => text(record.utc_timestamp()),
        StructuralColumn::EpochMillis => record.epoch_millis().map_or(Value::Null, Value::from),
        StructuralColumn::Date => text(record.date()),
        StructuralColumn::LaunchContextLong => {
            record.launch_context().cloned().unwrap_or(Value::Null)
        }
        StructuralColumn::LaunchContextShort => {
            record.launch_context_short().unwrap_or(Value::Null)
        }
        StructuralColumn::LocationStatus => text(record.location_status()),
        StructuralColumn::LocationLatitude => float(location.and_then(|l| l.latitude)),
        StructuralColumn::LocationLongitude => float(location.and_then(|l| l.longitude)),
        StructuralColumn::LocationAccuracy => float(location.and_then(|l| l.accuracy)),
        StructuralColumn::LocationTimestamp => location
            .and_then(|l| l.timestamp.clone())
            .unwrap_or(Value::Null),
        StructuralColumn::LocationTimezone => {
            text(location.and_then(|l| l.timezone.as_deref()))
        }
        StructuralColumn::LocationProvider => {
            text(location.and_then(|l| l.provider.as_deref()))
        }
        StructuralColumn::SurveyId => text(Some(record.survey_id())),
        StructuralColumn::SurveyTitle => text(record.survey_title()),
        StructuralColumn::SurveyDescription => text(record.survey_description()),
        StructuralColumn::PrivacyState => text(record.privacy_state()),
        StructuralColumn::RepeatableSetId => text(record.repeatable_set_id()),
        StructuralColumn::RepeatableSetIteration => record
            .repeatable_set_iteration()
            .map_or(Value::Null, Value::from),
        StructuralColumn::SurveyResponseId => record.survey_key().map_or(Value::Null, Value::from),
    }
}

/// Whether a column holds participant-written text for this record.
pub fn is_free_text(record: &AggregatedRecord, column: &ColumnId) -> bool {
    match column {
        ColumnId::Structural(structural) => structural.is_free_text(),
        ColumnId::Prompt(prompt_id) => record
            .answer(prompt_id)
            .is_some_and(|answer| answer.context.prompt_type.is_free_text()),
        ColumnId::AllColumns | ColumnId::AllPrompts => false,
    }
}

/// First context found for a prompt across the records.
pub fn prompt_context<'r>(
    records: &'r [AggregatedRecord],
    prompt_id: &str,
) -> Option<&'r PromptContext> {
    records
        .iter()
        .find_map(|record| record.answer(prompt_id))
        .map(|answer| &answer.context)
}

/// Glossary keyed by raw choice key, entries in declaration order.
pub struct GlossaryMap<'a>(pub &'a ChoiceGlossary);

impl Serialize for GlossaryMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0.iter() {
            map.serialize_entry(&entry.key, &ChoiceBody {
                value: &entry.value,
                label: &entry.label,
            })?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct ChoiceBody<'a> {
    value: &'a str,
    label: &'a str,
}

/// Prompt context as embedded in column documents and delimited headers.
#[derive(serde::Serialize)]
pub struct ContextBody<'a> {
    unit: Option<&'a str>,
    prompt_type: &'a str,
    display_type: Option<&'a str>,
    display_label: Option<&'a str>,
    text: Option<&'a str>,
    choice_glossary: Option<GlossaryMap<'a>>,
}

impl<'a> ContextBody<'a> {
    pub fn new(context: &'a PromptContext) -> Self {
        Self {
            unit: context.unit.as_deref(),
            prompt_type: context.prompt_type.as_str(),
            display_type: context.display_type.as_deref(),
            display_label: context.display_label.as_deref(),
            text: context.text.as_deref(),
            choice_glossary: context.choice_glossary.as_ref().map(GlossaryMap),
        }
    }
}

/// Replace every whitespace character with a space and double quotes with
/// single quotes, then wrap in double quotes.
pub fn clean_and_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push('\''),
            c if c.is_whitespace() => out.push(' '),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| c == FIELD_SEPARATOR || c == '"' || (c.is_whitespace() && c != ' '))
}

/// Render one cell of delimited output.
///
/// Every column type goes through here so that a cell always occupies exactly
/// one field on one line.
pub fn delimited_cell(value: &Value, free_text: bool) -> Result<String, RenderError> {
    let cell = match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) if free_text || needs_quoting(text) => clean_and_quote(text),
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => embed_structured(value)?,
    };
    if cell.contains(['\n', '\r']) {
        return Err(RenderError::Unembeddable { cell });
    }
    Ok(cell)
}

/// Compact JSON with the field separator substituted.
pub fn embed_structured<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace(FIELD_SEPARATOR, SEPARATOR_SUBSTITUTE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn free_text_is_cleaned_and_quoted() {
        assert_eq!(clean_and_quote("said \"hi\"\tthen\nleft"), "\"said 'hi' then left\"");
    }

    #[test]
    fn cells() {
        assert_eq!(delimited_cell(&Value::Null, false).unwrap(), "null");
        assert_eq!(delimited_cell(&json!(3.5), false).unwrap(), "3.5");
        assert_eq!(delimited_cell(&json!("plain"), false).unwrap(), "plain");
        assert_eq!(delimited_cell(&json!("plain"), true).unwrap(), "\"plain\"");
        assert_eq!(delimited_cell(&json!("a,b"), false).unwrap(), "\"a,b\"");
        assert_eq!(
            delimited_cell(&json!(["red", "blue"]), false).unwrap(),
            "[\"red\";\"blue\"]"
        );
        assert_eq!(
            delimited_cell(&json!({"a": 1, "b": "x\ny"}), false).unwrap(),
            "{\"a\":1;\"b\":\"x\\ny\"}"
        );
    }
}
