//! Display value resolution.
//!
//! Turns one raw stored response into its report-ready form. Resolution never
//! fails: malformed input falls back to a documented value and reports a
//! [`ResolveIssue`] for the caller to log.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use survey_model::{CampaignSchema, ChoiceGlossary, PromptSpec, PromptType, ResponseRow};

use crate::value::DisplayValue;

/// Raw values clients store for prompts the participant did not answer.
const NOT_ANSWERED: [&str; 2] = ["SKIPPED", "NOT_DISPLAYED"];

/// Parses a string as i64, returning None for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<i64>().ok()
}

/// Parses a string as a finite f64, returning None otherwise.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Integer first, then float, then the original text.
///
/// The order keeps `"3"` from turning into `3.0`.
pub fn coerce_numeric(raw: &str) -> DisplayValue {
    if let Some(integer) = parse_i64(raw) {
        DisplayValue::Integer(integer)
    } else if let Some(float) = parse_f64(raw) {
        DisplayValue::Float(float)
    } else {
        DisplayValue::Text(raw.to_string())
    }
}

/// Why a value was only partially resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveIssue {
    NotNumeric,
    ChoiceNotInGlossary { key: String },
    MultiChoiceNotArray,
    RemoteActivityUnparsed,
    RemoteActivityRunsSkipped { skipped: usize },
}

impl fmt::Display for ResolveIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveIssue::NotNumeric => f.write_str("numeric response is not a number"),
            ResolveIssue::ChoiceNotInGlossary { key } => {
                write!(f, "choice key '{key}' is not in the glossary")
            }
            ResolveIssue::MultiChoiceNotArray => {
                f.write_str("multi-choice response is not an array of keys")
            }
            ResolveIssue::RemoteActivityUnparsed => {
                f.write_str("remote activity response is not an array of runs")
            }
            ResolveIssue::RemoteActivityRunsSkipped { skipped } => {
                write!(f, "{skipped} remote activity run(s) without a usable score")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: DisplayValue,
    pub issue: Option<ResolveIssue>,
}

impl Resolution {
    fn clean(value: DisplayValue) -> Self {
        Self { value, issue: None }
    }
}

/// Resolve a raw value for a prompt type and optional choice glossary.
pub fn resolve(
    prompt_type: &PromptType,
    raw: &str,
    glossary: Option<&ChoiceGlossary>,
) -> Resolution {
    if NOT_ANSWERED.contains(&raw) {
        return Resolution::clean(DisplayValue::Text(raw.to_string()));
    }
    match prompt_type {
        PromptType::SingleChoice => resolve_single_choice(raw, glossary, false),
        PromptType::SingleChoiceCustom => resolve_single_choice(raw, glossary, true),
        PromptType::MultiChoice => resolve_multi_choice(raw, glossary, false),
        PromptType::MultiChoiceCustom => resolve_multi_choice(raw, glossary, true),
        PromptType::RemoteActivity => resolve_remote_activity(raw),
        PromptType::Number | PromptType::HoursBeforeNow => {
            let value = coerce_numeric(raw);
            let issue = matches!(value, DisplayValue::Text(_)).then_some(ResolveIssue::NotNumeric);
            Resolution { value, issue }
        }
        PromptType::Text | PromptType::Photo | PromptType::Other(_) => {
            Resolution::clean(DisplayValue::Text(raw.to_string()))
        }
    }
}

// Custom choice prompts carry participant-defined keys, so a glossary miss is
// expected there and not reported.
fn resolve_single_choice(
    raw: &str,
    glossary: Option<&ChoiceGlossary>,
    custom: bool,
) -> Resolution {
    match glossary.and_then(|glossary| glossary.get(raw)) {
        Some(entry) => Resolution::clean(coerce_numeric(&entry.value)),
        None => {
            let issue = (glossary.is_some() && !custom).then(|| ResolveIssue::ChoiceNotInGlossary {
                key: raw.to_string(),
            });
            Resolution {
                value: coerce_numeric(raw),
                issue,
            }
        }
    }
}

fn choice_key(element: &Value) -> String {
    match element {
        Value::String(key) => key.clone(),
        other => other.to_string(),
    }
}

fn resolve_multi_choice(
    raw: &str,
    glossary: Option<&ChoiceGlossary>,
    custom: bool,
) -> Resolution {
    let elements = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(elements)) => elements,
        _ => {
            return Resolution {
                value: DisplayValue::Text(raw.to_string()),
                issue: Some(ResolveIssue::MultiChoiceNotArray),
            };
        }
    };
    let Some(glossary) = glossary else {
        return Resolution::clean(DisplayValue::from_json(Value::Array(elements)));
    };

    // All or nothing: one unknown key keeps the whole raw sequence.
    let missing = elements
        .iter()
        .map(choice_key)
        .find(|key| !glossary.contains_key(key));
    if let Some(key) = missing {
        return Resolution {
            value: DisplayValue::from_json(Value::Array(elements)),
            issue: (!custom).then_some(ResolveIssue::ChoiceNotInGlossary { key }),
        };
    }

    let values = elements
        .iter()
        .filter_map(|element| glossary.get(&choice_key(element)))
        .map(|entry| coerce_numeric(&entry.value))
        .collect();
    Resolution::clean(DisplayValue::List(values))
}

fn run_score(run: &Value) -> Option<DisplayValue> {
    match run.get("score")? {
        Value::Number(number) => match DisplayValue::from_json(Value::Number(number.clone())) {
            DisplayValue::Json(_) => None,
            score => Some(score),
        },
        Value::String(text) => match coerce_numeric(text) {
            DisplayValue::Text(_) => None,
            score => Some(score),
        },
        _ => None,
    }
}

fn resolve_remote_activity(raw: &str) -> Resolution {
    let runs = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(runs)) => runs,
        _ => {
            return Resolution {
                value: DisplayValue::Text(raw.to_string()),
                issue: Some(ResolveIssue::RemoteActivityUnparsed),
            };
        }
    };
    let scores: Vec<DisplayValue> = runs.iter().filter_map(run_score).collect();
    let skipped = runs.len() - scores.len();
    Resolution {
        value: DisplayValue::List(scores),
        issue: (skipped > 0).then_some(ResolveIssue::RemoteActivityRunsSkipped { skipped }),
    }
}

/// Schema context attached to every answered prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptContext {
    pub prompt_type: PromptType,
    pub display_type: Option<String>,
    pub display_label: Option<String>,
    pub unit: Option<String>,
    pub text: Option<String>,
    pub choice_glossary: Option<ChoiceGlossary>,
    /// Position within the owning repeatable set for set prompts, otherwise
    /// the canonical column position within the survey.
    pub index: Option<usize>,
}

impl PromptContext {
    pub fn from_spec(spec: &PromptSpec, index: Option<usize>) -> Self {
        Self {
            prompt_type: spec.prompt_type.clone(),
            display_type: spec.display_type.clone(),
            display_label: Some(spec.display_label.clone()),
            unit: spec.unit.clone(),
            text: spec.text.clone(),
            choice_glossary: spec.choice_glossary.clone(),
            index,
        }
    }

    /// Context for a prompt the schema does not know.
    pub fn unknown(prompt_type: PromptType) -> Self {
        Self {
            prompt_type,
            display_type: None,
            display_label: None,
            unit: None,
            text: None,
            choice_glossary: None,
            index: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnswer {
    pub raw: String,
    pub value: DisplayValue,
    pub context: PromptContext,
}

#[derive(Debug, Clone)]
pub struct RowResolution {
    pub answer: ResolvedAnswer,
    pub issue: Option<ResolveIssue>,
    /// False when the schema has no metadata for the row's prompt.
    pub known_prompt: bool,
}

/// Resolves rows against a campaign schema.
#[derive(Debug, Clone, Copy)]
pub struct DisplayValueResolver<'a> {
    schema: &'a CampaignSchema,
}

impl<'a> DisplayValueResolver<'a> {
    pub fn new(schema: &'a CampaignSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a CampaignSchema {
        self.schema
    }

    pub fn resolve_row(&self, row: &ResponseRow) -> RowResolution {
        let spec = self
            .schema
            .prompt_meta(
                &row.survey_id,
                row.repeatable_set_id.as_deref(),
                &row.prompt_id,
            )
            .ok();
        let glossary = spec.and_then(|spec| spec.choice_glossary.as_ref());
        let Resolution { value, issue } = resolve(&row.prompt_type, &row.response, glossary);

        let context = match spec {
            Some(spec) => {
                let index = match row.repeatable_set_id.as_deref() {
                    Some(set_id) => self
                        .schema
                        .repeatable_set(set_id)
                        .ok()
                        .and_then(|set| set.prompt_index(&row.prompt_id)),
                    None => self
                        .schema
                        .prompt_index(&row.survey_id, &row.prompt_id)
                        .ok(),
                };
                PromptContext::from_spec(spec, index)
            }
            None => PromptContext::unknown(row.prompt_type.clone()),
        };

        RowResolution {
            answer: ResolvedAnswer {
                raw: row.response.clone(),
                value,
                context,
            },
            issue,
            known_prompt: spec.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_model::ChoiceEntry;

    fn glossary(pairs: &[(&str, &str)]) -> ChoiceGlossary {
        pairs
            .iter()
            .map(|(key, value)| ChoiceEntry {
                key: (*key).to_string(),
                value: (*value).to_string(),
                label: (*value).to_string(),
            })
            .collect()
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn numeric_coercion_order() {
        assert_eq!(coerce_numeric("42"), DisplayValue::Integer(42));
        assert_eq!(coerce_numeric("3.14"), DisplayValue::Float(3.14));
        assert_eq!(coerce_numeric("abc"), DisplayValue::Text("abc".to_string()));
        assert_eq!(coerce_numeric("NaN"), DisplayValue::Text("NaN".to_string()));
    }

    #[test]
    fn number_reports_non_numeric_input() {
        let resolution = resolve(&PromptType::Number, "lots", None);
        assert_eq!(resolution.value, DisplayValue::Text("lots".to_string()));
        assert_eq!(resolution.issue, Some(ResolveIssue::NotNumeric));
    }

    #[test]
    fn skipped_is_kept_verbatim() {
        let resolution = resolve(&PromptType::Number, "SKIPPED", None);
        assert_eq!(resolution.value, DisplayValue::Text("SKIPPED".to_string()));
        assert!(resolution.issue.is_none());
    }

    #[test]
    fn single_choice_uses_glossary_value() {
        let glossary = glossary(&[("0", "10"), ("1", "high")]);
        let hit = resolve(&PromptType::SingleChoice, "0", Some(&glossary));
        assert_eq!(hit.value, DisplayValue::Integer(10));
        let text = resolve(&PromptType::SingleChoice, "1", Some(&glossary));
        assert_eq!(text.value, DisplayValue::Text("high".to_string()));

        let miss = resolve(&PromptType::SingleChoice, "7", Some(&glossary));
        assert_eq!(miss.value, DisplayValue::Integer(7));
        assert!(miss.issue.is_some());

        let custom = resolve(&PromptType::SingleChoiceCustom, "7", Some(&glossary));
        assert!(custom.issue.is_none());
    }

    #[test]
    fn remote_activity_collects_scores() {
        let raw = r#"[{"score": 4}, {"score": "2.5"}, {"duration": 10}]"#;
        let resolution = resolve(&PromptType::RemoteActivity, raw, None);
        assert_eq!(
            resolution.value,
            DisplayValue::List(vec![DisplayValue::Integer(4), DisplayValue::Float(2.5)])
        );
        assert_eq!(
            resolution.issue,
            Some(ResolveIssue::RemoteActivityRunsSkipped { skipped: 1 })
        );

        let broken = resolve(&PromptType::RemoteActivity, "not json", None);
        assert_eq!(broken.value, DisplayValue::Text("not json".to_string()));
        assert_eq!(broken.issue, Some(ResolveIssue::RemoteActivityUnparsed));
    }
}
