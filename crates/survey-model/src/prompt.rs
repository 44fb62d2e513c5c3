use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a prompt.
///
/// Drives how a raw stored response is turned into a display value. Type
/// names that are not recognised are kept verbatim in [`PromptType::Other`]
/// so they can still be echoed back in prompt contexts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PromptType {
    Number,
    HoursBeforeNow,
    Text,
    SingleChoice,
    SingleChoiceCustom,
    MultiChoice,
    MultiChoiceCustom,
    RemoteActivity,
    Photo,
    Other(String),
}

impl PromptType {
    /// Parse a stored type name. Case and `-`/`_` separators are ignored.
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "number" => PromptType::Number,
            "hours_before_now" => PromptType::HoursBeforeNow,
            "text" => PromptType::Text,
            "single_choice" => PromptType::SingleChoice,
            "single_choice_custom" => PromptType::SingleChoiceCustom,
            "multi_choice" => PromptType::MultiChoice,
            "multi_choice_custom" => PromptType::MultiChoiceCustom,
            "remote_activity" => PromptType::RemoteActivity,
            "photo" => PromptType::Photo,
            _ => PromptType::Other(value.trim().to_string()),
        }
    }

    /// Canonical wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            PromptType::Number => "number",
            PromptType::HoursBeforeNow => "hours_before_now",
            PromptType::Text => "text",
            PromptType::SingleChoice => "single_choice",
            PromptType::SingleChoiceCustom => "single_choice_custom",
            PromptType::MultiChoice => "multi_choice",
            PromptType::MultiChoiceCustom => "multi_choice_custom",
            PromptType::RemoteActivity => "remote_activity",
            PromptType::Photo => "photo",
            PromptType::Other(name) => name.as_str(),
        }
    }

    pub fn is_single_choice(&self) -> bool {
        matches!(
            self,
            PromptType::SingleChoice | PromptType::SingleChoiceCustom
        )
    }

    pub fn is_multi_choice(&self) -> bool {
        matches!(self, PromptType::MultiChoice | PromptType::MultiChoiceCustom)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, PromptType::Number | PromptType::HoursBeforeNow)
    }

    /// Free-text responses need quoting when embedded in delimited output.
    pub fn is_free_text(&self) -> bool {
        matches!(self, PromptType::Text)
    }
}

impl From<&str> for PromptType {
    fn from(value: &str) -> Self {
        PromptType::parse(value)
    }
}

impl From<String> for PromptType {
    fn from(value: String) -> Self {
        PromptType::parse(&value)
    }
}

impl From<PromptType> for String {
    fn from(value: PromptType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a choice glossary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceEntry {
    /// Raw key as stored with each response.
    pub key: String,
    /// Report-ready value for the key.
    pub value: String,
    /// Human-facing label shown to participants.
    pub label: String,
}

/// Mapping from raw stored choice keys to their values and labels.
///
/// Entries keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceGlossary {
    entries: Vec<ChoiceEntry>,
}

impl ChoiceGlossary {
    pub fn new(entries: Vec<ChoiceEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&ChoiceEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChoiceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ChoiceEntry> for ChoiceGlossary {
    fn from_iter<I: IntoIterator<Item = ChoiceEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A single question declared by the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub id: String,
    pub prompt_type: PromptType,
    pub display_label: String,
    pub display_type: Option<String>,
    pub unit: Option<String>,
    /// Question text shown to participants.
    pub text: Option<String>,
    pub choice_glossary: Option<ChoiceGlossary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_case_and_separators() {
        assert_eq!(PromptType::parse("Single-Choice"), PromptType::SingleChoice);
        assert_eq!(PromptType::parse("hours_before_now"), PromptType::HoursBeforeNow);
        assert_eq!(
            PromptType::parse(" timestamp "),
            PromptType::Other("timestamp".to_string())
        );
    }

    #[test]
    fn other_type_keeps_its_name() {
        let kind = PromptType::parse("audio");
        assert_eq!(kind.as_str(), "audio");
        assert_eq!(kind.to_string(), "audio");
    }

    #[test]
    fn glossary_lookup_by_key() {
        let glossary: ChoiceGlossary = vec![
            ChoiceEntry {
                key: "0".to_string(),
                value: "1".to_string(),
                label: "Low".to_string(),
            },
            ChoiceEntry {
                key: "1".to_string(),
                value: "5".to_string(),
                label: "High".to_string(),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(glossary.get("1").map(|entry| entry.label.as_str()), Some("High"));
        assert!(!glossary.contains_key("2"));
        assert_eq!(glossary.len(), 2);
    }
}
