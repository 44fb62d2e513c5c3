//! Serialized form of a campaign configuration.
//!
//! The definition is a flat catalog: surveys list their items by id, and the
//! prompts and repeatable sets they reference are declared once at the top
//! level. [`CampaignSchema::from_definition`](crate::CampaignSchema::from_definition)
//! checks every reference and turns the catalog into the lookup structure used
//! during export.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignDefinition {
    pub campaign_urn: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub surveys: Vec<SurveyDefinition>,
    #[serde(default)]
    pub prompts: Vec<PromptDefinition>,
    #[serde(default)]
    pub repeatable_sets: Vec<RepeatableSetDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Prompt and repeatable set ids in declaration order.
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,
    #[serde(rename = "type", default)]
    pub prompt_type: Option<String>,
    #[serde(default)]
    pub display_label: Option<String>,
    #[serde(default)]
    pub display_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<ChoiceDefinition>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    pub key: String,
    /// Defaults to the key when omitted.
    #[serde(default)]
    pub value: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepeatableSetDefinition {
    pub id: String,
    /// Contained prompt ids in declaration order.
    pub prompts: Vec<String>,
}
