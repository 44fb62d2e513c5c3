use std::collections::BTreeMap;

use crate::definition::{CampaignDefinition, PromptDefinition, RepeatableSetDefinition};
use crate::error::{NotFound, Result, SchemaError};
use crate::prompt::{ChoiceEntry, ChoiceGlossary, PromptSpec, PromptType};

/// A survey item in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyItem {
    Prompt(String),
    RepeatableSet(String),
}

impl SurveyItem {
    pub fn id(&self) -> &str {
        match self {
            SurveyItem::Prompt(id) | SurveyItem::RepeatableSet(id) => id.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SurveySpec {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    items: Vec<SurveyItem>,
    prompt_slots: Vec<String>,
}

impl SurveySpec {
    pub fn items(&self) -> &[SurveyItem] {
        &self.items
    }

    /// Prompt ids in canonical column order.
    ///
    /// Top-level prompts keep their item position; a repeatable set occupies
    /// its item position with its own prompts in set order.
    pub fn prompt_slots(&self) -> &[String] {
        &self.prompt_slots
    }
}

#[derive(Debug, Clone)]
pub struct RepeatableSetSpec {
    pub id: String,
    pub survey_id: String,
    prompts: Vec<PromptSpec>,
}

impl RepeatableSetSpec {
    pub fn prompts(&self) -> &[PromptSpec] {
        &self.prompts
    }

    pub fn prompt(&self, prompt_id: &str) -> Option<&PromptSpec> {
        self.prompts.iter().find(|prompt| prompt.id == prompt_id)
    }

    /// Position of a prompt inside this set.
    pub fn prompt_index(&self, prompt_id: &str) -> Option<usize> {
        self.prompts.iter().position(|prompt| prompt.id == prompt_id)
    }
}

#[derive(Debug, Clone)]
struct PromptEntry {
    survey: usize,
    repeatable_set: Option<String>,
    slot: usize,
}

/// Immutable, in-memory view of one campaign version.
///
/// Built once per campaign version and shared read-only between export
/// requests. Every prompt, repeatable set and survey id is unique across
/// the whole schema.
#[derive(Debug, Clone)]
pub struct CampaignSchema {
    campaign_urn: String,
    name: Option<String>,
    version: Option<String>,
    surveys: Vec<SurveySpec>,
    survey_positions: BTreeMap<String, usize>,
    repeatable_sets: BTreeMap<String, RepeatableSetSpec>,
    top_level_prompts: BTreeMap<String, PromptSpec>,
    prompt_entries: BTreeMap<String, PromptEntry>,
}

impl CampaignSchema {
    /// Parse a JSON campaign definition and build the schema from it.
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: CampaignDefinition = serde_json::from_str(json)?;
        Self::from_definition(&definition)
    }

    /// Validate a campaign definition and index it for lookups.
    pub fn from_definition(definition: &CampaignDefinition) -> Result<Self> {
        let campaign_urn = definition.campaign_urn.trim();
        if campaign_urn.is_empty() {
            return Err(SchemaError::MissingCampaignUrn);
        }

        let mut prompt_catalog: BTreeMap<&str, &PromptDefinition> = BTreeMap::new();
        for prompt in &definition.prompts {
            if prompt_catalog.insert(prompt.id.as_str(), prompt).is_some() {
                return Err(SchemaError::DuplicateId {
                    id: prompt.id.clone(),
                });
            }
        }
        let mut set_catalog: BTreeMap<&str, &RepeatableSetDefinition> = BTreeMap::new();
        for set in &definition.repeatable_sets {
            if prompt_catalog.contains_key(set.id.as_str())
                || set_catalog.insert(set.id.as_str(), set).is_some()
            {
                return Err(SchemaError::DuplicateId { id: set.id.clone() });
            }
        }

        let mut schema = CampaignSchema {
            campaign_urn: campaign_urn.to_string(),
            name: definition.name.clone(),
            version: definition.version.clone(),
            surveys: Vec::with_capacity(definition.surveys.len()),
            survey_positions: BTreeMap::new(),
            repeatable_sets: BTreeMap::new(),
            top_level_prompts: BTreeMap::new(),
            prompt_entries: BTreeMap::new(),
        };
        // item id -> survey that declared it
        let mut owners: BTreeMap<String, String> = BTreeMap::new();

        for (position, survey) in definition.surveys.iter().enumerate() {
            let survey_id = survey.id.trim();
            if survey_id.is_empty() {
                return Err(SchemaError::EmptySurveyId { position });
            }
            if schema.survey_positions.contains_key(survey_id)
                || prompt_catalog.contains_key(survey_id)
                || set_catalog.contains_key(survey_id)
            {
                return Err(SchemaError::DuplicateId {
                    id: survey_id.to_string(),
                });
            }

            let survey_index = schema.surveys.len();
            let mut items = Vec::with_capacity(survey.items.len());
            let mut slots = Vec::new();

            for item_id in &survey.items {
                claim(&mut owners, item_id, survey_id)?;
                if let Some(prompt) = prompt_catalog.get(item_id.as_str()) {
                    let spec = build_prompt(prompt)?;
                    schema.prompt_entries.insert(
                        item_id.clone(),
                        PromptEntry {
                            survey: survey_index,
                            repeatable_set: None,
                            slot: slots.len(),
                        },
                    );
                    slots.push(item_id.clone());
                    schema.top_level_prompts.insert(item_id.clone(), spec);
                    items.push(SurveyItem::Prompt(item_id.clone()));
                } else if let Some(set) = set_catalog.get(item_id.as_str()) {
                    let mut prompts = Vec::with_capacity(set.prompts.len());
                    for prompt_id in &set.prompts {
                        if set_catalog.contains_key(prompt_id.as_str()) {
                            return Err(SchemaError::NestedRepeatableSet {
                                set_id: set.id.clone(),
                                nested_id: prompt_id.clone(),
                            });
                        }
                        let prompt = prompt_catalog.get(prompt_id.as_str()).ok_or_else(|| {
                            SchemaError::UnknownSetPrompt {
                                set_id: set.id.clone(),
                                prompt_id: prompt_id.clone(),
                            }
                        })?;
                        claim(&mut owners, prompt_id, survey_id)?;
                        schema.prompt_entries.insert(
                            prompt_id.clone(),
                            PromptEntry {
                                survey: survey_index,
                                repeatable_set: Some(set.id.clone()),
                                slot: slots.len(),
                            },
                        );
                        slots.push(prompt_id.clone());
                        prompts.push(build_prompt(prompt)?);
                    }
                    schema.repeatable_sets.insert(
                        set.id.clone(),
                        RepeatableSetSpec {
                            id: set.id.clone(),
                            survey_id: survey_id.to_string(),
                            prompts,
                        },
                    );
                    items.push(SurveyItem::RepeatableSet(set.id.clone()));
                } else {
                    return Err(SchemaError::UnknownItem {
                        survey_id: survey_id.to_string(),
                        item_id: item_id.clone(),
                    });
                }
            }

            schema
                .survey_positions
                .insert(survey_id.to_string(), survey_index);
            schema.surveys.push(SurveySpec {
                id: survey_id.to_string(),
                title: survey.title.clone(),
                description: survey.description.clone(),
                items,
                prompt_slots: slots,
            });
        }

        Ok(schema)
    }

    pub fn campaign_urn(&self) -> &str {
        &self.campaign_urn
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Surveys in declaration order.
    pub fn surveys(&self) -> impl Iterator<Item = &SurveySpec> {
        self.surveys.iter()
    }

    pub fn survey(&self, survey_id: &str) -> std::result::Result<&SurveySpec, NotFound> {
        self.survey_position(survey_id)
            .map(|position| &self.surveys[position])
    }

    pub fn repeatable_set(
        &self,
        repeatable_set_id: &str,
    ) -> std::result::Result<&RepeatableSetSpec, NotFound> {
        self.repeatable_sets
            .get(repeatable_set_id)
            .ok_or_else(|| NotFound::repeatable_set(repeatable_set_id))
    }

    /// The survey that declares `prompt_id`, directly or through a repeatable set.
    pub fn survey_id_for_prompt(&self, prompt_id: &str) -> std::result::Result<&str, NotFound> {
        self.prompt_entries
            .get(prompt_id)
            .map(|entry| self.surveys[entry.survey].id.as_str())
            .ok_or_else(|| NotFound::prompt(prompt_id))
    }

    /// Canonical column position of a prompt within its survey.
    ///
    /// Repeatable set prompts count as slots of the survey's expanded column
    /// order. [`RepeatableSetSpec::prompt_index`] gives the position inside
    /// the set.
    pub fn prompt_index(
        &self,
        survey_id: &str,
        prompt_id: &str,
    ) -> std::result::Result<usize, NotFound> {
        let position = self.survey_position(survey_id)?;
        self.prompt_entries
            .get(prompt_id)
            .filter(|entry| entry.survey == position)
            .map(|entry| entry.slot)
            .ok_or_else(|| NotFound::prompt(prompt_id))
    }

    /// Number of prompt column slots a survey contributes.
    pub fn prompt_count(&self, survey_id: &str) -> std::result::Result<usize, NotFound> {
        self.survey(survey_id)
            .map(|survey| survey.prompt_slots.len())
    }

    /// Prompt metadata scoped to a survey and, for repeatable set prompts,
    /// to the set that contains it.
    ///
    /// Without a repeatable set id only top-level prompts of the survey match.
    pub fn prompt_meta(
        &self,
        survey_id: &str,
        repeatable_set_id: Option<&str>,
        prompt_id: &str,
    ) -> std::result::Result<&PromptSpec, NotFound> {
        let position = self.survey_position(survey_id)?;
        let entry = self
            .prompt_entries
            .get(prompt_id)
            .filter(|entry| entry.survey == position)
            .ok_or_else(|| NotFound::prompt(prompt_id))?;

        match (repeatable_set_id, entry.repeatable_set.as_deref()) {
            (None, None) => self
                .top_level_prompts
                .get(prompt_id)
                .ok_or_else(|| NotFound::prompt(prompt_id)),
            (Some(requested), Some(owner)) if requested == owner => self
                .repeatable_sets
                .get(owner)
                .and_then(|set| set.prompt(prompt_id))
                .ok_or_else(|| NotFound::prompt(prompt_id)),
            (Some(requested), _) if !self.repeatable_sets.contains_key(requested) => {
                Err(NotFound::repeatable_set(requested))
            }
            _ => Err(NotFound::prompt(prompt_id)),
        }
    }

    /// Prompt metadata by id alone, wherever it is declared.
    pub fn prompt(&self, prompt_id: &str) -> std::result::Result<&PromptSpec, NotFound> {
        let entry = self
            .prompt_entries
            .get(prompt_id)
            .ok_or_else(|| NotFound::prompt(prompt_id))?;
        let spec = match entry.repeatable_set.as_deref() {
            Some(set_id) => self
                .repeatable_sets
                .get(set_id)
                .and_then(|set| set.prompt(prompt_id)),
            None => self.top_level_prompts.get(prompt_id),
        };
        spec.ok_or_else(|| NotFound::prompt(prompt_id))
    }

    pub fn contains_prompt(&self, prompt_id: &str) -> bool {
        self.prompt_entries.contains_key(prompt_id)
    }

    fn survey_position(&self, survey_id: &str) -> std::result::Result<usize, NotFound> {
        self.survey_positions
            .get(survey_id)
            .copied()
            .ok_or_else(|| NotFound::survey(survey_id))
    }
}

fn claim(owners: &mut BTreeMap<String, String>, item_id: &str, survey_id: &str) -> Result<()> {
    if let Some(first_survey) = owners.get(item_id) {
        if first_survey == survey_id {
            return Err(SchemaError::DuplicateId {
                id: item_id.to_string(),
            });
        }
        return Err(SchemaError::ReusedItem {
            id: item_id.to_string(),
            first_survey: first_survey.clone(),
            second_survey: survey_id.to_string(),
        });
    }
    owners.insert(item_id.to_string(), survey_id.to_string());
    Ok(())
}

fn required<'a>(
    value: Option<&'a String>,
    prompt_id: &str,
    field: &'static str,
) -> Result<&'a str> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SchemaError::MissingField {
            prompt_id: prompt_id.to_string(),
            field,
        })
}

fn build_prompt(definition: &PromptDefinition) -> Result<PromptSpec> {
    let prompt_type = required(definition.prompt_type.as_ref(), &definition.id, "type")?;
    let display_label = required(
        definition.display_label.as_ref(),
        &definition.id,
        "display_label",
    )?;

    let choice_glossary = match &definition.choices {
        Some(choices) => {
            let mut entries: Vec<ChoiceEntry> = Vec::with_capacity(choices.len());
            for choice in choices {
                if entries.iter().any(|entry| entry.key == choice.key) {
                    return Err(SchemaError::DuplicateChoiceKey {
                        prompt_id: definition.id.clone(),
                        key: choice.key.clone(),
                    });
                }
                entries.push(ChoiceEntry {
                    key: choice.key.clone(),
                    value: choice.value.clone().unwrap_or_else(|| choice.key.clone()),
                    label: choice.label.clone(),
                });
            }
            Some(ChoiceGlossary::new(entries))
        }
        None => None,
    };

    Ok(PromptSpec {
        id: definition.id.clone(),
        prompt_type: PromptType::parse(prompt_type),
        display_label: display_label.to_string(),
        display_type: definition.display_type.clone(),
        unit: definition.unit.clone(),
        text: definition.text.clone(),
        choice_glossary,
    })
}
