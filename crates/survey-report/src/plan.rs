//! Canonical column ordering shared by every output format.

use std::collections::BTreeSet;

use survey_model::{CampaignSchema, ColumnId, ColumnParseError, StructuralColumn};
use thiserror::Error;
use tracing::{debug, warn};

/// Columns pulled to the front of every plan, in this order, when requested.
pub const CANONICAL_PREFIX: [StructuralColumn; 6] = [
    StructuralColumn::UserId,
    StructuralColumn::Timestamp,
    StructuralColumn::UtcTimestamp,
    StructuralColumn::SurveyId,
    StructuralColumn::RepeatableSetId,
    StructuralColumn::RepeatableSetIteration,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColumnPlanError {
    #[error("no output columns requested")]
    EmptyRequest,

    #[error(transparent)]
    Parse(#[from] ColumnParseError),

    #[error("column '{token}' names prompt '{prompt_id}', which the campaign does not declare")]
    UnknownPrompt { token: String, prompt_id: String },
}

/// Parse requested column tokens.
pub fn parse_columns<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<ColumnId>, ColumnPlanError> {
    tokens
        .iter()
        .map(|token| token.as_ref().parse::<ColumnId>().map_err(ColumnPlanError::from))
        .collect()
}

/// Plans columns against one campaign schema.
#[derive(Debug, Clone, Copy)]
pub struct ColumnPlanner<'a> {
    schema: &'a CampaignSchema,
}

impl<'a> ColumnPlanner<'a> {
    pub fn new(schema: &'a CampaignSchema) -> Self {
        Self { schema }
    }

    /// Compute the canonical column order.
    ///
    /// The result starts with the requested [`CANONICAL_PREFIX`] columns,
    /// followed by one block per survey that owns a planned prompt (every
    /// declared slot of that survey, in schema order), then observed prompts
    /// the schema does not know, then the remaining structural columns in
    /// token order.
    pub fn plan(
        &self,
        requested: &[ColumnId],
        present_prompt_ids: &BTreeSet<String>,
    ) -> Result<Vec<ColumnId>, ColumnPlanError> {
        if requested.is_empty() {
            return Err(ColumnPlanError::EmptyRequest);
        }

        let mut remaining: BTreeSet<ColumnId> = BTreeSet::new();
        let mut explicit_prompts: BTreeSet<String> = BTreeSet::new();
        let mut all_prompts = false;
        for column in requested {
            match column {
                ColumnId::AllColumns => {
                    remaining.extend(StructuralColumn::ALL.into_iter().map(ColumnId::from));
                    all_prompts = true;
                }
                ColumnId::AllPrompts => all_prompts = true,
                ColumnId::Prompt(prompt_id) => {
                    if !self.schema.contains_prompt(prompt_id) {
                        return Err(ColumnPlanError::UnknownPrompt {
                            token: column.token(),
                            prompt_id: prompt_id.clone(),
                        });
                    }
                    explicit_prompts.insert(prompt_id.clone());
                }
                ColumnId::Structural(structural) => {
                    remaining.insert(ColumnId::Structural(*structural));
                }
            }
        }

        let mut planned = Vec::new();
        for prefix in CANONICAL_PREFIX {
            let column = ColumnId::Structural(prefix);
            if remaining.remove(&column) {
                planned.push(column);
            }
        }

        let mut prompt_ids = explicit_prompts;
        if all_prompts {
            prompt_ids.extend(present_prompt_ids.iter().cloned());
        }

        let mut owning_surveys: BTreeSet<&str> = BTreeSet::new();
        let mut undeclared: Vec<&str> = Vec::new();
        for prompt_id in &prompt_ids {
            match self.schema.survey_id_for_prompt(prompt_id) {
                Ok(survey_id) => {
                    owning_surveys.insert(survey_id);
                }
                Err(_) => undeclared.push(prompt_id.as_str()),
            }
        }

        for survey in self.schema.surveys() {
            if owning_surveys.contains(survey.id.as_str()) {
                planned.extend(survey.prompt_slots().iter().map(ColumnId::prompt));
            }
        }
        for prompt_id in undeclared {
            warn!(prompt_id, "observed prompt is not declared by the campaign");
            planned.push(ColumnId::prompt(prompt_id));
        }

        planned.extend(remaining);
        debug!(
            requested = requested.len(),
            planned = planned.len(),
            surveys = owning_surveys.len(),
            "planned output columns"
        );
        Ok(planned)
    }
}

/// Plan columns for a request. See [`ColumnPlanner::plan`].
pub fn plan(
    requested: &[ColumnId],
    present_prompt_ids: &BTreeSet<String>,
    schema: &CampaignSchema,
) -> Result<Vec<ColumnId>, ColumnPlanError> {
    ColumnPlanner::new(schema).plan(requested, present_prompt_ids)
}
