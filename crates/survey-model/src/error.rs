use std::fmt;

use thiserror::Error;

/// Errors raised while building a [`CampaignSchema`](crate::CampaignSchema).
///
/// Any of these aborts the export before rendering starts.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse campaign definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("campaign definition has an empty campaign urn")]
    MissingCampaignUrn,

    #[error("survey at position {position} has an empty id")]
    EmptySurveyId { position: usize },

    #[error("duplicate id '{id}' in campaign schema")]
    DuplicateId { id: String },

    #[error("item '{id}' is used by survey '{second_survey}' but already belongs to survey '{first_survey}'")]
    ReusedItem {
        id: String,
        first_survey: String,
        second_survey: String,
    },

    #[error("survey '{survey_id}' references unknown item '{item_id}'")]
    UnknownItem { survey_id: String, item_id: String },

    #[error("repeatable set '{set_id}' references unknown prompt '{prompt_id}'")]
    UnknownSetPrompt { set_id: String, prompt_id: String },

    #[error("repeatable set '{set_id}' may not contain another repeatable set '{nested_id}'")]
    NestedRepeatableSet { set_id: String, nested_id: String },

    #[error("prompt '{prompt_id}' is missing required field '{field}'")]
    MissingField {
        prompt_id: String,
        field: &'static str,
    },

    #[error("prompt '{prompt_id}' declares choice key '{key}' more than once")]
    DuplicateChoiceKey { prompt_id: String, key: String },
}

/// Which kind of schema entry a lookup was asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Survey,
    RepeatableSet,
    Prompt,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupKind::Survey => "survey",
            LookupKind::RepeatableSet => "repeatable set",
            LookupKind::Prompt => "prompt",
        };
        f.write_str(name)
    }
}

/// A schema lookup miss.
///
/// Response data may reference prompts that were retired from the campaign,
/// so callers treat this as "no context available" rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} '{id}' not found in campaign schema")]
pub struct NotFound {
    pub kind: LookupKind,
    pub id: String,
}

impl NotFound {
    pub(crate) fn survey(id: &str) -> Self {
        Self {
            kind: LookupKind::Survey,
            id: id.to_string(),
        }
    }

    pub(crate) fn repeatable_set(id: &str) -> Self {
        Self {
            kind: LookupKind::RepeatableSet,
            id: id.to_string(),
        }
    }

    pub(crate) fn prompt(id: &str) -> Self {
        Self {
            kind: LookupKind::Prompt,
            id: id.to_string(),
        }
    }
}

/// A column token that does not name any known column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column identifier '{token}'")]
pub struct ColumnParseError {
    pub token: String,
}

pub type Result<T> = std::result::Result<T, SchemaError>;
