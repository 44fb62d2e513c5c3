//! Column identifiers.
//!
//! A column is named by a namespaced token such as `context:timestamp` or
//! `prompt:id:mood`. Tokens are accepted with or without the legacy
//! `urn:ohmage:` prefix and are always emitted without it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColumnParseError;

const LEGACY_PREFIX: &str = "urn:ohmage:";
const PROMPT_PREFIX: &str = "prompt:id:";
const ALL_COLUMNS: &str = "special:all";
const ALL_PROMPTS: &str = "prompt:response";

/// A column that is not a prompt response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructuralColumn {
    UserId,
    Client,
    Timestamp,
    Timezone,
    UtcTimestamp,
    EpochMillis,
    Date,
    LaunchContextLong,
    LaunchContextShort,
    LocationStatus,
    LocationLatitude,
    LocationLongitude,
    LocationTimestamp,
    LocationTimezone,
    LocationAccuracy,
    LocationProvider,
    SurveyId,
    SurveyTitle,
    SurveyDescription,
    PrivacyState,
    RepeatableSetId,
    RepeatableSetIteration,
    SurveyResponseId,
}

impl StructuralColumn {
    pub const ALL: [StructuralColumn; 23] = [
        StructuralColumn::UserId,
        StructuralColumn::Client,
        StructuralColumn::Timestamp,
        StructuralColumn::Timezone,
        StructuralColumn::UtcTimestamp,
        StructuralColumn::EpochMillis,
        StructuralColumn::Date,
        StructuralColumn::LaunchContextLong,
        StructuralColumn::LaunchContextShort,
        StructuralColumn::LocationStatus,
        StructuralColumn::LocationLatitude,
        StructuralColumn::LocationLongitude,
        StructuralColumn::LocationTimestamp,
        StructuralColumn::LocationTimezone,
        StructuralColumn::LocationAccuracy,
        StructuralColumn::LocationProvider,
        StructuralColumn::SurveyId,
        StructuralColumn::SurveyTitle,
        StructuralColumn::SurveyDescription,
        StructuralColumn::PrivacyState,
        StructuralColumn::RepeatableSetId,
        StructuralColumn::RepeatableSetIteration,
        StructuralColumn::SurveyResponseId,
    ];

    /// Namespaced token, e.g. `context:location:latitude`.
    pub fn as_str(self) -> &'static str {
        match self {
            StructuralColumn::UserId => "user:id",
            StructuralColumn::Client => "context:client",
            StructuralColumn::Timestamp => "context:timestamp",
            StructuralColumn::Timezone => "context:timezone",
            StructuralColumn::UtcTimestamp => "context:utc_timestamp",
            StructuralColumn::EpochMillis => "context:epoch_millis",
            StructuralColumn::Date => "context:date",
            StructuralColumn::LaunchContextLong => "context:launch_context_long",
            StructuralColumn::LaunchContextShort => "context:launch_context_short",
            StructuralColumn::LocationStatus => "context:location:status",
            StructuralColumn::LocationLatitude => "context:location:latitude",
            StructuralColumn::LocationLongitude => "context:location:longitude",
            StructuralColumn::LocationTimestamp => "context:location:timestamp",
            StructuralColumn::LocationTimezone => "context:location:timezone",
            StructuralColumn::LocationAccuracy => "context:location:accuracy",
            StructuralColumn::LocationProvider => "context:location:provider",
            StructuralColumn::SurveyId => "survey:id",
            StructuralColumn::SurveyTitle => "survey:title",
            StructuralColumn::SurveyDescription => "survey:description",
            StructuralColumn::PrivacyState => "survey:privacy_state",
            StructuralColumn::RepeatableSetId => "repeatable_set:id",
            StructuralColumn::RepeatableSetIteration => "repeatable_set:iteration",
            StructuralColumn::SurveyResponseId => "survey_response:id",
        }
    }

    /// Field name used for this column in row documents.
    pub fn row_field_name(self) -> &'static str {
        match self {
            StructuralColumn::UserId => "user",
            StructuralColumn::Client => "client",
            StructuralColumn::Timestamp => "timestamp",
            StructuralColumn::Timezone => "timezone",
            StructuralColumn::UtcTimestamp => "utc_timestamp",
            StructuralColumn::EpochMillis => "epoch_millis",
            StructuralColumn::Date => "date",
            StructuralColumn::LaunchContextLong => "launch_context_long",
            StructuralColumn::LaunchContextShort => "launch_context_short",
            StructuralColumn::LocationStatus => "location_status",
            StructuralColumn::LocationLatitude => "latitude",
            StructuralColumn::LocationLongitude => "longitude",
            StructuralColumn::LocationTimestamp => "location_timestamp",
            StructuralColumn::LocationTimezone => "location_timezone",
            StructuralColumn::LocationAccuracy => "location_accuracy",
            StructuralColumn::LocationProvider => "location_provider",
            StructuralColumn::SurveyId => "survey_id",
            StructuralColumn::SurveyTitle => "survey_title",
            StructuralColumn::SurveyDescription => "survey_description",
            StructuralColumn::PrivacyState => "privacy_state",
            StructuralColumn::RepeatableSetId => "repeatable_set_id",
            StructuralColumn::RepeatableSetIteration => "repeatable_set_iteration",
            StructuralColumn::SurveyResponseId => "survey_key",
        }
    }

    /// Columns holding participant-written text.
    pub fn is_free_text(self) -> bool {
        matches!(
            self,
            StructuralColumn::SurveyTitle | StructuralColumn::SurveyDescription
        )
    }

    fn from_token(token: &str) -> Option<Self> {
        StructuralColumn::ALL
            .iter()
            .copied()
            .find(|column| column.as_str() == token)
    }
}

impl fmt::Display for StructuralColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of column selection and ordering.
///
/// Ordering between identifiers is the lexicographic order of their tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnId {
    Structural(StructuralColumn),
    Prompt(String),
    /// Sentinel: every known column.
    AllColumns,
    /// Sentinel: every prompt-response column.
    AllPrompts,
}

impl ColumnId {
    pub fn prompt(prompt_id: impl Into<String>) -> Self {
        ColumnId::Prompt(prompt_id.into())
    }

    pub fn token(&self) -> String {
        match self {
            ColumnId::Structural(column) => column.as_str().to_string(),
            ColumnId::Prompt(id) => format!("{PROMPT_PREFIX}{id}"),
            ColumnId::AllColumns => ALL_COLUMNS.to_string(),
            ColumnId::AllPrompts => ALL_PROMPTS.to_string(),
        }
    }

    /// Abbreviated header used by delimited output.
    ///
    /// The `context:` namespace is dropped, prompt columns use the bare prompt
    /// id and the remaining separators become underscores.
    pub fn short_header(&self) -> String {
        match self {
            ColumnId::Prompt(id) => id.clone(),
            other => {
                let token = other.token();
                let trimmed = token.strip_prefix("context:").unwrap_or(&token);
                trimmed.replace(':', "_")
            }
        }
    }

    pub fn is_prompt(&self) -> bool {
        matches!(self, ColumnId::Prompt(_))
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, ColumnId::AllColumns | ColumnId::AllPrompts)
    }

    pub fn prompt_id(&self) -> Option<&str> {
        match self {
            ColumnId::Prompt(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn structural(&self) -> Option<StructuralColumn> {
        match self {
            ColumnId::Structural(column) => Some(*column),
            _ => None,
        }
    }
}

impl From<StructuralColumn> for ColumnId {
    fn from(column: StructuralColumn) -> Self {
        ColumnId::Structural(column)
    }
}

impl FromStr for ColumnId {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let token = trimmed.strip_prefix(LEGACY_PREFIX).unwrap_or(trimmed);
        if let Some(column) = StructuralColumn::from_token(token) {
            return Ok(ColumnId::Structural(column));
        }
        match token {
            ALL_COLUMNS => return Ok(ColumnId::AllColumns),
            ALL_PROMPTS => return Ok(ColumnId::AllPrompts),
            _ => {}
        }
        match token.strip_prefix(PROMPT_PREFIX) {
            Some(id) if !id.is_empty() => Ok(ColumnId::Prompt(id.to_string())),
            _ => Err(ColumnParseError {
                token: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ColumnId {
    type Error = ColumnParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnId> for String {
    fn from(value: ColumnId) -> Self {
        value.token()
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl Ord for ColumnId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.token().cmp(&other.token())
    }
}

impl PartialOrd for ColumnId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_prefix_is_accepted() {
        let column: ColumnId = "urn:ohmage:context:location:latitude".parse().unwrap();
        assert_eq!(
            column,
            ColumnId::Structural(StructuralColumn::LocationLatitude)
        );
        assert_eq!(column.token(), "context:location:latitude");
    }

    #[test]
    fn legacy_context_columns() {
        for (token, column) in [
            ("urn:ohmage:context:epoch_millis", StructuralColumn::EpochMillis),
            ("urn:ohmage:context:date", StructuralColumn::Date),
            ("urn:ohmage:context:location:timezone", StructuralColumn::LocationTimezone),
            ("urn:ohmage:survey_response:id", StructuralColumn::SurveyResponseId),
        ] {
            assert_eq!(token.parse::<ColumnId>(), Ok(ColumnId::Structural(column)));
        }
        assert_eq!(StructuralColumn::SurveyResponseId.row_field_name(), "survey_key");
    }

    #[test]
    fn short_headers() {
        let header = |token: &str| token.parse::<ColumnId>().unwrap().short_header();
        assert_eq!(header("user:id"), "user_id");
        assert_eq!(header("context:timestamp"), "timestamp");
        assert_eq!(header("context:location:status"), "location_status");
        assert_eq!(header("survey:title"), "survey_title");
        assert_eq!(header("repeatable_set:iteration"), "repeatable_set_iteration");
        assert_eq!(header("context:epoch_millis"), "epoch_millis");
        assert_eq!(header("context:location:timezone"), "location_timezone");
        assert_eq!(header("survey_response:id"), "survey_response_id");
        assert_eq!(header("prompt:id:mood"), "mood");
    }

    #[test]
    fn sentinels_and_errors() {
        assert_eq!("special:all".parse::<ColumnId>(), Ok(ColumnId::AllColumns));
        assert_eq!(
            "urn:ohmage:prompt:response".parse::<ColumnId>(),
            Ok(ColumnId::AllPrompts)
        );
        assert!("prompt:id:".parse::<ColumnId>().is_err());
        assert!("context:weather".parse::<ColumnId>().is_err());
    }
}
