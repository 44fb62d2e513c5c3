use serde::{Deserialize, Serialize};

use crate::prompt::PromptType;

/// One stored answer to one prompt, as read from response storage.
///
/// Rows arrive unordered. Location and launch context are kept as the raw
/// JSON text they were stored with and are decoded during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRow {
    pub username: String,
    /// Local submission time, `yyyy-MM-dd HH:mm:ss`.
    pub timestamp: String,
    pub survey_id: String,
    pub prompt_id: String,
    pub prompt_type: PromptType,
    /// Raw stored response text.
    pub response: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_timestamp: Option<String>,
    #[serde(default)]
    pub location_status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub launch_context: Option<String>,
    #[serde(default)]
    pub repeatable_set_id: Option<String>,
    #[serde(default)]
    pub repeatable_set_iteration: Option<u32>,
    #[serde(default)]
    pub privacy_state: Option<String>,
    /// Storage key of the survey response this answer belongs to.
    #[serde(default)]
    pub survey_key: Option<i64>,
}

impl ResponseRow {
    /// Minimal row with only the required fields set.
    pub fn new(
        username: impl Into<String>,
        timestamp: impl Into<String>,
        survey_id: impl Into<String>,
        prompt_id: impl Into<String>,
        prompt_type: PromptType,
        response: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            timestamp: timestamp.into(),
            survey_id: survey_id.into(),
            prompt_id: prompt_id.into(),
            prompt_type,
            response: response.into(),
            client: None,
            timezone: None,
            utc_timestamp: None,
            location_status: None,
            location: None,
            launch_context: None,
            repeatable_set_id: None,
            repeatable_set_iteration: None,
            privacy_state: None,
            survey_key: None,
        }
    }

    #[must_use]
    pub fn with_repeatable_set(mut self, set_id: impl Into<String>, iteration: u32) -> Self {
        self.repeatable_set_id = Some(set_id.into());
        self.repeatable_set_iteration = Some(iteration);
        self
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    #[must_use]
    pub fn with_location(
        mut self,
        status: impl Into<String>,
        location: Option<String>,
    ) -> Self {
        self.location_status = Some(status.into());
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_launch_context(mut self, launch_context: impl Into<String>) -> Self {
        self.launch_context = Some(launch_context.into());
        self
    }

    #[must_use]
    pub fn with_privacy_state(mut self, privacy_state: impl Into<String>) -> Self {
        self.privacy_state = Some(privacy_state.into());
        self
    }

    #[must_use]
    pub fn with_survey_key(mut self, survey_key: i64) -> Self {
        self.survey_key = Some(survey_key);
        self
    }
}
