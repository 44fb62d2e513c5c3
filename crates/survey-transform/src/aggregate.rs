//! Folding flat response rows into survey-instance records.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use survey_model::{CampaignSchema, ResponseRow};
use thiserror::Error;
use tracing::{debug, info_span, warn};

use crate::context::{
    Location, format_utc, local_date, parse_launch_context, parse_location, parse_utc_timestamp,
    resolve_instant, short_launch_context,
};
use crate::resolve::{DisplayValueResolver, ResolvedAnswer};
use crate::warning::RowResolutionWarning;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error(
        "aggregation already finalized; row for survey '{survey_id}' prompt '{prompt_id}' rejected"
    )]
    Finalized {
        survey_id: String,
        prompt_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Empty,
    Accumulating,
    Finalized,
}

/// Identity of one survey instance, or of one repeatable set iteration within it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub username: String,
    pub timestamp: String,
    pub survey_id: String,
    pub repeatable_set_id: Option<String>,
    pub repeatable_set_iteration: Option<u32>,
}

impl RecordKey {
    pub fn from_row(row: &ResponseRow) -> Self {
        Self {
            username: row.username.clone(),
            timestamp: row.timestamp.clone(),
            survey_id: row.survey_id.clone(),
            repeatable_set_id: row.repeatable_set_id.clone(),
            repeatable_set_iteration: row.repeatable_set_iteration,
        }
    }
}

/// One reconstructed survey instance.
///
/// Context fields come from the first row seen for the key. Read-only once
/// aggregation has finished.
#[derive(Debug, Clone)]
pub struct AggregatedRecord {
    key: RecordKey,
    client: Option<String>,
    timezone: Option<String>,
    utc_timestamp: Option<String>,
    epoch_millis: Option<i64>,
    date: Option<String>,
    location_status: Option<String>,
    location: Option<Location>,
    launch_context: Option<Value>,
    survey_title: Option<String>,
    survey_description: Option<String>,
    privacy_state: Option<String>,
    survey_key: Option<i64>,
    answers: BTreeMap<String, ResolvedAnswer>,
}

impl AggregatedRecord {
    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn username(&self) -> &str {
        &self.key.username
    }

    pub fn timestamp(&self) -> &str {
        &self.key.timestamp
    }

    pub fn survey_id(&self) -> &str {
        &self.key.survey_id
    }

    pub fn repeatable_set_id(&self) -> Option<&str> {
        self.key.repeatable_set_id.as_deref()
    }

    pub fn repeatable_set_iteration(&self) -> Option<u32> {
        self.key.repeatable_set_iteration
    }

    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn utc_timestamp(&self) -> Option<&str> {
        self.utc_timestamp.as_deref()
    }

    /// Milliseconds since the Unix epoch of the submission instant.
    pub fn epoch_millis(&self) -> Option<i64> {
        self.epoch_millis
    }

    /// Local calendar date of the submission, `yyyy-MM-dd`.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn location_status(&self) -> Option<&str> {
        self.location_status.as_deref()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Launch context as stored.
    pub fn launch_context(&self) -> Option<&Value> {
        self.launch_context.as_ref()
    }

    pub fn launch_context_short(&self) -> Option<Value> {
        self.launch_context.as_ref().map(short_launch_context)
    }

    pub fn survey_title(&self) -> Option<&str> {
        self.survey_title.as_deref()
    }

    pub fn survey_description(&self) -> Option<&str> {
        self.survey_description.as_deref()
    }

    pub fn privacy_state(&self) -> Option<&str> {
        self.privacy_state.as_deref()
    }

    pub fn survey_key(&self) -> Option<i64> {
        self.survey_key
    }

    pub fn answer(&self, prompt_id: &str) -> Option<&ResolvedAnswer> {
        self.answers.get(prompt_id)
    }

    /// Answers ordered by prompt id.
    pub fn answers(&self) -> impl Iterator<Item = (&str, &ResolvedAnswer)> {
        self.answers
            .iter()
            .map(|(prompt_id, answer)| (prompt_id.as_str(), answer))
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }
}

/// Output of a finished aggregation.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Records in first-seen key order.
    pub records: Vec<AggregatedRecord>,
    pub warnings: Vec<RowResolutionWarning>,
    pub rows_seen: usize,
}

impl Aggregation {
    /// Total answers across all records.
    pub fn answer_count(&self) -> usize {
        self.records.iter().map(AggregatedRecord::answer_count).sum()
    }

    /// Every prompt id answered in at least one record.
    pub fn present_prompt_ids(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .flat_map(|record| record.answers.keys().cloned())
            .collect()
    }
}

/// Groups rows by [`RecordKey`] for one export request.
pub struct ResponseAggregator<'a> {
    resolver: DisplayValueResolver<'a>,
    state: AggregatorState,
    records: Vec<AggregatedRecord>,
    index: BTreeMap<RecordKey, usize>,
    warnings: Vec<RowResolutionWarning>,
    rows_seen: usize,
}

impl<'a> ResponseAggregator<'a> {
    pub fn new(schema: &'a CampaignSchema) -> Self {
        Self {
            resolver: DisplayValueResolver::new(schema),
            state: AggregatorState::Empty,
            records: Vec::new(),
            index: BTreeMap::new(),
            warnings: Vec::new(),
            rows_seen: 0,
        }
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    pub fn records(&self) -> &[AggregatedRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[RowResolutionWarning] {
        &self.warnings
    }

    /// Fold one row into its record.
    ///
    /// Rows that cannot be attributed to a record are skipped with a warning.
    pub fn push(&mut self, row: &ResponseRow) -> Result<(), AggregateError> {
        if self.state == AggregatorState::Finalized {
            return Err(AggregateError::Finalized {
                survey_id: row.survey_id.clone(),
                prompt_id: row.prompt_id.clone(),
            });
        }
        self.state = AggregatorState::Accumulating;
        let row_index = self.rows_seen;
        self.rows_seen += 1;

        if let Some(field) = missing_identity(row) {
            self.record_warning(RowResolutionWarning::MissingIdentity {
                row: row_index,
                field,
            });
            return Ok(());
        }

        let key = RecordKey::from_row(row);
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                let record = self.seed_record(row_index, row, key.clone());
                let position = self.records.len();
                self.records.push(record);
                self.index.insert(key, position);
                position
            }
        };

        let resolution = self.resolver.resolve_row(row);
        if !resolution.known_prompt {
            self.record_warning(RowResolutionWarning::UnknownPrompt {
                row: row_index,
                survey_id: row.survey_id.clone(),
                prompt_id: row.prompt_id.clone(),
            });
        }
        if let Some(issue) = resolution.issue {
            self.record_warning(RowResolutionWarning::Value {
                row: row_index,
                survey_id: row.survey_id.clone(),
                prompt_id: row.prompt_id.clone(),
                issue,
            });
        }

        let replaced = self.records[position]
            .answers
            .insert(row.prompt_id.clone(), resolution.answer)
            .is_some();
        if replaced {
            self.record_warning(RowResolutionWarning::DuplicateAnswer {
                row: row_index,
                survey_id: row.survey_id.clone(),
                prompt_id: row.prompt_id.clone(),
            });
        }
        Ok(())
    }

    /// Stop accepting rows. Calling it again has no effect.
    pub fn finalize(&mut self) {
        if self.state != AggregatorState::Finalized {
            self.state = AggregatorState::Finalized;
            debug!(
                rows = self.rows_seen,
                records = self.records.len(),
                warnings = self.warnings.len(),
                "aggregation finalized"
            );
        }
    }

    /// Finalize and hand over the records.
    pub fn finish(mut self) -> Aggregation {
        self.finalize();
        Aggregation {
            records: self.records,
            warnings: self.warnings,
            rows_seen: self.rows_seen,
        }
    }

    fn seed_record(&mut self, row_index: usize, row: &ResponseRow, key: RecordKey) -> AggregatedRecord {
        let location = match parse_location(row.location_status.as_deref(), row.location.as_deref()) {
            Ok(location) => location,
            Err(error) => {
                self.record_warning(RowResolutionWarning::MalformedLocation {
                    row: row_index,
                    survey_id: row.survey_id.clone(),
                    detail: error.to_string(),
                });
                None
            }
        };
        let launch_context = match parse_launch_context(row.launch_context.as_deref()) {
            Ok(launch_context) => launch_context,
            Err(error) => {
                self.record_warning(RowResolutionWarning::MalformedLaunchContext {
                    row: row_index,
                    survey_id: row.survey_id.clone(),
                    detail: error.to_string(),
                });
                None
            }
        };
        let stored_utc = row
            .utc_timestamp
            .clone()
            .filter(|utc| !utc.trim().is_empty());
        let instant = row
            .timezone
            .as_deref()
            .and_then(|timezone| resolve_instant(&row.timestamp, timezone))
            .or_else(|| stored_utc.as_deref().and_then(parse_utc_timestamp));
        let utc_timestamp = stored_utc.or_else(|| instant.as_ref().map(format_utc));
        if utc_timestamp.is_none() {
            self.record_warning(RowResolutionWarning::UtcUnavailable {
                row: row_index,
                survey_id: row.survey_id.clone(),
                timezone: row.timezone.clone(),
            });
        }

        let survey = self.resolver.schema().survey(&row.survey_id).ok();
        AggregatedRecord {
            key,
            client: row.client.clone(),
            timezone: row.timezone.clone(),
            utc_timestamp,
            epoch_millis: instant.map(|instant| instant.timestamp_millis()),
            date: local_date(&row.timestamp),
            location_status: row.location_status.clone(),
            location,
            launch_context,
            survey_title: survey.map(|survey| survey.title.clone()),
            survey_description: survey.and_then(|survey| survey.description.clone()),
            privacy_state: row.privacy_state.clone(),
            survey_key: row.survey_key,
            answers: BTreeMap::new(),
        }
    }

    fn record_warning(&mut self, warning: RowResolutionWarning) {
        warn!(row = warning.row(), "{warning}");
        self.warnings.push(warning);
    }
}

fn missing_identity(row: &ResponseRow) -> Option<&'static str> {
    [
        ("username", row.username.as_str()),
        ("timestamp", row.timestamp.as_str()),
        ("survey id", row.survey_id.as_str()),
        ("prompt id", row.prompt_id.as_str()),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
}

/// Aggregate a complete row set in one pass.
pub fn aggregate<'r>(
    schema: &CampaignSchema,
    rows: impl IntoIterator<Item = &'r ResponseRow>,
) -> Aggregation {
    let span = info_span!("aggregate", campaign = schema.campaign_urn());
    let _guard = span.enter();

    let mut aggregator = ResponseAggregator::new(schema);
    for row in rows {
        // Only fails after finalize, which has not happened yet.
        if let Err(error) = aggregator.push(row) {
            warn!(%error, "row rejected");
        }
    }
    aggregator.finish()
}
