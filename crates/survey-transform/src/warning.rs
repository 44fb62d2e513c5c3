use std::fmt;

use crate::resolve::ResolveIssue;

/// A recoverable problem with one input row.
///
/// The row is still folded into its record with a best-effort value, or
/// skipped when it cannot be attributed to any record at all. `row` is the
/// zero-based position of the row in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowResolutionWarning {
    MissingIdentity {
        row: usize,
        field: &'static str,
    },
    UnknownPrompt {
        row: usize,
        survey_id: String,
        prompt_id: String,
    },
    Value {
        row: usize,
        survey_id: String,
        prompt_id: String,
        issue: ResolveIssue,
    },
    MalformedLocation {
        row: usize,
        survey_id: String,
        detail: String,
    },
    MalformedLaunchContext {
        row: usize,
        survey_id: String,
        detail: String,
    },
    UtcUnavailable {
        row: usize,
        survey_id: String,
        timezone: Option<String>,
    },
    DuplicateAnswer {
        row: usize,
        survey_id: String,
        prompt_id: String,
    },
}

impl RowResolutionWarning {
    pub fn row(&self) -> usize {
        match self {
            RowResolutionWarning::MissingIdentity { row, .. }
            | RowResolutionWarning::UnknownPrompt { row, .. }
            | RowResolutionWarning::Value { row, .. }
            | RowResolutionWarning::MalformedLocation { row, .. }
            | RowResolutionWarning::MalformedLaunchContext { row, .. }
            | RowResolutionWarning::UtcUnavailable { row, .. }
            | RowResolutionWarning::DuplicateAnswer { row, .. } => *row,
        }
    }

    /// Whether the row was dropped instead of folded into a record.
    pub fn is_skip(&self) -> bool {
        matches!(self, RowResolutionWarning::MissingIdentity { .. })
    }
}

impl fmt::Display for RowResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowResolutionWarning::MissingIdentity { row, field } => {
                write!(f, "row {row}: empty {field}, row skipped")
            }
            RowResolutionWarning::UnknownPrompt {
                row,
                survey_id,
                prompt_id,
            } => write!(
                f,
                "row {row}: prompt '{prompt_id}' is not declared by survey '{survey_id}'"
            ),
            RowResolutionWarning::Value {
                row,
                survey_id,
                prompt_id,
                issue,
            } => write!(f, "row {row}: {survey_id}/{prompt_id}: {issue}"),
            RowResolutionWarning::MalformedLocation {
                row,
                survey_id,
                detail,
            } => write!(f, "row {row}: survey '{survey_id}': unreadable location: {detail}"),
            RowResolutionWarning::MalformedLaunchContext {
                row,
                survey_id,
                detail,
            } => write!(
                f,
                "row {row}: survey '{survey_id}': unreadable launch context: {detail}"
            ),
            RowResolutionWarning::UtcUnavailable {
                row,
                survey_id,
                timezone,
            } => write!(
                f,
                "row {row}: survey '{survey_id}': no UTC time for timezone '{}'",
                timezone.as_deref().unwrap_or("")
            ),
            RowResolutionWarning::DuplicateAnswer {
                row,
                survey_id,
                prompt_id,
            } => write!(
                f,
                "row {row}: {survey_id}/{prompt_id} answered twice in one record, keeping the later answer"
            ),
        }
    }
}
