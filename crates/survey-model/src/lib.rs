pub mod column;
pub mod definition;
pub mod error;
pub mod prompt;
pub mod response;
pub mod schema;

pub use column::{ColumnId, StructuralColumn};
pub use definition::{
    CampaignDefinition, ChoiceDefinition, PromptDefinition, RepeatableSetDefinition,
    SurveyDefinition,
};
pub use error::{ColumnParseError, LookupKind, NotFound, Result, SchemaError};
pub use prompt::{ChoiceEntry, ChoiceGlossary, PromptSpec, PromptType};
pub use response::ResponseRow;
pub use schema::{CampaignSchema, RepeatableSetSpec, SurveyItem, SurveySpec};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_row_reads_optional_fields_as_absent() {
        let json = r#"{
            "username": "alice",
            "timestamp": "2024-03-01 09:15:00",
            "survey_id": "mood",
            "prompt_id": "rating",
            "prompt_type": "single_choice",
            "response": "1"
        }"#;
        let row: ResponseRow = serde_json::from_str(json).expect("deserialize row");
        assert_eq!(row.prompt_type, PromptType::SingleChoice);
        assert!(row.repeatable_set_id.is_none());
        assert!(row.survey_key.is_none());
    }
}
