//! Tests for campaign schema construction and lookups.

use proptest::prelude::*;
use survey_model::{
    CampaignDefinition, CampaignSchema, LookupKind, PromptDefinition, PromptType,
    RepeatableSetDefinition, SchemaError, SurveyDefinition, SurveyItem,
};

const CAMPAIGN: &str = r#"{
    "campaign_urn": "urn:campaign:study:mood",
    "name": "Mood study",
    "surveys": [
        {
            "id": "mood",
            "title": "Daily mood",
            "items": ["rating", "feelings", "meals", "notes"]
        },
        { "id": "sleep", "title": "Sleep", "items": ["hours"] }
    ],
    "prompts": [
        {
            "id": "rating",
            "type": "single_choice",
            "display_label": "Rating",
            "choices": [
                { "key": "0", "value": "1", "label": "Low" },
                { "key": "1", "label": "High" }
            ]
        },
        { "id": "feelings", "type": "multi_choice", "display_label": "Feelings" },
        { "id": "notes", "type": "text", "display_label": "Notes", "text": "Anything else?" },
        { "id": "meal_type", "type": "single_choice_custom", "display_label": "Meal" },
        { "id": "meal_size", "type": "number", "display_label": "Size", "unit": "g" },
        { "id": "hours", "type": "hours_before_now", "display_label": "Hours" }
    ],
    "repeatable_sets": [
        { "id": "meals", "prompts": ["meal_type", "meal_size"] }
    ]
}"#;

fn schema() -> CampaignSchema {
    CampaignSchema::from_json(CAMPAIGN).expect("valid campaign")
}

fn prompt(id: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        prompt_type: Some("text".to_string()),
        display_label: Some(id.to_uppercase()),
        ..PromptDefinition::default()
    }
}

fn survey(id: &str, items: &[&str]) -> SurveyDefinition {
    SurveyDefinition {
        id: id.to_string(),
        items: items.iter().map(|item| (*item).to_string()).collect(),
        ..SurveyDefinition::default()
    }
}

#[test]
fn surveys_keep_declaration_order() {
    let schema = schema();
    let ids: Vec<&str> = schema.surveys().map(|survey| survey.id.as_str()).collect();
    assert_eq!(ids, vec!["mood", "sleep"]);
    assert_eq!(schema.campaign_urn(), "urn:campaign:study:mood");
    assert_eq!(schema.name(), Some("Mood study"));
}

#[test]
fn repeatable_set_prompts_expand_inline() {
    let schema = schema();
    let mood = schema.survey("mood").unwrap();
    assert_eq!(
        mood.prompt_slots(),
        ["rating", "feelings", "meal_type", "meal_size", "notes"]
    );
    assert_eq!(mood.items()[2], SurveyItem::RepeatableSet("meals".to_string()));
    assert_eq!(schema.prompt_count("mood"), Ok(5));
    assert_eq!(schema.prompt_index("mood", "notes"), Ok(4));
    assert_eq!(schema.prompt_index("mood", "meal_size"), Ok(3));
}

#[test]
fn survey_for_prompt_includes_set_members() {
    let schema = schema();
    assert_eq!(schema.survey_id_for_prompt("meal_type"), Ok("mood"));
    assert_eq!(schema.survey_id_for_prompt("hours"), Ok("sleep"));

    let missing = schema.survey_id_for_prompt("retired").unwrap_err();
    assert_eq!(missing.kind, LookupKind::Prompt);
    assert_eq!(missing.id, "retired");
}

#[test]
fn prompt_index_is_scoped_to_survey() {
    let schema = schema();
    assert!(schema.prompt_index("sleep", "rating").is_err());
    let missing = schema.prompt_index("nap", "rating").unwrap_err();
    assert_eq!(missing.kind, LookupKind::Survey);
}

#[test]
fn prompt_meta_respects_repeatable_set_scope() {
    let schema = schema();
    let meal = schema
        .prompt_meta("mood", Some("meals"), "meal_size")
        .unwrap();
    assert_eq!(meal.unit.as_deref(), Some("g"));
    assert_eq!(meal.prompt_type, PromptType::Number);

    assert!(schema.prompt_meta("mood", None, "meal_size").is_err());
    assert!(schema.prompt_meta("mood", Some("meals"), "rating").is_err());

    let unknown_set = schema
        .prompt_meta("mood", Some("snacks"), "meal_size")
        .unwrap_err();
    assert_eq!(unknown_set.kind, LookupKind::RepeatableSet);

    let rating = schema.prompt_meta("mood", None, "rating").unwrap();
    assert_eq!(rating.display_label, "Rating");
}

#[test]
fn choice_value_defaults_to_key() {
    let schema = schema();
    let glossary = schema
        .prompt("rating")
        .unwrap()
        .choice_glossary
        .clone()
        .unwrap();
    assert_eq!(glossary.get("0").unwrap().value, "1");
    assert_eq!(glossary.get("1").unwrap().value, "1");
    assert_eq!(glossary.get("1").unwrap().label, "High");
}

#[test]
fn empty_campaign_urn_is_rejected() {
    let definition = CampaignDefinition {
        campaign_urn: "  ".to_string(),
        ..CampaignDefinition::default()
    };
    assert!(matches!(
        CampaignSchema::from_definition(&definition),
        Err(SchemaError::MissingCampaignUrn)
    ));
}

#[test]
fn unknown_item_is_rejected() {
    let definition = CampaignDefinition {
        campaign_urn: "urn:c".to_string(),
        surveys: vec![survey("s", &["a", "ghost"])],
        prompts: vec![prompt("a")],
        ..CampaignDefinition::default()
    };
    let err = CampaignSchema::from_definition(&definition).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownItem { ref survey_id, ref item_id } if survey_id == "s" && item_id == "ghost"
    ));
}

#[test]
fn prompt_shared_between_surveys_is_rejected() {
    let definition = CampaignDefinition {
        campaign_urn: "urn:c".to_string(),
        surveys: vec![survey("one", &["a"]), survey("two", &["a"])],
        prompts: vec![prompt("a")],
        ..CampaignDefinition::default()
    };
    let err = CampaignSchema::from_definition(&definition).unwrap_err();
    assert!(matches!(err, SchemaError::ReusedItem { .. }));
    assert!(err.to_string().contains("'two'"));
}

#[test]
fn duplicate_prompt_definition_is_rejected() {
    let definition = CampaignDefinition {
        campaign_urn: "urn:c".to_string(),
        surveys: vec![survey("s", &["a"])],
        prompts: vec![prompt("a"), prompt("a")],
        ..CampaignDefinition::default()
    };
    assert!(matches!(
        CampaignSchema::from_definition(&definition),
        Err(SchemaError::DuplicateId { ref id }) if id == "a"
    ));
}

#[test]
fn missing_display_label_is_rejected() {
    let mut unlabeled = prompt("a");
    unlabeled.display_label = None;
    let definition = CampaignDefinition {
        campaign_urn: "urn:c".to_string(),
        surveys: vec![survey("s", &["a"])],
        prompts: vec![unlabeled],
        ..CampaignDefinition::default()
    };
    assert!(matches!(
        CampaignSchema::from_definition(&definition),
        Err(SchemaError::MissingField { field: "display_label", .. })
    ));
}

#[test]
fn set_referencing_unknown_prompt_is_rejected() {
    let definition = CampaignDefinition {
        campaign_urn: "urn:c".to_string(),
        surveys: vec![survey("s", &["set"])],
        prompts: vec![prompt("a")],
        repeatable_sets: vec![RepeatableSetDefinition {
            id: "set".to_string(),
            prompts: vec!["a".to_string(), "b".to_string()],
        }],
        ..CampaignDefinition::default()
    };
    assert!(matches!(
        CampaignSchema::from_definition(&definition),
        Err(SchemaError::UnknownSetPrompt { ref prompt_id, .. }) if prompt_id == "b"
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        CampaignSchema::from_json("{"),
        Err(SchemaError::Parse(_))
    ));
}

proptest! {
    #[test]
    fn every_prompt_gets_a_distinct_slot(count in 1usize..12, split in 0usize..12) {
        let ids: Vec<String> = (0..count).map(|i| format!("p{i}")).collect();
        let split = split.min(count);
        let (first, second) = ids.split_at(split);
        let definition = CampaignDefinition {
            campaign_urn: "urn:c".to_string(),
            surveys: vec![
                survey("first", &first.iter().map(String::as_str).collect::<Vec<_>>()),
                survey("second", &second.iter().map(String::as_str).collect::<Vec<_>>()),
            ],
            prompts: ids.iter().map(|id| prompt(id)).collect(),
            ..CampaignDefinition::default()
        };
        let schema = CampaignSchema::from_definition(&definition).unwrap();

        prop_assert_eq!(schema.prompt_count("first").unwrap(), first.len());
        prop_assert_eq!(schema.prompt_count("second").unwrap(), second.len());
        for (position, id) in second.iter().enumerate() {
            prop_assert_eq!(schema.survey_id_for_prompt(id).unwrap(), "second");
            prop_assert_eq!(schema.prompt_index("second", id).unwrap(), position);
        }
    }
}
