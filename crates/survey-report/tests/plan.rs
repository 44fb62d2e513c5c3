//! Tests for canonical column planning.

use std::collections::BTreeSet;

use proptest::prelude::*;
use survey_model::{CampaignSchema, ColumnId, StructuralColumn};
use survey_report::{ColumnPlanError, ColumnPlanner, parse_columns, plan};

const CAMPAIGN: &str = r#"{
    "campaign_urn": "urn:campaign:study:mood",
    "surveys": [
        { "id": "mood", "title": "Daily mood", "items": ["rating", "meals", "notes"] },
        { "id": "sleep", "title": "Sleep", "items": ["hours", "quality"] }
    ],
    "prompts": [
        { "id": "rating", "type": "single_choice", "display_label": "Rating" },
        { "id": "notes", "type": "text", "display_label": "Notes" },
        { "id": "meal_size", "type": "number", "display_label": "Size" },
        { "id": "hours", "type": "number", "display_label": "Hours" },
        { "id": "quality", "type": "single_choice", "display_label": "Quality" }
    ],
    "repeatable_sets": [{ "id": "meals", "prompts": ["meal_size"] }]
}"#;

fn schema() -> CampaignSchema {
    CampaignSchema::from_json(CAMPAIGN).expect("valid campaign")
}

fn present(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| (*id).to_string()).collect()
}

fn tokens(columns: &[ColumnId]) -> Vec<String> {
    columns.iter().map(ColumnId::token).collect()
}

#[test]
fn canonical_prefix_ignores_request_order() {
    let schema = schema();
    let requested = parse_columns(&["survey:id", "user:id", "context:timestamp"]).unwrap();
    let planned = plan(&requested, &BTreeSet::new(), &schema).unwrap();
    assert_eq!(
        tokens(&planned),
        vec!["user:id", "context:timestamp", "survey:id"]
    );
}

#[test]
fn unobserved_slots_are_kept_as_gaps() {
    let schema = schema();
    let requested = parse_columns(&["urn:ohmage:user:id", "urn:ohmage:prompt:response"]).unwrap();
    let planned = plan(&requested, &present(&["notes"]), &schema).unwrap();
    assert_eq!(
        tokens(&planned),
        vec![
            "user:id",
            "prompt:id:rating",
            "prompt:id:meal_size",
            "prompt:id:notes"
        ]
    );
}

#[test]
fn survey_blocks_follow_schema_order() {
    let schema = schema();
    let requested = vec![ColumnId::AllPrompts];
    let planned = plan(&requested, &present(&["quality", "rating"]), &schema).unwrap();
    assert_eq!(
        tokens(&planned),
        vec![
            "prompt:id:rating",
            "prompt:id:meal_size",
            "prompt:id:notes",
            "prompt:id:hours",
            "prompt:id:quality"
        ]
    );
}

#[test]
fn all_columns_expands_the_catalog() {
    let schema = schema();
    let planned = plan(&[ColumnId::AllColumns], &present(&["hours"]), &schema).unwrap();

    assert_eq!(planned.len(), StructuralColumn::ALL.len() + 2);
    assert_eq!(
        tokens(&planned[..8]),
        vec![
            "user:id",
            "context:timestamp",
            "context:utc_timestamp",
            "survey:id",
            "repeatable_set:id",
            "repeatable_set:iteration",
            "prompt:id:hours",
            "prompt:id:quality"
        ]
    );
    let rest = tokens(&planned[8..]);
    let mut sorted = rest.clone();
    sorted.sort();
    assert_eq!(rest, sorted);
    assert_eq!(rest.first().map(String::as_str), Some("context:client"));
    assert_eq!(rest.last().map(String::as_str), Some("survey_response:id"));
}

#[test]
fn legacy_context_tokens_plan_after_the_prefix() {
    let schema = schema();
    let requested = parse_columns(&[
        "urn:ohmage:survey_response:id",
        "urn:ohmage:context:epoch_millis",
        "context:location:timezone",
        "context:date",
        "user:id",
    ])
    .unwrap();
    let planned = plan(&requested, &BTreeSet::new(), &schema).unwrap();
    assert_eq!(
        tokens(&planned),
        vec![
            "user:id",
            "context:date",
            "context:epoch_millis",
            "context:location:timezone",
            "survey_response:id"
        ]
    );
}

#[test]
fn undeclared_observed_prompts_are_appended() {
    let schema = schema();
    let requested = parse_columns(&["prompt:response", "survey:title"]).unwrap();
    let planned = plan(&requested, &present(&["zeta", "hours", "alpha"]), &schema).unwrap();
    assert_eq!(
        tokens(&planned),
        vec![
            "prompt:id:hours",
            "prompt:id:quality",
            "prompt:id:alpha",
            "prompt:id:zeta",
            "survey:title"
        ]
    );
}

#[test]
fn explicit_prompt_selects_its_survey_block() {
    let schema = schema();
    let requested = parse_columns(&["prompt:id:quality"]).unwrap();
    let planned = plan(&requested, &present(&["rating"]), &schema).unwrap();
    assert_eq!(
        tokens(&planned),
        vec!["prompt:id:hours", "prompt:id:quality"]
    );
}

#[test]
fn planning_errors() {
    let schema = schema();
    let planner = ColumnPlanner::new(&schema);
    assert_eq!(
        planner.plan(&[], &BTreeSet::new()),
        Err(ColumnPlanError::EmptyRequest)
    );

    let err = planner
        .plan(&[ColumnId::prompt("retired")], &BTreeSet::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "column 'prompt:id:retired' names prompt 'retired', which the campaign does not declare"
    );

    assert!(matches!(
        parse_columns(&["user:id", "context:weather"]),
        Err(ColumnPlanError::Parse(_))
    ));
}

proptest! {
    #[test]
    fn prompt_column_count_is_stable(
        observed in prop::collection::btree_set(
            prop::sample::select(vec!["rating", "meal_size", "notes"]),
            1..=3,
        )
    ) {
        let schema = schema();
        let present: BTreeSet<String> = observed.iter().map(|id| (*id).to_string()).collect();
        let planned = plan(&[ColumnId::AllPrompts], &present, &schema).unwrap();
        prop_assert_eq!(planned.len(), schema.prompt_count("mood").unwrap());
    }

    #[test]
    fn prefix_order_is_fixed(
        request in Just(vec![
            "repeatable_set:iteration",
            "survey:id",
            "context:utc_timestamp",
            "user:id",
            "context:timestamp",
            "repeatable_set:id",
        ]).prop_shuffle()
    ) {
        let schema = schema();
        let requested = parse_columns(&request).unwrap();
        let planned = plan(&requested, &BTreeSet::new(), &schema).unwrap();
        let expected: Vec<ColumnId> = survey_report::CANONICAL_PREFIX
            .into_iter()
            .map(ColumnId::from)
            .collect();
        prop_assert_eq!(planned, expected);
    }
}
