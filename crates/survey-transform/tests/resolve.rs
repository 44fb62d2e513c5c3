//! Tests for display value resolution.

use proptest::prelude::*;
use serde_json::json;
use survey_model::{ChoiceEntry, ChoiceGlossary, PromptType};
use survey_transform::{DisplayValue, ResolveIssue, resolve};

fn colors() -> ChoiceGlossary {
    [("1", "red"), ("2", "blue")]
        .into_iter()
        .map(|(key, value)| ChoiceEntry {
            key: key.to_string(),
            value: value.to_string(),
            label: value.to_uppercase(),
        })
        .collect()
}

#[test]
#[allow(clippy::approx_constant)]
fn numeric_coercion_law() {
    assert_eq!(
        resolve(&PromptType::Number, "42", None).value,
        DisplayValue::Integer(42)
    );
    assert_eq!(
        resolve(&PromptType::Number, "3.14", None).value,
        DisplayValue::Float(3.14)
    );
    assert_eq!(
        resolve(&PromptType::Number, "abc", None).value,
        DisplayValue::Text("abc".to_string())
    );
    assert_eq!(
        resolve(&PromptType::HoursBeforeNow, "3", None).value,
        DisplayValue::Integer(3)
    );
}

#[test]
fn multi_choice_resolves_every_key() {
    let glossary = colors();
    let resolution = resolve(&PromptType::MultiChoice, r#"["1","2"]"#, Some(&glossary));
    assert_eq!(
        resolution.value.to_json(),
        json!(["red", "blue"])
    );
    assert!(resolution.issue.is_none());

    let numeric_keys = resolve(&PromptType::MultiChoice, "[2, 1]", Some(&glossary));
    assert_eq!(numeric_keys.value.to_json(), json!(["blue", "red"]));
}

#[test]
fn multi_choice_is_all_or_nothing() {
    let glossary = colors();
    let resolution = resolve(&PromptType::MultiChoice, r#"["1","9"]"#, Some(&glossary));
    assert_eq!(resolution.value.to_json(), json!(["1", "9"]));
    assert_eq!(
        resolution.issue,
        Some(ResolveIssue::ChoiceNotInGlossary {
            key: "9".to_string()
        })
    );
}

#[test]
fn multi_choice_non_array_is_kept() {
    let glossary = colors();
    let skipped = resolve(&PromptType::MultiChoice, "NOT_DISPLAYED", Some(&glossary));
    assert_eq!(skipped.value, DisplayValue::Text("NOT_DISPLAYED".to_string()));
    assert!(skipped.issue.is_none());

    let scalar = resolve(&PromptType::MultiChoiceCustom, "1", Some(&glossary));
    assert_eq!(scalar.value, DisplayValue::Text("1".to_string()));
    assert_eq!(scalar.issue, Some(ResolveIssue::MultiChoiceNotArray));
}

#[test]
fn free_text_passes_through() {
    let resolution = resolve(&PromptType::Text, "  42  ", None);
    assert_eq!(resolution.value, DisplayValue::Text("  42  ".to_string()));
    let photo = resolve(&PromptType::Photo, "uuid-1", None);
    assert_eq!(photo.value, DisplayValue::Text("uuid-1".to_string()));
}

proptest! {
    #[test]
    fn integers_never_become_floats(value in any::<i64>()) {
        let resolution = resolve(&PromptType::Number, &value.to_string(), None);
        prop_assert_eq!(resolution.value, DisplayValue::Integer(value));
        prop_assert!(resolution.issue.is_none());
    }

    #[test]
    fn one_unknown_key_keeps_raw_sequence(
        known in prop::collection::vec(prop::sample::select(vec!["1", "2"]), 0..5),
        unknown in "[3-9]",
        position in 0usize..6,
    ) {
        let mut keys: Vec<String> = known.iter().map(|key| (*key).to_string()).collect();
        let position = position.min(keys.len());
        keys.insert(position, unknown);
        let raw = serde_json::to_string(&keys).unwrap();

        let resolution = resolve(&PromptType::MultiChoice, &raw, Some(&colors()));
        prop_assert_eq!(resolution.value.to_json(), json!(keys));
    }
}
