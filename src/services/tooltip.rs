// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tooltip card assembly from dataset and feature metadata.

use crate::models::dataset::layout;
use crate::models::{Dataset, Feature, TooltipCard, TooltipEntries};
use serde_json::Value;

/// Build the card for `feature`, a member of `dataset`.
///
/// For each field the first tooltip entry with the matching layout wins. A
/// missing or empty value falls back to `properties.title` for the location
/// title and to `""` otherwise.
pub fn build_tooltip_card(feature: &Feature, dataset: &Dataset) -> TooltipCard {
    let tooltip = &feature.properties.tooltip;

    let location_title = text_field(tooltip, layout::TITLE)
        .or_else(|| feature.properties.title.clone())
        .unwrap_or_default();

    TooltipCard {
        dataset_title: dataset.title.clone(),
        dataset_id: feature.id.clone(),
        dataset_type: dataset.kind.clone(),
        location_title,
        meta: text_field(tooltip, layout::META).unwrap_or_default(),
        text: text_field(tooltip, layout::TEXT).unwrap_or_default(),
        button: tooltip.first(layout::BUTTON).cloned(),
        image: tooltip
            .first(layout::IMAGE)
            .and_then(|entry| entry.field(layout::IMAGE))
            .filter(|value| is_present(value))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new())),
        properties: feature.properties.clone(),
        coordinates: feature
            .geometry
            .as_ref()
            .map(|g| g.coordinates.clone())
            .unwrap_or_default(),
    }
}

/// The entry's value under its own layout key (`{layout: "meta", meta: …}`).
fn text_field(tooltip: &TooltipEntries, layout: &str) -> Option<String> {
    let value = tooltip.first(layout)?.field(layout)?;
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(value: Value) -> Feature {
        serde_json::from_value(value).expect("valid feature")
    }

    fn dataset() -> Dataset {
        Dataset {
            id: "d1".to_string(),
            title: "D".to_string(),
            kind: "T".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_layout_precedence() {
        let f = feature(json!({
            "id": "f1",
            "properties": {"tooltip": [
                {"layout": "title", "title": "X"},
                {"layout": "meta", "meta": "Y"}
            ]}
        }));
        let card = build_tooltip_card(&f, &dataset());

        assert_eq!(card.dataset_title, "D");
        assert_eq!(card.dataset_type, "T");
        assert_eq!(card.dataset_id, "f1");
        assert_eq!(card.location_title, "X");
        assert_eq!(card.meta, "Y");
        assert_eq!(card.text, "");
        assert_eq!(card.button, None);
        assert_eq!(card.image, json!(""));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let f = feature(json!({
            "properties": {"tooltip": [
                {"layout": "text", "text": "first"},
                {"layout": "text", "text": "second"}
            ]}
        }));
        assert_eq!(build_tooltip_card(&f, &dataset()).text, "first");
    }

    #[test]
    fn test_title_falls_back_to_feature_title() {
        let f = feature(json!({"properties": {"title": "Fallback"}}));
        assert_eq!(build_tooltip_card(&f, &dataset()).location_title, "Fallback");

        let empty = feature(json!({
            "properties": {"title": "Fallback", "tooltip": [{"layout": "title", "title": ""}]}
        }));
        assert_eq!(
            build_tooltip_card(&empty, &dataset()).location_title,
            "Fallback"
        );
    }

    #[test]
    fn test_button_is_returned_verbatim() {
        let f = feature(json!({
            "properties": {"tooltip": [
                {"layout": "button", "button_text": "Meer info", "button_url": "https://example.org"}
            ]}
        }));
        let card = build_tooltip_card(&f, &dataset());
        let button = card.button.expect("button");
        assert_eq!(button.layout, "button");
        assert_eq!(button.payload["button_url"], "https://example.org");
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let f = feature(json!({
            "id": "f1",
            "geometry": {"type": "Point", "coordinates": [5.0, 52.0]},
            "properties": {"tooltip": {"a": {"layout": "meta", "meta": "M"}}}
        }));
        let before = f.clone();
        let card = build_tooltip_card(&f, &dataset());
        assert_eq!(f, before);
        assert_eq!(card.meta, "M");
        assert_eq!(
            serde_json::to_value(&card.coordinates).unwrap(),
            json!([5.0, 52.0])
        );
    }
}
