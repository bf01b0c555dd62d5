// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Openkaarten dataset and feature models.

use super::de::{null_as_default, one_or_many, string_or_number};
use super::geometry::Geometry;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Layout tag of a tooltip entry.
pub mod layout {
    pub const TITLE: &str = "title";
    pub const META: &str = "meta";
    pub const TEXT: &str = "text";
    pub const BUTTON: &str = "button";
    pub const IMAGE: &str = "image";
}

/// One dataset of a `DatasetCollection`. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub features: Vec<Feature>,
    /// Default marker style for the dataset's point features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
}

/// One geographic entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: FeatureProperties,
}

/// Feature metadata. Unknown keys are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "TooltipEntries::is_empty")]
    pub tooltip: TooltipEntries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marker appearance as configured in Openkaarten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// URL of a hosted SVG icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Name of an icon in the shared icon set (without `.svg`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
}

/// A tooltip block: `{layout, ...payload}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TooltipEntry {
    #[serde(default)]
    pub layout: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl TooltipEntry {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// Tooltip entries normalised to a sequence.
///
/// A keyed mapping is flattened to its values in the mapping's insertion
/// order. That order carries no meaning upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TooltipEntries(pub Vec<TooltipEntry>);

impl TooltipEntries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TooltipEntry> {
        self.0.iter()
    }

    /// First entry with the given layout.
    pub fn first(&self, layout: &str) -> Option<&TooltipEntry> {
        self.0.iter().find(|entry| entry.layout == layout)
    }
}

impl<'de> Deserialize<'de> for TooltipEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values: Vec<Value> = match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        };
        // Entries that are not objects cannot carry a layout.
        let entries = values
            .into_iter()
            .filter(Value::is_object)
            .map(serde_json::from_value)
            .collect::<Result<Vec<TooltipEntry>, _>>()
            .map_err(serde::de::Error::custom)?;
        Ok(TooltipEntries(entries))
    }
}
