// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tooltip card shown when a feature is inspected.

use super::dataset::{FeatureProperties, TooltipEntry};
use super::geometry::Coordinate;
use serde::Serialize;
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Display payload for a selected feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TooltipCard {
    pub dataset_title: String,
    /// The feature id (the frontend keys cards by it).
    pub dataset_id: String,
    pub dataset_type: String,
    pub location_title: String,
    pub meta: String,
    pub text: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown> | null"))]
    pub button: Option<TooltipEntry>,
    /// Usually an image URL; passed through verbatim when it is an object.
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub image: Value,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub properties: FeatureProperties,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub coordinates: Coordinate,
}
