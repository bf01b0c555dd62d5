// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marker cluster glyph sizing.

use crate::services::container::escape_attr;
use serde::{Deserialize, Serialize};

/// Smallest cluster glyph diameter, in pixels.
pub const MIN_CLUSTER_DIAMETER: f64 = 48.0;
/// Largest cluster glyph diameter, in pixels.
pub const MAX_CLUSTER_DIAMETER: f64 = 200.0;

const CLUSTER_CLASS: &str = "owc-openkaarten-streetmap__cluster-group";

/// Diameter of a cluster glyph: `child_count * size_multiplier`, clamped.
pub fn cluster_diameter(child_count: usize, size_multiplier: f64) -> f64 {
    let raw = child_count as f64 * size_multiplier;
    if raw.is_nan() {
        return MIN_CLUSTER_DIAMETER;
    }
    raw.clamp(MIN_CLUSTER_DIAMETER, MAX_CLUSTER_DIAMETER)
}

/// Marker clustering options passed to the map library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOptions {
    /// Zoom level at and above which markers are never clustered.
    pub disable_clustering_at_zoom: u8,
    /// Maximum radius, in pixels, a cluster covers.
    pub max_cluster_radius: u32,
    pub show_coverage_on_hover: bool,
    pub size_multiplier: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            disable_clustering_at_zoom: 18,
            max_cluster_radius: 80,
            show_coverage_on_hover: false,
            size_multiplier: 4.0,
        }
    }
}

/// Rendered cluster glyph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIcon {
    pub html: String,
    pub class_name: String,
    pub size: (f64, f64),
}

/// Build the glyph for a cluster of `child_count` markers.
pub fn cluster_icon(child_count: usize, size_multiplier: f64, color: &str) -> ClusterIcon {
    let diameter = cluster_diameter(child_count, size_multiplier);
    let html = format!(
        r#"<div class="{CLUSTER_CLASS}__circle {color}"><span class="{CLUSTER_CLASS}__count">{child_count}</span></div>"#,
        color = escape_attr(color),
    );
    ClusterIcon {
        html,
        class_name: CLUSTER_CLASS.to_string(),
        size: (diameter, diameter),
    }
}
