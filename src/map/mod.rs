// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The map-library capability set the engine drives.
//!
//! Pan/zoom, tiles and DOM placement live in the map library. The engine only
//! needs to add and remove layers, swap marker icons, enumerate layers and ask
//! whether a layer's bounds contain a point.

pub mod headless;

pub use headless::HeadlessMap;

use crate::models::{Bounds, IconAsset, LatLng};
use geo::{MultiLineString, MultiPolygon};
use serde::Serialize;

/// Opaque layer handle. Never reused within one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Marker,
    Polygon,
    Line,
    /// Selection outline drawn by the overlap selector.
    Highlight,
}

/// Visual emphasis of a marker element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkerState {
    #[default]
    Normal,
    Active,
    Dimmed,
}

/// Outline style for a highlighted polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
    pub interactive: bool,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: "#0377fc".to_string(),
            weight: 4,
            opacity: 0.9,
            interactive: false,
        }
    }
}

/// Operations the engine needs from a map implementation.
pub trait MapSurface {
    fn add_marker(&mut self, position: LatLng, icon: IconAsset) -> LayerId;

    /// Replace a marker's icon. Returns `false` if the layer is gone.
    fn set_marker_icon(&mut self, id: LayerId, icon: IconAsset) -> bool;

    fn set_marker_state(&mut self, id: LayerId, state: MarkerState);

    fn add_polygon(&mut self, shape: MultiPolygon<f64>) -> LayerId;

    fn add_line(&mut self, shape: MultiLineString<f64>) -> LayerId;

    fn add_highlight(&mut self, outline: geojson::Geometry, style: HighlightStyle) -> LayerId;

    /// Returns `false` if the layer was not registered.
    fn remove_layer(&mut self, id: LayerId) -> bool;

    fn has_layer(&self, id: LayerId) -> bool;

    /// Registered layers in registry (insertion) order.
    fn layers(&self) -> Vec<(LayerId, LayerKind)>;

    /// Whether the layer's bounding box contains `point` (edges inclusive).
    fn bounds_contain(&self, id: LayerId, point: LatLng) -> bool;

    /// The layer's shape as GeoJSON, for drawing outlines.
    fn layer_geojson(&self, id: LayerId) -> Option<geojson::Geometry>;

    fn fit_bounds(&mut self, bounds: Bounds);
}
