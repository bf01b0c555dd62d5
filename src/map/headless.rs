// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory map surface with no rendering backend.

use super::{HighlightStyle, LayerId, LayerKind, MapSurface, MarkerState};
use crate::models::{Bounds, IconAsset, LatLng};
use geo::{BoundingRect, MultiLineString, MultiPolygon};

#[derive(Debug, Clone)]
enum Layer {
    Marker {
        position: LatLng,
        icon: IconAsset,
        state: MarkerState,
    },
    Polygon {
        shape: MultiPolygon<f64>,
        bbox: Option<Bounds>,
    },
    Line {
        shape: MultiLineString<f64>,
        bbox: Option<Bounds>,
    },
    Highlight {
        outline: geojson::Geometry,
        style: HighlightStyle,
    },
}

impl Layer {
    fn kind(&self) -> LayerKind {
        match self {
            Layer::Marker { .. } => LayerKind::Marker,
            Layer::Polygon { .. } => LayerKind::Polygon,
            Layer::Line { .. } => LayerKind::Line,
            Layer::Highlight { .. } => LayerKind::Highlight,
        }
    }
}

/// Layer registry that behaves like a browser map without drawing anything.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_id: u64,
    layers: Vec<(LayerId, Layer)>,
    viewport: Option<Bounds>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Last bounds passed to `fit_bounds`.
    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    pub fn marker_icon(&self, id: LayerId) -> Option<&IconAsset> {
        match self.get(id)? {
            Layer::Marker { icon, .. } => Some(icon),
            _ => None,
        }
    }

    pub fn marker_state(&self, id: LayerId) -> Option<MarkerState> {
        match self.get(id)? {
            Layer::Marker { state, .. } => Some(*state),
            _ => None,
        }
    }

    pub fn marker_position(&self, id: LayerId) -> Option<LatLng> {
        match self.get(id)? {
            Layer::Marker { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn highlight_style(&self, id: LayerId) -> Option<&HighlightStyle> {
        match self.get(id)? {
            Layer::Highlight { style, .. } => Some(style),
            _ => None,
        }
    }

    pub fn layer_kind(&self, id: LayerId) -> Option<LayerKind> {
        self.get(id).map(Layer::kind)
    }

    /// Ids of all layers of one kind, in registry order.
    pub fn layers_of(&self, kind: LayerKind) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|(_, layer)| layer.kind() == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|(layer_id, _)| *layer_id == id)
            .map(|(_, layer)| layer)
    }

    fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|(layer_id, _)| *layer_id == id)
            .map(|(_, layer)| layer)
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.push((id, layer));
        id
    }
}

impl MapSurface for HeadlessMap {
    fn add_marker(&mut self, position: LatLng, icon: IconAsset) -> LayerId {
        self.insert(Layer::Marker {
            position,
            icon,
            state: MarkerState::Normal,
        })
    }

    fn set_marker_icon(&mut self, id: LayerId, new_icon: IconAsset) -> bool {
        match self.get_mut(id) {
            Some(Layer::Marker { icon, .. }) => {
                *icon = new_icon;
                true
            }
            _ => false,
        }
    }

    fn set_marker_state(&mut self, id: LayerId, new_state: MarkerState) {
        if let Some(Layer::Marker { state, .. }) = self.get_mut(id) {
            *state = new_state;
        }
    }

    fn add_polygon(&mut self, shape: MultiPolygon<f64>) -> LayerId {
        let bbox = shape.bounding_rect().map(Bounds::from_rect);
        self.insert(Layer::Polygon { shape, bbox })
    }

    fn add_line(&mut self, shape: MultiLineString<f64>) -> LayerId {
        let bbox = shape.bounding_rect().map(Bounds::from_rect);
        self.insert(Layer::Line { shape, bbox })
    }

    fn add_highlight(&mut self, outline: geojson::Geometry, style: HighlightStyle) -> LayerId {
        self.insert(Layer::Highlight { outline, style })
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|(layer_id, _)| *layer_id != id);
        self.layers.len() != before
    }

    fn has_layer(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }

    fn layers(&self) -> Vec<(LayerId, LayerKind)> {
        self.layers
            .iter()
            .map(|(id, layer)| (*id, layer.kind()))
            .collect()
    }

    fn bounds_contain(&self, id: LayerId, point: LatLng) -> bool {
        match self.get(id) {
            Some(Layer::Polygon { bbox: Some(bbox), .. })
            | Some(Layer::Line { bbox: Some(bbox), .. }) => bbox.contains(point),
            Some(Layer::Marker { position, .. }) => *position == point,
            _ => false,
        }
    }

    fn layer_geojson(&self, id: LayerId) -> Option<geojson::Geometry> {
        match self.get(id)? {
            Layer::Polygon { shape, .. } => {
                Some(geojson::Geometry::new(geojson::Value::from(shape)))
            }
            Layer::Line { shape, .. } => Some(geojson::Geometry::new(geojson::Value::from(shape))),
            Layer::Marker { position, .. } => Some(geojson::Geometry::new(
                geojson::Value::Point(vec![position.long, position.lat]),
            )),
            Layer::Highlight { outline, .. } => Some(outline.clone()),
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport = Some(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0)
        ]])
    }

    #[test]
    fn test_layers_keep_insertion_order() {
        let mut map = HeadlessMap::new();
        let a = map.add_polygon(square(0.0, 0.0, 1.0));
        let b = map.add_line(MultiLineString::new(vec![]));
        let c = map.add_polygon(square(5.0, 5.0, 1.0));

        let ids: Vec<LayerId> = map.layers().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b, c]);

        assert!(map.remove_layer(b));
        assert!(!map.remove_layer(b));
        assert_eq!(map.layers_of(LayerKind::Polygon), vec![a, c]);
    }

    #[test]
    fn test_bounds_containment_is_inclusive() {
        let mut map = HeadlessMap::new();
        let id = map.add_polygon(square(0.0, 0.0, 2.0));

        assert!(map.bounds_contain(id, LatLng::new(1.0, 1.0)));
        assert!(map.bounds_contain(id, LatLng::new(2.0, 0.0)));
        assert!(!map.bounds_contain(id, LatLng::new(2.1, 1.0)));
    }

    #[test]
    fn test_polygon_exports_geojson() {
        let mut map = HeadlessMap::new();
        let id = map.add_polygon(square(0.0, 0.0, 1.0));
        let geometry = map.layer_geojson(id).expect("geometry");
        assert!(matches!(geometry.value, geojson::Value::MultiPolygon(_)));
    }
}
