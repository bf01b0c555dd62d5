// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Click-to-cycle selection among stacked polygons.

use crate::map::{HighlightStyle, LayerId, LayerKind, MapSurface};
use crate::models::LatLng;

/// Selection state; mutated only through `select` and `reset`.
#[derive(Debug, Default)]
pub struct OverlapSelector {
    candidates: Vec<LayerId>,
    cursor: usize,
    selected: Option<LayerId>,
    highlight: Option<LayerId>,
}

impl OverlapSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polygons that contained the last clicked point, in registry order.
    pub fn candidates(&self) -> &[LayerId] {
        &self.candidates
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The polygon currently highlighted.
    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    /// The outline overlay layer drawn over the selected polygon.
    pub fn highlight_layer(&self) -> Option<LayerId> {
        self.highlight
    }

    /// Handle a click at `point`.
    ///
    /// The cursor advances before it is read, so the first click on a stack
    /// of several polygons selects the second one. The cursor also carries
    /// over between click locations.
    pub fn select<M: MapSurface + ?Sized>(&mut self, map: &mut M, point: LatLng) -> Option<LayerId> {
        self.candidates = map
            .layers()
            .into_iter()
            .filter(|(id, kind)| *kind == LayerKind::Polygon && map.bounds_contain(*id, point))
            .map(|(id, _)| id)
            .collect();

        if self.candidates.is_empty() {
            self.clear_highlight(map);
            return None;
        }

        self.cursor = (self.cursor + 1) % self.candidates.len();
        let chosen = self.candidates[self.cursor];

        self.clear_highlight(map);
        if let Some(outline) = map.layer_geojson(chosen) {
            self.highlight = Some(map.add_highlight(outline, HighlightStyle::default()));
        }
        self.selected = Some(chosen);

        tracing::debug!(
            layer = chosen.0,
            candidates = self.candidates.len(),
            cursor = self.cursor,
            "Polygon selected"
        );
        Some(chosen)
    }

    /// Drop the highlight and forget all candidates.
    pub fn reset<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        self.clear_highlight(map);
        self.candidates.clear();
        self.cursor = 0;
    }

    fn clear_highlight<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        if let Some(id) = self.highlight.take() {
            map.remove_layer(id);
        }
        self.selected = None;
    }
}
