// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One mounted streetmap instance.
//!
//! Owns everything a mount needs: the rendered datasets, the layer to feature
//! index, marker leases and the polygon selection state. Icon refinements run
//! on tokio and report back over a channel; updates are applied on the
//! owner's side with `apply_icon_updates` or `settle`.

use crate::config::Config;
use crate::map::{LayerId, MapSurface, MarkerState};
use crate::models::{
    Bounds, Dataset, Feature, IconAsset, LatLng, MarkerIconRequest, MarkerStyle, TooltipCard,
};
use crate::services::bounds::compute_bounds;
use crate::services::cluster::{cluster_icon, ClusterIcon, ClusterOptions};
use crate::services::icon::{IconResolver, MarkerLease, Refinement};
use crate::services::overlap::OverlapSelector;
use crate::services::tooltip::build_tooltip_card;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Inline icon markup ready for a marker.
#[derive(Debug)]
struct IconUpdate {
    layer: LayerId,
    asset: IconAsset,
}

/// Position of a feature within the mounted datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FeatureRef {
    dataset: usize,
    feature: usize,
}

pub struct Streetmap<M: MapSurface> {
    map: M,
    resolver: Arc<IconResolver>,
    selector: OverlapSelector,
    default_color: String,
    cluster: ClusterOptions,
    datasets: Vec<Dataset>,
    features: HashMap<LayerId, FeatureRef>,
    markers: HashMap<LayerId, MarkerLease>,
    active_marker: Option<LayerId>,
    updates_tx: mpsc::UnboundedSender<IconUpdate>,
    updates_rx: mpsc::UnboundedReceiver<IconUpdate>,
    refinements: Vec<JoinHandle<Refinement>>,
}

impl<M: MapSurface> Streetmap<M> {
    /// `default_color` tints markers whose style names no colour.
    pub fn new(map: M, resolver: Arc<IconResolver>, default_color: impl Into<String>) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            map,
            resolver,
            selector: OverlapSelector::new(),
            default_color: default_color.into(),
            cluster: ClusterOptions::default(),
            datasets: Vec::new(),
            features: HashMap::new(),
            markers: HashMap::new(),
            active_marker: None,
            updates_tx,
            updates_rx,
            refinements: Vec::new(),
        }
    }

    /// Streetmap with an HTTP icon resolver, default marker colour and
    /// cluster options taken from `config`.
    pub fn from_config(map: M, config: &Config) -> Self {
        let resolver = Arc::new(IconResolver::from_config(config));
        Self::new(map, resolver, config.default_marker_color.clone())
            .with_cluster_options(config.cluster.clone())
    }

    pub fn with_cluster_options(mut self, cluster: ClusterOptions) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn cluster_options(&self) -> &ClusterOptions {
        &self.cluster
    }

    /// Glyph for a cluster of `child_count` markers at the configured size.
    pub fn cluster_icon(&self, child_count: usize, color: &str) -> ClusterIcon {
        cluster_icon(child_count, self.cluster.size_multiplier, color)
    }

    /// Icon refinements `settle` would still wait for.
    pub fn pending_refinements(&self) -> usize {
        self.refinements.len()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn active_marker(&self) -> Option<LayerId> {
        self.active_marker
    }

    pub fn selected_polygon(&self) -> Option<LayerId> {
        self.selector.selected()
    }

    /// Replace the rendered datasets and fit the view to them.
    ///
    /// The previous set is fully removed first. Must run inside a tokio
    /// runtime when any marker needs a remote icon.
    pub fn mount(&mut self, datasets: Vec<Dataset>) -> Option<Bounds> {
        self.clear();
        self.datasets = datasets;

        for (d, dataset) in self.datasets.iter().enumerate() {
            for (f, feature) in dataset.features.iter().enumerate() {
                let at = FeatureRef {
                    dataset: d,
                    feature: f,
                };
                for layer in render_feature(
                    &mut self.map,
                    &self.resolver,
                    &self.default_color,
                    &self.updates_tx,
                    &mut self.markers,
                    &mut self.refinements,
                    dataset,
                    feature,
                ) {
                    self.features.insert(layer, at);
                }
            }
        }

        let bounds = compute_bounds(&self.datasets);
        if let Some(bounds) = bounds {
            self.map.fit_bounds(bounds);
        }
        tracing::info!(
            datasets = self.datasets.len(),
            layers = self.features.len(),
            "Streetmap mounted"
        );
        bounds
    }

    /// Click on the map background or a polygon.
    pub fn click_map(&mut self, point: LatLng) -> Option<TooltipCard> {
        self.clear_marker_highlight();
        let layer = self.selector.select(&mut self.map, point)?;
        self.card_for(layer)
    }

    /// Click on a marker: mark it active, dim the rest and build its card.
    pub fn click_marker(&mut self, layer: LayerId) -> Option<TooltipCard> {
        if !self.markers.contains_key(&layer) {
            return None;
        }
        self.selector.reset(&mut self.map);

        for &id in self.markers.keys() {
            let state = if id == layer {
                MarkerState::Active
            } else {
                MarkerState::Dimmed
            };
            self.map.set_marker_state(id, state);
        }
        self.active_marker = Some(layer);
        self.card_for(layer)
    }

    /// Apply finished icon refinements. Returns how many markers changed.
    pub fn apply_icon_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates_rx.try_recv() {
            let live = self
                .markers
                .get(&update.layer)
                .is_some_and(MarkerLease::is_live);
            if live && self.map.set_marker_icon(update.layer, update.asset) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for every outstanding refinement, then apply the results.
    pub async fn settle(&mut self) -> usize {
        for handle in self.refinements.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Icon refinement task failed");
            }
        }
        self.apply_icon_updates()
    }

    /// Remove everything this instance rendered.
    pub fn unmount(&mut self) {
        self.clear();
        self.datasets.clear();
        tracing::info!("Streetmap unmounted");
    }

    fn clear(&mut self) {
        self.selector.reset(&mut self.map);
        for (id, lease) in self.markers.drain() {
            lease.release();
            self.map.remove_layer(id);
        }
        for id in self.features.drain().map(|(id, _)| id) {
            self.map.remove_layer(id);
        }
        self.active_marker = None;
        self.refinements.retain(|handle| !handle.is_finished());
        // Anything still queued belongs to released markers.
        while self.updates_rx.try_recv().is_ok() {}
    }

    fn clear_marker_highlight(&mut self) {
        if self.active_marker.take().is_some() {
            for &id in self.markers.keys() {
                self.map.set_marker_state(id, MarkerState::Normal);
            }
        }
    }

    fn card_for(&self, layer: LayerId) -> Option<TooltipCard> {
        let at = self.features.get(&layer)?;
        let dataset = self.datasets.get(at.dataset)?;
        let feature = dataset.features.get(at.feature)?;
        Some(build_tooltip_card(feature, dataset))
    }
}

/// Marker style of a feature: its own, else the dataset's.
fn marker_request(dataset: &Dataset, feature: &Feature, default_color: &str) -> MarkerIconRequest {
    let style: Option<&MarkerStyle> = feature
        .properties
        .marker
        .as_ref()
        .or(dataset.marker.as_ref());
    let color = style
        .and_then(|s| s.color.as_deref())
        .filter(|c| !c.is_empty())
        .unwrap_or(default_color);

    MarkerIconRequest {
        icon_url: style.and_then(|s| s.icon.clone()),
        icon_name: style.and_then(|s| s.icon_name.clone()),
        color: color.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_feature<M: MapSurface>(
    map: &mut M,
    resolver: &Arc<IconResolver>,
    default_color: &str,
    updates: &mpsc::UnboundedSender<IconUpdate>,
    markers: &mut HashMap<LayerId, MarkerLease>,
    refinements: &mut Vec<JoinHandle<Refinement>>,
    dataset: &Dataset,
    feature: &Feature,
) -> Vec<LayerId> {
    let Some(geometry) = feature.geometry.as_ref() else {
        return Vec::new();
    };
    let coordinates = &geometry.coordinates;

    match geometry.kind.as_str() {
        "Point" | "MultiPoint" => {
            let request = marker_request(dataset, feature, default_color);
            let positions: Vec<_> = match geometry.kind.as_str() {
                "Point" => coordinates.leaves().take(1).collect(),
                _ => coordinates.leaves().collect(),
            };
            positions
                .into_iter()
                .map(|p| {
                    let (icon, pending) = resolver.resolve(&request);
                    let layer = map.add_marker(LatLng::new(p.lat, p.lon), icon);
                    let lease = MarkerLease::new();
                    if let Some(pending) = pending {
                        let tx = updates.clone();
                        refinements.push(resolver.spawn_refinement(
                            pending,
                            lease.clone(),
                            move |asset| {
                                // Receiver gone means the map was dropped.
                                let _ = tx.send(IconUpdate { layer, asset });
                            },
                        ));
                    }
                    markers.insert(layer, lease);
                    layer
                })
                .collect()
        }
        "LineString" | "MultiLineString" => {
            let shape = coordinates.to_multi_line_string(&geometry.kind);
            if shape.0.iter().all(|line| line.0.is_empty()) {
                return Vec::new();
            }
            vec![map.add_line(shape)]
        }
        "Polygon" | "MultiPolygon" => {
            let shape = coordinates.to_multi_polygon(&geometry.kind);
            if shape.0.is_empty() {
                return Vec::new();
            }
            vec![map.add_polygon(shape)]
        }
        other => {
            tracing::debug!(kind = other, feature = %feature.id, "Skipping unsupported geometry");
            Vec::new()
        }
    }
}
